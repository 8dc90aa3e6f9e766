use log::*;
use notify_queue::NotificationQueue;
use price_watch_engine::{RefreshApi, SqliteDatabase};
use pw_common::Metrics;
use scraper_client::ScraperApi;
use tokio::task::JoinHandle;

/// Starts the scheduled refresh worker. Do not await the returned JoinHandle, as it will run
/// indefinitely.
pub fn start_refresh_worker(
    db: SqliteDatabase,
    scraper: ScraperApi,
    queue: NotificationQueue,
    metrics: Metrics,
    batch_size: usize,
    interval_secs: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        let api = RefreshApi::new(db, scraper, queue, metrics).with_batch_size(batch_size);
        info!("🕰️ Price refresh worker started, running every {interval_secs}s");
        loop {
            timer.tick().await;
            debug!("🕰️ Triggering scheduled price update");
            match api.run_once().await {
                Ok(processed) => {
                    if processed > 0 {
                        info!("🕰️ Scheduled refresh complete. {processed} observations processed");
                    }
                },
                Err(e) => {
                    error!("🕰️ Error running scheduled price refresh: {e}");
                },
            }
        }
    })
}
