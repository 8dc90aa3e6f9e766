use std::sync::Arc;

use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};
use log::*;
use notify_queue::NotificationQueue;
use price_watch_engine::{ObservationsApi, RefreshApi, SqliteDatabase};
use pw_common::{InMemoryMetrics, Metrics};
use scraper_client::ScraperApi;

use crate::{config::ServerConfig, errors::ServerError, refresh_worker::start_refresh_worker, routes};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    SqliteDatabase::create_database(&config.database_url)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;

    let metrics_sink = Arc::new(InMemoryMetrics::default());
    let metrics = Metrics::new(metrics_sink.clone());
    let scraper = ScraperApi::new(config.scraper.clone(), metrics.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let queue = NotificationQueue::connect(&config.queue, metrics.clone())
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;

    if config.refresh_interval_secs > 0 {
        start_refresh_worker(
            db.clone(),
            scraper.clone(),
            queue.clone(),
            metrics.clone(),
            config.batch_size,
            config.refresh_interval_secs,
        );
    } else {
        warn!("🕰️ The in-process refresh scheduler is disabled; prices only refresh via the cron endpoint");
    }

    let srv = create_server_instance(config, db, scraper, queue, metrics, metrics_sink)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    scraper: ScraperApi,
    queue: NotificationQueue,
    metrics: Metrics,
    metrics_sink: Arc<InMemoryMetrics>,
) -> Result<Server, ServerError> {
    let batch_size = config.batch_size;
    let srv = HttpServer::new(move || {
        let refresh_api = RefreshApi::new(db.clone(), scraper.clone(), queue.clone(), metrics.clone())
            .with_batch_size(batch_size);
        let observations_api = ObservationsApi::new(db.clone(), scraper.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("pw::access_log"))
            .app_data(web::Data::new(refresh_api))
            .app_data(web::Data::new(observations_api))
            .app_data(web::Data::from(metrics_sink.clone()))
            .configure(routes::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
