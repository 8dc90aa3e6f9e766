use std::env;

use log::*;
use notify_queue::QueueConfig;
use price_watch_engine::DEFAULT_BATCH_SIZE;
use scraper_client::ScraperConfig;

const DEFAULT_PW_HOST: &str = "127.0.0.1";
const DEFAULT_PW_PORT: u16 = 8480;
const DEFAULT_DATABASE_URL: &str = "sqlite://./price_watch.db";
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// How many stale observations one refresh run takes on.
    pub batch_size: usize,
    /// Seconds between scheduled refresh runs. 0 disables the in-process scheduler, leaving the
    /// cron endpoint as the only trigger.
    pub refresh_interval_secs: u64,
    pub scraper: ScraperConfig,
    pub queue: QueueConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PW_HOST.to_string(),
            port: DEFAULT_PW_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            scraper: ScraperConfig::default(),
            queue: QueueConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("PW_HOST").ok().unwrap_or_else(|| DEFAULT_PW_HOST.into());
        let port = env::var("PW_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for PW_PORT. {e} Using the default, {DEFAULT_PW_PORT}, instead.");
                    DEFAULT_PW_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_PW_PORT);
        let database_url = env::var("PW_DATABASE_URL").unwrap_or_else(|_| {
            warn!("🪛️ PW_DATABASE_URL not set, using {DEFAULT_DATABASE_URL} as default");
            DEFAULT_DATABASE_URL.to_string()
        });
        let batch_size = env::var("PW_BATCH_SIZE")
            .ok()
            .map(|s| {
                s.parse::<usize>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid value for PW_BATCH_SIZE. {e} Using {DEFAULT_BATCH_SIZE}.");
                    DEFAULT_BATCH_SIZE
                })
            })
            .unwrap_or(DEFAULT_BATCH_SIZE);
        let refresh_interval_secs = env::var("PW_REFRESH_INTERVAL_SECS")
            .ok()
            .map(|s| {
                s.parse::<u64>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid value for PW_REFRESH_INTERVAL_SECS. {e} Using \
                         {DEFAULT_REFRESH_INTERVAL_SECS}."
                    );
                    DEFAULT_REFRESH_INTERVAL_SECS
                })
            })
            .unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS);
        let scraper = ScraperConfig::new_from_env_or_default();
        let queue = QueueConfig::new_from_env_or_default();
        Self { host, port, database_url, batch_size, refresh_interval_secs, scraper, queue }
    }
}
