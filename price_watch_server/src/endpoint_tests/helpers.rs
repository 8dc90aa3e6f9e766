use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer};
use notify_queue::{
    aws_sdk_sqs::{
        config::{BehaviorVersion, Credentials, Region},
        Client,
        Config,
    },
    NotificationQueue,
    SqsProducer,
};
use price_watch_engine::{ObservationsApi, RefreshApi, SqliteDatabase};
use pw_common::{InMemoryMetrics, Metrics};
use scraper_client::{ScraperApi, ScraperConfig};

use crate::routes::{Observations, Refresh};

/// Everything a route test needs: a migrated throwaway database, a scraper client pointed
/// wherever the test wants, a queue producer that never reaches a real broker, and the shared
/// counter sink.
pub struct TestContext {
    pub db: SqliteDatabase,
    pub sink: Arc<InMemoryMetrics>,
    pub scraper: ScraperApi,
    pub queue: NotificationQueue,
}

impl TestContext {
    pub async fn new(scraper_base_url: &str) -> Self {
        let _ = env_logger::try_init();
        let url = format!("sqlite://{}/pw_server_test_{}.db", std::env::temp_dir().display(), rand::random::<u64>());
        SqliteDatabase::create_database(&url).await.expect("Error creating database");
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error connecting to database");
        db.run_migrations().await.expect("Error running migrations");

        let sink = Arc::new(InMemoryMetrics::default());
        let metrics = Metrics::new(sink.clone());
        let config = ScraperConfig { base_url: scraper_base_url.to_string(), ..Default::default() };
        let scraper = ScraperApi::new(config, metrics.clone()).expect("Error creating scraper client");
        let queue = dummy_queue(metrics);
        Self { db, sink, scraper, queue }
    }

    pub fn refresh_data(&self) -> web::Data<Refresh> {
        let metrics = Metrics::new(self.sink.clone());
        web::Data::new(RefreshApi::new(self.db.clone(), self.scraper.clone(), self.queue.clone(), metrics))
    }

    pub fn observations_data(&self) -> web::Data<Observations> {
        web::Data::new(ObservationsApi::new(self.db.clone(), self.scraper.clone()))
    }

    pub fn sink_data(&self) -> web::Data<InMemoryMetrics> {
        web::Data::from(self.sink.clone())
    }
}

/// An SQS producer built from static test credentials and an unroutable endpoint. It constructs
/// without any network access; a publish would fail asynchronously, which is exactly the
/// fire-and-forget contract.
pub fn dummy_queue(metrics: Metrics) -> NotificationQueue {
    let config = Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .credentials_provider(Credentials::new("test", "test", None, None, "static"))
        .region(Region::new("eu-central-1"))
        .endpoint_url("http://127.0.0.1:1")
        .build();
    let client = Client::from_conf(config);
    NotificationQueue::Sqs(SqsProducer::new(client, "http://127.0.0.1:1/000000000000/test-queue", metrics))
}

/// Serve a canned price-source answer on a random local port and return the base URL.
pub async fn spawn_fake_scraper() -> String {
    let srv = HttpServer::new(|| {
        App::new().route(
            "/scrape_direct_url",
            web::post().to(|| async {
                HttpResponse::Ok().json(serde_json::json!({
                    "found_product_name": "Fake Product",
                    "price": 49.99,
                    "currency": "PLN",
                    "canonical_url": "https://store.example/p/fake"
                }))
            }),
        )
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("Could not bind the fake scraper");
    let addr = srv.addrs()[0];
    actix_web::rt::spawn(srv.run());
    format!("http://{addr}")
}
