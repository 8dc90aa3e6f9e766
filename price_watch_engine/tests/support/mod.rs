#![allow(dead_code)]

use std::{
    collections::HashMap,
    str::FromStr,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use log::*;
use price_watch_engine::{
    db_types::{NewObservation, Observation},
    ObservationStore,
    SqliteDatabase,
    StoreError,
};
use pw_common::{
    FetchOutcome,
    NotificationError,
    NotificationEvent,
    NotificationProducer,
    Price,
    PriceSource,
    SourceUnreachable,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub async fn prepare_test_store() -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = random_db_path();
    SqliteDatabase::create_database(&url).await.expect("Error creating database");
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    db.run_migrations().await.expect("Error running DB migrations");
    db
}

pub fn random_db_path() -> String {
    format!("sqlite://{}/pw_test_store_{}.db", std::env::temp_dir().display(), rand::random::<u64>())
}

pub async fn tear_down(mut db: SqliteDatabase) {
    let url = db.url().to_string();
    if let Err(e) = db.close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    Sqlite::drop_database(&url).await.unwrap();
}

pub fn price(s: &str) -> Price {
    Price::from_str(s).unwrap()
}

/// Insert an observation that has already been checked once: one sample, price and
/// `last_checked_at` both from `checked_at`.
pub async fn seed_checked(
    db: &SqliteDatabase,
    owner: &str,
    name: &str,
    url: &str,
    price_str: &str,
    checked_at: DateTime<Utc>,
) -> Observation {
    let initial = price(price_str);
    let mut observation =
        db.insert_observation(NewObservation::new(name, url, owner, initial)).await.expect("Error inserting");
    observation.append_sample(initial, checked_at);
    observation.mark_checked(checked_at);
    db.save(observation).await.expect("Error saving seeded observation")
}

/// Insert an observation that has never been checked: no history, `last_checked_at` NULL.
pub async fn seed_unchecked(db: &SqliteDatabase, owner: &str, name: &str, url: &str, price_str: &str) -> Observation {
    db.insert_observation(NewObservation::new(name, url, owner, price(price_str)))
        .await
        .expect("Error inserting")
}

//--------------------------------------   ScriptedSource    ---------------------------------------------------------

/// A price source with canned answers, keyed by the query string or URL. Unscripted lookups
/// resolve to `NotFound` so a test failure shows up as a missing script rather than a panic
/// inside the pipeline. Every URL lookup is recorded in order.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    answers: Arc<Mutex<HashMap<String, Result<FetchOutcome, SourceUnreachable>>>>,
    url_calls: Arc<Mutex<Vec<String>>>,
    name_calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSource {
    pub fn script(&self, key: &str, answer: Result<FetchOutcome, SourceUnreachable>) {
        self.answers.lock().unwrap().insert(key.to_string(), answer);
    }

    pub fn script_found(&self, key: &str, name: &str, price_str: &str, canonical_url: &str) {
        self.script(
            key,
            Ok(FetchOutcome::Found {
                product_name: name.to_string(),
                price: price(price_str),
                canonical_url: canonical_url.to_string(),
            }),
        );
    }

    pub fn url_calls(&self) -> Vec<String> {
        self.url_calls.lock().unwrap().clone()
    }

    pub fn name_calls(&self) -> Vec<String> {
        self.name_calls.lock().unwrap().clone()
    }

    fn lookup(&self, key: &str) -> Result<FetchOutcome, SourceUnreachable> {
        self.answers
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_else(|| Ok(FetchOutcome::NotFound { message: format!("unscripted lookup: {key}") }))
    }
}

impl PriceSource for ScriptedSource {
    async fn check_price_by_name(&self, query: &str) -> Result<FetchOutcome, SourceUnreachable> {
        self.name_calls.lock().unwrap().push(query.to_string());
        self.lookup(query)
    }

    async fn check_price_by_url(&self, url: &str) -> Result<FetchOutcome, SourceUnreachable> {
        self.url_calls.lock().unwrap().push(url.to_string());
        self.lookup(url)
    }
}

//--------------------------------------   MemoryNotifier    ---------------------------------------------------------

/// Captures sent notifications, or fails every send with a configured error.
#[derive(Clone, Default)]
pub struct MemoryNotifier {
    sent: Arc<Mutex<Vec<NotificationEvent>>>,
    fail_with: Arc<Mutex<Option<NotificationError>>>,
}

impl MemoryNotifier {
    pub fn sent(&self) -> Vec<NotificationEvent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_with(&self, error: NotificationError) {
        *self.fail_with.lock().unwrap() = Some(error);
    }
}

impl NotificationProducer for MemoryNotifier {
    async fn send_email_notification(&self, event: &NotificationEvent) -> Result<(), NotificationError> {
        if let Some(error) = self.fail_with.lock().unwrap().clone() {
            return Err(error);
        }
        self.sent.lock().unwrap().push(event.clone());
        Ok(())
    }
}

//--------------------------------------    CountingStore    ---------------------------------------------------------

/// Pass-through store that records which observation ids were saved, and how often.
#[derive(Clone)]
pub struct CountingStore<B> {
    inner: B,
    saved_ids: Arc<Mutex<Vec<i64>>>,
}

impl<B> CountingStore<B> {
    pub fn new(inner: B) -> Self {
        Self { inner, saved_ids: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn saved_ids(&self) -> Vec<i64> {
        self.saved_ids.lock().unwrap().clone()
    }

    pub fn save_count(&self, id: i64) -> usize {
        self.saved_ids.lock().unwrap().iter().filter(|saved| **saved == id).count()
    }
}

impl<B: ObservationStore> ObservationStore for CountingStore<B> {
    fn url(&self) -> &str {
        self.inner.url()
    }

    async fn insert_observation(&self, observation: NewObservation) -> Result<Observation, StoreError> {
        self.inner.insert_observation(observation).await
    }

    async fn fetch_observation(&self, id: i64, owner_email: &str) -> Result<Option<Observation>, StoreError> {
        self.inner.fetch_observation(id, owner_email).await
    }

    async fn fetch_observations_for_owner(&self, owner_email: &str) -> Result<Vec<Observation>, StoreError> {
        self.inner.fetch_observations_for_owner(owner_email).await
    }

    async fn find_stale(&self, limit: usize) -> Result<Vec<Observation>, StoreError> {
        self.inner.find_stale(limit).await
    }

    async fn save(&self, observation: Observation) -> Result<Observation, StoreError> {
        self.saved_ids.lock().unwrap().push(observation.id());
        self.inner.save(observation).await
    }

    async fn delete_observation(&self, id: i64, owner_email: &str) -> Result<(), StoreError> {
        self.inner.delete_observation(id, owner_email).await
    }
}

//--------------------------------------    FailingStore     ---------------------------------------------------------

/// A store whose every call fails. Used to show that a selection failure is the one error that
/// escapes the refresh run.
#[derive(Clone)]
pub struct FailingStore {
    url: String,
}

impl Default for FailingStore {
    fn default() -> Self {
        Self { url: "sqlite://unreachable".to_string() }
    }
}

fn down() -> StoreError {
    StoreError::DatabaseError("store is down".to_string())
}

impl ObservationStore for FailingStore {
    fn url(&self) -> &str {
        &self.url
    }

    async fn insert_observation(&self, _observation: NewObservation) -> Result<Observation, StoreError> {
        Err(down())
    }

    async fn fetch_observation(&self, _id: i64, _owner_email: &str) -> Result<Option<Observation>, StoreError> {
        Err(down())
    }

    async fn fetch_observations_for_owner(&self, _owner_email: &str) -> Result<Vec<Observation>, StoreError> {
        Err(down())
    }

    async fn find_stale(&self, _limit: usize) -> Result<Vec<Observation>, StoreError> {
        Err(down())
    }

    async fn save(&self, _observation: Observation) -> Result<Observation, StoreError> {
        Err(down())
    }

    async fn delete_observation(&self, _id: i64, _owner_email: &str) -> Result<(), StoreError> {
        Err(down())
    }
}
