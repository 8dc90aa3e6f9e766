use thiserror::Error;

use crate::db_types::{NewObservation, Observation};

/// The persistence contract the engine needs from a backend.
///
/// The refresh pipeline relies on two properties:
/// * [`find_stale`](ObservationStore::find_stale) orders observations oldest-checked-first, with
///   never-checked observations before any that have been checked (never-checked is infinitely
///   stale).
/// * [`save`](ObservationStore::save) is an upsert by id and persists, in the same call, every
///   price sample that was appended in memory.
///
/// No cross-call transaction is assumed: each observation is saved independently, and concurrent
/// runs serialize only through the backend's own per-row atomicity.
#[allow(async_fn_in_trait)]
pub trait ObservationStore: Clone {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Persist a brand-new observation and return it with its assigned id. The new record has no
    /// history and has never been checked.
    async fn insert_observation(&self, observation: NewObservation) -> Result<Observation, StoreError>;

    /// Fetch a single observation owned by `owner_email`, with its full price history attached,
    /// oldest sample first. Another owner's observation is reported as absent, not as forbidden.
    async fn fetch_observation(&self, id: i64, owner_email: &str) -> Result<Option<Observation>, StoreError>;

    /// All observations belonging to `owner_email`, without history.
    async fn fetch_observations_for_owner(&self, owner_email: &str) -> Result<Vec<Observation>, StoreError>;

    /// Up to `limit` observations most overdue for a refresh, without history. Ordered
    /// oldest-checked-first; never-checked observations sort before all others.
    async fn find_stale(&self, limit: usize) -> Result<Vec<Observation>, StoreError>;

    /// Upsert the observation by id and insert any samples appended since it was loaded. Returns
    /// the saved observation with all sample ids assigned.
    async fn save(&self, observation: Observation) -> Result<Observation, StoreError>;

    /// Delete the observation and its entire history. Owner-scoped like
    /// [`fetch_observation`](ObservationStore::fetch_observation).
    async fn delete_observation(&self, id: i64, owner_email: &str) -> Result<(), StoreError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("The requested observation (internal id {0}) does not exist")]
    ObservationNotFound(i64),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}
