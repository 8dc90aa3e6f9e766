use std::fmt::Debug;

use log::*;
use sqlx::{migrate, migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Sqlite, SqlitePool};

use crate::{
    db_types::{NewObservation, Observation},
    sqlite::observations,
    traits::{ObservationStore, StoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    /// Create the database file if it does not exist yet.
    pub async fn create_database(url: &str) -> Result<(), StoreError> {
        if !Sqlite::database_exists(url).await? {
            Sqlite::create_database(url).await?;
            info!("🗃️ Created Sqlite database {url}");
        }
        Ok(())
    }

    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        debug!("🗃️ Migrations complete for {}", self.url);
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl ObservationStore for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_observation(&self, observation: NewObservation) -> Result<Observation, StoreError> {
        let mut conn = self.pool.acquire().await?;
        observations::insert(observation, &mut conn).await
    }

    async fn fetch_observation(&self, id: i64, owner_email: &str) -> Result<Option<Observation>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        observations::fetch_by_id_and_owner(id, owner_email, &mut conn).await
    }

    async fn fetch_observations_for_owner(&self, owner_email: &str) -> Result<Vec<Observation>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        observations::fetch_all_for_owner(owner_email, &mut conn).await
    }

    async fn find_stale(&self, limit: usize) -> Result<Vec<Observation>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        observations::find_stale(limit, &mut conn).await
    }

    async fn save(&self, observation: Observation) -> Result<Observation, StoreError> {
        let mut tx = self.pool.begin().await?;
        let saved = observations::upsert(observation, &mut tx).await?;
        tx.commit().await?;
        Ok(saved)
    }

    async fn delete_observation(&self, id: i64, owner_email: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        observations::delete_by_id_and_owner(id, owner_email, &mut conn).await
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}
