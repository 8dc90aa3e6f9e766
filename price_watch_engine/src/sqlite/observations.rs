use chrono::Utc;
use log::*;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewObservation, Observation, PriceSample},
    traits::StoreError,
};

pub async fn insert(observation: NewObservation, conn: &mut SqliteConnection) -> Result<Observation, StoreError> {
    let observation: Observation = sqlx::query_as(
        r#"
            INSERT INTO observations (
                product_name,
                product_url,
                owner_email,
                current_price,
                created_at
            ) VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(observation.product_name)
    .bind(observation.product_url)
    .bind(observation.owner_email)
    .bind(observation.initial_price)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Observation [{}] inserted with id {}", observation.product_name(), observation.id());
    Ok(observation)
}

pub async fn fetch_by_id_and_owner(
    id: i64,
    owner_email: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Observation>, StoreError> {
    let observation: Option<Observation> =
        sqlx::query_as("SELECT * FROM observations WHERE id = $1 AND owner_email = $2")
            .bind(id)
            .bind(owner_email)
            .fetch_optional(&mut *conn)
            .await?;
    match observation {
        Some(mut observation) => {
            let history = fetch_history(observation.id(), conn).await?;
            observation.attach_history(history);
            Ok(Some(observation))
        },
        None => Ok(None),
    }
}

pub async fn fetch_all_for_owner(
    owner_email: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Observation>, StoreError> {
    let observations = sqlx::query_as("SELECT * FROM observations WHERE owner_email = $1 ORDER BY created_at, id")
        .bind(owner_email)
        .fetch_all(conn)
        .await?;
    Ok(observations)
}

/// The refresh batch: oldest-checked first, with never-checked observations (infinitely stale)
/// ahead of everything else. Ties break on id so the order is stable.
pub async fn find_stale(limit: usize, conn: &mut SqliteConnection) -> Result<Vec<Observation>, StoreError> {
    let observations = sqlx::query_as(
        r#"
            SELECT * FROM observations
            ORDER BY last_checked_at ASC NULLS FIRST, id ASC
            LIMIT $1
        "#,
    )
    .bind(limit as i64)
    .fetch_all(conn)
    .await?;
    Ok(observations)
}

pub async fn fetch_history(observation_id: i64, conn: &mut SqliteConnection) -> Result<Vec<PriceSample>, StoreError> {
    let history = sqlx::query_as(
        "SELECT id, price, checked_at FROM price_samples WHERE observation_id = $1 ORDER BY checked_at ASC, id ASC",
    )
    .bind(observation_id)
    .fetch_all(conn)
    .await?;
    Ok(history)
}

/// Upserts the observation row by id, then persists every sample that was appended in memory.
/// Immutable columns (url, owner, creation time) are only written on the insert path.
pub async fn upsert(mut observation: Observation, conn: &mut SqliteConnection) -> Result<Observation, StoreError> {
    sqlx::query(
        r#"
            INSERT INTO observations (
                id,
                product_name,
                product_url,
                owner_email,
                current_price,
                last_checked_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                product_name = excluded.product_name,
                current_price = excluded.current_price,
                last_checked_at = excluded.last_checked_at;
        "#,
    )
    .bind(observation.id())
    .bind(observation.product_name().to_string())
    .bind(observation.product_url().to_string())
    .bind(observation.owner_email().to_string())
    .bind(observation.current_price())
    .bind(observation.last_checked_at())
    .bind(observation.created_at())
    .execute(&mut *conn)
    .await?;
    let id = observation.id();
    for sample in observation.history_mut().iter_mut().filter(|s| !s.is_persisted()) {
        let sample_id: i64 = sqlx::query_scalar(
            "INSERT INTO price_samples (observation_id, price, checked_at) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(id)
        .bind(sample.price())
        .bind(sample.checked_at())
        .fetch_one(&mut *conn)
        .await?;
        sample.set_id(sample_id);
    }
    trace!("🗃️ Observation #{id} saved");
    Ok(observation)
}

pub async fn delete_by_id_and_owner(
    id: i64,
    owner_email: &str,
    conn: &mut SqliteConnection,
) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM observations WHERE id = $1 AND owner_email = $2")
        .bind(id)
        .bind(owner_email)
        .execute(conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::ObservationNotFound(id));
    }
    debug!("🗃️ Observation #{id} deleted for {owner_email}");
    Ok(())
}
