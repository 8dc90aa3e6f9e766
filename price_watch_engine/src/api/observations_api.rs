use chrono::Utc;
use log::*;
use pw_common::{FetchOutcome, PriceSource};
use thiserror::Error;

use crate::{
    db_types::{NewObservation, Observation},
    traits::{ObservationStore, StoreError},
};

/// Owner-scoped management of observations: start tracking a product, list and inspect tracked
/// products, stop tracking. Every operation takes the owner identity and never exposes another
/// owner's data - a wrong owner sees "not found".
pub struct ObservationsApi<B, S> {
    db: B,
    source: S,
}

impl<B, S> ObservationsApi<B, S> {
    pub fn new(db: B, source: S) -> Self {
        Self { db, source }
    }
}

impl<B, S> ObservationsApi<B, S>
where
    B: ObservationStore,
    S: PriceSource,
{
    /// Start observing whatever the source resolves for a free-text query.
    pub async fn observe_by_name(&self, owner_email: &str, query: &str) -> Result<Observation, ObservationsApiError> {
        info!("🧾️ User {owner_email} requested observation for product name: {query}");
        let outcome = self
            .source
            .check_price_by_name(query)
            .await
            .map_err(|e| ObservationsApiError::SourceUnavailable(e.to_string()))?;
        self.save_new_observation(owner_email, outcome).await
    }

    /// Start observing a specific product URL.
    pub async fn observe_by_url(&self, owner_email: &str, url: &str) -> Result<Observation, ObservationsApiError> {
        info!("🧾️ User {owner_email} requested observation for URL: {url}");
        let outcome = self
            .source
            .check_price_by_url(url)
            .await
            .map_err(|e| ObservationsApiError::SourceUnavailable(e.to_string()))?;
        self.save_new_observation(owner_email, outcome).await
    }

    /// The stored observation takes everything from the source's answer: the reported name, the
    /// canonical URL (which may differ from what the user pasted) and the first price sample.
    async fn save_new_observation(
        &self,
        owner_email: &str,
        outcome: FetchOutcome,
    ) -> Result<Observation, ObservationsApiError> {
        match outcome {
            FetchOutcome::Found { product_name, price, canonical_url } => {
                let new = NewObservation::new(product_name, canonical_url, owner_email, price);
                let mut observation = self.db.insert_observation(new).await?;
                let now = Utc::now();
                observation.append_sample(price, now);
                observation.mark_checked(now);
                let observation = self.db.save(observation).await?;
                info!("🧾️ Started observing product #{} for user {owner_email}", observation.id());
                Ok(observation)
            },
            FetchOutcome::NotFound { message } => Err(ObservationsApiError::NotFoundInStore(message)),
            FetchOutcome::InvalidInput { message } => Err(ObservationsApiError::InvalidQuery(message)),
            FetchOutcome::Unknown { tag, message } => {
                Err(ObservationsApiError::SourceUnavailable(format!("{tag}: {message}")))
            },
        }
    }

    pub async fn my_observations(&self, owner_email: &str) -> Result<Vec<Observation>, ObservationsApiError> {
        Ok(self.db.fetch_observations_for_owner(owner_email).await?)
    }

    /// A single observation with its full price history.
    pub async fn observation_details(&self, owner_email: &str, id: i64) -> Result<Observation, ObservationsApiError> {
        self.db.fetch_observation(id, owner_email).await?.ok_or(ObservationsApiError::NotFound(id))
    }

    pub async fn remove_observation(&self, owner_email: &str, id: i64) -> Result<(), ObservationsApiError> {
        match self.db.delete_observation(id, owner_email).await {
            Ok(()) => {
                info!("🧾️ Deleted observation #{id} for user {owner_email}");
                Ok(())
            },
            Err(StoreError::ObservationNotFound(_)) => Err(ObservationsApiError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ObservationsApiError {
    #[error("The requested observation {0} does not exist")]
    NotFound(i64),
    #[error("The product could not be found in the store. {0}")]
    NotFoundInStore(String),
    #[error("Invalid product query. {0}")]
    InvalidQuery(String),
    #[error("The price source is unavailable. {0}")]
    SourceUnavailable(String),
    #[error("{0}")]
    StoreError(#[from] StoreError),
}
