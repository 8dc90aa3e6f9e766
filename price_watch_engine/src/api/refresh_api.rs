use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use pw_common::{FetchOutcome, Metrics, NotificationEvent, NotificationProducer, Price, PriceSource};
use thiserror::Error;

use crate::{
    db_types::Observation,
    traits::{ObservationStore, StoreError},
};

/// How many stale observations one run refreshes unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// `RefreshApi` runs the batch price-refresh pipeline: select the stalest observations, ask the
/// price source about each one, notify owners of price drops, and persist every observation
/// exactly once whatever happened to its fetch.
///
/// Failures are isolated per observation. The only error that escapes
/// [`run_once`](RefreshApi::run_once) is a failure to select the batch in the first place.
pub struct RefreshApi<B, S, N> {
    db: B,
    source: S,
    notifier: N,
    metrics: Metrics,
    batch_size: usize,
}

impl<B, S, N> Debug for RefreshApi<B, S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RefreshApi(batch_size = {})", self.batch_size)
    }
}

impl<B, S, N> RefreshApi<B, S, N> {
    pub fn new(db: B, source: S, notifier: N, metrics: Metrics) -> Self {
        Self { db, source, notifier, metrics, batch_size: DEFAULT_BATCH_SIZE }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

impl<B, S, N> RefreshApi<B, S, N>
where
    B: ObservationStore,
    S: PriceSource,
    N: NotificationProducer,
{
    /// Run one batch now. Returns how many observations were *selected* for this run, i.e. how
    /// many were attempted, not how many succeeded.
    pub async fn run_once(&self) -> Result<usize, RefreshError> {
        let batch = self.db.find_stale(self.batch_size).await.map_err(RefreshError::Selection)?;
        if batch.is_empty() {
            info!("🔄️ No observations are due for a price refresh");
            return Ok(0);
        }
        let selected = batch.len();
        info!("🔄️ Starting batch refresh for {selected} observations");
        for observation in batch {
            self.process_observation(observation).await;
        }
        Ok(selected)
    }

    /// One observation, start to finish. Never returns an error: whatever happens, the
    /// observation gets its `last_checked_at` stamped and is saved exactly once, so a failing
    /// item does not get re-selected as infinitely stale on the very next run.
    async fn process_observation(&self, mut observation: Observation) {
        let id = observation.id();
        debug!("🔄️ Checking price for: {}", observation.product_name());
        let now = Utc::now();
        match self.source.check_price_by_url(observation.product_url()).await {
            Ok(FetchOutcome::Found { product_name, price, .. }) => {
                self.metrics.increment_price_update_success();
                self.apply_price_update(&mut observation, product_name, price, now).await;
            },
            Ok(outcome) => {
                let reason = outcome.failure_label().unwrap_or_default();
                self.metrics.increment_price_update_failure(&reason);
                warn!("🔄️ Failed to update observation #{id}. Reason: {reason} ({outcome:?})");
            },
            Err(e) => {
                self.metrics.increment_price_update_failure("transient");
                error!("🔄️ Transient failure updating observation #{id}: {e}");
            },
        }
        observation.mark_checked(now);
        if let Err(e) = self.db.save(observation).await {
            error!("🔄️ Could not persist observation #{id}: {e}");
        }
    }

    async fn apply_price_update(
        &self,
        observation: &mut Observation,
        product_name: String,
        price: Price,
        now: DateTime<Utc>,
    ) {
        let old_price = observation.current_price();
        if price < old_price {
            self.notify_price_drop(observation, old_price, price).await;
        }
        observation.append_sample(price, now);
        if product_name != observation.product_name() {
            observation.set_product_name(product_name);
        }
        info!("🔄️ Updated price for: {}", observation.product_name());
    }

    /// A failed or lost alert must never undo the price update that triggered it.
    async fn notify_price_drop(&self, observation: &Observation, old_price: Price, new_price: Price) {
        let event = NotificationEvent::new(
            observation.owner_email(),
            "Price Drop Alert!",
            format!("Price for {} dropped from {old_price} to {new_price}", observation.product_name()),
        );
        if let Err(e) = self.notifier.send_email_notification(&event).await {
            error!("🔄️ Price updated, but notification failed for user {}: {e}", observation.owner_email());
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum RefreshError {
    #[error("Could not select stale observations: {0}")]
    Selection(StoreError),
}
