use chrono::{DateTime, Utc};
use price_watch_engine::db_types::Observation;
use pw_common::Price;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct BatchUpdateResult {
    pub processed: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObserveByNameRequest {
    pub product_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObserveByUrlRequest {
    pub product_url: String,
}

/// The list/summary view of an observation. Prices serialize as decimal strings.
#[derive(Debug, Clone, Serialize)]
pub struct ProductObservationResponse {
    pub id: i64,
    pub product_name: String,
    pub product_url: String,
    pub owner_email: String,
    pub current_price: Price,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Observation> for ProductObservationResponse {
    fn from(observation: &Observation) -> Self {
        Self {
            id: observation.id(),
            product_name: observation.product_name().to_string(),
            product_url: observation.product_url().to_string(),
            owner_email: observation.owner_email().to_string(),
            current_price: observation.current_price(),
            last_checked_at: observation.last_checked_at(),
            created_at: observation.created_at(),
        }
    }
}

/// The details view: the summary plus the full price history, oldest sample first.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetailsResponse {
    #[serde(flatten)]
    pub observation: ProductObservationResponse,
    pub price_history: Vec<PriceHistoryEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceHistoryEntry {
    pub price: Price,
    pub checked_at: DateTime<Utc>,
}

impl From<&Observation> for ProductDetailsResponse {
    fn from(observation: &Observation) -> Self {
        let price_history = observation
            .history()
            .iter()
            .map(|sample| PriceHistoryEntry { price: sample.price(), checked_at: sample.checked_at() })
            .collect();
        Self { observation: ProductObservationResponse::from(observation), price_history }
    }
}
