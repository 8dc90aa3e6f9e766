use std::{sync::Arc, time::Duration};

use log::*;
use pw_common::{FailureTag, FetchOutcome, Metrics, Price, PriceSource, SourceUnreachable};
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::{
    config::ScraperConfig,
    data_objects::{PriceResponse, ScraperErrorCode, ScraperErrorResponse, SearchRequest, UrlRequest},
    ScraperApiError,
};

/// Reason label used when the source's error body is not in the structured format.
const MALFORMED_ERROR_BODY: &str = "MALFORMED_ERROR_BODY";

/// Typed client for the external price-source service.
///
/// Transport faults (no HTTP response at all) surface as [`SourceUnreachable`]. Everything the
/// source actually answered with - a price, a structured error, or garbage - is classified into a
/// [`FetchOutcome`] so callers can pattern-match instead of unwinding.
#[derive(Clone)]
pub struct ScraperApi {
    config: ScraperConfig,
    client: Arc<Client>,
    metrics: Metrics,
}

impl ScraperApi {
    pub fn new(config: ScraperConfig, metrics: Metrics) -> Result<Self, ScraperApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ScraperApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client), metrics })
    }

    async fn post_to_scraper<B: Serialize>(&self, url: &str, body: &B) -> Result<FetchOutcome, SourceUnreachable> {
        trace!("🛒️ Sending price query to {url}");
        let response = self.client.post(url).json(body).send().await.map_err(|e| {
            error!("🛒️ Network error connecting to the price source: {e}");
            SourceUnreachable(e.to_string())
        })?;
        let status = response.status();
        let body = response.text().await.unwrap_or_else(|e| {
            warn!("🛒️ Could not read the response body from the price source: {e}");
            String::new()
        });
        if status.is_success() {
            Ok(self.classify_success(&body))
        } else {
            Ok(self.classify_error(status, &body))
        }
    }

    /// A 2xx answer. The source claims success, but an empty or unusable payload is still a
    /// failure for the caller.
    fn classify_success(&self, body: &str) -> FetchOutcome {
        if body.trim().is_empty() {
            warn!("🛒️ The price source returned a success status with an empty body");
            return FetchOutcome::Unknown {
                tag: FailureTag::EmptyBody,
                message: "success response with an empty body".to_string(),
            };
        }
        match serde_json::from_str::<PriceResponse>(body) {
            Ok(response) => {
                trace!("🛒️ Price source found '{}' at {}", response.found_product_name, response.price);
                FetchOutcome::Found {
                    product_name: response.found_product_name,
                    price: Price::from(response.price),
                    canonical_url: response.canonical_url,
                }
            },
            Err(e) => {
                warn!("🛒️ The price source returned a success status with no usable payload: {e}");
                FetchOutcome::Unknown {
                    tag: FailureTag::EmptyBody,
                    message: format!("success response with no usable payload: {e}"),
                }
            },
        }
    }

    /// A non-2xx answer. Maps the source's structured error codes onto the outcome taxonomy and
    /// bumps the error-reason counter with the wire code before surfacing the result.
    fn classify_error(&self, status: StatusCode, body: &str) -> FetchOutcome {
        let error = match serde_json::from_str::<ScraperErrorResponse>(body) {
            Ok(error) => error,
            Err(e) => {
                error!("🛒️ Could not parse the price source error body. Status: {status}. {e}");
                self.metrics.increment_scraper_error(MALFORMED_ERROR_BODY);
                return FetchOutcome::Unknown {
                    tag: FailureTag::MalformedErrorBody,
                    message: format!("HTTP {status} with an unparseable error body"),
                };
            },
        };
        warn!("🛒️ Price source error: {} ({})", error.error_code, error.message);
        self.metrics.increment_scraper_error(&error.error_code);
        match ScraperErrorCode::parse(&error.error_code) {
            ScraperErrorCode::ProductNotFound => FetchOutcome::NotFound { message: error.message },
            ScraperErrorCode::InvalidDomain | ScraperErrorCode::MissingParam => {
                FetchOutcome::InvalidInput { message: error.message }
            },
            ScraperErrorCode::PriceParsingError => {
                FetchOutcome::Unknown { tag: FailureTag::Parsing, message: error.message }
            },
            ScraperErrorCode::ConnectionError => {
                FetchOutcome::Unknown { tag: FailureTag::SourceUnreachable, message: error.message }
            },
            ScraperErrorCode::ScrapingError | ScraperErrorCode::Unrecognized => {
                FetchOutcome::Unknown { tag: FailureTag::Unmapped, message: error.message }
            },
        }
    }
}

impl PriceSource for ScraperApi {
    async fn check_price_by_name(&self, query: &str) -> Result<FetchOutcome, SourceUnreachable> {
        self.post_to_scraper(&self.config.search_url(), &SearchRequest { query }).await
    }

    async fn check_price_by_url(&self, url: &str) -> Result<FetchOutcome, SourceUnreachable> {
        self.post_to_scraper(&self.config.direct_url(), &UrlRequest { url }).await
    }
}
