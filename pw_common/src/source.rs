use std::fmt::Display;

use thiserror::Error;

use crate::Price;

//--------------------------------------    FetchOutcome     ---------------------------------------------------------

/// The classified result of one price-fetch attempt against the external source.
///
/// Business failures are *returned* as variants so the refresh loop can pattern-match on them.
/// Only transport-level faults (the source could not be reached at all) use the error channel,
/// [`SourceUnreachable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The source resolved the product. The canonical URL is the source's own and may differ from
    /// the one we queried with.
    Found {
        product_name: String,
        price: Price,
        canonical_url: String,
    },
    /// The source answered, but the product does not exist there.
    NotFound { message: String },
    /// The query itself was rejected (bad domain, missing parameter).
    InvalidInput { message: String },
    /// The source answered with something we cannot act on. Not retryable within a run.
    Unknown { tag: FailureTag, message: String },
}

impl FetchOutcome {
    /// A stable label for failure counters. `None` for [`FetchOutcome::Found`].
    pub fn failure_label(&self) -> Option<String> {
        match self {
            FetchOutcome::Found { .. } => None,
            FetchOutcome::NotFound { .. } => Some("not-found".to_string()),
            FetchOutcome::InvalidInput { .. } => Some("invalid-input".to_string()),
            FetchOutcome::Unknown { tag, .. } => Some(format!("unknown:{tag}")),
        }
    }
}

/// Why a structurally valid answer from the source was still unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureTag {
    /// The source could not parse a price out of the product page.
    Parsing,
    /// The source reported that it could not reach the store itself.
    SourceUnreachable,
    /// An error code we do not recognise.
    Unmapped,
    /// The error body was not in the structured format.
    MalformedErrorBody,
    /// A success status carrying no payload.
    EmptyBody,
}

impl Display for FailureTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureTag::Parsing => "parsing",
            FailureTag::SourceUnreachable => "source-unreachable",
            FailureTag::Unmapped => "unmapped",
            FailureTag::MalformedErrorBody => "malformed-error-body",
            FailureTag::EmptyBody => "empty-body",
        };
        f.write_str(s)
    }
}

/// A transport-level fault: no HTTP response was obtained at all (timeout, connection refused,
/// DNS failure). Signals that the source is unreachable, not that the queried item is invalid.
#[derive(Debug, Clone, Error)]
#[error("Price source unreachable: {0}")]
pub struct SourceUnreachable(pub String);

//--------------------------------------     PriceSource     ---------------------------------------------------------

/// The capability the refresh pipeline needs from a price source client.
#[allow(async_fn_in_trait)]
pub trait PriceSource {
    /// Resolve a product by free-text search. Used when an observation is first created.
    async fn check_price_by_name(&self, query: &str) -> Result<FetchOutcome, SourceUnreachable>;

    /// Fetch the current price for a known product URL. Used by the batch refresh.
    async fn check_price_by_url(&self, url: &str) -> Result<FetchOutcome, SourceUnreachable>;
}
