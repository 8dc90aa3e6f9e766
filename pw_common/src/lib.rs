mod metrics;
mod notify;
mod price;
mod secret;
mod source;

pub use metrics::{
    InMemoryMetrics,
    Metrics,
    MetricsSink,
    NullMetrics,
    MAIL_QUEUE_METRIC,
    PRICE_UPDATE_METRIC,
    SCRAPER_ERRORS_METRIC,
};
pub use notify::{NotificationError, NotificationEvent, NotificationProducer};
pub use price::{Price, PriceParseError};
pub use secret::Secret;
pub use source::{FailureTag, FetchOutcome, PriceSource, SourceUnreachable};
