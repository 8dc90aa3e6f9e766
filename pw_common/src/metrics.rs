use std::{collections::BTreeMap, sync::Arc, sync::Mutex};

pub const SCRAPER_ERRORS_METRIC: &str = "scraper.errors.total";
pub const PRICE_UPDATE_METRIC: &str = "product.price.update";
pub const MAIL_QUEUE_METRIC: &str = "queue.mail.sent";

const STATUS_SUCCESS: &str = "success";
const STATUS_FAILURE: &str = "failure";
const REASON_NONE: &str = "none";

//--------------------------------------     MetricsSink     ---------------------------------------------------------

/// The counter sink the pipeline and its collaborators emit into. Metric emission is an external
/// concern; the pipeline only ever calls `increment`.
pub trait MetricsSink: Send + Sync {
    fn increment(&self, name: &str, status: &str, reason: &str);
}

/// Cheap cloneable facade with one method per counter the system emits.
#[derive(Clone)]
pub struct Metrics {
    sink: Arc<dyn MetricsSink>,
}

impl Metrics {
    pub fn new(sink: Arc<dyn MetricsSink>) -> Self {
        Self { sink }
    }

    /// A facade that swallows every increment. Useful for tools and tests that don't care.
    pub fn disabled() -> Self {
        Self::new(Arc::new(NullMetrics))
    }

    pub fn increment_scraper_error(&self, reason: &str) {
        self.sink.increment(SCRAPER_ERRORS_METRIC, STATUS_FAILURE, reason);
    }

    pub fn increment_price_update_success(&self) {
        self.sink.increment(PRICE_UPDATE_METRIC, STATUS_SUCCESS, REASON_NONE);
    }

    pub fn increment_price_update_failure(&self, reason: &str) {
        self.sink.increment(PRICE_UPDATE_METRIC, STATUS_FAILURE, reason);
    }

    pub fn increment_mail_queue_success(&self) {
        self.sink.increment(MAIL_QUEUE_METRIC, STATUS_SUCCESS, REASON_NONE);
    }

    pub fn increment_mail_queue_failure(&self, reason: &str) {
        self.sink.increment(MAIL_QUEUE_METRIC, STATUS_FAILURE, reason);
    }
}

//--------------------------------------     NullMetrics     ---------------------------------------------------------

pub struct NullMetrics;

impl MetricsSink for NullMetrics {
    fn increment(&self, _name: &str, _status: &str, _reason: &str) {}
}

//--------------------------------------   InMemoryMetrics   ---------------------------------------------------------

/// Counter sink backed by a map, keyed `name{status="...",reason="..."}`. Serves as the default
/// sink for deployments without an external metrics pipeline, and as the assertion point in tests.
#[derive(Default)]
pub struct InMemoryMetrics {
    counters: Mutex<BTreeMap<String, u64>>,
}

impl InMemoryMetrics {
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counters.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str, status: &str, reason: &str) -> u64 {
        self.counters.lock().unwrap().get(&key(name, status, reason)).copied().unwrap_or(0)
    }
}

impl MetricsSink for InMemoryMetrics {
    fn increment(&self, name: &str, status: &str, reason: &str) {
        let mut counters = self.counters.lock().unwrap();
        *counters.entry(key(name, status, reason)).or_insert(0) += 1;
    }
}

fn key(name: &str, status: &str, reason: &str) -> String {
    format!("{name}{{status=\"{status}\",reason=\"{reason}\"}}")
}
