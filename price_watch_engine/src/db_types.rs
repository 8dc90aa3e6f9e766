use chrono::{DateTime, Utc};
use pw_common::Price;
use sqlx::{sqlite::SqliteRow, FromRow, Row};

//--------------------------------------    Observation      ---------------------------------------------------------

/// A tracked product-price subscription owned by one user.
///
/// The fields that carry invariants are private: `current_price` always equals the price of the
/// most recently appended sample and can only change through [`Observation::append_sample`];
/// `last_checked_at` is only ever advanced through [`Observation::mark_checked`], which happens on
/// every processing attempt whether or not the fetch succeeded.
///
/// The price history is loaded lazily. Batch and list queries return observations with an empty
/// history; the details query attaches it in full. Samples appended in memory have no id yet and
/// are the ones [`crate::ObservationStore::save`] persists.
#[derive(Debug, Clone)]
pub struct Observation {
    id: i64,
    product_name: String,
    product_url: String,
    owner_email: String,
    current_price: Price,
    last_checked_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    history: Vec<PriceSample>,
}

// The history is not a column; rows come back with an empty one and queries that want it attach
// it explicitly.
impl FromRow<'_, SqliteRow> for Observation {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            product_name: row.try_get("product_name")?,
            product_url: row.try_get("product_url")?,
            owner_email: row.try_get("owner_email")?,
            current_price: row.try_get("current_price")?,
            last_checked_at: row.try_get("last_checked_at")?,
            created_at: row.try_get("created_at")?,
            history: Vec::new(),
        })
    }
}

impl Observation {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// The canonical source URL. Immutable after creation.
    pub fn product_url(&self) -> &str {
        &self.product_url
    }

    pub fn owner_email(&self) -> &str {
        &self.owner_email
    }

    pub fn current_price(&self) -> Price {
        self.current_price
    }

    pub fn last_checked_at(&self) -> Option<DateTime<Utc>> {
        self.last_checked_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whatever part of the history is loaded, oldest first, plus any samples appended in memory.
    pub fn history(&self) -> &[PriceSample] {
        &self.history
    }

    pub fn latest_sample(&self) -> Option<&PriceSample> {
        self.history.last()
    }

    /// Record a new price reading. This is the only way `current_price` changes.
    pub fn append_sample(&mut self, price: Price, checked_at: DateTime<Utc>) {
        self.history.push(PriceSample { id: None, price, checked_at });
        self.current_price = price;
    }

    /// Stamp a processing attempt. Called on every attempt, successful or not.
    pub fn mark_checked(&mut self, at: DateTime<Utc>) {
        self.last_checked_at = Some(at);
    }

    /// The source may report a corrected display name on any fetch.
    pub fn set_product_name<S: Into<String>>(&mut self, name: S) {
        self.product_name = name.into();
    }

    pub(crate) fn attach_history(&mut self, history: Vec<PriceSample>) {
        self.history = history;
    }

    pub(crate) fn history_mut(&mut self) -> &mut [PriceSample] {
        &mut self.history
    }
}

//--------------------------------------    PriceSample      ---------------------------------------------------------

/// One historical price reading. Samples are owned exclusively by their observation and are
/// removed only when the observation is removed.
#[derive(Debug, Clone, FromRow)]
pub struct PriceSample {
    id: Option<i64>,
    price: Price,
    checked_at: DateTime<Utc>,
}

impl PriceSample {
    pub fn price(&self) -> Price {
        self.price
    }

    pub fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }

    /// `false` until the owning observation has been saved.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub(crate) fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

//--------------------------------------   NewObservation    ---------------------------------------------------------

/// The data needed to start tracking a product. Built from a successful price-source resolution,
/// so the name, canonical URL and initial price all come from the source.
#[derive(Debug, Clone)]
pub struct NewObservation {
    pub product_name: String,
    pub product_url: String,
    pub owner_email: String,
    pub initial_price: Price,
}

impl NewObservation {
    pub fn new<S1, S2, S3>(product_name: S1, product_url: S2, owner_email: S3, initial_price: Price) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            product_name: product_name.into(),
            product_url: product_url.into(),
            owner_email: owner_email.into(),
            initial_price,
        }
    }
}
