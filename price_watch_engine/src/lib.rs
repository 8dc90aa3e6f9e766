//! Price Watch Engine
//!
//! The engine owns the persistent state of the price tracker and the batch refresh pipeline that
//! keeps it current. It is transport-agnostic: the HTTP surface, the concrete price-source client
//! and the notification queue all live elsewhere and are plugged in through the capability traits
//! in [`pw_common`] and [`mod@traits`].
//!
//! The library is divided into two main sections:
//! 1. Database management ([`mod@traits`] and the SQLite backend). Access goes through the
//!    [`ObservationStore`] trait; the data types it trades in live in the `db_types` module and
//!    are public.
//! 2. The engine public API: [`RefreshApi`] runs one batch of stale observations through the
//!    price source, and [`ObservationsApi`] carries the owner-scoped CRUD flows.
mod api;
mod sqlite;

pub mod db_types;
pub mod traits;

pub use api::{ObservationsApi, ObservationsApiError, RefreshApi, RefreshError, DEFAULT_BATCH_SIZE};
pub use sqlite::SqliteDatabase;
pub use traits::{ObservationStore, StoreError};
