mod observations_api;
mod refresh_api;

pub use observations_api::{ObservationsApi, ObservationsApiError};
pub use refresh_api::{RefreshApi, RefreshError, DEFAULT_BATCH_SIZE};
