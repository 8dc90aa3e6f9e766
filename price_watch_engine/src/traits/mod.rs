mod observation_store;

pub use observation_store::{ObservationStore, StoreError};
