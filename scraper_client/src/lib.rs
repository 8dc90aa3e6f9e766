mod api;
mod config;
mod data_objects;
mod error;

pub use api::ScraperApi;
pub use config::ScraperConfig;
pub use data_objects::{PriceResponse, ScraperErrorCode, ScraperErrorResponse};
pub use error::ScraperApiError;
