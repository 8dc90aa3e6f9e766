use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
}
