use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use price_watch_engine::ObservationsApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Missing or empty X-User-Email header")]
    MissingOwnerHeader,
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("{0}")]
    ProductError(#[from] ObservationsApiError),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingOwnerHeader => StatusCode::UNAUTHORIZED,
            Self::ProductError(e) => match e {
                ObservationsApiError::NotFound(_) => StatusCode::NOT_FOUND,
                ObservationsApiError::NotFoundInStore(_) => StatusCode::NOT_FOUND,
                ObservationsApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
                ObservationsApiError::SourceUnavailable(_) => StatusCode::BAD_GATEWAY,
                ObservationsApiError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!("🚨️ {self}");
        }
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}
