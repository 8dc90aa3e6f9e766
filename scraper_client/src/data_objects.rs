use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

//--------------------------------------    PriceResponse    ---------------------------------------------------------

/// A successful answer from the price source.
///
/// The price arrives as a JSON number and is parsed with arbitrary precision, so `123.45` is the
/// decimal `123.45` and not the nearest binary float.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PriceResponse {
    pub found_product_name: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
    pub currency: String,
    pub canonical_url: String,
}

//--------------------------------------  ScraperErrorResponse  ------------------------------------------------------

/// The structured error body of the price source. `error_code` is kept as the raw wire string so
/// unrecognised codes can be reported verbatim.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperErrorResponse {
    pub error_code: String,
    pub message: String,
}

/// The error codes the price source is known to emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScraperErrorCode {
    MissingParam,
    ProductNotFound,
    InvalidDomain,
    ConnectionError,
    PriceParsingError,
    ScrapingError,
    Unrecognized,
}

impl ScraperErrorCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "MISSING_PARAM" => Self::MissingParam,
            "PRODUCT_NOT_FOUND" => Self::ProductNotFound,
            "INVALID_DOMAIN" => Self::InvalidDomain,
            "CONNECTION_ERROR" => Self::ConnectionError,
            "PRICE_PARSING_ERROR" => Self::PriceParsingError,
            "SCRAPING_ERROR" => Self::ScrapingError,
            _ => Self::Unrecognized,
        }
    }
}

//--------------------------------------      Requests       ---------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
}

#[derive(Debug, Serialize)]
pub struct UrlRequest<'a> {
    pub url: &'a str,
}
