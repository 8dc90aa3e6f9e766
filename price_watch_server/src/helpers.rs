use actix_web::HttpRequest;

use crate::errors::ServerError;

/// The owner identity arrives pre-authenticated from the upstream gateway in the `X-User-Email`
/// header. Requests without it cannot be scoped and are rejected.
pub fn get_owner_email(req: &HttpRequest) -> Result<String, ServerError> {
    req.headers()
        .get("X-User-Email")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(String::from)
        .ok_or(ServerError::MissingOwnerHeader)
}

#[cfg(test)]
mod test {
    use actix_web::test::TestRequest;

    use super::get_owner_email;

    #[test]
    fn reads_the_owner_header() {
        let req = TestRequest::get().insert_header(("X-User-Email", "alice@example.com")).to_http_request();
        assert_eq!(get_owner_email(&req).unwrap(), "alice@example.com");
    }

    #[test]
    fn missing_or_blank_headers_are_rejected() {
        let req = TestRequest::get().to_http_request();
        assert!(get_owner_email(&req).is_err());
        let req = TestRequest::get().insert_header(("X-User-Email", "   ")).to_http_request();
        assert!(get_owner_email(&req).is_err());
    }
}
