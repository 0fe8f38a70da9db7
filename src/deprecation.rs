//! Deprecation signaling for legacy routes.
//!
//! Legacy entry points delegate to the same handlers as their v1
//! counterparts; the only divergence is this response decorator, which adds
//! machine-readable deprecation headers pointing at the successor route.

use axum::http::HeaderValue;
use axum::response::Response;

pub const DEPRECATION_HEADER: &str = "deprecation";
pub const SUNSET_HEADER: &str = "sunset";
pub const LINK_HEADER: &str = "link";

/// RFC 1123 date after which the legacy routes stop being served.
pub const SUNSET_DATE: &str = "Thu, 01 Jul 2027 00:00:00 GMT";

/// Decorate a legacy-route response with deprecation headers and a pointer at
/// the successor route. Body and status are untouched.
pub fn decorate(mut response: Response, successor: &str) -> Response {
    let headers = response.headers_mut();
    headers.insert(DEPRECATION_HEADER, HeaderValue::from_static("true"));
    headers.insert(SUNSET_HEADER, HeaderValue::from_static(SUNSET_DATE));
    if let Ok(link) = HeaderValue::from_str(&format!("<{successor}>; rel=\"successor-version\"")) {
        headers.insert(LINK_HEADER, link);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn adds_all_three_headers() {
        let response = decorate("body".into_response(), "/ucp/v1/profile");
        let headers = response.headers();
        assert_eq!(headers.get(DEPRECATION_HEADER).unwrap(), "true");
        assert_eq!(headers.get(SUNSET_HEADER).unwrap(), SUNSET_DATE);
        assert_eq!(
            headers.get(LINK_HEADER).unwrap(),
            "</ucp/v1/profile>; rel=\"successor-version\""
        );
    }

    #[test]
    fn body_and_status_are_untouched() {
        let original = (axum::http::StatusCode::NOT_FOUND, "nope").into_response();
        let decorated = decorate(original, "/ucp/v1/profile");
        assert_eq!(decorated.status(), axum::http::StatusCode::NOT_FOUND);
    }
}
