use super::*;
use std::error::Error as StdError;

#[test]
fn test_not_found_error() {
    let error = Error::NotFound;

    assert_eq!(error.to_string(), "Resource not found");
    assert!(error.source().is_none());
}

#[test]
fn test_rate_limit_exceeded_error() {
    let error = Error::RateLimitExceeded;

    assert_eq!(error.to_string(), "Rate limit exceeded");
    assert!(error.source().is_none());
}

#[test]
fn test_unexpected_status_error() {
    let error = Error::UnexpectedStatus {
        status: 503,
        body: "service unavailable".to_string(),
    };

    assert_eq!(
        error.to_string(),
        "Unexpected response status 503: service unavailable"
    );
}

#[test]
fn test_invalid_base_url_error() {
    let error = Error::InvalidBaseUrl("mailto:ops@example.com".to_string());

    assert!(error.to_string().contains("mailto:ops@example.com"));
}

#[test]
fn test_deserialization_error_keeps_source() {
    let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let error = Error::from(json_error);

    assert!(error
        .to_string()
        .starts_with("Failed to deserialize service response"));
    assert!(error.source().is_some());
}

#[test]
fn test_url_parse_error_converts() {
    let parse_error = url::Url::parse("not a url").unwrap_err();
    let error: Error = parse_error.into();

    assert!(matches!(error, Error::InvalidUrl(_)));
}

#[test]
fn test_error_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Error>();
}
