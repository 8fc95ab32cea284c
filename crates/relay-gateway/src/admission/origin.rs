//! Request validation ahead of the upgrade

use super::AdmissionError;
use axum::http::{header, HeaderMap, Method};

/// Cross-site protection for upgrade requests
///
/// A request is accepted when its `Origin` is exactly `http://{Host}`, or
/// when it appears in the configured allow list. A missing `Origin` is
/// rejected.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    allowed: Vec<String>,
}

impl OriginPolicy {
    /// Accept same-host origins only
    #[must_use]
    pub fn same_host() -> Self {
        Self::default()
    }

    /// Accept same-host origins plus the listed ones
    #[must_use]
    pub fn with_allowed(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    pub fn check(&self, headers: &HeaderMap) -> Result<(), AdmissionError> {
        let origin = header_str(headers, &header::ORIGIN);
        let host = header_str(headers, &header::HOST);

        let same_host = matches!(
            (origin, host),
            (Some(origin), Some(host)) if origin.strip_prefix("http://") == Some(host)
        );
        let listed = origin.is_some_and(|origin| self.allowed.iter().any(|a| a == origin));

        if same_host || listed {
            Ok(())
        } else {
            Err(AdmissionError::OriginNotAllowed {
                origin: origin.map(String::from),
            })
        }
    }
}

/// Method and origin checks, in that order
pub fn validate_request(
    method: &Method,
    headers: &HeaderMap,
    policy: &OriginPolicy,
) -> Result<(), AdmissionError> {
    if *method != Method::GET {
        return Err(AdmissionError::MethodNotAllowed);
    }
    policy.check(headers)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(origin: Option<&'static str>, host: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static(host));
        if let Some(origin) = origin {
            headers.insert(header::ORIGIN, HeaderValue::from_static(origin));
        }
        headers
    }

    #[test]
    fn test_same_host_origin_is_accepted() {
        let policy = OriginPolicy::same_host();
        assert!(policy.check(&headers(Some("http://example.com"), "example.com")).is_ok());
        assert!(policy
            .check(&headers(Some("http://localhost:8080"), "localhost:8080"))
            .is_ok());
    }

    #[test]
    fn test_foreign_origin_is_rejected() {
        let policy = OriginPolicy::same_host();
        let err = policy
            .check(&headers(Some("http://evil.com"), "example.com"))
            .unwrap_err();
        assert!(matches!(
            err,
            AdmissionError::OriginNotAllowed { origin: Some(ref o) } if o == "http://evil.com"
        ));
    }

    #[test]
    fn test_missing_origin_is_rejected() {
        let policy = OriginPolicy::same_host();
        assert!(matches!(
            policy.check(&headers(None, "example.com")),
            Err(AdmissionError::OriginNotAllowed { origin: None })
        ));
    }

    #[test]
    fn test_scheme_must_match() {
        let policy = OriginPolicy::same_host();
        assert!(policy.check(&headers(Some("https://example.com"), "example.com")).is_err());
    }

    #[test]
    fn test_allow_list() {
        let policy = OriginPolicy::with_allowed(vec!["https://app.example.com".to_string()]);
        assert!(policy
            .check(&headers(Some("https://app.example.com"), "api.example.com"))
            .is_ok());
        assert!(policy
            .check(&headers(Some("https://other.example.com"), "api.example.com"))
            .is_err());
    }

    #[test]
    fn test_method_checked_before_origin() {
        let policy = OriginPolicy::same_host();
        let foreign = headers(Some("http://evil.com"), "example.com");

        assert!(matches!(
            validate_request(&Method::POST, &foreign, &policy),
            Err(AdmissionError::MethodNotAllowed)
        ));
        assert!(matches!(
            validate_request(&Method::GET, &foreign, &policy),
            Err(AdmissionError::OriginNotAllowed { .. })
        ));
    }
}
