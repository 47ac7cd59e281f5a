use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Sentinel timestamp value a caller passes to have the gateway substitute
/// the page-scoped last-refresh marker before transmission.
pub const UNSET_TIMESTAMP: &str = "-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One outbound request, fully resolved: an absolute URL, query parameters
/// for GET, serialized form fields for POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    pub method: Method,
    pub url: String,
    pub params: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireResponse {
    pub status: u16,
    pub body: String,
}

impl WireResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking request execution. Implementations return `Ok` for any
/// completed exchange regardless of status; the gateway worker turns
/// non-2xx statuses into errors so every caller sees one failure shape.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &WireRequest) -> AppResult<WireResponse>;
}

/// One page's content without full-document chrome, as the server returns
/// it for requests carrying the partial-content marker.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PageFragment {
    pub title: String,
    pub heading: String,
    pub body: String,
}

impl PageFragment {
    pub fn parse(body: &str) -> AppResult<Self> {
        serde_json::from_str(body)
            .map_err(|source| AppError::decode("page fragment payload", source))
    }
}

#[cfg(test)]
mod tests {
    use super::{PageFragment, WireResponse};

    #[test]
    fn fragment_parses_expected_shape() {
        let fragment =
            PageFragment::parse(r#"{"title":"Home","heading":"Timeline","body":"<p>hi</p>"}"#)
                .expect("well-formed fragment should parse");
        assert_eq!(fragment.title, "Home");
        assert_eq!(fragment.heading, "Timeline");
        assert_eq!(fragment.body, "<p>hi</p>");
    }

    #[test]
    fn fragment_rejects_missing_fields() {
        assert!(PageFragment::parse(r#"{"title":"Home"}"#).is_err());
        assert!(PageFragment::parse("not json").is_err());
    }

    #[test]
    fn success_covers_2xx_only() {
        let ok = WireResponse {
            status: 204,
            body: String::new(),
        };
        let redirect = WireResponse {
            status: 302,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }
}
