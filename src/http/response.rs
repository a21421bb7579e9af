//! Response snapshots

use serde::Serialize;
use ureq::http::StatusCode;

/// Message carried by the synthetic offline response
pub const OFFLINE_MESSAGE: &str = "You are currently offline. Please check your connection.";

#[derive(Serialize)]
struct OfflineBody<'a> {
    error: &'a str,
    message: &'a str,
}

/// A captured response: status, headers and the full body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    /// Header pairs in the order the server sent them
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// Create a response with the canonical status text for `status`
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let status_text = StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            status_text,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The synthetic 503 returned when neither network nor cache can answer
    pub fn offline() -> Self {
        let body = serde_json::to_vec(&OfflineBody {
            error: "offline",
            message: OFFLINE_MESSAGE,
        })
        .unwrap_or_default();

        let mut response = Self::new(503, body).with_header("Content-Type", "application/json");
        response.status_text = "Service Unavailable".to_string();
        response
    }

    /// Status in the 200-299 range; only these are ever written to a cache
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with the given name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body decoded as UTF-8, lossily
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_response_exact_shape() {
        let response = Response::offline();
        assert_eq!(response.status, 503);
        assert_eq!(response.status_text, "Service Unavailable");
        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(
            response.text(),
            r#"{"error":"offline","message":"You are currently offline. Please check your connection."}"#
        );
    }

    #[test]
    fn ok_range() {
        assert!(Response::new(200, "").is_ok());
        assert!(Response::new(204, "").is_ok());
        assert!(!Response::new(304, "").is_ok());
        assert!(!Response::new(404, "").is_ok());
        assert!(!Response::new(500, "").is_ok());
    }

    #[test]
    fn canonical_status_text() {
        assert_eq!(Response::new(404, "").status_text, "Not Found");
        assert_eq!(Response::new(299, "").status_text, "");
    }
}
