//! Healthcheck push client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::health::probe::Status;

/// Failures delivering a status push.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Connection, TLS, timeout or body read failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status code.
    #[error("endpoint returned HTTP {0}")]
    Status(StatusCode),

    /// The acknowledgement was not a JSON object.
    #[error("malformed acknowledgement: {0}")]
    Malformed(String),

    /// The endpoint explicitly refused the push.
    #[error("healthcheck push rejected: {}", .0.as_deref().unwrap_or("no message"))]
    Rejected(Option<String>),
}

/// Delivers one backend's status to its healthcheck endpoint.
#[async_trait]
pub trait Reporter: Send + Sync {
    async fn report(&self, endpoint: &Url, status: Status, elapsed_ms: f64)
        -> Result<(), ReportError>;
}

/// Build the push URL, replacing any `status`/`ping` already on `endpoint`.
pub fn push_url(endpoint: &Url, status: Status, elapsed_ms: f64) -> Url {
    let kept: Vec<(String, String)> = endpoint
        .query_pairs()
        .filter(|(k, _)| k != "status" && k != "ping")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = endpoint.clone();
    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        pairs.extend_pairs(kept);
        pairs.append_pair("status", status.as_str());
        pairs.append_pair("ping", &format!("{:.2}", elapsed_ms));
    }
    url
}

/// Check an acknowledgement body of the form `{"ok": true, "msg": "..."}`.
fn check_ack(body: &[u8]) -> Result<(), ReportError> {
    let ack: Value =
        serde_json::from_slice(body).map_err(|e| ReportError::Malformed(e.to_string()))?;
    let fields = ack
        .as_object()
        .ok_or_else(|| ReportError::Malformed(format!("expected an object, got {}", ack)))?;

    let accepted = match fields.get("ok") {
        Some(Value::Bool(ok)) => *ok,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    };

    if accepted {
        Ok(())
    } else {
        let msg = fields.get("msg").map(|m| match m {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        Err(ReportError::Rejected(msg))
    }
}

/// Reporter that POSTs to the endpoint and validates the acknowledgement.
#[derive(Debug, Clone)]
pub struct HttpReporter {
    client: reqwest::Client,
}

impl HttpReporter {
    /// Create a reporter. `timeout` bounds each push end to end.
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("store-sentinel/", env!("CARGO_PKG_VERSION")));
        if let Some(limit) = timeout {
            builder = builder.timeout(limit);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Reporter for HttpReporter {
    async fn report(
        &self,
        endpoint: &Url,
        status: Status,
        elapsed_ms: f64,
    ) -> Result<(), ReportError> {
        let url = push_url(endpoint, status, elapsed_ms);
        let response = self.client.post(url).send().await?;

        let code = response.status();
        let body = response.bytes().await?;
        if code.is_success() {
            return check_ack(&body);
        }

        // Push endpoints answer unknown monitors with 404 and a JSON msg.
        match check_ack(&body) {
            Err(rejected @ ReportError::Rejected(_)) => Err(rejected),
            _ => Err(ReportError::Status(code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_url_formats_ping() {
        let endpoint = Url::parse("https://status.local/api/push/abc").unwrap();

        let url = push_url(&endpoint, Status::Up, 12.3);
        assert_eq!(url.as_str(), "https://status.local/api/push/abc?status=up&ping=12.30");

        let url = push_url(&endpoint, Status::Down, 0.0);
        assert_eq!(url.query(), Some("status=down&ping=0.00"));
    }

    #[test]
    fn test_push_url_replaces_existing_params() {
        let endpoint =
            Url::parse("https://status.local/api/push/abc?status=up&msg=OK&ping=").unwrap();
        let url = push_url(&endpoint, Status::Down, 4.567);
        assert_eq!(url.query(), Some("msg=OK&status=down&ping=4.57"));
    }

    #[test]
    fn test_ack_accepted() {
        assert!(check_ack(br#"{"ok": true}"#).is_ok());
        assert!(check_ack(br#"{"ok": 1, "msg": "fine"}"#).is_ok());
    }

    #[test]
    fn test_ack_rejected_carries_message() {
        let err = check_ack(br#"{"ok": false, "msg": "Monitor not found or not active."}"#)
            .unwrap_err();
        assert!(matches!(&err, ReportError::Rejected(Some(m)) if m.contains("not found")));
        assert!(err.to_string().contains("Monitor not found"));

        let err = check_ack(br#"{"msg": "missing ok"}"#).unwrap_err();
        assert!(matches!(err, ReportError::Rejected(_)));

        let err = check_ack(br#"{}"#).unwrap_err();
        assert_eq!(err.to_string(), "healthcheck push rejected: no message");
    }

    #[test]
    fn test_ack_malformed() {
        assert!(matches!(check_ack(b"<html>"), Err(ReportError::Malformed(_))));
        assert!(matches!(check_ack(b"[true]"), Err(ReportError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let reporter = HttpReporter::new(Some(Duration::from_secs(2))).unwrap();
        // Nothing listens on port 1.
        let endpoint = Url::parse("http://127.0.0.1:1/push").unwrap();
        let err = reporter.report(&endpoint, Status::Up, 1.0).await.unwrap_err();
        assert!(matches!(err, ReportError::Transport(_)));
    }
}
