//! MongoDB liveness probe.
//!
//! Sends the administrative `ping` command over a long-lived client and
//! accepts the reply only when its `ok` field is truthy.

use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use mongodb::Client;

use crate::config::{BackendKind, MongoConfig};
use crate::health::probe::{Probe, ProbeError};

/// Probe bound to one MongoDB client.
#[derive(Debug, Clone)]
pub struct MongoProbe {
    client: Client,
}

impl MongoProbe {
    /// Build the client from the configured URI.
    ///
    /// The driver connects lazily, so this fails only on a malformed URI or
    /// an unresolvable SRV record.
    pub async fn connect(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(&config.uri).await?;
        Ok(Self { client })
    }

    async fn ping_command(&self) -> Result<Document, mongodb::error::Error> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
    }

    /// Fire one ping and discard the outcome.
    ///
    /// The first command on a fresh client pays for server selection and the
    /// handshake; doing it before the first cycle keeps that out of the
    /// reported latency.
    pub async fn warm_up(&self) {
        if let Err(e) = self.ping_command().await {
            tracing::debug!(error = %e, "MongoDB warm-up ping failed");
        }
    }
}

/// Whether a command reply carries an affirmative `ok`.
pub fn reply_is_ok(reply: &Document) -> bool {
    match reply.get("ok") {
        Some(Bson::Double(v)) => *v == 1.0,
        Some(Bson::Int32(v)) => *v == 1,
        Some(Bson::Int64(v)) => *v == 1,
        Some(Bson::Boolean(v)) => *v,
        _ => false,
    }
}

#[async_trait]
impl Probe for MongoProbe {
    fn backend(&self) -> BackendKind {
        BackendKind::MongoDb
    }

    async fn ping(&self) -> Result<(), ProbeError> {
        let reply = self
            .ping_command()
            .await
            .map_err(|e| ProbeError::Driver(e.to_string()))?;
        tracing::debug!(reply = %reply, "MongoDB response");

        if reply_is_ok(&reply) {
            Ok(())
        } else {
            Err(ProbeError::UnexpectedReply(reply.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_reply_variants() {
        assert!(reply_is_ok(&doc! { "ok": 1.0 }));
        assert!(reply_is_ok(&doc! { "ok": 1 }));
        assert!(reply_is_ok(&doc! { "ok": 1_i64 }));
        assert!(reply_is_ok(&doc! { "ok": true }));
    }

    #[test]
    fn test_non_affirmative_replies() {
        assert!(!reply_is_ok(&doc! { "ok": 0.0 }));
        assert!(!reply_is_ok(&doc! { "ok": false }));
        assert!(!reply_is_ok(&doc! { "ok": "1" }));
        assert!(!reply_is_ok(&doc! { "errmsg": "not authorized" }));
        assert!(!reply_is_ok(&Document::new()));
    }

    #[tokio::test]
    async fn test_malformed_uri_fails_to_connect() {
        let config = MongoConfig {
            uri: "not-a-mongo-uri".into(),
            healthcheck_url: url::Url::parse("http://127.0.0.1/push").unwrap(),
        };
        assert!(MongoProbe::connect(&config).await.is_err());
    }
}
