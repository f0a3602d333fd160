// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the outbound delivery provider.
//!
//! One POST per message with a bounded timeout. Any non-2xx response or
//! transport error (timeouts included) becomes a typed
//! [`ConfabError::Delivery`] carrying the provider status and raw body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use confab_core::{ConfabError, DeliveryAdapter, DeliveryReceipt};

/// Configuration for the HTTP delivery adapter.
///
/// Mirrors `DeliveryConfig` from `confab-config` to avoid a dependency on
/// the config crate from the delivery crate.
#[derive(Debug, Clone)]
pub struct HttpDeliveryConfig {
    /// Provider endpoint the message payload is POSTed to.
    pub endpoint: String,
    /// Optional bearer token for the provider API.
    pub api_token: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
}

/// Delivery adapter performing one outbound HTTP call per message.
#[derive(Debug, Clone)]
pub struct HttpDelivery {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDelivery {
    /// Creates a new HTTP delivery adapter.
    pub fn new(config: &HttpDeliveryConfig) -> Result<Self, ConfabError> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        if let Some(ref token) = config.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                ConfabError::Channel {
                    message: format!("invalid delivery API token header value: {e}"),
                    source: Some(Box::new(e)),
                }
            })?;
            headers.insert("authorization", value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfabError::Channel {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl DeliveryAdapter for HttpDelivery {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(
        &self,
        conversation_id: i64,
        content: &str,
    ) -> Result<DeliveryReceipt, ConfabError> {
        let body = serde_json::json!({
            "conversation_id": conversation_id,
            "content": content,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let status = if e.is_timeout() { "timeout" } else { "transport" };
                ConfabError::Delivery {
                    conversation_id,
                    status: status.to_string(),
                    body: e.to_string(),
                }
            })?;

        let status = response.status();
        let raw_body = response.text().await.unwrap_or_default();
        debug!(conversation_id, status = %status, "delivery response received");

        if !status.is_success() {
            warn!(
                conversation_id,
                status = %status,
                body = %raw_body,
                "delivery provider rejected message"
            );
            return Err(ConfabError::Delivery {
                conversation_id,
                status: status.as_u16().to_string(),
                body: raw_body,
            });
        }

        let provider_id = serde_json::from_str::<serde_json::Value>(&raw_body)
            .ok()
            .and_then(|v| v.get("id").and_then(|id| id.as_str()).map(str::to_string));

        Ok(DeliveryReceipt {
            status: "sent".to_string(),
            status_code: status.as_u16(),
            provider_id,
            raw_body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(endpoint: String) -> HttpDeliveryConfig {
        HttpDeliveryConfig {
            endpoint,
            api_token: None,
            timeout: Duration::from_secs(2),
        }
    }

    #[tokio::test]
    async fn success_response_yields_a_receipt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/deliver"))
            .and(body_json(serde_json::json!({
                "conversation_id": 42,
                "content": "hello",
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "prov-9"})),
            )
            .mount(&server)
            .await;

        let adapter = HttpDelivery::new(&config(format!("{}/deliver", server.uri()))).unwrap();
        let receipt = adapter.send(42, "hello").await.unwrap();

        assert_eq!(receipt.status, "sent");
        assert_eq!(receipt.status_code, 200);
        assert_eq!(receipt.provider_id.as_deref(), Some("prov-9"));
        assert!(receipt.raw_body.contains("prov-9"));
    }

    #[tokio::test]
    async fn non_2xx_becomes_a_delivery_error_with_the_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let adapter = HttpDelivery::new(&config(server.uri())).unwrap();
        let Err(ConfabError::Delivery {
            conversation_id,
            status,
            body,
        }) = adapter.send(7, "hello").await
        else {
            panic!("expected delivery error");
        };
        assert_eq!(conversation_id, 7);
        assert_eq!(status, "503");
        assert_eq!(body, "upstream down");
    }

    #[tokio::test]
    async fn timeout_is_a_delivery_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let adapter = HttpDelivery::new(&HttpDeliveryConfig {
            endpoint: server.uri(),
            api_token: None,
            timeout: Duration::from_millis(100),
        })
        .unwrap();

        let Err(ConfabError::Delivery { status, .. }) = adapter.send(1, "slow").await else {
            panic!("expected delivery error");
        };
        assert_eq!(status, "timeout");
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        // Port 9 (discard) is never listening in CI.
        let adapter = HttpDelivery::new(&config("http://127.0.0.1:9/deliver".to_string()))
            .unwrap();
        let Err(ConfabError::Delivery { status, .. }) = adapter.send(1, "x").await else {
            panic!("expected delivery error");
        };
        assert_eq!(status, "transport");
    }

    #[tokio::test]
    async fn api_token_is_sent_as_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(wiremock::matchers::header("authorization", "Bearer sekrit"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let adapter = HttpDelivery::new(&HttpDeliveryConfig {
            endpoint: server.uri(),
            api_token: Some("sekrit".to_string()),
            timeout: Duration::from_secs(2),
        })
        .unwrap();
        assert!(adapter.send(1, "authed").await.is_ok());
    }
}
