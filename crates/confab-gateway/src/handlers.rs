// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Handles POST /webhook, POST /outbound/send, GET /health.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use confab_core::{ConfabError, DeliveryReceipt, MessageDirection, MessageStatus};
use confab_ingest::IngestOutcome;

use crate::auth;
use crate::server::GatewayState;

/// Response body for a stored webhook message.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub conversation_id: i64,
    pub message_id: i64,
    pub direction: MessageDirection,
    pub status: MessageStatus,
}

/// Response body for a deliberately ignored webhook payload.
#[derive(Debug, Serialize)]
pub struct IgnoredResponse {
    /// Always `"ignored"`.
    pub status: &'static str,
    /// Why the payload was dropped.
    pub reason: String,
}

/// Request body for POST /outbound/send.
#[derive(Debug, Deserialize)]
pub struct OutboundSendRequest {
    pub conversation_id: i64,
    #[serde(default)]
    pub content: String,
}

/// Response body for a successful outbound send.
#[derive(Debug, Serialize)]
pub struct OutboundSendResponse {
    pub conversation_id: i64,
    pub response: DeliveryReceipt,
}

/// Response body for a failed outbound send (HTTP 502).
#[derive(Debug, Serialize)]
pub struct DeliveryFailureResponse {
    pub conversation_id: i64,
    /// Always `"failed"`.
    pub status: &'static str,
    pub error: String,
    /// Provider context: status and raw body.
    pub payload: Value,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// POST /webhook
///
/// Accepts a JSON object of provider-defined shape. Unresolvable senders and
/// empty content are deliberate no-ops reported with HTTP 200; only
/// malformed bodies are client errors.
pub async fn post_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();

    if let Some(ref secret) = state.auth.webhook_secret {
        let signature = headers
            .get("x-signature-256")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !auth::verify_signature(secret, &body, signature) {
            warn!(%request_id, "webhook signature verification failed");
            return error_response(StatusCode::UNAUTHORIZED, "invalid webhook signature");
        }
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(_) => {
            return error_response(StatusCode::BAD_REQUEST, "request body is not valid JSON");
        }
    };
    if !payload.is_object() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "request body must be a JSON object",
        );
    }

    match state.ingest.ingest(&payload).await {
        Ok(IngestOutcome::Stored {
            conversation_id,
            message_id,
            direction,
            status,
        }) => {
            debug!(%request_id, conversation_id, message_id, "webhook stored");
            (
                StatusCode::OK,
                Json(WebhookResponse {
                    conversation_id,
                    message_id,
                    direction,
                    status,
                }),
            )
                .into_response()
        }
        Ok(IngestOutcome::Ignored { reason }) => {
            debug!(%request_id, %reason, "webhook ignored");
            (
                StatusCode::OK,
                Json(IgnoredResponse {
                    status: "ignored",
                    reason,
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!(%request_id, error = %e, "webhook ingestion failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "ingestion failed")
        }
    }
}

/// POST /outbound/send
///
/// Validates the conversation reference and content, then dispatches through
/// the persist -> deliver -> transition pipeline. Delivery failures surface
/// as HTTP 502 with the provider context attached; the persisted message is
/// already marked `failed` by then.
pub async fn post_outbound_send(
    State(state): State<GatewayState>,
    Json(body): Json<OutboundSendRequest>,
) -> Response {
    if body.conversation_id < 1 {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, "invalid_conversation_id");
    }
    if body.content.trim().is_empty() {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, "empty_content");
    }

    let conversation = match state.registry.get(body.conversation_id).await {
        Ok(Some(conversation)) => conversation,
        Ok(None) => {
            return error_response(StatusCode::NOT_FOUND, "conversation_not_found");
        }
        Err(e) => {
            error!(conversation_id = body.conversation_id, error = %e, "conversation lookup failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage failure");
        }
    };

    match state.dispatch.dispatch(&conversation, &body.content).await {
        Ok(receipt) => (
            StatusCode::OK,
            Json(OutboundSendResponse {
                conversation_id: conversation.id,
                response: receipt,
            }),
        )
            .into_response(),
        Err(ConfabError::Delivery {
            conversation_id,
            status,
            body,
        }) => (
            StatusCode::BAD_GATEWAY,
            Json(DeliveryFailureResponse {
                conversation_id,
                status: "failed",
                error: "delivery failed".to_string(),
                payload: serde_json::json!({"status": status, "body": body}),
            }),
        )
            .into_response(),
        Err(ConfabError::Timeout { duration }) => (
            StatusCode::BAD_GATEWAY,
            Json(DeliveryFailureResponse {
                conversation_id: conversation.id,
                status: "failed",
                error: format!("delivery timed out after {duration:?}"),
                payload: Value::Null,
            }),
        )
            .into_response(),
        Err(ConfabError::Validation(message)) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, &message)
        }
        Err(e) => {
            error!(conversation_id = conversation.id, error = %e, "outbound dispatch failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "dispatch failed")
        }
    }
}

/// GET /health
///
/// Public endpoint for liveness probes.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_request_deserializes_without_content() {
        let req: OutboundSendRequest =
            serde_json::from_str(r#"{"conversation_id": 5}"#).unwrap();
        assert_eq!(req.conversation_id, 5);
        assert!(req.content.is_empty());
    }

    #[test]
    fn webhook_response_serializes_lowercase_enums() {
        let resp = WebhookResponse {
            conversation_id: 1,
            message_id: 2,
            direction: MessageDirection::Inbound,
            status: MessageStatus::Received,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"direction\":\"inbound\""));
        assert!(json.contains("\"status\":\"received\""));
    }

    #[test]
    fn ignored_response_serializes() {
        let resp = IgnoredResponse {
            status: "ignored",
            reason: "message content is empty".to_string(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ignored\""));
        assert!(json.contains("message content is empty"));
    }

    #[test]
    fn failure_response_carries_provider_payload() {
        let resp = DeliveryFailureResponse {
            conversation_id: 9,
            status: "failed",
            error: "delivery failed".to_string(),
            payload: serde_json::json!({"status": "503", "body": "down"}),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"conversation_id\":9"));
        assert!(json.contains("\"503\""));
    }
}
