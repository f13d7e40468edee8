//! Outcome of a remote operation, as reported back by the transport layer.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// Success flag plus whatever the service or transport said about a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationStatus {
    pub is_success: bool,
    pub error_message: Option<String>,
    /// The `status` member as sent by the service, or the unparsed body.
    pub raw_status: Option<String>,
}

#[derive(Deserialize)]
struct Envelope {
    status: Value,
}

impl OperationStatus {
    pub fn success() -> Self {
        Self {
            is_success: true,
            error_message: None,
            raw_status: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            error_message: Some(message.into()),
            raw_status: None,
        }
    }

    /// Captures a transport-level error.
    pub fn from_error(error: &impl fmt::Display) -> Self {
        Self::failure(error.to_string())
    }

    /// Reads the service response envelope.
    ///
    /// `{"status": "ok"}` is a success, `{"status": {"error": ".."}}` a failure
    /// carrying the message. Anything else is a failure keeping the raw text.
    pub fn from_response_body(body: &str) -> Self {
        let envelope: Envelope = match serde_json::from_str(body) {
            Ok(envelope) => envelope,
            Err(e) => {
                return Self {
                    raw_status: Some(body.to_string()),
                    ..Self::failure(format!("unreadable response: {}", e))
                }
            }
        };

        let raw_status = Some(envelope.status.to_string());
        match &envelope.status {
            Value::String(s) if s == "ok" => Self {
                raw_status,
                ..Self::success()
            },
            Value::Object(obj) => {
                let message = obj
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                Self {
                    raw_status,
                    ..Self::failure(message)
                }
            }
            other => Self {
                raw_status,
                ..Self::failure(format!("unexpected status: {}", other))
            },
        }
    }
}
