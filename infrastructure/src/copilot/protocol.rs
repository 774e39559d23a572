//! JSON-RPC protocol types for Copilot CLI communication.
//!
//! - **Requests**: client → CLI (`session.create`, `session.send`, `session.destroy`)
//! - **Responses**: CLI → client, correlated by `id`
//! - **Notifications**: CLI → client, `session.event` carrying a typed event
//!   (`session.start`, `assistant.message.delta`, `session.idle`, ...)

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    REQUEST_ID.fetch_add(1, Ordering::SeqCst)
}

/// JSON-RPC request
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Creates a new JSON-RPC request with an auto-generated ID.
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id: next_id(),
            method: method.into(),
            params,
        }
    }

    /// `session.destroy` for one session
    pub fn destroy_session(session_id: &str) -> Self {
        Self::new(
            "session.destroy",
            Some(serde_json::json!({ "sessionId": session_id })),
        )
    }
}

/// JSON-RPC response
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<RpcError>,
}

impl JsonRpcResponse {
    /// `result.sessionId`, as returned by `session.create`
    pub fn session_id(&self) -> Option<&str> {
        self.result.as_ref()?.get("sessionId")?.as_str()
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// Error reply to a request the CLI sent us
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcErrorReply {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub error: RpcError,
}

impl JsonRpcErrorReply {
    /// `-32601 Method not found`: this client never registers tools or
    /// handlers, so every incoming request gets this reply.
    pub fn method_not_found(id: u64, method: &str) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            error: RpcError {
                code: -32601,
                message: format!("method not supported by client: {}", method),
            },
        }
    }
}

/// Session creation parameters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionParams {
    pub model: String,
    pub streaming: bool,
}

/// `session.send` / `session.destroy` parameters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendParams {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// How an incoming frame must be dispatched
#[derive(Debug, PartialEq)]
pub enum Incoming {
    /// Reply to one of our requests
    Response { id: u64 },
    /// A request from the CLI (has both `id` and `method`)
    Request { id: u64, method: String },
    /// A `session.event` for one session
    SessionEvent {
        session_id: String,
        event_type: String,
        event: Value,
    },
    /// Any other notification
    Other,
}

/// Classify a decoded frame by its `id`, `method` and `params` fields.
pub fn classify(frame: &Value) -> Incoming {
    let id = frame.get("id").and_then(Value::as_u64);
    let method = frame.get("method").and_then(Value::as_str);

    match (id, method) {
        (Some(id), Some(method)) => Incoming::Request {
            id,
            method: method.to_string(),
        },
        (Some(id), None) => Incoming::Response { id },
        (None, Some("session.event")) => {
            let params = frame.get("params");
            let session_id = params
                .and_then(|p| p.get("sessionId"))
                .and_then(Value::as_str);
            let event = params.and_then(|p| p.get("event"));
            match (session_id, event) {
                (Some(session_id), Some(event)) => Incoming::SessionEvent {
                    session_id: session_id.to_string(),
                    event_type: event
                        .get("type")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    event: event.clone(),
                },
                _ => Incoming::Other,
            }
        }
        _ => Incoming::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_ids_are_unique() {
        let a = JsonRpcRequest::new("session.send", None);
        let b = JsonRpcRequest::new("session.send", None);
        assert_ne!(a.id, b.id);
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert!(json.get("params").is_none());
    }

    #[test]
    fn session_id_from_create_response() {
        let response: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 3, "result": {"sessionId": "s9"}}))
                .unwrap();
        assert_eq!(response.session_id(), Some("s9"));

        let empty: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 4, "result": {}})).unwrap();
        assert_eq!(empty.session_id(), None);

        let destroy = serde_json::to_value(JsonRpcRequest::destroy_session("s9")).unwrap();
        assert_eq!(destroy["method"], "session.destroy");
        assert_eq!(destroy["params"]["sessionId"], "s9");
    }

    #[test]
    fn send_params_are_camel_case() {
        let params = SendParams {
            session_id: "s1".to_string(),
            prompt: Some("hi".to_string()),
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["sessionId"], "s1");
        assert_eq!(json["prompt"], "hi");

        let destroy = SendParams {
            session_id: "s1".to_string(),
            prompt: None,
        };
        assert!(serde_json::to_value(&destroy).unwrap().get("prompt").is_none());
    }

    #[test]
    fn classify_response() {
        let frame = json!({"jsonrpc": "2.0", "id": 7, "result": {}});
        assert_eq!(classify(&frame), Incoming::Response { id: 7 });
    }

    #[test]
    fn classify_incoming_request() {
        let frame = json!({"id": 3, "method": "tool.call", "params": {}});
        assert_eq!(
            classify(&frame),
            Incoming::Request {
                id: 3,
                method: "tool.call".to_string()
            }
        );
    }

    #[test]
    fn classify_session_event() {
        let frame = json!({
            "method": "session.event",
            "params": {"sessionId": "abc", "event": {"type": "session.idle"}}
        });
        match classify(&frame) {
            Incoming::SessionEvent {
                session_id,
                event_type,
                ..
            } => {
                assert_eq!(session_id, "abc");
                assert_eq!(event_type, "session.idle");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn classify_session_event_without_session_id() {
        let frame = json!({"method": "session.event", "params": {"event": {}}});
        assert_eq!(classify(&frame), Incoming::Other);
    }

    #[test]
    fn method_not_found_reply() {
        let reply = JsonRpcErrorReply::method_not_found(9, "tool.call");
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["id"], 9);
        assert_eq!(json["error"]["code"], -32601);
    }
}
