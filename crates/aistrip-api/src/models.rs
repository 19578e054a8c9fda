// AiStrip API request and response types
//
// The service wraps most payloads in a loose `{ ok, error, data }` envelope
// and is inconsistent about which fields are present, so nearly everything
// is `#[serde(default)]` and validated by the caller instead of the decoder.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Envelope ─────────────────────────────────────────────────────────

/// Response envelope shared by the endpoints.
///
/// ```json
/// { "ok": true, "data": ... }
/// { "ok": false, "error": "invalid key" }
/// ```
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub error: Option<Value>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// The error payload, if it is set to anything truthy.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().and_then(truthy_message)
    }
}

/// Render a JSON value as an error message when it would count as "set".
///
/// `null`, `false`, `0` and `""` are treated as absent.
pub(crate) fn truthy_message(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64().is_some_and(|f| f.abs() < f64::EPSILON) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ── Directory ────────────────────────────────────────────────────────

/// One entry of `GET /dev/all`.
///
/// Non-strip device kinds share the list but not always the outlet fields,
/// so the identifiers are optional here. Entries are decoded one at a time;
/// see [`AiStripClient::list_devices`](crate::AiStripClient::list_devices).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDevice {
    #[serde(default)]
    pub outlet_id: Option<String>,
    #[serde(default)]
    pub outlet_name: Option<String>,
    #[serde(default)]
    pub device_type: String,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

// ── Device state ─────────────────────────────────────────────────────

/// The `data` object of `GET /dev/{deviceId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDetail {
    /// Packed attribute string; the relay state is the digit after `12_`.
    #[serde(default)]
    pub attrid_val: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

// ── Control ──────────────────────────────────────────────────────────

/// Client kind the service expects on control calls.
pub const CONTROL_KIND: &str = "ios";

/// Body of `POST /dev/{deviceId}/control`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRequest {
    /// `1` for on, `0` for off.
    pub state: u8,
    pub kind: String,
}

impl ControlRequest {
    pub fn new(on: bool) -> Self {
        Self {
            state: u8::from(on),
            kind: CONTROL_KIND.into(),
        }
    }
}

/// Response of `POST /dev/{deviceId}/control`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlResponse {
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub error: Option<Value>,
    /// Resulting relay state as reported by the service.
    #[serde(default)]
    pub state: Option<Value>,
}

impl ControlResponse {
    /// The reported state as a boolean, accepting `true`/`false` and `1`/`0`.
    /// `None` when the field is absent or has any other shape.
    pub fn reported_state(&self) -> Option<bool> {
        match self.state.as_ref()? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().map(|v| v != 0),
            _ => None,
        }
    }
}
