use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use rc_core::domain::{ActionName, GatewayError, TransportError};

// ---------------------------------------------------------------------------
// Call envelope — `{ "action": <name>, "payload": <object> }`
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CallEnvelope<'a, P: Serialize> {
    action: &'static str,
    payload: &'a P,
}

pub fn encode_call<P: Serialize>(action: ActionName, payload: &P) -> Result<Vec<u8>, GatewayError> {
    let envelope = CallEnvelope {
        action: action.as_str(),
        payload,
    };
    serde_json::to_vec(&envelope).map_err(|e| GatewayError::Decode(e.to_string()))
}

// ---------------------------------------------------------------------------
// Reply envelope — `{ "success": bool, ...fields, "error"?: string }`
// ---------------------------------------------------------------------------

/// Splits the reply into its three outcomes: not JSON (transport), `success:
/// false` (logical failure, message verbatim), or the action-specific fields.
fn parse_envelope(body: &[u8]) -> Result<serde_json::Map<String, Value>, GatewayError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| {
        TransportError::InvalidJson(String::from_utf8_lossy(body).chars().take(120).collect())
    })?;

    let Value::Object(mut object) = value else {
        return Err(GatewayError::Decode(format!(
            "expected a JSON object reply, got {value}"
        )));
    };

    match object.remove("success") {
        Some(Value::Bool(true)) => {
            object.remove("error");
            Ok(object)
        }
        Some(Value::Bool(false)) => {
            let message = match object.remove("error") {
                Some(Value::String(s)) => s,
                _ => "backend reported failure without a message".to_owned(),
            };
            Err(GatewayError::Rejected { message })
        }
        _ => Err(GatewayError::Decode(
            "reply is missing the success flag".to_owned(),
        )),
    }
}

/// Decodes the action-specific fields of a successful reply into `T`.
pub fn decode_reply<T: DeserializeOwned>(body: &[u8]) -> Result<T, GatewayError> {
    let fields = parse_envelope(body)?;
    serde_json::from_value(Value::Object(fields)).map_err(|e| GatewayError::Decode(e.to_string()))
}

/// For actions whose reply carries nothing beyond the success flag.
pub fn decode_ack(body: &[u8]) -> Result<(), GatewayError> {
    parse_envelope(body).map(|_| ())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
