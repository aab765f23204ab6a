//! Decoding of backend response bodies and error classification.

use hl_core::ApiError;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// The backend answers either with the payload itself or wrapped in
/// `{ "data": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

pub fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let envelope: Envelope<T> = serde_json::from_str(body).map_err(|err| ApiError::Decode {
        message: err.to_string(),
    })?;
    Ok(match envelope {
        Envelope::Wrapped { data } => data,
        Envelope::Bare(value) => value,
    })
}

/// Decodes list items one at a time. An item that does not decode is logged
/// and dropped so the rest of the list still arrives.
pub fn decode_items<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(index, %err, "skipping undecodable list item");
                None
            }
        })
        .collect();
    if decoded.len() < total {
        warn!(skipped = total - decoded.len(), total, "list decoded partially");
    }
    decoded
}

/// Pulls a human-readable message out of an error body.
pub fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|value| {
            ["message", "error", "msg"]
                .iter()
                .find_map(|field| value.get(*field).and_then(Value::as_str))
        })
        .map_or_else(|| body.trim().to_string(), str::to_string)
}

/// Maps a non-success, non-401 status to an [`ApiError`].
pub fn classify(status: u16, body: &str) -> ApiError {
    let message = error_message(body);
    match status {
        409 => ApiError::Duplicate { message },
        400 if message.to_lowercase().contains("already") => ApiError::Duplicate { message },
        404 => ApiError::NotFound,
        401 => ApiError::Unauthorized,
        _ => ApiError::Status { status, message },
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    #[serde(alias = "token", alias = "access_token")]
    pub access_token: String,
    #[serde(default, alias = "refresh_token")]
    pub refresh_token: Option<String>,
}
