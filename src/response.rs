//! Turning raw HTTP responses into results or classified errors

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result, StoreError};
use crate::types::{OperationResult, ResponseMeta};

/// What the transport hands back: status, headers and the full body.
///
/// Error statuses are ordinary values here; etcd reports application
/// errors as 4xx/5xx responses with a JSON body.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Complete body
    pub body: Bytes,
}

impl RawResponse {
    /// Build a response with no headers
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// True when the status is 4xx or 5xx
    pub fn is_error_status(&self) -> bool {
        self.status.is_client_error() || self.status.is_server_error()
    }

    fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).trim().to_string()
    }
}

/// Decode a keys-API response.
///
/// A non-zero `errorCode` becomes [`Error::Store`]. An error status without
/// one becomes [`Error::Rejected`]. Anything else is returned as decoded,
/// with missing fields left at their defaults.
pub fn parse(raw: &RawResponse) -> Result<OperationResult> {
    let mut result: OperationResult = match serde_json::from_slice(&raw.body) {
        Ok(value @ Value::Object(_)) => serde_json::from_value(value)?,
        // Well-formed JSON that is not an object carries no known fields.
        Ok(_) => OperationResult::default(),
        // A non-JSON error page still says more than a parse error would.
        Err(_) if raw.is_error_status() && !raw.body.is_empty() => {
            return Err(Error::Rejected {
                status: raw.status.as_u16(),
                message: raw.body_text(),
            });
        }
        Err(e) => return Err(Error::Parse(e)),
    };

    if let Some(code) = result.error_code.filter(|c| *c != 0) {
        return Err(Error::Store(StoreError {
            code,
            message: result.message.take().unwrap_or_default(),
            cause: result.cause.take(),
            index: result.index,
        }));
    }

    if raw.is_error_status() {
        let message = result.message.take().unwrap_or_else(|| raw.body_text());
        warn!("Request rejected with status {}: {}", raw.status, message);
        return Err(Error::Rejected {
            status: raw.status.as_u16(),
            message,
        });
    }

    result.meta = ResponseMeta::from_headers(&raw.headers);
    Ok(result)
}

/// Decode the answer to an auth enable/disable call.
///
/// etcd acknowledges a successful toggle with `200` and an empty body; that
/// case is answered with `success_message` instead of being parsed.
pub fn parse_auth_toggle(raw: &RawResponse, success_message: &str) -> Result<OperationResult> {
    if raw.status == StatusCode::OK && raw.body.iter().all(u8::is_ascii_whitespace) {
        let mut result = OperationResult::with_message(success_message);
        result.meta = ResponseMeta::from_headers(&raw.headers);
        return Ok(result);
    }
    parse(raw)
}

/// Decode a body of a known shape, such as `GET /v2/auth/enable`.
pub fn parse_json<T>(raw: &RawResponse) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    if raw.is_error_status() {
        // Reuse the classifier so error bodies surface the same way.
        parse(raw)?;
    }
    Ok(serde_json::from_slice(&raw.body)?)
}
