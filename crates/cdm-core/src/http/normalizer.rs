//! Response classification for CDM API calls
//!
//! CDM nodes report application errors inside the JSON body through an `errorType`
//! field, sometimes with a 200 status. The embedded error always wins over the status
//! code; otherwise the status decides.

use serde_json::Value;

use crate::http::transport::RawResponse;
use crate::{Error, Result};

/// Field marking an application error in a response body
pub const ERROR_TYPE_FIELD: &str = "errorType";
/// Human readable companion of [`ERROR_TYPE_FIELD`]
pub const ERROR_MESSAGE_FIELD: &str = "message";

/// Classify a received response, returning the parsed body on success
pub fn normalize_response(url: &str, response: RawResponse) -> Result<Value> {
    let RawResponse { status, body } = response;

    match serde_json::from_str::<Value>(&body) {
        Ok(json) => {
            if let Some(error) = embedded_error(&json, status) {
                return Err(error);
            }
            if is_failure_status(status) {
                return Err(Error::Http {
                    status_code: status,
                    url: url.to_string(),
                    body,
                });
            }
            Ok(json)
        }
        Err(_) if is_failure_status(status) => Err(Error::Http {
            status_code: status,
            url: url.to_string(),
            body,
        }),
        Err(_) if body.trim().is_empty() => Ok(Value::Null),
        Err(_) => Ok(Value::String(body)),
    }
}

/// 4xx and 5xx statuses are failures
pub fn is_failure_status(status: u16) -> bool {
    (400..600).contains(&status)
}

fn embedded_error(json: &Value, status: u16) -> Option<Error> {
    let error_type = json.get(ERROR_TYPE_FIELD)?;

    let error_type = match error_type {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let message = json
        .get(ERROR_MESSAGE_FIELD)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| json.to_string());

    Some(Error::Server {
        error_type,
        message,
        status_code: status,
    })
}
