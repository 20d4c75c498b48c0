//! Error types for the CDM core library
//!
//! Every failure the dispatcher or the job poller can observe is mapped onto one
//! variant of [`Error`], using thiserror for the definitions and anyhow for opaque
//! underlying causes. Nothing in this crate terminates the process; errors are always
//! returned to the caller.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Main error type for CDM client operations
#[derive(Error, Debug)]
pub enum Error {
    /// Local validation failed; no request was sent
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The connection could not be established within the connect timeout
    #[error("Unable to establish a connection to the CDM cluster ({method} {url})")]
    Connection {
        method: String,
        url: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Any other network-level failure (DNS, refused connection, slow reply, malformed response)
    #[error("Transport error during {method} {url}: {message}")]
    Transport {
        method: String,
        url: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Application error embedded in the response body via `errorType`
    #[error("{message}")]
    Server {
        error_type: String,
        message: String,
        status_code: u16,
    },

    /// Non-2xx status without an embedded application error
    #[error("HTTP error [{status_code}] for {url}: {body}")]
    Http {
        status_code: u16,
        url: String,
        body: String,
    },

    /// A polled job reached a terminal status other than SUCCEEDED
    #[error("Job failed with status {status}: {details}")]
    JobFailed { status: String, details: Value },

    /// The poll loop was cancelled through its cancellation token
    #[error("Job polling cancelled for {url}")]
    Cancelled { url: String },

    /// The poll loop exceeded its maximum duration
    #[error("Job at {url} did not complete within {max_duration:?}")]
    PollDeadline { url: String, max_duration: Duration },

    /// Configuration errors (credentials, TLS material, node list)
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a configuration error without an underlying cause
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// HTTP status attached to the error, if a response was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Server { status_code, .. } | Self::Http { status_code, .. } => {
                Some(*status_code)
            }
            _ => None,
        }
    }

    /// True when the failure happened before anything was sent over the network
    pub fn is_local(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. } | Self::Configuration { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_error_displays_server_message() {
        let err = Error::Server {
            error_type: "InvalidInput".to_string(),
            message: "bad field".to_string(),
            status_code: 200,
        };
        assert_eq!(err.to_string(), "bad field");
        assert_eq!(err.status_code(), Some(200));
    }

    #[test]
    fn test_connection_error_names_method_and_url() {
        let err = Error::Connection {
            method: "GET".to_string(),
            url: "https://10.0.0.1/api/v1/cluster/me".to_string(),
            source: None,
        };
        let text = err.to_string();
        assert!(text.contains("Unable to establish a connection"));
        assert!(text.contains("GET https://10.0.0.1/api/v1/cluster/me"));
    }

    #[test]
    fn test_job_failed_includes_full_payload() {
        let err = Error::JobFailed {
            status: "FAILED".to_string(),
            details: json!({"status": "FAILED", "progress": 40}),
        };
        let text = err.to_string();
        assert!(text.contains("FAILED"));
        assert!(text.contains("\"progress\":40"));
    }

    #[test]
    fn test_local_errors() {
        assert!(Error::invalid_argument("x").is_local());
        assert!(Error::configuration("x").is_local());
        assert!(!Error::Cancelled { url: "u".into() }.is_local());
    }
}
