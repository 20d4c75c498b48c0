//! The closed set of calls the dispatcher knows how to send

use reqwest::Method;
use serde_json::Value;

/// One API call, carrying exactly the data its kind needs
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Get { version: String, path: String },
    Post { version: String, path: String, body: Value },
    Patch { version: String, path: String, body: Value },
    Delete { version: String, path: String },
    /// Absolute job-status URL returned by an earlier call
    JobStatus { url: String },
}

impl ApiCall {
    pub fn get(version: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Get {
            version: version.into(),
            path: path.into(),
        }
    }

    pub fn post(version: impl Into<String>, path: impl Into<String>, body: Value) -> Self {
        Self::Post {
            version: version.into(),
            path: path.into(),
            body,
        }
    }

    pub fn patch(version: impl Into<String>, path: impl Into<String>, body: Value) -> Self {
        Self::Patch {
            version: version.into(),
            path: path.into(),
            body,
        }
    }

    pub fn delete(version: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Delete {
            version: version.into(),
            path: path.into(),
        }
    }

    pub fn job_status(url: impl Into<String>) -> Self {
        Self::JobStatus { url: url.into() }
    }

    /// HTTP method used on the wire
    pub fn method(&self) -> Method {
        match self {
            Self::Get { .. } | Self::JobStatus { .. } => Method::GET,
            Self::Post { .. } => Method::POST,
            Self::Patch { .. } => Method::PATCH,
            Self::Delete { .. } => Method::DELETE,
        }
    }

    /// Label used in log lines and error context
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Get { .. } => "GET",
            Self::Post { .. } => "POST",
            Self::Patch { .. } => "PATCH",
            Self::Delete { .. } => "DELETE",
            Self::JobStatus { .. } => "JOB_STATUS",
        }
    }

    /// `(version, path)` for calls addressed relative to a node
    pub fn endpoint(&self) -> Option<(&str, &str)> {
        match self {
            Self::Get { version, path }
            | Self::Post { version, path, .. }
            | Self::Patch { version, path, .. }
            | Self::Delete { version, path } => Some((version, path)),
            Self::JobStatus { .. } => None,
        }
    }

    /// Request body for POST and PATCH
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Post { body, .. } | Self::Patch { body, .. } => Some(body),
            _ => None,
        }
    }
}
