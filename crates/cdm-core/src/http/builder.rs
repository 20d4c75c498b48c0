//! HTTP request builder for CDM API calls
//!
//! Turns an [`ApiCall`] plus a selected node into a fully resolved request: the
//! absolute URL, the method and the serialized JSON body. Headers are attached later
//! by the dispatcher once authentication has been resolved.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use reqwest::Method;
use tracing::debug;
use url::Url;

use crate::http::call::ApiCall;
use crate::{Error, Result};

/// Characters kept verbatim when a GET URL is percent-encoded
const STRUCTURAL_CHARS: &[char] = &[':', '/', '?', '=', '&'];

/// A request ready to hand to a [`Transport`](crate::http::Transport)
#[derive(Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for PreparedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: HashMap<&str, &str> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case("authorization") {
                    (name.as_str(), "***")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();

        f.debug_struct("PreparedRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body", &self.body)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for constructing requests from API calls
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestBuilder;

impl RequestBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the request for `call` against `node`
    pub fn build_request(
        &self,
        call: &ApiCall,
        node: &str,
        timeout: Duration,
    ) -> Result<PreparedRequest> {
        let (url, body) = match call {
            ApiCall::Get { version, path } => {
                let url = quote_url(&self.build_url(node, version, path));
                debug!("GET {}", url);
                (url, None)
            }
            ApiCall::Post { version, path, body } | ApiCall::Patch { version, path, body } => {
                let url = self.build_url(node, version, path);
                let config = serde_json::to_string(body)?;
                debug!("{} {}", call.kind(), url);
                debug!("Config: {}", config);
                (url, Some(config))
            }
            ApiCall::Delete { version, path } => {
                let url = self.build_url(node, version, path);
                debug!("DELETE {}", url);
                (url, None)
            }
            ApiCall::JobStatus { url } => {
                check_job_status_url(url)?;
                debug!("JOB STATUS for {}", url);
                (url.clone(), None)
            }
        };

        Ok(PreparedRequest {
            method: call.method(),
            url,
            headers: HashMap::new(),
            body,
            timeout,
        })
    }

    /// `https://<node>/api/<version><path>`
    pub fn build_url(&self, node: &str, version: &str, path: &str) -> String {
        format!("https://{}/api/{}{}", node, version, path)
    }
}

/// Percent-encode a URL, keeping `: / ? = &` as structural characters
///
/// Unreserved characters (`A-Z a-z 0-9 - _ . ~`) are never encoded; everything else,
/// including `%`, is.
pub fn quote_url(url: &str) -> String {
    let mut quoted = String::with_capacity(url.len());
    let mut run_start = 0;

    for (index, ch) in url.char_indices() {
        if STRUCTURAL_CHARS.contains(&ch) {
            quoted.push_str(&urlencoding::encode(&url[run_start..index]));
            quoted.push(ch);
            run_start = index + ch.len_utf8();
        }
    }
    quoted.push_str(&urlencoding::encode(&url[run_start..]));

    quoted
}

fn check_job_status_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url).map_err(|e| {
        Error::invalid_argument(format!("job status URL '{}' is not a valid URL: {}", url, e))
    })?;

    match parsed.scheme() {
        "http" | "https" if parsed.host().is_some() => Ok(()),
        _ => Err(Error::invalid_argument(format!(
            "job status URL '{}' must be an absolute http(s) URL",
            url
        ))),
    }
}
