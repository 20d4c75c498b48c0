//! The network seam between the dispatcher and the HTTP stack
//!
//! [`Transport`] sends one fully prepared request and reports either the raw response
//! or the kind of transport failure. Classification into crate errors happens in the
//! dispatcher, so alternative transports (tests, proxies) only need to report what
//! happened on the wire.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use tracing::debug;

use crate::http::builder::PreparedRequest;
use crate::http::tls::TlsConfig;
use crate::{Error, Result};

/// Status and body of a received response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Why no response was received
#[derive(Debug)]
pub enum TransportFailure {
    /// The TCP connection was not established within the connect timeout
    ConnectTimeout { source: Option<anyhow::Error> },
    /// DNS failure, refused connection, TLS failure, a node that accepted the
    /// connection but answered too slowly, malformed response...
    Other {
        message: String,
        source: Option<anyhow::Error>,
    },
}

impl TransportFailure {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            source: None,
        }
    }
}

/// Sends prepared requests
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: PreparedRequest) -> std::result::Result<RawResponse, TransportFailure>;
}

/// Production transport backed by reqwest
///
/// A request's timeout bounds connection establishment and, separately, every
/// wait for response data. reqwest fixes both per client, so one client is kept
/// per distinct timeout; clients share nothing but the TLS settings.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    clients: Clients,
}

#[derive(Debug, Clone)]
enum Clients {
    /// Built here, one per request timeout
    PerTimeout {
        tls: TlsConfig,
        cache: Arc<Mutex<HashMap<Duration, ReqwestClient>>>,
    },
    /// Supplied by the caller and used as-is
    Fixed(ReqwestClient),
}

impl ReqwestTransport {
    /// Create a transport honoring the given TLS settings, with a client ready
    /// for `default_timeout`
    pub fn new(tls: &TlsConfig, default_timeout: Duration) -> Result<Self> {
        let client = build_client(tls, default_timeout)?;

        Ok(Self {
            clients: Clients::PerTimeout {
                tls: tls.clone(),
                cache: Arc::new(Mutex::new(HashMap::from([(default_timeout, client)]))),
            },
        })
    }

    /// Wrap an already configured reqwest client
    ///
    /// The request timeout then bounds the whole exchange, and an expired timeout
    /// is only a connect timeout if the client's own `connect_timeout` fired.
    pub fn from_client(client: ReqwestClient) -> Self {
        Self {
            clients: Clients::Fixed(client),
        }
    }

    /// Client for `timeout`, and whether the timeout must be set on the request
    fn client_for(
        &self,
        timeout: Duration,
    ) -> std::result::Result<(ReqwestClient, bool), TransportFailure> {
        let (tls, cache) = match &self.clients {
            Clients::Fixed(client) => return Ok((client.clone(), true)),
            Clients::PerTimeout { tls, cache } => (tls, cache),
        };

        let mut cache = cache
            .lock()
            .map_err(|_| TransportFailure::other("HTTP client cache is poisoned"))?;
        if let Some(client) = cache.get(&timeout) {
            return Ok((client.clone(), false));
        }

        debug!(?timeout, "Creating HTTP client for a new request timeout");
        let client = build_client(tls, timeout).map_err(|e| TransportFailure::Other {
            message: e.to_string(),
            source: Some(e.into()),
        })?;
        cache.insert(timeout, client.clone());
        Ok((client, false))
    }
}

fn build_client(tls: &TlsConfig, timeout: Duration) -> Result<ReqwestClient> {
    tls.apply(
        ReqwestClient::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout),
    )?
    .build()
    .map_err(|e| Error::Configuration {
        message: format!("Failed to create HTTP client: {}", e),
        source: Some(e.into()),
    })
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: PreparedRequest) -> std::result::Result<RawResponse, TransportFailure> {
        let (client, whole_exchange) = self.client_for(request.timeout)?;
        let mut builder = client.request(request.method, &request.url);
        if whole_exchange {
            builder = builder.timeout(request.timeout);
        }

        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        // Only a connect-phase timeout means the node was never reached
        let response = builder.send().await.map_err(|e| {
            if e.is_connect() && e.is_timeout() {
                TransportFailure::ConnectTimeout {
                    source: Some(e.into()),
                }
            } else {
                TransportFailure::Other {
                    message: e.to_string(),
                    source: Some(e.into()),
                }
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| TransportFailure::Other {
            message: format!("Failed to read response body: {}", e),
            source: Some(e.into()),
        })?;

        Ok(RawResponse { status, body })
    }
}
