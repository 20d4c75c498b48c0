//! Dispatcher for CDM API calls
//!
//! [`CdmClient`] ties the pieces together: endpoint validation, node selection,
//! request building, header resolution, the transport and response classification.
//! Nothing is retried here; every failure is returned to the caller as-is.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::http::auth::{create_auth_resolver_from_env, AuthResolver};
use crate::http::builder::RequestBuilder;
use crate::http::call::ApiCall;
use crate::http::normalizer::normalize_response;
use crate::http::transport::{ReqwestTransport, Transport, TransportFailure};
use crate::http::validation::{EndpointValidator, StandardEndpoints};
use crate::{Error, Result};

/// Per-call options for GET/POST/PATCH/DELETE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    /// Request timeout; `None` uses the client's configured timeout
    pub timeout: Option<Duration>,
    /// Send the `Authorization` header
    pub authenticate: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            authenticate: true,
        }
    }
}

impl RequestOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send only the basic JSON headers
    pub fn unauthenticated(mut self) -> Self {
        self.authenticate = false;
        self
    }
}

/// Client for the CDM REST API
///
/// Cheap to clone; clones share the transport, credentials and validator.
#[derive(Clone)]
pub struct CdmClient {
    transport: Arc<dyn Transport>,
    auth: Arc<dyn AuthResolver>,
    validator: Arc<dyn EndpointValidator>,
    request_builder: RequestBuilder,
    config: ClientConfig,
}

impl CdmClient {
    /// Create a client using reqwest and the standard endpoint validation
    pub fn new(config: ClientConfig, auth: Arc<dyn AuthResolver>) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config.tls, config.timeout())?;

        Ok(Self {
            transport: Arc::new(transport),
            auth,
            validator: Arc::new(StandardEndpoints),
            request_builder: RequestBuilder::new(),
            config,
        })
    }

    /// Create a client from `CDM_NODE_IP` and the credential environment variables
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env()?;
        Self::new(config, Arc::from(create_auth_resolver_from_env()))
    }

    /// Replace the transport
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replace the endpoint validator
    pub fn with_validator(mut self, validator: Arc<dyn EndpointValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Get a reference to the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Connect to the cluster and perform a GET operation
    pub async fn get(&self, version: &str, path: &str, options: RequestOptions) -> Result<Value> {
        self.dispatch(ApiCall::get(version, path), options).await
    }

    /// Connect to the cluster and perform a POST operation
    pub async fn post(
        &self,
        version: &str,
        path: &str,
        body: Value,
        options: RequestOptions,
    ) -> Result<Value> {
        self.dispatch(ApiCall::post(version, path, body), options).await
    }

    /// Connect to the cluster and perform a PATCH operation
    pub async fn patch(
        &self,
        version: &str,
        path: &str,
        body: Value,
        options: RequestOptions,
    ) -> Result<Value> {
        self.dispatch(ApiCall::patch(version, path, body), options).await
    }

    /// Connect to the cluster and perform a DELETE operation
    pub async fn delete(&self, version: &str, path: &str, options: RequestOptions) -> Result<Value> {
        self.dispatch(ApiCall::delete(version, path), options).await
    }

    /// Send one call and classify the outcome
    #[instrument(level = "debug", skip_all, fields(kind = call.kind()))]
    pub async fn dispatch(&self, call: ApiCall, options: RequestOptions) -> Result<Value> {
        if let Some((version, path)) = call.endpoint() {
            self.validator.validate(version, path)?;
        }

        let node = self.config.nodes.select();
        let timeout = options.timeout.unwrap_or_else(|| self.config.timeout());
        let mut request = self.request_builder.build_request(&call, node, timeout)?;

        request.headers = if options.authenticate {
            self.auth.authenticated_headers()?
        } else {
            self.auth.basic_headers()
        };

        let method = request.method.to_string();
        let url = request.url.clone();

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|failure| match failure {
                TransportFailure::ConnectTimeout { source } => Error::Connection {
                    method: method.clone(),
                    url: url.clone(),
                    source,
                },
                TransportFailure::Other { message, source } => Error::Transport {
                    method: method.clone(),
                    url: url.clone(),
                    message,
                    source,
                },
            })?;

        debug!(status = response.status, "{} {} -> {}", method, url, response.status);

        normalize_response(&url, response)
    }
}

impl fmt::Debug for CdmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdmClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::auth::TokenAuth;
    use crate::http::node::NodePool;

    fn test_config() -> ClientConfig {
        ClientConfig::new(NodePool::single("10.0.0.1").unwrap())
    }

    #[test]
    fn test_options_defaults() {
        let options = RequestOptions::default();
        assert!(options.authenticate);
        assert!(options.timeout.is_none());

        let options = RequestOptions::default()
            .with_timeout(Duration::from_secs(3))
            .unauthenticated();
        assert!(!options.authenticate);
        assert_eq!(options.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_client_creation() {
        let client = CdmClient::new(test_config(), Arc::new(TokenAuth::new("t"))).unwrap();
        assert_eq!(client.config().timeout_secs, 15);
        assert!(format!("{:?}", client).contains("CdmClient"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = test_config().with_timeout_secs(0);
        assert!(CdmClient::new(config, Arc::new(TokenAuth::new("t"))).is_err());
    }
}
