//! Synchronous facade over [`CdmClient`]
//!
//! Owns a current-thread tokio runtime and blocks the calling thread for the whole
//! call. Must not be used from inside an async context; use [`CdmClient`] there.

use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::{Builder, Runtime};

use crate::config::ClientConfig;
use crate::http::auth::AuthResolver;
use crate::http::client::{CdmClient, RequestOptions};
use crate::http::job::PollOptions;
use crate::{Error, Result};

/// Blocking CDM client
#[derive(Debug)]
pub struct BlockingClient {
    inner: CdmClient,
    runtime: Runtime,
}

impl BlockingClient {
    pub fn new(config: ClientConfig, auth: Arc<dyn AuthResolver>) -> Result<Self> {
        Self::from_async(CdmClient::new(config, auth)?)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_async(CdmClient::from_env()?)
    }

    /// Wrap an existing async client
    pub fn from_async(inner: CdmClient) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Configuration {
                message: format!("Failed to create runtime: {}", e),
                source: Some(e.into()),
            })?;

        Ok(Self { inner, runtime })
    }

    /// The wrapped async client
    pub fn inner(&self) -> &CdmClient {
        &self.inner
    }

    pub fn get(&self, version: &str, path: &str, options: RequestOptions) -> Result<Value> {
        self.runtime.block_on(self.inner.get(version, path, options))
    }

    pub fn post(
        &self,
        version: &str,
        path: &str,
        body: Value,
        options: RequestOptions,
    ) -> Result<Value> {
        self.runtime
            .block_on(self.inner.post(version, path, body, options))
    }

    pub fn patch(
        &self,
        version: &str,
        path: &str,
        body: Value,
        options: RequestOptions,
    ) -> Result<Value> {
        self.runtime
            .block_on(self.inner.patch(version, path, body, options))
    }

    pub fn delete(&self, version: &str, path: &str, options: RequestOptions) -> Result<Value> {
        self.runtime.block_on(self.inner.delete(version, path, options))
    }

    /// Blocks for the whole poll loop when `wait_for_completion` is set
    pub fn job_status(&self, url: &str, options: PollOptions) -> Result<Value> {
        self.runtime.block_on(self.inner.job_status(url, options))
    }
}
