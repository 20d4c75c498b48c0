//! Client configuration
//!
//! Holds the node pool, the per-request timeout, the job poll interval and TLS
//! settings. Configurations are plain serde structures so that front ends can load
//! them from files; [`ClientConfig::from_env`] covers the environment-only case.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::http::node::NodePool;
use crate::http::tls::TlsConfig;
use crate::{Error, Result};

/// Seconds to wait for a node to answer a single request
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
/// Seconds between two job status polls
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
/// Environment variable holding the node address or comma separated node list
pub const NODE_ENV: &str = "CDM_NODE_IP";

/// Configuration for a [`CdmClient`](crate::CdmClient)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Node address or list of node addresses
    pub nodes: NodePool,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Interval between job status polls in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// TLS settings
    #[serde(default)]
    pub tls: TlsConfig,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl ClientConfig {
    /// Configuration with default policy for the given nodes
    pub fn new(nodes: NodePool) -> Self {
        Self {
            nodes,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            tls: TlsConfig::default(),
        }
    }

    /// Read the node list from `CDM_NODE_IP`
    pub fn from_env() -> Result<Self> {
        let nodes = std::env::var(NODE_ENV).map_err(|_| {
            Error::configuration(format!(
                "Node address not found. Set the {} environment variable",
                NODE_ENV
            ))
        })?;

        Ok(Self::new(NodePool::parse_list(&nodes)?))
    }

    pub fn with_timeout_secs(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    pub fn with_poll_interval_secs(mut self, seconds: u64) -> Self {
        self.poll_interval_secs = seconds;
        self
    }

    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::configuration("Request timeout cannot be zero"));
        }
        if self.poll_interval_secs == 0 {
            return Err(Error::configuration("Job poll interval cannot be zero"));
        }
        self.tls.validate()
    }
}
