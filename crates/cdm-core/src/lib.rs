//! CDM Core - Request dispatch and job polling for the CDM appliance REST API
//!
//! This crate sends GET/POST/PATCH/DELETE calls to a CDM cluster, turns error
//! responses into typed errors and polls job-status URLs until completion.
//!
//! # Main Components
//!
//! - **Node selection**: one fixed address or a pool picked at random per call
//! - **Request building**: `https://<node>/api/<version><path>` URLs and JSON bodies
//! - **Authentication**: pluggable header resolvers (API token, username/password)
//! - **Dispatch**: the async [`CdmClient`] with typed [`Error`] classification
//! - **Job polling**: cancelable, bounded polling with progress notifications
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cdm_core::{CdmClient, ClientConfig, NodePool, PollOptions, RequestOptions, TokenAuth};
//!
//! async fn example() -> cdm_core::Result<()> {
//!     let config = ClientConfig::new(NodePool::single("10.0.0.1")?);
//!     let client = CdmClient::new(config, Arc::new(TokenAuth::from_env()))?;
//!
//!     let cluster = client.get("v1", "/cluster/me", RequestOptions::default()).await?;
//!     println!("{}", cluster["name"]);
//!
//!     let job = client
//!         .post("v1", "/vmware/vm/snapshot", serde_json::json!({}), RequestOptions::default())
//!         .await?;
//!     if let Some(href) = job["links"][0]["href"].as_str() {
//!         client.job_status(href, PollOptions::default()).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;

#[cfg(feature = "blocking")]
pub mod blocking;

// Re-export main types for convenience
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use http::{
    ApiCall, AuthResolver, CdmClient, CredentialAuth, EndpointValidator, JobProgress, JobState,
    NodePool, PollOptions, RequestOptions, TlsConfig, TokenAuth, Transport,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
