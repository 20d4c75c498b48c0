//! HTTP layer for CDM API communication
//!
//! This module provides:
//! - Node selection from a single address or a pool
//! - Request building with GET percent-encoding and JSON bodies
//! - Authentication header resolution (API token or username/password)
//! - Endpoint validation before dispatch
//! - Response classification, including errors embedded in successful responses
//! - Job status polling with cancellation, deadline and progress reporting

pub mod auth;
pub mod builder;
pub mod call;
pub mod client;
pub mod job;
pub mod node;
pub mod normalizer;
pub mod tls;
pub mod transport;
pub mod validation;

pub use auth::{
    basic_headers, create_auth_resolver_from_env, Anonymous, AuthResolver, CredentialAuth,
    TokenAuth,
};
pub use builder::{quote_url, PreparedRequest, RequestBuilder};
pub use call::ApiCall;
pub use client::{CdmClient, RequestOptions};
pub use job::{JobProgress, JobState, PollOptions};
pub use node::NodePool;
pub use normalizer::normalize_response;
pub use tls::{TlsConfig, TlsVersion};
pub use transport::{RawResponse, ReqwestTransport, Transport, TransportFailure};
pub use validation::{AcceptAll, EndpointValidator, StandardEndpoints};

// Re-export commonly used types
pub use reqwest::{Method, StatusCode};
