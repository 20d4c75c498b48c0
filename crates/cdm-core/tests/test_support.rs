//! Shared test support utilities for integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cdm_core::http::{PreparedRequest, RawResponse, Transport, TransportFailure};
use cdm_core::{AuthResolver, CdmClient, ClientConfig, NodePool, TokenAuth};
use serde_json::Value;

pub const TOKEN: &str = "secret-token";
pub const NODE: &str = "10.0.0.1";

/// Transport replaying a fixed script and recording every request it receives
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<RawResponse, TransportFailure>>>,
    requests: Mutex<Vec<PreparedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a JSON response
    pub fn respond(self: &Arc<Self>, status: u16, body: Value) -> Arc<Self> {
        self.respond_raw(status, body.to_string())
    }

    pub fn respond_raw(self: &Arc<Self>, status: u16, body: impl Into<String>) -> Arc<Self> {
        self.push(Ok(RawResponse::new(status, body)))
    }

    pub fn fail(self: &Arc<Self>, failure: TransportFailure) -> Arc<Self> {
        self.push(Err(failure))
    }

    fn push(self: &Arc<Self>, entry: Result<RawResponse, TransportFailure>) -> Arc<Self> {
        self.script.lock().unwrap().push_back(entry);
        Arc::clone(self)
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportFailure> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportFailure::other("script exhausted")))
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig::new(NodePool::single(NODE).unwrap())
}

/// Client authenticating with [`TOKEN`] and sending through `transport`
pub fn scripted_client(transport: &Arc<ScriptedTransport>) -> CdmClient {
    client_with_auth(transport, Arc::new(TokenAuth::new(TOKEN)))
}

pub fn client_with_auth(
    transport: &Arc<ScriptedTransport>,
    auth: Arc<dyn AuthResolver>,
) -> CdmClient {
    CdmClient::new(test_config(), auth)
        .unwrap()
        .with_transport(transport.clone())
}
