//! End to end tests against a mock HTTP server
//!
//! Node-relative calls always use https, so the mock server is reached through
//! job-status URLs, which are absolute, and through the transport directly.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use cdm_core::http::{
    Method, PreparedRequest, ReqwestTransport, Transport, TransportFailure,
};
use cdm_core::{CdmClient, ClientConfig, Error, NodePool, PollOptions, TlsConfig, TokenAuth};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JOB_PATH: &str = "/api/v1/vmware/vm/request/INSTANT_RECOVER_7";

fn client() -> CdmClient {
    let config = ClientConfig::new(NodePool::single("10.0.0.1").unwrap());
    CdmClient::new(config, Arc::new(TokenAuth::new("tok-wire"))).unwrap()
}

fn fast_poll() -> PollOptions {
    PollOptions::default().with_interval(Duration::from_millis(10))
}

#[tokio::test]
async fn test_job_status_polls_real_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(JOB_PATH))
        .and(header("Authorization", "Bearer tok-wire"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "QUEUED", "progress": 0})))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(JOB_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "RUNNING", "progress": 50})))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(JOB_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "SUCCEEDED", "progress": 100})))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), JOB_PATH);
    let body = client().job_status(&url, fast_poll()).await.unwrap();

    assert_eq!(body["status"], "SUCCEEDED");
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_job_failure_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(JOB_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "FAILED", "progress": 10})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), JOB_PATH);
    let err = client().job_status(&url, fast_poll()).await.unwrap_err();

    assert!(matches!(err, Error::JobFailed { ref status, .. } if status == "FAILED"));
}

#[tokio::test]
async fn test_embedded_error_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(JOB_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"errorType": "user_error", "message": "Request not found"}),
        ))
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), JOB_PATH);
    let err = client()
        .job_status(&url, PollOptions::default().no_wait())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Server { status_code: 200, .. }));
    assert_eq!(err.to_string(), "Request not found");
}

#[tokio::test]
async fn test_server_error_status_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(JOB_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), JOB_PATH);
    let err = client()
        .job_status(&url, PollOptions::default().no_wait())
        .await
        .unwrap_err();

    match err {
        Error::Http {
            status_code, body, ..
        } => {
            assert_eq!(status_code, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected HTTP error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_reply_maps_to_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(JOB_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "SUCCEEDED"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), JOB_PATH);
    let err = client()
        .job_status(
            &url,
            PollOptions::default()
                .no_wait()
                .with_timeout(Duration::from_millis(200)),
        )
        .await
        .unwrap_err();

    // The node accepted the connection, so this is not a connection error
    assert!(matches!(err, Error::Transport { ref method, .. } if method == "GET"));
    assert!(err.to_string().contains(&url));
}

#[tokio::test]
async fn test_unreachable_node_is_a_connect_timeout() {
    // Non-routable address: the SYN is never answered. The per-call timeout is
    // shorter than the transport default and still bounds the connect phase.
    let transport = ReqwestTransport::new(&TlsConfig::default(), Duration::from_secs(30)).unwrap();
    let request = PreparedRequest {
        method: Method::GET,
        url: "http://10.255.255.1/api/v1/cluster/me".to_string(),
        headers: HashMap::new(),
        body: None,
        timeout: Duration::from_millis(200),
    };

    match transport.send(request).await {
        Err(TransportFailure::ConnectTimeout { .. }) => {}
        // Hosts without any route reject the address immediately
        Err(TransportFailure::Other {
            source: Some(ref source),
            ..
        }) if format!("{:#}", source).to_lowercase().contains("unreachable") => {}
        other => panic!("expected a connect timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_transport_sends_headers_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/sla_domain"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "sla-9"})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(&TlsConfig::default(), Duration::from_secs(5)).unwrap();
    let request = PreparedRequest {
        method: Method::POST,
        url: format!("{}/api/v1/sla_domain", server.uri()),
        headers: HashMap::from([("Content-Type".to_string(), "application/json".to_string())]),
        body: Some(json!({"name": "Gold"}).to_string()),
        timeout: Duration::from_secs(5),
    };

    let response = transport.send(request).await.unwrap();
    assert_eq!(response.status, 201);
    assert!(response.body.contains("sla-9"));

    let received = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(sent, json!({"name": "Gold"}));
}

#[tokio::test]
async fn test_refused_connection_is_not_a_timeout() {
    // Bind then release a port so nothing is listening on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let transport = ReqwestTransport::new(&TlsConfig::default(), Duration::from_secs(5)).unwrap();
    let request = PreparedRequest {
        method: Method::GET,
        url: format!("http://127.0.0.1:{}/api/v1/cluster/me", port),
        headers: HashMap::new(),
        body: None,
        timeout: Duration::from_secs(5),
    };

    match transport.send(request).await {
        Err(TransportFailure::Other { .. }) => {}
        other => panic!("expected a non-timeout failure, got {:?}", other),
    }
}
