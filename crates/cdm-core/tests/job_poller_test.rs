//! Integration tests for job status polling
//!
//! Tokio time is paused, so the ten second poll interval elapses instantly while
//! `Instant` still observes it.

mod test_support;

use std::time::Duration;

use cdm_core::{Error, JobState, PollOptions};
use serde_json::json;
use test_support::{scripted_client, ScriptedTransport};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const JOB_URL: &str = "https://10.0.0.1/api/v1/vmware/vm/request/INSTANT_RECOVER_42";

fn running_forever(calls: usize) -> std::sync::Arc<ScriptedTransport> {
    let transport = ScriptedTransport::new();
    for _ in 0..calls {
        transport.respond(200, json!({"status": "RUNNING", "progress": 10}));
    }
    transport
}

#[tokio::test(start_paused = true)]
async fn test_polls_until_succeeded() {
    let transport = ScriptedTransport::new()
        .respond(200, json!({"status": "QUEUED", "progress": 0}))
        .respond(200, json!({"status": "RUNNING", "progress": 50}))
        .respond(200, json!({"status": "SUCCEEDED", "progress": 100}));
    let client = scripted_client(&transport);

    let started = Instant::now();
    let body = client
        .job_status(JOB_URL, PollOptions::default())
        .await
        .unwrap();

    assert_eq!(body, json!({"status": "SUCCEEDED", "progress": 100}));
    assert_eq!(transport.call_count(), 3);
    // Two sleeps of the default interval between the three calls
    assert_eq!(started.elapsed().as_secs(), 20);

    for request in transport.requests() {
        assert_eq!(request.url, JOB_URL);
        assert!(request.headers.contains_key("Authorization"));
    }
}

#[tokio::test(start_paused = true)]
async fn test_no_wait_issues_one_call() {
    let transport = running_forever(5);
    let client = scripted_client(&transport);

    let body = client
        .job_status(JOB_URL, PollOptions::default().no_wait())
        .await
        .unwrap();

    assert_eq!(body["status"], "RUNNING");
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_status_stops_polling() {
    let failed = json!({"status": "FAILED", "progress": 40, "error": {"message": "disk full"}});
    let transport = ScriptedTransport::new()
        .respond(200, json!({"status": "RUNNING", "progress": 20}))
        .respond(200, failed.clone())
        .respond(200, json!({"status": "SUCCEEDED"}));
    let client = scripted_client(&transport);

    let err = client
        .job_status(JOB_URL, PollOptions::default())
        .await
        .unwrap_err();

    match err {
        Error::JobFailed { status, details } => {
            assert_eq!(status, "FAILED");
            assert_eq!(details, failed);
        }
        other => panic!("expected job failure, got {:?}", other),
    }
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_missing_status_is_a_failure() {
    let transport = ScriptedTransport::new().respond(200, json!({"progress": 10}));
    let client = scripted_client(&transport);

    let err = client
        .job_status(JOB_URL, PollOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::JobFailed { .. }));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_errors_propagate() {
    let transport = ScriptedTransport::new()
        .respond(200, json!({"status": "QUEUED"}))
        .respond(200, json!({"errorType": "NotFound", "message": "no such request"}));
    let client = scripted_client(&transport);

    let err = client
        .job_status(JOB_URL, PollOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "no such request");
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_relative_url_rejected_before_any_call() {
    let transport = running_forever(1);
    let client = scripted_client(&transport);

    let err = client
        .job_status("/api/v1/job/1", PollOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidArgument { .. }));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_rejected() {
    let transport = running_forever(1);
    let client = scripted_client(&transport);

    let err = client
        .job_status(JOB_URL, PollOptions::default().with_interval(Duration::ZERO))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidArgument { .. }));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_single_read_ignores_interval() {
    let transport = running_forever(1);
    let client = scripted_client(&transport);

    let body = client
        .job_status(
            JOB_URL,
            PollOptions::default().no_wait().with_interval(Duration::ZERO),
        )
        .await
        .unwrap();

    assert_eq!(body["status"], "RUNNING");
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_interrupts_sleep() {
    let transport = running_forever(20);
    let client = scripted_client(&transport);
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(25)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let err = client
        .job_status(JOB_URL, PollOptions::default().with_cancellation(token))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled { .. }));
    // Calls at 0s, 10s and 20s; cancelled during the third sleep
    assert_eq!(transport.call_count(), 3);
    assert_eq!(started.elapsed().as_secs(), 25);
}

#[tokio::test(start_paused = true)]
async fn test_already_cancelled_makes_no_call() {
    let transport = running_forever(1);
    let client = scripted_client(&transport);
    let token = CancellationToken::new();
    token.cancel();

    let err = client
        .job_status(JOB_URL, PollOptions::default().with_cancellation(token))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled { .. }));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_max_duration_bounds_the_loop() {
    let transport = running_forever(20);
    let client = scripted_client(&transport);

    let err = client
        .job_status(
            JOB_URL,
            PollOptions::default().with_max_duration(Duration::from_secs(35)),
        )
        .await
        .unwrap_err();

    match err {
        Error::PollDeadline { url, max_duration } => {
            assert_eq!(url, JOB_URL);
            assert_eq!(max_duration, Duration::from_secs(35));
        }
        other => panic!("expected deadline, got {:?}", other),
    }
    assert_eq!(transport.call_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_custom_interval() {
    let transport = ScriptedTransport::new()
        .respond(200, json!({"status": "RUNNING"}))
        .respond(200, json!({"status": "SUCCEEDED"}));
    let client = scripted_client(&transport);

    let started = Instant::now();
    client
        .job_status(
            JOB_URL,
            PollOptions::default().with_interval(Duration::from_secs(2)),
        )
        .await
        .unwrap();

    assert_eq!(started.elapsed().as_secs(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_progress_is_published() {
    let transport = ScriptedTransport::new()
        .respond(200, json!({"status": "QUEUED", "progress": 0}))
        .respond(200, json!({"status": "RUNNING", "progress": 50}))
        .respond(200, json!({"status": "SUCCEEDED", "progress": 100}));
    let client = scripted_client(&transport);
    let (tx, mut rx) = mpsc::unbounded_channel();

    client
        .job_status(JOB_URL, PollOptions::default().with_progress(tx))
        .await
        .unwrap();

    let mut observed = Vec::new();
    while let Some(progress) = rx.recv().await {
        observed.push(progress);
    }

    let states: Vec<JobState> = observed.iter().map(|p| p.state.clone()).collect();
    assert_eq!(
        states,
        vec![JobState::Queued, JobState::Running, JobState::Succeeded]
    );
    assert_eq!(observed[1].progress, Some(50.0));
    assert_eq!(
        observed.iter().map(|p| p.attempt).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(observed.iter().all(|p| p.url == JOB_URL));
}
