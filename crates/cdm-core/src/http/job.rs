//! Job status polling
//!
//! Asynchronous CDM operations return a job-status URL. [`CdmClient::job_status`]
//! either reads that URL once or polls it until the job reaches a terminal state.
//! A poll loop can be interrupted through a [`CancellationToken`] or bounded with a
//! maximum duration, and it can publish every observation on a progress channel.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::http::call::ApiCall;
use crate::http::client::{CdmClient, RequestOptions};
use crate::{Error, Result};

/// Field of a job-status body holding the job state
pub const STATUS_FIELD: &str = "status";
/// Field of a job-status body holding the completion percentage
pub const PROGRESS_FIELD: &str = "progress";

/// State reported by a job-status endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Running,
    Succeeded,
    /// Any other reported value; terminal failure
    Other(String),
}

impl JobState {
    pub fn parse(status: &str) -> Self {
        match status {
            "QUEUED" => Self::Queued,
            "RUNNING" => Self::Running,
            "SUCCEEDED" => Self::Succeeded,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether polling should continue
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "QUEUED"),
            Self::Running => write!(f, "RUNNING"),
            Self::Succeeded => write!(f, "SUCCEEDED"),
            Self::Other(status) => write!(f, "{}", status),
        }
    }
}

/// One observation of a polled job
#[derive(Debug, Clone, PartialEq)]
pub struct JobProgress {
    pub url: String,
    pub state: JobState,
    /// Completion percentage, when the node reported one
    pub progress: Option<f64>,
    /// 1-based number of the status call that produced this observation
    pub attempt: u32,
    pub observed_at: DateTime<Utc>,
}

/// Options for [`CdmClient::job_status`]
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Poll until a terminal state instead of reading the status once
    pub wait_for_completion: bool,
    /// Per-request timeout; `None` uses the client's configured timeout
    pub timeout: Option<Duration>,
    /// Sleep between two status calls; `None` uses the client's poll interval
    pub interval: Option<Duration>,
    /// Upper bound on the whole poll loop
    pub max_duration: Option<Duration>,
    pub cancel: Option<CancellationToken>,
    pub progress: Option<UnboundedSender<JobProgress>>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            wait_for_completion: true,
            timeout: None,
            interval: None,
            max_duration: None,
            cancel: None,
            progress: None,
        }
    }
}

impl PollOptions {
    /// Read the job status once
    pub fn no_wait(mut self) -> Self {
        self.wait_for_completion = false;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = Some(max_duration);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_progress(mut self, sender: UnboundedSender<JobProgress>) -> Self {
        self.progress = Some(sender);
        self
    }
}

/// Cancellation and deadline shared by every await point of one poll loop
struct Interrupts<'a> {
    url: &'a str,
    cancel: Option<&'a CancellationToken>,
    deadline: Option<(Instant, Duration)>,
}

impl Interrupts<'_> {
    async fn run<T>(&self, work: impl Future<Output = Result<T>>) -> Result<T> {
        let cancelled = async {
            match self.cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some((deadline, _)) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Err(Error::Cancelled {
                url: self.url.to_string(),
            }),
            _ = expired => Err(Error::PollDeadline {
                url: self.url.to_string(),
                max_duration: self.deadline.map(|(_, d)| d).unwrap_or_default(),
            }),
            result = work => result,
        }
    }
}

impl CdmClient {
    /// Read a job-status URL, optionally polling until the job is done
    ///
    /// Without `wait_for_completion` exactly one status call is made and its body is
    /// returned whatever the state. Otherwise the URL is polled once per interval:
    /// `SUCCEEDED` returns the final body, `QUEUED`/`RUNNING` keep polling and any
    /// other state (or a body without `status`) fails with [`Error::JobFailed`].
    #[instrument(level = "debug", skip(self, options), fields(wait = options.wait_for_completion))]
    pub async fn job_status(&self, url: &str, options: PollOptions) -> Result<Value> {
        let request = RequestOptions {
            timeout: options.timeout,
            authenticate: true,
        };
        let interrupts = Interrupts {
            url,
            cancel: options.cancel.as_ref(),
            deadline: options
                .max_duration
                .map(|limit| (Instant::now() + limit, limit)),
        };

        if !options.wait_for_completion {
            return interrupts
                .run(self.dispatch(ApiCall::job_status(url), request))
                .await;
        }

        let interval = options
            .interval
            .unwrap_or_else(|| self.config().poll_interval());
        if interval.is_zero() {
            return Err(Error::invalid_argument("job poll interval cannot be zero"));
        }

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let body = interrupts
                .run(self.dispatch(ApiCall::job_status(url), request))
                .await?;

            let state = match body.get(STATUS_FIELD).and_then(Value::as_str) {
                Some(status) => JobState::parse(status),
                None => {
                    return Err(Error::JobFailed {
                        status: "<missing>".to_string(),
                        details: body,
                    })
                }
            };
            let progress = body.get(PROGRESS_FIELD).and_then(Value::as_f64);

            if let Some(sender) = &options.progress {
                // A dropped receiver only means nobody is watching
                let _ = sender.send(JobProgress {
                    url: url.to_string(),
                    state: state.clone(),
                    progress,
                    attempt,
                    observed_at: Utc::now(),
                });
            }

            match state {
                JobState::Succeeded => {
                    info!("Job Progress 100%");
                    return Ok(body);
                }
                JobState::Queued | JobState::Running => {
                    info!(
                        attempt,
                        "Job {}: Progress {}%",
                        state,
                        progress.map(|p| p.to_string()).unwrap_or_else(|| "?".to_string())
                    );
                    debug!("Sleeping {:?} before the next status call", interval);
                    interrupts
                        .run(async {
                            tokio::time::sleep(interval).await;
                            Ok(())
                        })
                        .await?;
                }
                JobState::Other(status) => {
                    return Err(Error::JobFailed {
                        status,
                        details: body,
                    });
                }
            }
        }
    }
}
