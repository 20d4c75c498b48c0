//! Job status command handler

use crate::cli::JobStatusArgs;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::{describe_job_progress, update_job_progress, OutputWriter};
use cdm_core::{CdmClient, JobProgress, PollOptions};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Handle the job-status command
#[instrument(skip(client, output), fields(url = %args.url, wait = args.wait))]
pub async fn handle_job_status(
    args: JobStatusArgs,
    client: &CdmClient,
    output: &mut OutputWriter,
) -> Result<()> {
    let timer = Timer::with_details("job-status", &args.url);
    let options = poll_options(&args);

    if !args.wait {
        let body = client.job_status(&args.url, options).await?;
        return output.data(&body);
    }

    // Ctrl-C aborts the poll loop, whether it is sleeping or waiting on a status call
    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted; stopping the job poll");
                cancel.cancel();
            }
        }
    });

    let (tx, mut rx) = mpsc::unbounded_channel::<JobProgress>();
    let progress_bar = output.job_progress_bar(&args.url);
    let watcher = tokio::spawn({
        let progress_bar = progress_bar.clone();
        async move {
            while let Some(progress) = rx.recv().await {
                debug!("{}", describe_job_progress(&progress));
                if let Some(pb) = &progress_bar {
                    update_job_progress(pb, &progress);
                }
            }
        }
    });

    let result = client
        .job_status(
            &args.url,
            options.with_cancellation(cancel).with_progress(tx),
        )
        .await;

    interrupt.abort();
    // The sender went away with the options, so the watcher drains and stops
    if let Err(e) = watcher.await {
        debug!("Progress watcher ended abnormally: {}", e);
    }
    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    let body = result?;
    info!(elapsed_ms = timer.elapsed().as_millis() as u64, "Job completed");
    output.success(&format!(
        "Job completed in {:.1}s",
        timer.elapsed().as_secs_f64()
    ))?;
    output.data(&body)
}

fn poll_options(args: &JobStatusArgs) -> PollOptions {
    let mut options = PollOptions::default();
    if !args.wait {
        options = options.no_wait();
    }
    if let Some(seconds) = args.interval {
        options = options.with_interval(Duration::from_secs(seconds));
    }
    if let Some(seconds) = args.max_wait {
        options = options.with_max_duration(Duration::from_secs(seconds));
    }
    options
}
