//! GET, POST, PATCH and DELETE command handlers

use super::utils::{load_body, request_options};
use crate::cli::{BodyArgs, EndpointArgs};
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use cdm_core::CdmClient;
use tracing::instrument;

/// Handle the get command
#[instrument(skip(client, output), fields(version = %args.version, path = %args.path))]
pub async fn handle_get(
    args: EndpointArgs,
    client: &CdmClient,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details("get", &args.path);

    let body = client
        .get(&args.version, &args.path, request_options(args.no_auth))
        .await?;
    output.data(&body)
}

/// Handle the post command
#[instrument(skip_all, fields(version = %args.endpoint.version, path = %args.endpoint.path))]
pub async fn handle_post(
    args: BodyArgs,
    client: &CdmClient,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details("post", &args.endpoint.path);
    let payload = load_body(&args)?;
    let EndpointArgs {
        version,
        path,
        no_auth,
    } = args.endpoint;

    let body = client
        .post(&version, &path, payload, request_options(no_auth))
        .await?;
    if let Some(href) = job_link(&body) {
        output.info(&format!(
            "Asynchronous request accepted; follow it with: cdm job-status {}",
            href
        ))?;
    }
    output.data(&body)
}

/// Handle the patch command
#[instrument(skip_all, fields(version = %args.endpoint.version, path = %args.endpoint.path))]
pub async fn handle_patch(
    args: BodyArgs,
    client: &CdmClient,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details("patch", &args.endpoint.path);
    let payload = load_body(&args)?;
    let EndpointArgs {
        version,
        path,
        no_auth,
    } = args.endpoint;

    let body = client
        .patch(&version, &path, payload, request_options(no_auth))
        .await?;
    output.data(&body)
}

/// Handle the delete command
#[instrument(skip(client, output), fields(version = %args.version, path = %args.path))]
pub async fn handle_delete(
    args: EndpointArgs,
    client: &CdmClient,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details("delete", &args.path);

    let body = client
        .delete(&args.version, &args.path, request_options(args.no_auth))
        .await?;
    output.data(&body)
}

/// Status link of an asynchronous operation's response
fn job_link(body: &serde_json::Value) -> Option<&str> {
    body.get("links")?
        .as_array()?
        .iter()
        .find(|link| link.get("rel").and_then(|r| r.as_str()) == Some("self"))?
        .get("href")?
        .as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_link() {
        let body = json!({
            "id": "INSTANT_RECOVER_123",
            "status": "QUEUED",
            "links": [{"rel": "self", "href": "https://10.0.0.1/api/v1/vmware/vm/request/INSTANT_RECOVER_123"}]
        });
        assert_eq!(
            job_link(&body),
            Some("https://10.0.0.1/api/v1/vmware/vm/request/INSTANT_RECOVER_123")
        );
        assert_eq!(job_link(&json!({"id": "x"})), None);
    }
}
