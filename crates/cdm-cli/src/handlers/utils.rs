//! Shared utilities for command handlers

use crate::cli::BodyArgs;
use crate::config::Config;
use crate::error::{Error, ErrorContext, Result};
use crate::output::OutputWriter;
use cdm_core::{CdmClient, RequestOptions};
use serde_json::Value;
use std::fs;
use tracing::{debug, warn};

/// Create a client from the merged configuration
pub fn build_client(config: &Config, output: &mut OutputWriter) -> Result<CdmClient> {
    let client_config = config.client_config()?;
    if !client_config.tls.validate_certificates {
        warn!("TLS certificate validation is disabled");
        output.warning("TLS certificates presented by the cluster are not verified")?;
    }
    debug!(nodes = ?client_config.nodes.addresses(), "Creating CDM client");

    Ok(CdmClient::new(client_config, config.auth_resolver())?)
}

/// Request options for a node-relative call
pub fn request_options(no_auth: bool) -> RequestOptions {
    if no_auth {
        RequestOptions::default().unauthenticated()
    } else {
        RequestOptions::default()
    }
}

/// Read the JSON body of a POST or PATCH call
pub fn load_body(args: &BodyArgs) -> Result<Value> {
    if let Some(data) = &args.data {
        return serde_json::from_str(data)
            .map_err(|e| Error::invalid_args(format!("--data is not valid JSON: {}", e)));
    }

    let Some(path) = &args.data_file else {
        return Err(Error::invalid_args(
            "a request body is required; pass --data or --data-file",
        ));
    };

    if !path.exists() {
        return Err(Error::FileNotFound { path: path.clone() });
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;

    let is_yaml = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s == "yaml" || s == "yml")
        .unwrap_or(false);

    if is_yaml {
        serde_yaml::from_str(&content).map_err(|_| Error::InvalidFormat {
            path: path.clone(),
            expected: "YAML".to_string(),
        })
    } else {
        serde_json::from_str(&content).map_err(|_| Error::InvalidFormat {
            path: path.clone(),
            expected: "JSON".to_string(),
        })
    }
}
