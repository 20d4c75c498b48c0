//! Endpoint validation performed before a call is dispatched

use crate::{Error, Result};

/// API versions exposed by CDM clusters
pub const API_VERSIONS: &[&str] = &["v1", "v2", "internal"];

/// Checks that a `(version, path)` pair names a recognized API call
pub trait EndpointValidator: Send + Sync {
    fn validate(&self, version: &str, path: &str) -> Result<()>;
}

/// Default validation: known version, path starting with `/` and not ending with `/`
#[derive(Debug, Clone, Default)]
pub struct StandardEndpoints;

impl EndpointValidator for StandardEndpoints {
    fn validate(&self, version: &str, path: &str) -> Result<()> {
        if !API_VERSIONS.contains(&version) {
            return Err(Error::invalid_argument(format!(
                "Enter a valid API version {:?}",
                API_VERSIONS
            )));
        }

        if !path.starts_with('/') {
            return Err(Error::invalid_argument(
                "The API endpoint should begin with '/'. (ex: /cluster/me)",
            ));
        }

        if path.len() > 1 && path.ends_with('/') {
            return Err(Error::invalid_argument(
                "The API endpoint should not end with '/'. (ex: /cluster/me)",
            ));
        }

        Ok(())
    }
}

/// Skips validation entirely
#[derive(Debug, Clone, Default)]
pub struct AcceptAll;

impl EndpointValidator for AcceptAll {
    fn validate(&self, _version: &str, _path: &str) -> Result<()> {
        Ok(())
    }
}
