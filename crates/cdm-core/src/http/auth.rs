//! Authentication header resolution for CDM API calls
//!
//! Supports two credential schemes:
//! - API tokens, sent as `Authorization: Bearer <token>`
//! - Username and password, sent as HTTP Basic authentication
//!
//! Every call also carries the basic JSON headers; unauthenticated calls carry only
//! those.

use std::collections::HashMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::{Error, Result};

/// Environment variable holding an API token
pub const TOKEN_ENV: &str = "CDM_TOKEN";
/// Environment variable holding the username for basic authentication
pub const USERNAME_ENV: &str = "CDM_USERNAME";
/// Environment variable holding the password for basic authentication
pub const PASSWORD_ENV: &str = "CDM_PASSWORD";

/// Value sent in the `User-Agent` header
pub const USER_AGENT: &str = concat!("cdm-client/", env!("CARGO_PKG_VERSION"));

/// Trait for producing the headers of a call
pub trait AuthResolver: Send + Sync {
    /// Headers for an authenticated call, including `Authorization`
    fn authenticated_headers(&self) -> Result<HashMap<String, String>>;

    /// Headers for an unauthenticated call
    fn basic_headers(&self) -> HashMap<String, String> {
        basic_headers()
    }
}

/// Content negotiation headers shared by every call
pub fn basic_headers() -> HashMap<String, String> {
    HashMap::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Accept".to_string(), "application/json".to_string()),
        ("User-Agent".to_string(), USER_AGENT.to_string()),
    ])
}

/// API token authentication (Bearer)
#[derive(Clone)]
pub struct TokenAuth {
    token: Option<String>,
}

impl TokenAuth {
    /// Create from environment variable
    pub fn from_env() -> Self {
        Self {
            token: std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()),
        }
    }

    /// Create with an explicit token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }
}

impl fmt::Debug for TokenAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuth")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl AuthResolver for TokenAuth {
    fn authenticated_headers(&self) -> Result<HashMap<String, String>> {
        match &self.token {
            Some(token) => {
                let mut headers = basic_headers();
                headers.insert("Authorization".to_string(), format!("Bearer {}", token));
                Ok(headers)
            }
            None => Err(Error::configuration(format!(
                "API token not found. Set the {} environment variable",
                TOKEN_ENV
            ))),
        }
    }
}

/// Username and password authentication (HTTP Basic)
#[derive(Clone)]
pub struct CredentialAuth {
    username: Option<String>,
    password: Option<String>,
}

impl CredentialAuth {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            username: std::env::var(USERNAME_ENV).ok().filter(|u| !u.is_empty()),
            password: std::env::var(PASSWORD_ENV).ok(),
        }
    }

    /// Create with explicit credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

impl fmt::Debug for CredentialAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialAuth")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl AuthResolver for CredentialAuth {
    fn authenticated_headers(&self) -> Result<HashMap<String, String>> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => {
                let encoded = STANDARD.encode(format!("{}:{}", username, password));
                let mut headers = basic_headers();
                headers.insert("Authorization".to_string(), format!("Basic {}", encoded));
                Ok(headers)
            }
            _ => Err(Error::configuration(format!(
                "Username and password not found. Set the {} and {} environment variables",
                USERNAME_ENV, PASSWORD_ENV
            ))),
        }
    }
}

/// Resolver used when no credentials are configured at all
///
/// Unauthenticated calls still work; authenticated calls fail before dispatch.
#[derive(Debug, Clone, Default)]
pub struct Anonymous;

impl AuthResolver for Anonymous {
    fn authenticated_headers(&self) -> Result<HashMap<String, String>> {
        Err(Error::configuration(format!(
            "No credentials configured. Set {} or {} and {}",
            TOKEN_ENV, USERNAME_ENV, PASSWORD_ENV
        )))
    }
}

/// Pick a resolver from the environment, preferring an API token
pub fn create_auth_resolver_from_env() -> Box<dyn AuthResolver> {
    let token = TokenAuth::from_env();
    if token.is_configured() {
        return Box::new(token);
    }

    let credentials = CredentialAuth::from_env();
    if credentials.is_configured() {
        return Box::new(credentials);
    }

    Box::new(Anonymous)
}
