//! Configuration management for the CLI
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//! - Environment variables and command-line arguments (highest precedence)

use crate::cli::ConnectionArgs;
use crate::error::{Error, Result};
use cdm_core::http::{Anonymous, TlsConfig};
use cdm_core::{AuthResolver, ClientConfig, CredentialAuth, NodePool, TokenAuth};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cluster connection settings
    pub cluster: ClusterConfig,

    /// Credentials
    pub auth: AuthConfig,

    /// Output settings
    pub output: OutputConfig,
}

/// Cluster connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Node address or list of node addresses
    pub nodes: Option<NodePool>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Seconds between job status polls
    pub poll_interval_secs: u64,

    /// TLS settings
    pub tls: TlsConfig,
}

/// Credentials; an API token wins over username and password
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Use colored output by default
    pub color: bool,

    /// Show progress indicators
    pub progress: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            nodes: None,
            timeout_secs: cdm_core::config::DEFAULT_TIMEOUT_SECS,
            poll_interval_secs: cdm_core::config::DEFAULT_POLL_INTERVAL_SECS,
            tls: TlsConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            progress: true,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;

        let config = if is_yaml(path) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in &Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        tracing::debug!("Loaded configuration from {}", path.display());
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        // Return default config if no config file found
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".cdm.yaml"),
            PathBuf::from(".cdm.json"),
            PathBuf::from("cdm.yaml"),
            PathBuf::from("cdm.json"),
        ];

        if let Some(path) = Self::user_config_path() {
            let json = path.with_extension("json");
            paths.push(path);
            paths.push(json);
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".cdm.yaml"));
            paths.push(home_dir.join(".cdm.json"));
        }

        paths
    }

    /// `~/.config/cdm/config.yaml` (platform equivalent)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cdm").join("config.yaml"))
    }

    /// Apply environment and command-line values on top of the file values
    pub fn apply_overrides(&mut self, args: &ConnectionArgs) -> Result<()> {
        if let Some(nodes) = &args.node {
            self.cluster.nodes = Some(NodePool::parse_list(nodes)?);
        }
        if let Some(timeout) = args.timeout {
            self.cluster.timeout_secs = timeout;
        }
        if args.insecure {
            self.cluster.tls.validate_certificates = false;
        }
        if let Some(ca_cert) = &args.ca_cert {
            self.cluster.tls.custom_ca_certs.push(ca_cert.clone());
        }

        // A token given here replaces all file credentials; a username or password drops the file token
        if args.token.is_some() {
            self.auth = AuthConfig {
                token: args.token.clone(),
                ..AuthConfig::default()
            };
        } else if args.username.is_some() || args.password.is_some() {
            self.auth.token = None;
            if let Some(username) = &args.username {
                self.auth.username = Some(username.clone());
            }
            if let Some(password) = &args.password {
                self.auth.password = Some(password.clone());
            }
        }

        Ok(())
    }

    /// Core client configuration
    pub fn client_config(&self) -> Result<ClientConfig> {
        let nodes = self.cluster.nodes.clone().ok_or_else(|| {
            Error::config("No CDM node configured. Use --node, CDM_NODE_IP or the config file")
        })?;

        let config = ClientConfig::new(nodes)
            .with_timeout_secs(self.cluster.timeout_secs)
            .with_poll_interval_secs(self.cluster.poll_interval_secs)
            .with_tls(self.cluster.tls.clone());
        config.validate()?;

        Ok(config)
    }

    /// Header resolver for the configured credentials
    pub fn auth_resolver(&self) -> Arc<dyn AuthResolver> {
        match &self.auth {
            AuthConfig {
                token: Some(token), ..
            } if !token.is_empty() => Arc::new(TokenAuth::new(token.clone())),
            AuthConfig {
                username: Some(username),
                password: Some(password),
                ..
            } => Arc::new(CredentialAuth::new(username.clone(), password.clone())),
            _ => Arc::new(Anonymous),
        }
    }

    /// Copy with secrets masked, for display
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        let mask = |value: &mut Option<String>| {
            if value.is_some() {
                *value = Some("***".to_string());
            }
        };
        mask(&mut copy.auth.token);
        mask(&mut copy.auth.password);
        copy
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_yaml(path) {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}
