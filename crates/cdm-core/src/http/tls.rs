//! TLS configuration for connections to CDM nodes
//!
//! Certificate verification is on by default. Appliances commonly ship with
//! self-signed certificates; callers either add the appliance CA or opt in to
//! [`TlsConfig::insecure`] explicitly.

use std::path::PathBuf;

use reqwest::ClientBuilder;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// TLS/HTTPS configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Whether to validate TLS certificates
    pub validate_certificates: bool,
    /// Custom CA certificate paths
    pub custom_ca_certs: Vec<PathBuf>,
    /// Custom CA certificate content (PEM format)
    pub custom_ca_cert_pem: Vec<String>,
    /// Minimum TLS version to accept
    pub min_tls_version: TlsVersion,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            validate_certificates: true,
            custom_ca_certs: Vec::new(),
            custom_ca_cert_pem: Vec::new(),
            min_tls_version: TlsVersion::TLS1_2,
        }
    }
}

/// TLS protocol versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TlsVersion {
    TLS1_2,
    TLS1_3,
}

impl TlsVersion {
    fn to_reqwest_version(self) -> reqwest::tls::Version {
        match self {
            TlsVersion::TLS1_2 => reqwest::tls::Version::TLS_1_2,
            TlsVersion::TLS1_3 => reqwest::tls::Version::TLS_1_3,
        }
    }
}

impl TlsConfig {
    /// Verify certificates against the system roots
    pub fn secure() -> Self {
        Self::default()
    }

    /// Accept any certificate the node presents (dangerous!)
    pub fn insecure() -> Self {
        Self {
            validate_certificates: false,
            ..Self::default()
        }
    }

    /// Add a custom CA certificate from file path
    pub fn with_ca_cert_file(mut self, path: PathBuf) -> Self {
        self.custom_ca_certs.push(path);
        self
    }

    /// Add a custom CA certificate from PEM content
    pub fn with_ca_cert_pem(mut self, pem_content: String) -> Self {
        self.custom_ca_cert_pem.push(pem_content);
        self
    }

    /// Set minimum TLS version
    pub fn with_min_tls_version(mut self, version: TlsVersion) -> Self {
        self.min_tls_version = version;
        self
    }

    /// Check if this configuration has custom CA certificates
    pub fn has_custom_ca_certs(&self) -> bool {
        !self.custom_ca_certs.is_empty() || !self.custom_ca_cert_pem.is_empty()
    }

    /// Validate the TLS configuration
    pub fn validate(&self) -> Result<()> {
        for ca_path in &self.custom_ca_certs {
            if !ca_path.exists() {
                return Err(Error::configuration(format!(
                    "CA certificate file not found: {}",
                    ca_path.display()
                )));
            }
        }

        for pem in &self.custom_ca_cert_pem {
            if !validate_pem_format(pem) {
                return Err(Error::configuration("CA certificate content is not PEM encoded"));
            }
        }

        Ok(())
    }

    /// Apply this configuration to a reqwest client builder
    pub fn apply(&self, mut builder: ClientBuilder) -> Result<ClientBuilder> {
        self.validate()?;

        builder = builder.min_tls_version(self.min_tls_version.to_reqwest_version());

        if !self.validate_certificates {
            tracing::warn!(
                "TLS certificate verification is disabled; connections to CDM nodes are not authenticated"
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        let mut pems = Vec::with_capacity(self.custom_ca_cert_pem.len() + self.custom_ca_certs.len());
        for path in &self.custom_ca_certs {
            pems.push(std::fs::read_to_string(path)?);
        }
        pems.extend(self.custom_ca_cert_pem.iter().cloned());

        for pem in pems {
            let certificate = reqwest::Certificate::from_pem(pem.as_bytes()).map_err(|e| {
                Error::Configuration {
                    message: format!("Invalid CA certificate: {}", e),
                    source: Some(e.into()),
                }
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        Ok(builder)
    }
}

/// Helper function to validate PEM format
pub fn validate_pem_format(pem_content: &str) -> bool {
    pem_content.contains("-----BEGIN") && pem_content.contains("-----END")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_tls_config_default_verifies() {
        let config = TlsConfig::default();
        assert!(config.validate_certificates);
        assert_eq!(config.min_tls_version, TlsVersion::TLS1_2);
        assert!(!config.has_custom_ca_certs());
    }

    #[test]
    fn test_insecure_is_explicit() {
        assert!(TlsConfig::secure().validate_certificates);
        assert!(!TlsConfig::insecure().validate_certificates);
    }

    #[test]
    fn test_missing_ca_file() {
        let config = TlsConfig::secure().with_ca_cert_file(PathBuf::from("/nonexistent/ca.pem"));
        assert!(matches!(config.validate(), Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_ca_file_present() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"-----BEGIN CERTIFICATE-----\nabc\n-----END CERTIFICATE-----\n")
            .unwrap();
        let config = TlsConfig::secure().with_ca_cert_file(file.path().to_path_buf());
        assert!(config.validate().is_ok());
        assert!(config.has_custom_ca_certs());
    }

    #[test]
    fn test_non_pem_content_rejected() {
        let config = TlsConfig::secure().with_ca_cert_pem("not a certificate".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_without_custom_roots() {
        let builder = TlsConfig::insecure().apply(reqwest::Client::builder()).unwrap();
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: TlsConfig =
            serde_json::from_str(r#"{"validate_certificates": false}"#).unwrap();
        assert!(!config.validate_certificates);
        assert_eq!(config.min_tls_version, TlsVersion::TLS1_2);
    }
}
