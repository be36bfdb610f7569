//! Configuration for pdfcombiner.
//!
//! This module holds the explicit configuration values that used to live as
//! process-wide globals in earlier incarnations of the service: the storage
//! region, the credential pair, and the server listen address. Everything is
//! a plain value passed into a constructor, so jobs and tests can carry
//! their own overrides.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::error::{CombinerError, Result};

/// Default AWS region when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Content type applied to the uploaded combined document.
pub const COMBINED_CONTENT_TYPE: &str = "application/pdf";

/// Default port for server mode.
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variable holding the storage access key identifier.
pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";

/// Environment variable holding the storage secret key.
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";

/// Object storage configuration.
///
/// Covers everything needed to build a storage handle except the bucket
/// name, which arrives with each job request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Storage region.
    pub region: String,
    /// Custom endpoint URL (for S3-compatible storage like MinIO).
    pub endpoint: Option<String>,
    /// Access key identifier.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
}

impl StorageConfig {
    /// Creates a configuration for the given region with no credentials.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }

    /// Builds a configuration from the process environment.
    ///
    /// Requires both [`ENV_ACCESS_KEY_ID`] and [`ENV_SECRET_ACCESS_KEY`] to
    /// be set. A missing or empty variable is a fatal startup condition and
    /// surfaces as a [`CombinerError::Connection`], never as a per-job
    /// error.
    pub fn from_env() -> Result<Self> {
        let access_key_id = non_empty_var(ENV_ACCESS_KEY_ID)?;
        let secret_access_key = non_empty_var(ENV_SECRET_ACCESS_KEY)?;

        Ok(Self {
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            access_key_id: Some(access_key_id),
            secret_access_key: Some(secret_access_key),
        })
    }

    /// Sets the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Sets a custom endpoint (for S3-compatible storage).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the access credentials.
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Check whether a full credential pair is present.
    pub fn has_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REGION)
    }
}

/// Server mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub addr: SocketAddr,
}

impl ServerConfig {
    /// Creates a configuration listening on all interfaces at `port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::with_port(DEFAULT_PORT)
    }
}

fn non_empty_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CombinerError::connection(format!(
            "required environment variable {name} is not set"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_builder_methods() {
        let config = StorageConfig::new("eu-west-1")
            .with_endpoint("http://localhost:9000")
            .with_credentials("AKID", "SECRET");

        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9000"));
        assert!(config.has_credentials());
    }

    #[test]
    fn test_default_region() {
        let config = StorageConfig::default();
        assert_eq!(config.region, DEFAULT_REGION);
        assert!(!config.has_credentials());
    }

    #[test]
    #[serial]
    fn test_from_env_missing_credentials() {
        unsafe {
            env::remove_var(ENV_ACCESS_KEY_ID);
            env::remove_var(ENV_SECRET_ACCESS_KEY);
        }

        let result = StorageConfig::from_env();
        assert!(matches!(result, Err(CombinerError::Connection { .. })));
    }

    #[test]
    #[serial]
    fn test_from_env_with_credentials() {
        unsafe {
            env::set_var(ENV_ACCESS_KEY_ID, "AKID");
            env::set_var(ENV_SECRET_ACCESS_KEY, "SECRET");
        }

        let config = StorageConfig::from_env().unwrap();
        assert!(config.has_credentials());
        assert_eq!(config.region, DEFAULT_REGION);

        unsafe {
            env::remove_var(ENV_ACCESS_KEY_ID);
            env::remove_var(ENV_SECRET_ACCESS_KEY);
        }
    }

    #[test]
    fn test_server_config_port() {
        let config = ServerConfig::with_port(9090);
        assert_eq!(config.addr.port(), 9090);

        assert_eq!(ServerConfig::default().addr.port(), DEFAULT_PORT);
    }
}
