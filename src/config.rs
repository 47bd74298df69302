use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for the cluster being managed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Bootstrap broker endpoints (host:port)
    pub bootstrap_servers: Vec<String>,

    /// Client id sent in every request header
    pub client_id: String,

    /// TCP connect timeout in milliseconds
    pub connect_timeout_ms: u64,

    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Protocol versions used for admin requests
    pub api_versions: ApiVersions,
}

/// Request versions for the admin APIs this client speaks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiVersions {
    /// CreateAcls / DeleteAcls / DescribeAcls
    pub acls: i16,
    pub metadata: i16,
}

impl Default for ApiVersions {
    fn default() -> Self {
        Self {
            acls: 1,
            metadata: 1,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: vec!["localhost:9092".to_string()],
            client_id: "kafka-acl".to_string(),
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            api_versions: ApiVersions::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)
            .map_err(|e| crate::error::AclError::Config(e.to_string()))?;
        Ok(config)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.bootstrap_servers.is_empty() {
            return Err(crate::error::AclError::InvalidConfig(
                "bootstrap_servers cannot be empty".to_string(),
            ));
        }

        if self.bootstrap_servers.iter().any(|s| s.trim().is_empty()) {
            return Err(crate::error::AclError::InvalidConfig(
                "bootstrap_servers cannot contain empty entries".to_string(),
            ));
        }

        if self.client_id.is_empty() {
            return Err(crate::error::AclError::InvalidConfig(
                "client_id cannot be empty".to_string(),
            ));
        }

        if self.connect_timeout_ms == 0 {
            return Err(crate::error::AclError::InvalidConfig(
                "connect_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout_ms == 0 {
            return Err(crate::error::AclError::InvalidConfig(
                "request_timeout_ms must be greater than 0".to_string(),
            ));
        }

        // pattern types arrived in v1 of the ACL APIs
        if !(1..=3).contains(&self.api_versions.acls) {
            return Err(crate::error::AclError::InvalidConfig(format!(
                "api_versions.acls must be between 1 and 3, got {}",
                self.api_versions.acls
            )));
        }

        // controller id arrived in metadata v1
        if !(1..=12).contains(&self.api_versions.metadata) {
            return Err(crate::error::AclError::InvalidConfig(format!(
                "api_versions.metadata must be between 1 and 12, got {}",
                self.api_versions.metadata
            )));
        }

        Ok(())
    }
}
