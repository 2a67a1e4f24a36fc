/// Stack configuration for Stratus - GKE cluster bring-up
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading the stack configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration key '{0}'")]
    MissingKey(String),

    #[error("configuration key '{key}' is not a number: '{value}'")]
    InvalidNumber { key: String, value: String },

    #[error("failed to read stack file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse stack file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// A configuration value that must never appear in logs or rendered output.
///
/// `Debug` and `Display` both redact; the inner string is only reachable
/// through `expose()`.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Access the underlying value. Callers are responsible for keeping it
    /// out of logs and rendered documents.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([redacted])")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

/// Flat key/value store backing the typed configuration, loaded from a YAML
/// stack file. Any key may also be supplied through the environment as
/// `STRATUS_<KEY>` (e.g. `STRATUS_CLUSTERPASSWORD`), which is the usual way
/// to pass the two secrets.
pub struct ConfigStore {
    values: BTreeMap<String, String>,
}

impl ConfigStore {
    /// Load the store from a YAML stack file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse the store from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, serde_yaml::Value> = serde_yaml::from_str(content)?;
        let values = raw
            .into_iter()
            .map(|(k, v)| {
                let s = match v {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    _ => String::new(),
                };
                (k, s)
            })
            .collect();
        Ok(Self { values })
    }

    // Absent, unset and empty all count as "not provided".
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(format!("STRATUS_{}", key.to_uppercase()))
            .ok()
            .or_else(|| self.values.get(key).cloned())
            .filter(|v| !v.is_empty())
    }

    /// Optional plain string value
    pub fn get(&self, key: &str) -> Option<String> {
        self.lookup(key)
    }

    /// Required plain string value
    pub fn require(&self, key: &str) -> Result<String, ConfigError> {
        self.lookup(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    /// Optional numeric value
    pub fn get_number(&self, key: &str) -> Result<Option<u32>, ConfigError> {
        match self.lookup(key) {
            None => Ok(None),
            Some(v) => v
                .parse::<u32>()
                .map(Some)
                .map_err(|_| ConfigError::InvalidNumber {
                    key: key.to_string(),
                    value: v,
                }),
        }
    }

    /// Optional secret value
    pub fn get_secret(&self, key: &str) -> Option<Secret> {
        self.lookup(key).map(Secret)
    }

    /// Required secret value
    pub fn require_secret(&self, key: &str) -> Result<Secret, ConfigError> {
        self.get_secret(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }
}

/// Typed view over the configuration store, resolved once at startup
#[derive(Debug)]
pub struct StackConfig {
    /// Cluster name (used for resource naming)
    pub cluster_name: String,

    /// Worker nodes in the managed node pool
    pub cluster_node_count: u32,

    /// Machine type for the managed node pool
    pub cluster_node_machine_type: String,

    /// Basic-auth username. Loaded and guarded but not attached to any
    /// declared resource; kept for parity with existing stack files.
    pub cluster_username: Secret,

    /// Basic-auth password, same handling as the username
    pub cluster_password: Secret,

    /// GCP project the cluster lives in
    pub project: String,

    /// GCP zone the cluster lives in
    pub zone: String,

    /// API access token from the store, if present. Held as a secret so a
    /// debug-formatted configuration never prints it.
    token: Option<Secret>,
}

impl StackConfig {
    /// Resolve the typed configuration from a store
    pub fn load(store: &ConfigStore) -> Result<Self, ConfigError> {
        Ok(Self {
            cluster_name: store.require("clusterName")?,
            cluster_node_count: store.get_number("clusterNodeCount")?.unwrap_or(1),
            cluster_node_machine_type: store
                .get("clusterNodeMachineType")
                .unwrap_or_else(|| "n1-standard-1".to_string()),
            cluster_username: store.require_secret("clusterUsername")?,
            cluster_password: store.require_secret("clusterPassword")?,
            project: store.require("project")?,
            zone: store.require("zone")?,
            token: store.get_secret("token"),
        })
    }

    /// Load the typed configuration straight from a stack file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let store = ConfigStore::from_file(path)?;
        Self::load(&store)
    }

    /// Get the API access token from config or environment
    pub fn get_access_token(&self) -> anyhow::Result<String> {
        self.token
            .as_ref()
            .map(|t| t.expose().to_string())
            .or_else(|| std::env::var("GOOGLE_OAUTH_ACCESS_TOKEN").ok())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "API access token not found. Set GOOGLE_OAUTH_ACCESS_TOKEN or specify 'token' in the stack file"
                )
            })
    }

    /// Generate an example stack file
    pub fn example_yaml() -> &'static str {
        "\
# Stratus stack configuration
clusterName: demo
clusterNodeCount: 3
clusterNodeMachineType: n1-standard-1
clusterUsername: admin
clusterPassword: change-me
project: my-project
zone: us-central1-a
# token: set GOOGLE_OAUTH_ACCESS_TOKEN instead of storing it here
"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(yaml: &str) -> ConfigStore {
        ConfigStore::from_yaml(yaml).unwrap()
    }

    const FULL: &str = "\
clusterName: demo
clusterUsername: admin
clusterPassword: hunter2
project: proj1
zone: us-central1-a
";

    #[test]
    fn test_node_count_defaults_to_one() {
        let config = StackConfig::load(&store(FULL)).unwrap();
        assert_eq!(config.cluster_node_count, 1);
    }

    #[test]
    fn test_node_count_empty_defaults_to_one() {
        let yaml = format!("{}clusterNodeCount: \"\"\n", FULL);
        let config = StackConfig::load(&store(&yaml)).unwrap();
        assert_eq!(config.cluster_node_count, 1);
    }

    #[test]
    fn test_node_count_uses_provided_value() {
        let yaml = format!("{}clusterNodeCount: 5\n", FULL);
        let config = StackConfig::load(&store(&yaml)).unwrap();
        assert_eq!(config.cluster_node_count, 5);
    }

    #[test]
    fn test_node_count_rejects_non_numeric() {
        let yaml = format!("{}clusterNodeCount: lots\n", FULL);
        let err = StackConfig::load(&store(&yaml)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }

    #[test]
    fn test_machine_type_default() {
        let config = StackConfig::load(&store(FULL)).unwrap();
        assert_eq!(config.cluster_node_machine_type, "n1-standard-1");

        let yaml = format!("{}clusterNodeMachineType: e2-medium\n", FULL);
        let config = StackConfig::load(&store(&yaml)).unwrap();
        assert_eq!(config.cluster_node_machine_type, "e2-medium");
    }

    #[test]
    fn test_missing_cluster_name_is_fatal() {
        let yaml = "\
clusterUsername: admin
clusterPassword: hunter2
project: proj1
zone: us-central1-a
";
        let err = StackConfig::load(&store(yaml)).unwrap_err();
        match err {
            ConfigError::MissingKey(key) => assert_eq!(key, "clusterName"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let yaml = "\
clusterName: demo
clusterUsername: admin
project: proj1
zone: us-central1-a
";
        let err = StackConfig::load(&store(yaml)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(key) if key == "clusterPassword"));
    }

    #[test]
    fn test_token_redacts_in_debug() {
        let yaml = format!("{}token: sekrit-token\n", FULL);
        let config = StackConfig::load(&store(&yaml)).unwrap();
        assert!(!format!("{:?}", config).contains("sekrit-token"));
        assert_eq!(config.get_access_token().unwrap(), "sekrit-token");
    }

    #[test]
    fn test_secret_redacts_in_debug_and_display() {
        let config = StackConfig::load(&store(FULL)).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("admin"));
        assert_eq!(format!("{}", config.cluster_password), "[redacted]");
        assert_eq!(config.cluster_password.expose(), "hunter2");
    }
}
