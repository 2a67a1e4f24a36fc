/// GKE REST API data models
use serde::{Deserialize, Serialize};

/// Server configuration for a zone, listing supported control-plane versions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub default_cluster_version: String,
    /// Valid master versions, newest first
    #[serde(default)]
    pub valid_master_versions: Vec<String>,
}

impl ServerConfig {
    /// Latest supported control-plane version, if the engine reported any
    pub fn latest_master_version(&self) -> Option<&str> {
        self.valid_master_versions.first().map(String::as_str)
    }
}

/// Managed cluster resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub name: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub current_master_version: String,
    pub master_auth: Option<MasterAuth>,
}

/// Cluster authentication material returned by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterAuth {
    /// Base64-encoded CA certificate, embedded verbatim in the kubeconfig
    #[serde(default)]
    pub cluster_ca_certificate: String,
}

/// Node pool resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePool {
    pub name: String,
    #[serde(default)]
    pub initial_node_count: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<NodeConfig>,
    #[serde(default)]
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management: Option<NodeManagement>,
}

/// Per-node machine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    pub machine_type: String,
    pub preemptible: bool,
    #[serde(default)]
    pub oauth_scopes: Vec<String>,
}

/// Automated node management settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeManagement {
    pub auto_repair: bool,
}

/// Long-running operation handle returned by mutating calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub operation_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub status_message: String,
}

impl Operation {
    pub fn is_done(&self) -> bool {
        self.status == "DONE"
    }

    pub fn is_failed(&self) -> bool {
        self.is_done() && !self.status_message.is_empty()
    }
}

/// Error response from the API
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ApiError,
}

/// API error details
#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: u32,
    pub message: String,
    #[serde(default)]
    pub status: String,
}
