/// Provisioning engine seam between the resource graph and the GKE API
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use super::client::GkeClient;
use super::models::{Cluster, NodeConfig, NodeManagement, NodePool};

/// Name of the minimal node pool the engine creates with every cluster
pub const DEFAULT_NODE_POOL: &str = "default-pool";

/// Parameters for declaring a cluster
#[derive(Debug, Clone)]
pub struct ClusterRequest {
    pub name: String,
    /// The API rejects clusters with no node pool, so every cluster starts
    /// with a minimal default pool
    pub initial_node_count: u32,
    /// Delete the default pool once the cluster is running, leaving only
    /// explicitly managed pools
    pub remove_default_node_pool: bool,
    pub min_master_version: String,
}

/// Parameters for declaring a node pool on an existing cluster
#[derive(Debug, Clone)]
pub struct NodePoolRequest {
    /// Cluster the pool attaches to, taken from the cluster's resolved outputs
    pub cluster: String,
    /// Location of the pool, taken from the cluster's resolved outputs
    pub location: String,
    pub name: String,
    pub node_count: u32,
    pub machine_type: String,
    pub preemptible: bool,
    pub oauth_scopes: Vec<String>,
    pub version: String,
    pub auto_repair: bool,
}

/// Outputs assigned by the engine once a cluster is realized
#[derive(Debug, Clone)]
pub struct ClusterOutputs {
    pub name: String,
    pub endpoint: String,
    pub location: String,
    /// Base64-encoded CA certificate
    pub ca_certificate: String,
}

/// The engine owning resource realization. Mutating calls return only after
/// the engine reports the resource as realized, which is what gives declared
/// dependencies their ordering guarantee.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Latest control-plane version supported in the target zone
    async fn latest_master_version(&self) -> Result<String>;

    /// Declare a cluster and wait until its outputs are resolved
    async fn create_cluster(&self, request: &ClusterRequest) -> Result<ClusterOutputs>;

    /// Declare a node pool and wait until it is realized
    async fn create_node_pool(&self, request: &NodePoolRequest) -> Result<()>;

    /// Read back a cluster's current state
    async fn get_cluster(&self, name: &str) -> Result<Cluster>;
}

/// GKE-backed engine implementation
pub struct GkeEngine {
    client: GkeClient,
    zone: String,
    operation_timeout_secs: u64,
}

impl GkeEngine {
    /// Create a new engine over a GKE client
    pub fn new(client: GkeClient, zone: String) -> Self {
        Self {
            client,
            zone,
            operation_timeout_secs: 1800,
        }
    }
}

#[async_trait]
impl ContainerEngine for GkeEngine {
    async fn latest_master_version(&self) -> Result<String> {
        let server_config = self
            .client
            .get_server_config()
            .await
            .context("Failed to query supported control-plane versions")?;

        // Valid versions are listed newest first. A cluster must never be
        // created against a stale or default version, so an empty list is an
        // error rather than a fallback.
        let version = server_config
            .latest_master_version()
            .map(str::to_string)
            .ok_or_else(|| {
                anyhow::anyhow!("Engine reported no valid control-plane versions for the zone")
            })?;

        info!("Latest control-plane version: {}", version);
        Ok(version)
    }

    async fn create_cluster(&self, request: &ClusterRequest) -> Result<ClusterOutputs> {
        info!("Creating cluster: {}", request.name);

        let body = serde_json::json!({
            "name": request.name,
            "initialNodeCount": request.initial_node_count,
            "initialClusterVersion": request.min_master_version,
        });

        let operation = self
            .client
            .create_cluster(&body)
            .await
            .context("Failed to create cluster")?;

        self.client
            .wait_for_operation(&operation, self.operation_timeout_secs)
            .await?;

        if request.remove_default_node_pool {
            info!("Removing default node pool from cluster {}", request.name);
            let operation = self
                .client
                .delete_node_pool(&request.name, DEFAULT_NODE_POOL)
                .await
                .context("Failed to delete default node pool")?;
            self.client
                .wait_for_operation(&operation, self.operation_timeout_secs)
                .await?;
        }

        let cluster = self.client.get_cluster(&request.name).await?;

        let location = if cluster.location.is_empty() {
            self.zone.clone()
        } else {
            cluster.location
        };
        let ca_certificate = cluster
            .master_auth
            .map(|auth| auth.cluster_ca_certificate)
            .unwrap_or_default();

        info!(
            "Cluster created successfully: {} (endpoint: {})",
            cluster.name, cluster.endpoint
        );

        Ok(ClusterOutputs {
            name: cluster.name,
            endpoint: cluster.endpoint,
            location,
            ca_certificate,
        })
    }

    async fn create_node_pool(&self, request: &NodePoolRequest) -> Result<()> {
        info!(
            "Creating node pool {} on cluster {} in {} ({} x {})",
            request.name, request.cluster, request.location, request.node_count, request.machine_type
        );

        let node_pool = NodePool {
            name: request.name.clone(),
            initial_node_count: request.node_count,
            status: String::new(),
            config: Some(NodeConfig {
                machine_type: request.machine_type.clone(),
                preemptible: request.preemptible,
                oauth_scopes: request.oauth_scopes.clone(),
            }),
            version: request.version.clone(),
            management: Some(NodeManagement {
                auto_repair: request.auto_repair,
            }),
        };

        let operation = self
            .client
            .create_node_pool(&request.location, &request.cluster, &node_pool)
            .await
            .context("Failed to create node pool")?;

        self.client
            .wait_for_operation(&operation, self.operation_timeout_secs)
            .await?;

        info!("Node pool created successfully: {}", request.name);
        Ok(())
    }

    async fn get_cluster(&self, name: &str) -> Result<Cluster> {
        self.client.get_cluster(name).await
    }
}
