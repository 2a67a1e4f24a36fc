/// Resource graph construction: cluster, node pool, client configuration
use anyhow::Result;
use tracing::info;

use crate::config::StackConfig;
use crate::gke::engine::{ClusterOutputs, ClusterRequest, ContainerEngine, NodePoolRequest};
use crate::k8s::{kubeconfig, ProviderHandle};

/// Name of the explicitly managed node pool
pub const PRIMARY_NODE_POOL: &str = "primary-node-pool";

/// OAuth scopes granted to node pool instances
const NODE_OAUTH_SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/compute",
    "https://www.googleapis.com/auth/devstorage.read_only",
    "https://www.googleapis.com/auth/logging.write",
    "https://www.googleapis.com/auth/monitoring",
];

/// Everything the graph produces for the operator
pub struct GraphOutputs {
    pub cluster: ClusterOutputs,
    pub version: String,
    pub provider: ProviderHandle,
}

/// Build the resource graph in dependency order.
///
/// Each step waits for the engine to realize the resource it depends on
/// before submitting the next declaration: the node pool is only submitted
/// once the cluster's outputs are resolved, and the provider handle is only
/// constructed once the node pool is realized.
pub async fn build(engine: &dyn ContainerEngine, config: &StackConfig) -> Result<GraphOutputs> {
    // The cluster must not be created against a stale or default version
    let version = engine.latest_master_version().await?;

    // The API requires a non-empty node pool at creation time, but only
    // separately managed pools should survive. The smallest possible default
    // pool is created and immediately removed.
    let cluster = engine
        .create_cluster(&ClusterRequest {
            name: config.cluster_name.clone(),
            initial_node_count: 1,
            remove_default_node_pool: true,
            min_master_version: version.clone(),
        })
        .await?;

    engine
        .create_node_pool(&NodePoolRequest {
            cluster: cluster.name.clone(),
            location: cluster.location.clone(),
            name: PRIMARY_NODE_POOL.to_string(),
            node_count: config.cluster_node_count,
            machine_type: config.cluster_node_machine_type.clone(),
            preemptible: true,
            oauth_scopes: NODE_OAUTH_SCOPES.iter().map(|s| s.to_string()).collect(),
            version: version.clone(),
            auto_repair: true,
        })
        .await?;

    // The kubeconfig combines the cluster's resolved name, endpoint and CA
    // certificate; the handle itself only exists once the pool that will run
    // workloads is scheduled.
    let document = kubeconfig::render(&config.project, &config.zone, &cluster);
    let provider = ProviderHandle::new(&cluster.name, document);

    info!("Resource graph realized for cluster {}", cluster.name);

    Ok(GraphOutputs {
        cluster,
        version,
        provider,
    })
}
