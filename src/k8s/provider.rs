/// Provider handle wrapping the rendered kubeconfig
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Client configuration bundle handed to downstream tooling. Constructed only
/// once the node pool that will run workloads is realized.
#[derive(Debug, Clone)]
pub struct ProviderHandle {
    name: String,
    kubeconfig: String,
}

impl ProviderHandle {
    /// Create a provider handle for a cluster
    pub fn new(cluster_name: &str, kubeconfig: String) -> Self {
        Self {
            name: format!("{}-provider", cluster_name),
            kubeconfig,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kubeconfig(&self) -> &str {
        &self.kubeconfig
    }

    /// Write the kubeconfig into the output directory
    pub async fn write_kubeconfig(&self, output_dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .context("Failed to create output directory")?;

        let path = output_dir.join("kubeconfig");
        tokio::fs::write(&path, &self.kubeconfig)
            .await
            .context("Failed to write kubeconfig")?;

        info!("Kubeconfig written to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name() {
        let provider = ProviderHandle::new("demo", "apiVersion: v1\n".to_string());
        assert_eq!(provider.name(), "demo-provider");
        assert_eq!(provider.kubeconfig(), "apiVersion: v1\n");
    }

    #[tokio::test]
    async fn test_write_kubeconfig() {
        let dir = std::env::temp_dir().join(format!("stratus-test-{}", std::process::id()));
        let provider = ProviderHandle::new("demo", "apiVersion: v1\n".to_string());

        let path = provider.write_kubeconfig(&dir).await.unwrap();
        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, "apiVersion: v1\n");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
