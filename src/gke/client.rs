/// GKE REST API client
use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::models::*;

const GKE_API_BASE: &str = "https://container.googleapis.com/v1";

/// Main GKE API client, scoped to one project and zone
#[derive(Clone)]
pub struct GkeClient {
    client: Client,
    project: String,
    zone: String,
}

impl GkeClient {
    /// Create a new GKE API client
    pub fn new(access_token: String, project: String, zone: String) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", access_token))
            .context("Invalid access token format")?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            project,
            zone,
        })
    }

    fn location_url(&self, location: &str, endpoint: &str) -> String {
        format!(
            "{}/projects/{}/zones/{}/{}",
            GKE_API_BASE, self.project, location, endpoint
        )
    }

    fn zone_url(&self, endpoint: &str) -> String {
        self.location_url(&self.zone, endpoint)
    }

    /// Make a GET request to the API
    pub(crate) async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.zone_url(endpoint);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send GET request")?;

        self.handle_response(response).await
    }

    /// Make a POST request to the API
    pub(crate) async fn post<T: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<R> {
        self.post_url(&self.zone_url(endpoint), body).await
    }

    async fn post_url<T: Serialize, R: DeserializeOwned>(&self, url: &str, body: &T) -> Result<R> {
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send POST request")?;

        self.handle_response(response).await
    }

    /// Make a DELETE request to the API
    pub(crate) async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.zone_url(endpoint);
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .context("Failed to send DELETE request")?;

        self.handle_response(response).await
    }

    /// Handle API response, checking for errors
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .context("Failed to parse API response")
        } else {
            let error_text = response.text().await.unwrap_or_default();

            // Try to parse as structured error response
            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                anyhow::bail!(
                    "API error: {} {} - {}",
                    error_response.error.code,
                    error_response.error.status,
                    error_response.error.message
                );
            }

            anyhow::bail!("API request failed with status {}: {}", status, error_text)
        }
    }

    /// Get the server configuration listing supported control-plane versions
    pub async fn get_server_config(&self) -> Result<ServerConfig> {
        self.get("serverconfig").await
    }

    /// Get cluster by name
    pub async fn get_cluster(&self, name: &str) -> Result<Cluster> {
        self.get(&format!("clusters/{}", name)).await
    }

    /// Submit a cluster creation request
    pub async fn create_cluster(&self, cluster: &serde_json::Value) -> Result<Operation> {
        self.post("clusters", &serde_json::json!({ "cluster": cluster }))
            .await
    }

    /// Submit a node pool creation request in the given location
    pub async fn create_node_pool(
        &self,
        location: &str,
        cluster_name: &str,
        node_pool: &NodePool,
    ) -> Result<Operation> {
        let url = self.location_url(location, &format!("clusters/{}/nodePools", cluster_name));
        self.post_url(&url, &serde_json::json!({ "nodePool": node_pool }))
            .await
    }

    /// Delete a node pool
    pub async fn delete_node_pool(&self, cluster_name: &str, pool_name: &str) -> Result<Operation> {
        self.delete(&format!("clusters/{}/nodePools/{}", cluster_name, pool_name))
            .await
    }

    /// Get operation status
    pub async fn get_operation(&self, operation_name: &str) -> Result<Operation> {
        self.get(&format!("operations/{}", operation_name)).await
    }

    /// Wait for a long-running operation to complete
    pub async fn wait_for_operation(&self, operation: &Operation, timeout_secs: u64) -> Result<()> {
        wait_until_done(
            || {
                let name = operation.name.clone();
                async move { self.get_operation(&name).await }
            },
            timeout_secs,
            5,
        )
        .await
    }
}

/// Poll an operation until it reports DONE, fail it otherwise.
///
/// The timeout covers every status short of DONE, including statuses the
/// engine may report that are neither PENDING nor RUNNING (e.g. ABORTING).
async fn wait_until_done<F, Fut>(fetch: F, timeout_secs: u64, interval_secs: u64) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<Operation>>,
{
    use tokio::time::{sleep, Duration};

    let start = std::time::Instant::now();
    let timeout = Duration::from_secs(timeout_secs);

    loop {
        let current = fetch().await?;

        if current.is_done() {
            if current.is_failed() {
                anyhow::bail!(
                    "Operation {} failed: {}",
                    current.name,
                    current.status_message
                );
            }
            return Ok(());
        }

        match current.status.as_str() {
            "PENDING" | "RUNNING" => debug!("Operation {} is {}", current.name, current.status),
            status => warn!("Unexpected operation status for {}: {}", current.name, status),
        }

        if start.elapsed() > timeout {
            anyhow::bail!(
                "Operation {} timed out after {} seconds",
                current.name,
                timeout_secs
            );
        }

        sleep(Duration::from_secs(interval_secs)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let result = GkeClient::new(
            "test-token".to_string(),
            "proj1".to_string(),
            "us-central1-a".to_string(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_zone_url() {
        let client = GkeClient::new(
            "test-token".to_string(),
            "proj1".to_string(),
            "us-central1-a".to_string(),
        )
        .unwrap();
        assert_eq!(
            client.zone_url("serverconfig"),
            "https://container.googleapis.com/v1/projects/proj1/zones/us-central1-a/serverconfig"
        );
        assert_eq!(
            client.location_url("us-west1-b", "clusters/demo/nodePools"),
            "https://container.googleapis.com/v1/projects/proj1/zones/us-west1-b/clusters/demo/nodePools"
        );
    }

    fn operation(status: &str, status_message: &str) -> Operation {
        Operation {
            name: "operation-123".to_string(),
            operation_type: String::new(),
            status: status.to_string(),
            status_message: status_message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_wait_until_done_success() {
        let result = wait_until_done(|| async { Ok(operation("DONE", "")) }, 10, 1).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_wait_until_done_surfaces_operation_error() {
        let result =
            wait_until_done(|| async { Ok(operation("DONE", "quota exceeded")) }, 10, 1).await;
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_wait_until_done_times_out_while_pending() {
        let result = wait_until_done(|| async { Ok(operation("PENDING", "")) }, 0, 1).await;
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("timed out"));
    }

    #[tokio::test]
    async fn test_wait_until_done_times_out_on_unexpected_status() {
        let result = wait_until_done(|| async { Ok(operation("ABORTING", "")) }, 0, 1).await;
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("timed out"));
    }
}
