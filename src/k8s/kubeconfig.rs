/// Kubeconfig rendering from resolved cluster outputs
use crate::gke::engine::ClusterOutputs;

/// Context name shared by the cluster, user and context entries
pub fn context_name(project: &str, zone: &str, cluster_name: &str) -> String {
    format!("{}_{}_{}", project, zone, cluster_name)
}

/// Render a kubeconfig document for a realized cluster.
///
/// Pure function of its inputs; the same project, zone and cluster outputs
/// always produce a byte-identical document. The CA certificate is embedded
/// verbatim in its base64 form.
pub fn render(project: &str, zone: &str, outputs: &ClusterOutputs) -> String {
    let context = context_name(project, zone, &outputs.name);
    format!(
        "\
apiVersion: v1
clusters:
- cluster:
    certificate-authority-data: {ca}
    server: https://{endpoint}
  name: {context}
contexts:
- context:
    cluster: {context}
    user: {context}
  name: {context}
current-context: {context}
kind: Config
preferences: {{}}
users:
- name: {context}
  user:
    exec:
      apiVersion: client.authentication.k8s.io/v1beta1
      command: gke-gcloud-auth-plugin
      installHint: Install gke-gcloud-auth-plugin for use with kubectl by following
        https://cloud.google.com/blog/products/containers-kubernetes/kubectl-auth-changes-in-gke
      provideClusterInfo: true
",
        ca = outputs.ca_certificate,
        endpoint = outputs.endpoint,
        context = context,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_outputs() -> ClusterOutputs {
        ClusterOutputs {
            name: "demo".to_string(),
            endpoint: "1.2.3.4".to_string(),
            location: "us-central1-a".to_string(),
            ca_certificate: "BASE64CERT".to_string(),
        }
    }

    #[test]
    fn test_context_name() {
        assert_eq!(
            context_name("proj1", "us-central1-a", "demo"),
            "proj1_us-central1-a_demo"
        );
    }

    #[test]
    fn test_render_exact_document() {
        let doc = render("proj1", "us-central1-a", &demo_outputs());
        let expected = "\
apiVersion: v1
clusters:
- cluster:
    certificate-authority-data: BASE64CERT
    server: https://1.2.3.4
  name: proj1_us-central1-a_demo
contexts:
- context:
    cluster: proj1_us-central1-a_demo
    user: proj1_us-central1-a_demo
  name: proj1_us-central1-a_demo
current-context: proj1_us-central1-a_demo
kind: Config
preferences: {}
users:
- name: proj1_us-central1-a_demo
  user:
    exec:
      apiVersion: client.authentication.k8s.io/v1beta1
      command: gke-gcloud-auth-plugin
      installHint: Install gke-gcloud-auth-plugin for use with kubectl by following
        https://cloud.google.com/blog/products/containers-kubernetes/kubectl-auth-changes-in-gke
      provideClusterInfo: true
";
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_render_is_valid_yaml() {
        let doc = render("proj1", "us-central1-a", &demo_outputs());
        let parsed: serde_yaml::Value = serde_yaml::from_str(&doc).unwrap();
        assert_eq!(parsed["kind"], "Config");
        assert_eq!(parsed["current-context"], "proj1_us-central1-a_demo");
        assert_eq!(
            parsed["clusters"][0]["cluster"]["server"],
            "https://1.2.3.4"
        );
        assert_eq!(
            parsed["clusters"][0]["cluster"]["certificate-authority-data"],
            "BASE64CERT"
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let outputs = demo_outputs();
        let first = render("proj1", "us-central1-a", &outputs);
        let second = render("proj1", "us-central1-a", &outputs);
        assert_eq!(first.as_bytes(), second.as_bytes());
    }
}
