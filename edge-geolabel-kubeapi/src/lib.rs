use std::fmt::Debug;

use async_trait::async_trait;
use edge_geolabel::EncodedLabelSet;
use edge_geolabel_ext as k8s;
use kube::api;

use k8s::corev1;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(r#"node "{name}" not found"#)]
    NotFound { name: String },

    #[error(transparent)]
    Kube(#[from] kube::Error),

    #[error("request exceeded the cycle deadline")]
    Timeout,
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Read and label access to cluster nodes.
///
/// Nothing is cached, every call goes to the control plane.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Fails with [`Error::NotFound`] when no node called `name` exists.
    async fn get_node(&self, name: &str) -> Result<corev1::Node>;

    /// Merge `labels` into the labels of node `name`.
    ///
    /// Labels not in `labels` and every other field of the node stay as they are.
    async fn patch_labels(&self, name: &str, labels: &EncodedLabelSet) -> Result<()>;
}

pub struct KubeApi {
    patch_params: api::PatchParams,
    client: kube::Client,
}

impl KubeApi {
    /// Create a KubeApi configured with a default Kubernetes client.
    ///
    /// The client configuration is inferred: `KUBECONFIG`, then
    /// `~/.kube/config`, then the in-cluster service account.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), kube::Error> {
    /// let api = edge_geolabel_kubeapi::KubeApi::new().await?;
    /// // use `api`...
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new() -> kube::Result<Self> {
        kube::Client::try_default().await.map(Self::with_client)
    }

    /// Create a KubeApi backed by the provided Kubernetes client.
    pub fn with_client(client: kube::Client) -> Self {
        Self {
            patch_params: api::PatchParams::default(),
            client,
        }
    }

    /// Fetches the node called `name`.
    ///
    /// A missing node is reported as [`Error::NotFound`], anything else the
    /// API server or the transport returns as [`Error::Kube`].
    pub async fn get_node(&self, name: &str) -> Result<corev1::Node> {
        self.nodes()
            .get_opt(name)
            .await
            .inspect_err(|err| tracing::error!(name, ?err, "Failed to retrieve node"))?
            .ok_or_else(|| Error::NotFound {
                name: name.to_string(),
            })
    }

    /// Sends a JSON merge patch touching only `metadata.labels` of node `name`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example(labels: edge_geolabel::EncodedLabelSet) -> edge_geolabel_kubeapi::Result<()> {
    /// let api = edge_geolabel_kubeapi::KubeApi::new().await?;
    /// let node = api.patch_node_labels("edge-1", &labels).await?;
    /// # Ok(()) }
    /// ```
    pub async fn patch_node_labels(
        &self,
        name: &str,
        labels: &EncodedLabelSet,
    ) -> Result<corev1::Node> {
        let patch = label_patch(labels);
        let node = self
            .nodes()
            .patch(name, self.patch_params(), &api::Patch::Merge(&patch))
            .await
            .inspect_err(|err| tracing::error!(name, ?err, "Failed to patch node labels"))?;
        Ok(node)
    }

    fn nodes(&self) -> api::Api<corev1::Node> {
        api::Api::all(self.client.clone())
    }

    fn patch_params(&self) -> &api::PatchParams {
        &self.patch_params
    }
}

#[async_trait]
impl NodeStore for KubeApi {
    async fn get_node(&self, name: &str) -> Result<corev1::Node> {
        Self::get_node(self, name).await
    }

    async fn patch_labels(&self, name: &str, labels: &EncodedLabelSet) -> Result<()> {
        self.patch_node_labels(name, labels).await.map(drop)
    }
}

impl Debug for KubeApi {
    /// Formats the `KubeApi` for debugging while redacting the `client`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeApi")
            .field("patch_params", &self.patch_params)
            .field("client", &"<kube::Client>")
            .finish()
    }
}

/// Merge patch body that sets `labels` and nothing else.
pub fn label_patch(labels: &EncodedLabelSet) -> serde_json::Value {
    serde_json::json!({
        "metadata": {
            "labels": labels,
        }
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;
    use edge_geolabel::{labels, GeolocationRecord};

    use super::*;

    #[test]
    fn patch_touches_labels_only() {
        let record = GeolocationRecord {
            ip: "203.0.113.9".to_string(),
            city: "Paris".to_string(),
            ..GeolocationRecord::default()
        };
        let now = chrono::Utc.timestamp_opt(1_760_636_400, 0).unwrap();
        let labels = EncodedLabelSet::encode(&record, &now);
        let patch = label_patch(&labels);

        let root = patch.as_object().unwrap();
        assert_eq!(root.len(), 1);
        let metadata = root["metadata"].as_object().unwrap();
        assert_eq!(metadata.len(), 1);
        let patched = metadata["labels"].as_object().unwrap();
        assert_eq!(patched.len(), labels::ALL.len());
        assert_eq!(patched[labels::PUBLIC_IP], "203.0.113.9");
        assert_eq!(patched[labels::GEOLOCATION_CITY], "KDyzdgF");
    }

    #[test]
    fn not_found_is_distinct() {
        let err = Error::NotFound {
            name: "edge-9".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), r#"node "edge-9" not found"#);
    }
}
