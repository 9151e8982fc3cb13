use k8s::NodeExt as _;

use super::*;

/// Decides whether the automatic update may touch the node.
#[derive(Clone, Debug)]
pub struct OverridePolicy {
    node_name: String,
}

impl OverridePolicy {
    pub fn new(node_name: impl ToString) -> Self {
        let node_name = node_name.to_string();
        Self { node_name }
    }

    /// Reads the node and returns `false` when its manual override label is
    /// `"false"`. A missing node or a failed read is an error.
    pub async fn allows(&self, store: &dyn NodeStore) -> Result<bool, UpdateError> {
        let node = store
            .get_node(&self.node_name)
            .await
            .map_err(|source| UpdateError::override_check(&self.node_name, source))?;
        Ok(node.geolocation_update_allowed())
    }
}
