use std::fmt;

use chrono::Utc;
use tokio::time::{timeout_at, Instant};

use super::*;

/// Upper bound for one whole cycle: override check, lookup and patch together.
pub const DEFAULT_CYCLE_DEADLINE: Duration = Duration::from_secs(60);

/// Result of a cycle that ran to its end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    SkippedByOverride,
    Committed(EncodedLabelSet),
}

/// Terminal state of one update cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleState {
    SkippedByOverride,
    OverrideCheckFailed,
    FetchFailed,
    PatchFailed,
    Committed,
}

impl CycleState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SkippedByOverride => "skipped_by_override",
            Self::OverrideCheckFailed => "override_check_failed",
            Self::FetchFailed => "fetch_failed",
            Self::PatchFailed => "patch_failed",
            Self::Committed => "committed",
        }
    }
}

impl From<ErrorKind> for CycleState {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::OverrideCheck => Self::OverrideCheckFailed,
            ErrorKind::Fetch => Self::FetchFailed,
            ErrorKind::Patch => Self::PatchFailed,
        }
    }
}

/// Runs update cycles for one node.
pub struct GeolocationUpdater {
    node_name: String,
    policy: OverridePolicy,
    locator: Arc<dyn Locate>,
    store: Arc<dyn NodeStore>,
    deadline: Duration,
    metrics: Option<CycleMetrics>,
}

impl GeolocationUpdater {
    pub fn new(
        node_name: impl ToString,
        locator: Arc<dyn Locate>,
        store: Arc<dyn NodeStore>,
    ) -> Result<Self, ConfigurationError> {
        let node_name = node_name.to_string();
        if node_name.trim().is_empty() {
            return Err(ConfigurationError::Missing("node name"));
        }
        let policy = OverridePolicy::new(&node_name);
        Ok(Self {
            node_name,
            policy,
            locator,
            store,
            deadline: DEFAULT_CYCLE_DEADLINE,
            metrics: None,
        })
    }

    pub fn with_deadline(self, deadline: Duration) -> Self {
        Self { deadline, ..self }
    }

    /// Counts every finished cycle in `metrics`.
    pub fn with_metrics(self, metrics: CycleMetrics) -> Self {
        let metrics = Some(metrics);
        Self { metrics, ..self }
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// Runs one cycle, then logs and counts how it ended.
    pub async fn update(&self) -> CycleState {
        let node = self.node_name();
        let state = match self.run_cycle().await {
            Ok(CycleOutcome::SkippedByOverride) => {
                tracing::debug!(node, "Manual update is set, skipping geolocation update");
                CycleState::SkippedByOverride
            }
            Ok(CycleOutcome::Committed(labels)) => {
                tracing::info!(node, labels = labels.len(), "Finished updating geolocation details");
                CycleState::Committed
            }
            Err(err) => {
                let source = std::error::Error::source(&err).map(ToString::to_string);
                tracing::error!(node, kind = ?err.kind(), source, "{err}");
                err.kind().into()
            }
        };
        if let Some(metrics) = &self.metrics {
            metrics.observe(state);
        }
        state
    }

    /// One pass of override check, lookup, encoding and patch.
    ///
    /// All steps share a single deadline. Whatever step is running when it
    /// expires is abandoned and reported as that step's failure.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, UpdateError> {
        let deadline = Instant::now() + self.deadline;
        let node = self.node_name();

        let allowed = timeout_at(deadline, self.policy.allows(self.store.as_ref()))
            .await
            .unwrap_or_else(|_| Err(UpdateError::override_check(node, kubeapi::Error::Timeout)))?;
        if !allowed {
            return Ok(CycleOutcome::SkippedByOverride);
        }

        tracing::info!(node, "Updating geolocation");
        let record = timeout_at(deadline, self.locator.fetch())
            .await
            .unwrap_or(Err(FetchError::Timeout))?;

        let mut labels = EncodedLabelSet::encode(&record, &Utc::now());
        for key in labels.remove_invalid() {
            tracing::warn!(node, key, "Value is not a valid label value, leaving label as is");
        }

        timeout_at(deadline, self.store.patch_labels(node, &labels))
            .await
            .unwrap_or(Err(kubeapi::Error::Timeout))
            .map_err(|source| UpdateError::patch(node, source))?;

        Ok(CycleOutcome::Committed(labels))
    }
}

impl fmt::Debug for GeolocationUpdater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeolocationUpdater")
            .field("node_name", &self.node_name)
            .field("policy", &self.policy)
            .field("locator", &"<dyn Locate>")
            .field("store", &"<dyn NodeStore>")
            .field("deadline", &self.deadline)
            .field("metrics", &self.metrics)
            .finish()
    }
}
