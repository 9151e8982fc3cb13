use super::*;

/// A required setting is missing or unusable. Nothing gets started.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("cluster type {0:?} is not supported")]
    UnsupportedClusterType(String),

    #[error(transparent)]
    Recurrence(#[from] RecurrenceError),

    #[error("failed to set up the geolocation lookup client")]
    Locator(#[source] FetchError),
}

/// Which step ended an update cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    OverrideCheck,
    Fetch,
    Patch,
}

/// Why an update cycle stopped without updating the node.
///
/// None of these stop the scheduler, the next tick simply tries again.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error(r#"failed to check the manual override label of node "{node}""#)]
    OverrideCheck {
        node: String,
        #[source]
        source: kubeapi::Error,
    },

    #[error("failed to fetch geolocation details")]
    Fetch(#[from] FetchError),

    #[error(r#"failed to patch the labels of node "{node}""#)]
    Patch {
        node: String,
        #[source]
        source: kubeapi::Error,
    },
}

impl UpdateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OverrideCheck { .. } => ErrorKind::OverrideCheck,
            Self::Fetch(_) => ErrorKind::Fetch,
            Self::Patch { .. } => ErrorKind::Patch,
        }
    }

    pub(crate) fn override_check(node: &str, source: kubeapi::Error) -> Self {
        Self::OverrideCheck {
            node: node.to_string(),
            source,
        }
    }

    pub(crate) fn patch(node: &str, source: kubeapi::Error) -> Self {
        Self::Patch {
            node: node.to_string(),
            source,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("lookup request failed")]
    Transport(#[source] reqwest::Error),

    #[error("lookup service answered {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed lookup response")]
    Decode(#[source] reqwest::Error),

    #[error("lookup exceeded the cycle deadline")]
    Timeout,
}

#[derive(Debug, thiserror::Error)]
pub enum RecurrenceError {
    #[error("recurrence spec is empty")]
    Empty,

    #[error("invalid cron expression {spec:?}: {reason}")]
    Cron { spec: String, reason: String },

    #[error("invalid @every interval {spec:?}: {reason}")]
    Every { spec: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("scheduler is already started")]
    AlreadyStarted,

    #[error("scheduler is not started")]
    NotStarted,
}
