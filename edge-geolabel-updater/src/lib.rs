//! The geolocation node-label updater.
//!
//! A [`Scheduler`] drives [`GeolocationUpdater`] cycles on a [`Recurrence`].
//! Each cycle checks the node's manual override label, looks up the public IP
//! and location of the node, encodes the answer into label values and merges
//! them into the node's labels.

use std::sync::Arc;
use std::time::Duration;

use edge_geolabel::{EncodedLabelSet, GeolocationRecord};
use edge_geolabel_ext as k8s;
use edge_geolabel_kubeapi as kubeapi;

use kubeapi::NodeStore;

pub use error::{
    ConfigurationError, ErrorKind, FetchError, RecurrenceError, SchedulerError, UpdateError,
};
pub use lifecycle::LifecycleState;
pub use locator::{GeoLocator, Locate, DEFAULT_LOOKUP_URL};
pub use metrics::CycleMetrics;
pub use policy::OverridePolicy;
pub use recurrence::{parse_go_duration, Recurrence};
pub use scheduler::{Scheduler, TickOutcome};
pub use updater::{CycleOutcome, CycleState, GeolocationUpdater, DEFAULT_CYCLE_DEADLINE};

#[cfg(test)]
pub(crate) use locator::MockLocate;

mod error;
mod lifecycle;
mod locator;
mod metrics;
mod policy;
mod recurrence;
mod scheduler;
mod updater;

#[cfg(test)]
mod testing;
