//! In-memory doubles for the lookup service and the node store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use k8s::{corev1, NodeExt as _};
use tokio::sync::Notify;

use super::*;

pub(crate) fn paris() -> GeolocationRecord {
    GeolocationRecord {
        ip: "203.0.113.9".to_string(),
        city: "Paris".to_string(),
        region: "Île-de-France".to_string(),
        country: "FR".to_string(),
        loc: "48.85,2.35".to_string(),
        postal: "75001".to_string(),
        timezone: "Europe/Paris".to_string(),
        ..GeolocationRecord::default()
    }
}

#[derive(Debug, Default)]
pub(crate) struct Gate {
    pub(crate) entered: Notify,
    pub(crate) release: Notify,
}

#[derive(Debug, Default)]
enum Behaviour {
    #[default]
    Answer,
    Gated(Arc<Gate>),
    Hang,
}

/// Answers every lookup with the same record.
#[derive(Debug, Default)]
pub(crate) struct FakeLocator {
    record: GeolocationRecord,
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl FakeLocator {
    pub(crate) fn answering(record: GeolocationRecord) -> Arc<Self> {
        Arc::new(Self {
            record,
            ..Self::default()
        })
    }

    /// Every lookup waits for `gate.release` after signalling `gate.entered`.
    pub(crate) fn gated(record: GeolocationRecord, gate: Arc<Gate>) -> Arc<Self> {
        Arc::new(Self {
            record,
            behaviour: Behaviour::Gated(gate),
            ..Self::default()
        })
    }

    pub(crate) fn hanging() -> Arc<Self> {
        Arc::new(Self {
            behaviour: Behaviour::Hang,
            ..Self::default()
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Locate for FakeLocator {
    async fn fetch(&self) -> Result<GeolocationRecord, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            Behaviour::Answer => {}
            Behaviour::Gated(gate) => {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
            Behaviour::Hang => std::future::pending::<()>().await,
        }
        Ok(self.record.clone())
    }
}

/// One node kept in memory, patched with merge semantics.
#[derive(Debug, Default)]
pub(crate) struct FakeStore {
    node: Mutex<Option<corev1::Node>>,
    reads: AtomicUsize,
    patches: Mutex<Vec<EncodedLabelSet>>,
}

impl FakeStore {
    pub(crate) fn with_labels(name: &str, labels: &[(&str, &str)]) -> Arc<Self> {
        let node = corev1::Node::with_labels(name, labels.iter().copied());
        Arc::new(Self {
            node: Mutex::new(Some(node)),
            ..Self::default()
        })
    }

    pub(crate) fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub(crate) fn patches(&self) -> Vec<EncodedLabelSet> {
        self.patches.lock().unwrap().clone()
    }

    pub(crate) fn labels(&self) -> BTreeMap<String, String> {
        self.node
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|node| node.metadata.labels.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NodeStore for FakeStore {
    async fn get_node(&self, name: &str) -> kubeapi::Result<corev1::Node> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.node
            .lock()
            .unwrap()
            .clone()
            .filter(|node| node.metadata.name.as_deref() == Some(name))
            .ok_or_else(|| kubeapi::Error::NotFound {
                name: name.to_string(),
            })
    }

    async fn patch_labels(&self, name: &str, labels: &EncodedLabelSet) -> kubeapi::Result<()> {
        self.patches.lock().unwrap().push(labels.clone());
        let mut node = self.node.lock().unwrap();
        let node = node
            .as_mut()
            .filter(|node| node.metadata.name.as_deref() == Some(name))
            .ok_or_else(|| kubeapi::Error::NotFound {
                name: name.to_string(),
            })?;
        let existing = node.metadata.labels.get_or_insert_with(BTreeMap::new);
        existing.extend(
            labels
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        );
        Ok(())
    }
}
