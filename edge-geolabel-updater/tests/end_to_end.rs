//! A scheduler wired to a real `GeoLocator` and an in-memory node store.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::routing::get;
use axum::Router;
use edge_geolabel::{encode_text, labels, EncodedLabelSet};
use edge_geolabel_ext::{corev1, NodeExt as _};
use edge_geolabel_kubeapi::{self as kubeapi, NodeStore};
use edge_geolabel_updater::{GeoLocator, GeolocationUpdater, LifecycleState, Scheduler};

const PARIS: &str = r#"{"Ip":"203.0.113.9","City":"Paris","Region":"Île-de-France","Country":"FR","Loc":"48.85,2.35","Org":"","Postal":"75001","Timezone":"Europe/Paris","Hostname":""}"#;

#[derive(Debug)]
struct MemoryNodeStore {
    node: Mutex<corev1::Node>,
    patches: Mutex<Vec<EncodedLabelSet>>,
}

impl MemoryNodeStore {
    fn new(labels: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            node: Mutex::new(corev1::Node::with_labels("edge-1", labels.iter().copied())),
            patches: Mutex::default(),
        })
    }

    fn labels(&self) -> BTreeMap<String, String> {
        self.node
            .lock()
            .unwrap()
            .metadata
            .labels
            .clone()
            .unwrap_or_default()
    }
}

#[async_trait]
impl NodeStore for MemoryNodeStore {
    async fn get_node(&self, name: &str) -> kubeapi::Result<corev1::Node> {
        let node = self.node.lock().unwrap().clone();
        if node.metadata.name.as_deref() == Some(name) {
            Ok(node)
        } else {
            Err(kubeapi::Error::NotFound {
                name: name.to_string(),
            })
        }
    }

    async fn patch_labels(&self, _name: &str, labels: &EncodedLabelSet) -> kubeapi::Result<()> {
        self.patches.lock().unwrap().push(labels.clone());
        self.node
            .lock()
            .unwrap()
            .metadata
            .labels
            .get_or_insert_with(BTreeMap::new)
            .extend(labels.clone().into_inner());
        Ok(())
    }
}

async fn lookup_service() -> String {
    let app = Router::new().route("/", get(|| async { PARIS }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });
    format!("http://{addr}/")
}

#[tokio::test]
async fn labels_the_node_on_start() {
    let url = lookup_service().await;
    let store = MemoryNodeStore::new(&[("team", "infra")]);
    let locator = Arc::new(GeoLocator::new(url, "").unwrap());
    let updater = GeolocationUpdater::new("edge-1", locator, store.clone()).unwrap();
    let lifecycle = Arc::new(LifecycleState::new());
    let mut scheduler = Scheduler::new("0 0 * * *", updater, Arc::clone(&lifecycle)).unwrap();

    scheduler.start().await.unwrap();
    assert!(lifecycle.is_live() && lifecycle.is_ready());

    let patches = store.patches.lock().unwrap().clone();
    assert_eq!(patches.len(), 1);
    let patch = &patches[0];
    assert_eq!(patch.get(labels::K3S_EXTERNAL_IP), Some("203.0.113.9"));
    assert_eq!(patch.get(labels::PUBLIC_IP), Some("203.0.113.9"));
    assert_eq!(
        patch.get(labels::GEOLOCATION_CITY),
        Some(encode_text("Paris").as_str())
    );
    let updated = patch.get(labels::PUBLIC_LAST_UPDATED_TIME).unwrap();
    assert!(!updated.is_empty());
    assert_eq!(patch.get(labels::GEOLOCATION_LAST_UPDATED_TIME), Some(updated));

    let node = store.labels();
    assert_eq!(node.get("team").map(String::as_str), Some("infra"));
    assert_eq!(
        node.get(labels::GEOLOCATION_TIMEZONE),
        Some(&encode_text("Europe/Paris"))
    );

    scheduler.stop().await.unwrap();
    assert!(!lifecycle.is_live() && !lifecycle.is_ready());
}

#[tokio::test]
async fn manual_override_leaves_the_node_alone() {
    let url = lookup_service().await;
    let store = MemoryNodeStore::new(&[("team", "infra"), (labels::MANUAL_OVERRIDE, "false")]);
    let before = store.labels();
    let locator = Arc::new(GeoLocator::new(url, "").unwrap());
    let updater = GeolocationUpdater::new("edge-1", locator, store.clone()).unwrap();
    let mut scheduler = Scheduler::new("@daily", updater, Arc::default()).unwrap();

    scheduler.start().await.unwrap();
    assert!(store.patches.lock().unwrap().is_empty());
    assert_eq!(store.labels(), before);
    scheduler.stop().await.unwrap();
}
