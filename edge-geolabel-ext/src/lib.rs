use std::collections::BTreeMap;

pub use k8s_openapi as openapi;
pub use k8s_openapi::api::core::v1 as corev1;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;

use edge_geolabel::labels;
use openapi::Resource;

pub trait ObjectMetaExt {
    fn new(name: impl ToString) -> Self;
    fn with_labels<I, K, V>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: ToString,
        V: ToString;
}

impl ObjectMetaExt for metav1::ObjectMeta {
    fn new(name: impl ToString) -> Self {
        let name = Some(name.to_string());
        Self { name, ..default() }
    }

    fn with_labels<I, K, V>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: ToString,
        V: ToString,
    {
        let labels = labels
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>();
        Self {
            labels: Some(labels),
            ..self
        }
    }
}

pub trait NodeExt {
    fn new(name: impl ToString) -> Self;
    fn with_labels<I, K, V>(name: impl ToString, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: ToString,
        V: ToString;
    fn label(&self, key: &str) -> Option<&str>;

    /// `false` only when the manual override label is set to `"false"`.
    fn geolocation_update_allowed(&self) -> bool {
        self.label(labels::MANUAL_OVERRIDE) != Some(labels::MANUAL_OVERRIDE_DISABLED)
    }
}

impl NodeExt for corev1::Node {
    fn new(name: impl ToString) -> Self {
        let metadata = metav1::ObjectMeta::new(name);
        Self {
            metadata,
            ..default()
        }
    }

    fn with_labels<I, K, V>(name: impl ToString, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: ToString,
        V: ToString,
    {
        let metadata = metav1::ObjectMeta::new(name).with_labels(labels);
        Self {
            metadata,
            ..default()
        }
    }

    fn label(&self, key: &str) -> Option<&str> {
        self.metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(key))
            .map(String::as_str)
    }
}

pub trait StatusExt {
    fn not_found<K>(name: impl ToString) -> Self
    where
        K: Resource;
}

impl StatusExt for metav1::Status {
    fn not_found<K>(name: impl ToString) -> Self
    where
        K: Resource,
    {
        let kind = K::URL_PATH_SEGMENT.to_string();
        let name = name.to_string();
        let code = 404;
        let message = format!(r#"{kind} "{name}" not found"#);
        let details = metav1::StatusDetails {
            name: Some(name),
            kind: Some(kind),
            ..default()
        };
        Self {
            code: Some(code),
            details: Some(details),
            message: Some(message),
            metadata: metav1::ListMeta::default(),
            reason: Some("NotFound".to_string()),
            status: Some("Failure".to_string()),
        }
    }
}

pub fn default<T: Default>() -> T {
    T::default()
}
