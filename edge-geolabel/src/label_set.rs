use super::*;

/// Label values derived from one [`GeolocationRecord`], keyed by the node
/// label they are written to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EncodedLabelSet(BTreeMap<String, String>);

impl EncodedLabelSet {
    /// Builds the full label set for `record` as of `now`.
    ///
    /// IP addresses are stored as they are, every free-text field goes through
    /// [`encode_text`]. Both `lastUpdatedTime` labels carry the same encoded
    /// `now`.
    pub fn encode(record: &GeolocationRecord, now: &DateTime<Utc>) -> Self {
        let updated = encode_timestamp(now);
        let entries = [
            (labels::K3S_EXTERNAL_IP, record.ip.clone()),
            (labels::PUBLIC_IP, record.ip.clone()),
            (labels::PUBLIC_HOSTNAME, encode_text(&record.hostname)),
            (labels::PUBLIC_LAST_UPDATED_TIME, updated.clone()),
            (labels::GEOLOCATION_LAST_UPDATED_TIME, updated),
            (labels::GEOLOCATION_LOC, encode_text(&record.loc)),
            (labels::GEOLOCATION_CITY, encode_text(&record.city)),
            (labels::GEOLOCATION_REGION, encode_text(&record.region)),
            (labels::GEOLOCATION_COUNTRY, encode_text(&record.country)),
            (labels::GEOLOCATION_ORG, encode_text(&record.org)),
            (labels::GEOLOCATION_POSTAL, encode_text(&record.postal)),
            (labels::GEOLOCATION_TIMEZONE, encode_text(&record.timezone)),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();

        Self(entries)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Removes the entries whose value the cluster would reject and returns
    /// their keys.
    ///
    /// Encoding never truncates, so a long enough input (roughly more than 46
    /// bytes) encodes past the label value length limit.
    pub fn remove_invalid(&mut self) -> Vec<String> {
        let invalid = self
            .0
            .iter()
            .filter(|(_, value)| !is_valid_label_value(value))
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>();
        for key in &invalid {
            self.0.remove(key);
        }
        invalid
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl From<EncodedLabelSet> for BTreeMap<String, String> {
    fn from(labels: EncodedLabelSet) -> Self {
        labels.into_inner()
    }
}
