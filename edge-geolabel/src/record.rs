use super::*;

/// One answer of the public IP lookup service.
///
/// The service answers with a JSON object using capitalised field names
/// (`Ip`, `City`, ...). The lower-case spelling used by ipinfo.io is accepted
/// as well. Unknown fields are ignored and missing ones are left empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GeolocationRecord {
    #[serde(alias = "ip")]
    pub ip: String,
    #[serde(alias = "hostname")]
    pub hostname: String,
    #[serde(alias = "city")]
    pub city: String,
    #[serde(alias = "region")]
    pub region: String,
    #[serde(alias = "country")]
    pub country: String,
    /// `latitude,longitude`
    #[serde(alias = "loc")]
    pub loc: String,
    #[serde(alias = "org")]
    pub org: String,
    #[serde(alias = "postal")]
    pub postal: String,
    #[serde(alias = "timezone")]
    pub timezone: String,
}
