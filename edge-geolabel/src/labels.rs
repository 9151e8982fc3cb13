//! Node label keys written and read by the geolocation updater.
//!
//! The keys are shared with existing consumers of the labels and must not change.

use constcat::concat;

pub const EDGECLOUD9: &str = "edgecloud9";
pub const PUBLIC_PREFIX: &str = concat!(EDGECLOUD9, ".public.");
pub const GEOLOCATION_PREFIX: &str = concat!(EDGECLOUD9, ".geolocation.");

pub const K3S_EXTERNAL_IP: &str = "k3s.io/external-ip";

pub const PUBLIC_IP: &str = concat!(PUBLIC_PREFIX, "ip");
pub const PUBLIC_HOSTNAME: &str = concat!(PUBLIC_PREFIX, "hostname");
pub const PUBLIC_LAST_UPDATED_TIME: &str = concat!(PUBLIC_PREFIX, "lastUpdatedTime");

pub const GEOLOCATION_LAST_UPDATED_TIME: &str = concat!(GEOLOCATION_PREFIX, "lastUpdatedTime");
pub const GEOLOCATION_LOC: &str = concat!(GEOLOCATION_PREFIX, "loc");
pub const GEOLOCATION_CITY: &str = concat!(GEOLOCATION_PREFIX, "city");
pub const GEOLOCATION_REGION: &str = concat!(GEOLOCATION_PREFIX, "region");
pub const GEOLOCATION_COUNTRY: &str = concat!(GEOLOCATION_PREFIX, "country");
pub const GEOLOCATION_ORG: &str = concat!(GEOLOCATION_PREFIX, "org");
pub const GEOLOCATION_POSTAL: &str = concat!(GEOLOCATION_PREFIX, "postal");
pub const GEOLOCATION_TIMEZONE: &str = concat!(GEOLOCATION_PREFIX, "timezone");

/// Setting this label to `"false"` on a node turns the automatic update off
/// for that node. Any other value, or no label at all, leaves it on.
pub const MANUAL_OVERRIDE: &str = concat!(GEOLOCATION_PREFIX, "manual");
pub const MANUAL_OVERRIDE_DISABLED: &str = "false";

/// Every key an update cycle writes.
pub const ALL: [&str; 12] = [
    K3S_EXTERNAL_IP,
    PUBLIC_IP,
    PUBLIC_HOSTNAME,
    PUBLIC_LAST_UPDATED_TIME,
    GEOLOCATION_LAST_UPDATED_TIME,
    GEOLOCATION_LOC,
    GEOLOCATION_CITY,
    GEOLOCATION_REGION,
    GEOLOCATION_COUNTRY,
    GEOLOCATION_ORG,
    GEOLOCATION_POSTAL,
    GEOLOCATION_TIMEZONE,
];
