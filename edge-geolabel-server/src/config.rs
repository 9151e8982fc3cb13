use std::time::Duration;

use clap::Args;
use edge_geolabel_updater::{ConfigurationError, DEFAULT_LOOKUP_URL, Recurrence, parse_go_duration};

const K3S: &str = "K3S";

/// Process options, each settable by flag or by environment variable.
#[derive(Args, Clone, Debug, Default)]
pub(crate) struct Config {
    /// Cron expression or `@every <duration>` driving the updates
    #[arg(long, env = "GEOLOCATION_UPDATER_CRON_SPEC")]
    cron_spec: Option<String>,

    /// Base URL of the IP geolocation lookup service
    #[arg(long, env = "IPINFO_URL")]
    ipinfo_url: Option<String>,

    /// Bearer token for the lookup service
    #[arg(long, env = "IPINFO_ACCESS_TOKEN", hide_env_values = true)]
    ipinfo_access_token: Option<String>,

    /// Name of the node this process runs on
    #[arg(long, env = "NODE_NAME")]
    node_name: Option<String>,

    /// Kind of edge cluster, only K3S is supported
    #[arg(long, env = "EDGE_CLUSTER_TYPE")]
    edge_cluster_type: Option<String>,

    /// Set to `true` to keep the node's public IP and geolocation labels up to date
    #[arg(long, env = "UPDATE_PUBLIC_IP_GEOLOCATION_DETAILS")]
    update_public_ip_geolocation_details: Option<String>,

    #[arg(long, env = "HTTP_HOST", default_value = "0.0.0.0")]
    http_host: String,

    #[arg(long, env = "HTTP_PORT", default_value_t = 8080)]
    http_port: u16,

    /// Upper bound on one update cycle, e.g. `60s` or `2m`
    #[arg(long, env = "GEOLOCATION_CYCLE_TIMEOUT", default_value = "60s")]
    cycle_timeout: String,
}

/// Validated process settings.
#[derive(Debug)]
pub(crate) struct Settings {
    pub(crate) recurrence: Recurrence,
    pub(crate) lookup_url: String,
    pub(crate) access_token: String,
    pub(crate) node_name: String,
    pub(crate) update_enabled: bool,
    pub(crate) http_addr: String,
    pub(crate) cycle_timeout: Duration,
}

impl Config {
    pub(crate) fn validate(self) -> Result<Settings, ConfigurationError> {
        match non_blank(self.edge_cluster_type) {
            None => return Err(ConfigurationError::Missing("EDGE_CLUSTER_TYPE")),
            Some(kind) if kind != K3S => {
                return Err(ConfigurationError::UnsupportedClusterType(kind));
            }
            Some(_) => {}
        }

        let recurrence = non_blank(self.cron_spec)
            .ok_or(ConfigurationError::Missing("GEOLOCATION_UPDATER_CRON_SPEC"))?
            .parse()?;
        let node_name =
            non_blank(self.node_name).ok_or(ConfigurationError::Missing("NODE_NAME"))?;
        let lookup_url =
            non_blank(self.ipinfo_url).unwrap_or_else(|| DEFAULT_LOOKUP_URL.to_string());
        let cycle_timeout = parse_go_duration(self.cycle_timeout.trim()).map_err(|reason| {
            ConfigurationError::Invalid {
                name: "GEOLOCATION_CYCLE_TIMEOUT",
                reason,
            }
        })?;
        let update_enabled = non_blank(self.update_public_ip_geolocation_details)
            .is_some_and(|flag| flag == "true");

        Ok(Settings {
            recurrence,
            lookup_url,
            access_token: self.ipinfo_access_token.unwrap_or_default(),
            node_name,
            update_enabled,
            http_addr: format!("{}:{}", self.http_host, self.http_port),
            cycle_timeout,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
