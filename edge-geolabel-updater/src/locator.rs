use async_trait::async_trait;
use reqwest::header;

use super::*;

pub const DEFAULT_LOOKUP_URL: &str = "https://ipinfo.io";

/// Source of the node's public IP and location.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Locate: Send + Sync {
    async fn fetch(&self) -> Result<GeolocationRecord, FetchError>;
}

/// Looks the node up with a single GET against an ipinfo-style service.
///
/// There is no retry, a failed lookup waits for the next scheduled cycle.
#[derive(Debug, Clone)]
pub struct GeoLocator {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl GeoLocator {
    /// `token` is sent as a bearer credential unless it is blank.
    pub fn new(url: impl ToString, token: impl ToString) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(FetchError::Transport)?;
        Ok(Self::with_client(client, url, token))
    }

    pub fn with_client(client: reqwest::Client, url: impl ToString, token: impl ToString) -> Self {
        let url = url.to_string();
        let token = Some(token.to_string()).filter(|token| !token.trim().is_empty());
        Self { client, url, token }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn lookup(&self) -> Result<GeolocationRecord, FetchError> {
        let mut request = self
            .client
            .get(&self.url)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(FetchError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        response.json().await.map_err(FetchError::Decode)
    }
}

#[async_trait]
impl Locate for GeoLocator {
    async fn fetch(&self) -> Result<GeolocationRecord, FetchError> {
        self.lookup()
            .await
            .inspect(|record| tracing::debug!(url = %self.url, ?record, "Fetched geolocation"))
            .inspect_err(|err| tracing::error!(url = %self.url, ?err, "Failed to fetch geolocation"))
    }
}
