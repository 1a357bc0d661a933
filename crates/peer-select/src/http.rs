//! HTTP collaborators backed by the local device's REST API.
//!
//! The device keeps the location registries and proxies catalog lookups to
//! remote peers, so every call here goes to one base URL:
//! - `api/discovery/staticnetworklocation/` - static registry and address CRUD
//! - `api/discovery/dynamicnetworklocation/` - locally discovered peers
//! - `api/discovery/remotechannel/{id}/?baseurl=` - channel lookup on a peer
//! - `api/discovery/networklocation_facilities/{id}/` - facilities on a peer

use async_trait::async_trait;
use peer_select_core::addresses::{self, AddressError, AddressStore};
use peer_select_core::probe::{
    self, FacilityDirectory, FacilityListing, ProbeError, RemoteCatalog, RemoteChannel,
};
use peer_select_core::registry::{
    self, FetchOptions, LocationRegistry, RegistryError, RegistryKind,
};
use peer_select_core::{Location, NewStaticLocation};
use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::config::ClientConfig;

const STATIC_LOCATIONS: &str = "staticnetworklocation";
const DYNAMIC_LOCATIONS: &str = "dynamicnetworklocation";
const REMOTE_CHANNEL: &str = "remotechannel";
const LOCATION_FACILITIES: &str = "networklocation_facilities";

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Invalid device URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(StatusCode),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, HttpError>;

impl HttpError {
    fn is_not_found(&self) -> bool {
        matches!(self, HttpError::Status(StatusCode::NOT_FOUND))
    }
}

impl From<HttpError> for RegistryError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Decode(msg) => RegistryError::InvalidResponse(msg),
            HttpError::Status(status) => RegistryError::Unavailable(status.to_string()),
            other => RegistryError::Transport(other.to_string()),
        }
    }
}

impl From<HttpError> for ProbeError {
    fn from(e: HttpError) -> Self {
        if e.is_not_found() {
            return ProbeError::NotFound(e.to_string());
        }
        match e {
            HttpError::Decode(msg) => ProbeError::InvalidResponse(msg),
            other => ProbeError::Transport(other.to_string()),
        }
    }
}

impl From<HttpError> for AddressError {
    fn from(e: HttpError) -> Self {
        if e.is_not_found() {
            return AddressError::NotFound(e.to_string());
        }
        match e {
            HttpError::Status(status) if status.is_client_error() => {
                AddressError::Rejected(status.to_string())
            }
            other => AddressError::Transport(other.to_string()),
        }
    }
}

/// Client for the device API. Cheap to clone (shares the connection pool).
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: Client,
    base_url: Url,
}

impl DeviceClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.device_url)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {}", config.device_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(HttpError::InvalidUrl(config.device_url.clone()));
        }

        // The device API is local, so system proxies are never used
        let http = Client::builder()
            .no_proxy()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `<base>/api/discovery/<segments...>/`, percent-encoding each segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| HttpError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["api", "discovery"])
            .extend(segments)
            .push("");
        Ok(url)
    }

    /// URL of a registry listing, with the subset-of-users filter applied server-side.
    pub fn registry_url(&self, kind: RegistryKind, options: FetchOptions) -> Result<Url> {
        let collection = match kind {
            RegistryKind::Static => STATIC_LOCATIONS,
            RegistryKind::Dynamic => DYNAMIC_LOCATIONS,
        };
        let mut url = self.endpoint(&[collection])?;
        if options.exclude_subset_of_users_device {
            url.query_pairs_mut()
                .append_pair("subset_of_users_device", "false");
        }
        Ok(url)
    }

    /// URL of a channel lookup proxied to the peer at `peer_base_url`.
    pub fn remote_channel_url(&self, channel_id: &str, peer_base_url: &str) -> Result<Url> {
        let mut url = self.endpoint(&[REMOTE_CHANNEL, channel_id])?;
        url.query_pairs_mut().append_pair("baseurl", peer_base_url);
        Ok(url)
    }

    pub fn facilities_url(&self, location_id: &str) -> Result<Url> {
        self.endpoint(&[LOCATION_FACILITIES, location_id])
    }

    pub fn static_location_url(&self, id: Option<&str>) -> Result<Url> {
        match id {
            Some(id) => self.endpoint(&[STATIC_LOCATIONS, id]),
            None => self.endpoint(&[STATIC_LOCATIONS]),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, force_refresh: bool) -> Result<T> {
        let mut request = self.http.get(url);
        if force_refresh {
            request = request.header(CACHE_CONTROL, "no-cache");
        }
        decode(send(request).await?).await
    }
}

async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(HttpError::Status(status));
    }
    Ok(response)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| HttpError::Decode(e.to_string()))
}

#[async_trait]
impl RemoteCatalog for DeviceClient {
    async fn fetch_channel(
        &self,
        channel_id: &str,
        base_url: &str,
        force_refresh: bool,
    ) -> probe::Result<RemoteChannel> {
        let url = self.remote_channel_url(channel_id, base_url)?;
        self.get_json(url, force_refresh).await.map_err(|e| {
            debug!("Channel {} lookup at {} failed: {}", channel_id, base_url, e);
            ProbeError::from(e)
        })
    }
}

#[async_trait]
impl FacilityDirectory for DeviceClient {
    async fn fetch_facilities(&self, location_id: &str) -> probe::Result<FacilityListing> {
        let url = self.facilities_url(location_id)?;
        self.get_json(url, true).await.map_err(|e| {
            debug!("Facility listing for {} failed: {}", location_id, e);
            ProbeError::from(e)
        })
    }
}

#[async_trait]
impl AddressStore for DeviceClient {
    async fn create(&self, record: &NewStaticLocation) -> addresses::Result<Location> {
        let url = self.static_location_url(None)?;
        let response = send(self.http.post(url).json(record)).await?;
        decode(response).await.map_err(|e| match e {
            HttpError::Decode(msg) => AddressError::Transport(msg),
            other => AddressError::from(other),
        })
    }

    async fn delete(&self, id: &str) -> addresses::Result<()> {
        let url = self.static_location_url(Some(id))?;
        send(self.http.delete(url)).await?;
        Ok(())
    }
}

/// A static or dynamic location registry on the device.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    client: DeviceClient,
    kind: RegistryKind,
}

impl HttpRegistry {
    pub fn new(client: DeviceClient, kind: RegistryKind) -> Self {
        Self { client, kind }
    }
}

#[async_trait]
impl LocationRegistry for HttpRegistry {
    fn kind(&self) -> RegistryKind {
        self.kind
    }

    async fn fetch_all(&self, options: FetchOptions) -> registry::Result<Vec<Location>> {
        let url = self.client.registry_url(self.kind, options)?;
        debug!("Fetching {:?} locations from {}", self.kind, url);
        Ok(self.client.get_json(url, options.force_refresh).await?)
    }
}
