//! Availability probes: does a peer expose a given channel or facility?
//!
//! Each probe is a single best-effort remote call reduced to a boolean.
//! Unreachable peers are never contacted, and every probe failure (not found,
//! transport error, timeout, bad response) collapses to `false`.

use crate::location::Location;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, ProbeError>;

/// Catalog entry for a content channel hosted by a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteChannel {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A facility hosted by a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Facilities reported by a peer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityListing {
    #[serde(default)]
    pub facilities: Vec<FacilityInfo>,
}

impl FacilityListing {
    pub fn contains(&self, facility_id: &str) -> bool {
        self.facilities.iter().any(|f| f.id == facility_id)
    }
}

/// Remote channel catalog lookup, scoped to a peer's base URL.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait RemoteCatalog: Send + Sync {
    /// Fetch one channel entry from the peer at `base_url`
    async fn fetch_channel(
        &self,
        channel_id: &str,
        base_url: &str,
        force_refresh: bool,
    ) -> Result<RemoteChannel>;
}

/// Lists facilities hosted by a known location.
///
/// A successful listing that lacks a facility is not an error; only transport
/// failures are.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait FacilityDirectory: Send + Sync {
    async fn fetch_facilities(&self, location_id: &str) -> Result<FacilityListing>;
}

/// Check whether `location` currently exposes channel `channel_id`.
pub async fn channel_available_at<C>(catalog: &C, channel_id: &str, location: &Location) -> bool
where
    C: RemoteCatalog + ?Sized,
{
    if !location.available {
        return false;
    }

    catalog
        .fetch_channel(channel_id, &location.base_url, true)
        .await
        .is_ok()
}

/// Check whether `location` currently hosts facility `facility_id`.
pub async fn facility_available_at<D>(directory: &D, facility_id: &str, location: &Location) -> bool
where
    D: FacilityDirectory + ?Sized,
{
    if !location.available {
        return false;
    }

    match directory.fetch_facilities(&location.id).await {
        Ok(listing) => listing.contains(facility_id),
        Err(_) => false,
    }
}
