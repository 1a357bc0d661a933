//! LocationRegistry trait for listing known network locations.
//!
//! Implementations:
//! - `InMemoryRegistry` - For testing and offline snapshots
//! - `HttpRegistry` (in peer-select) - Reads the device's static or dynamic location API

use crate::location::Location;
use async_trait::async_trait;
use std::sync::{Mutex, RwLock};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Registry unavailable: {0}")]
    Unavailable(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid registry response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Which set of locations a registry serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryKind {
    /// Manually configured, persisted addresses
    Static,
    /// Peers discovered on the local network
    Dynamic,
}

impl RegistryKind {
    /// Local discovery results only make sense against discovered peers.
    pub fn supports_local_discovery(self) -> bool {
        matches!(self, RegistryKind::Dynamic)
    }
}

/// Options for a registry fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchOptions {
    /// Bypass any cache held by the registry
    pub force_refresh: bool,
    /// Ask the registry to leave out subset-of-users devices
    pub exclude_subset_of_users_device: bool,
}

impl FetchOptions {
    /// A forced fetch with no filters.
    pub fn fresh() -> Self {
        Self {
            force_refresh: true,
            exclude_subset_of_users_device: false,
        }
    }

    /// Also filter out subset-of-users devices at fetch time.
    pub fn excluding_subset_devices(mut self) -> Self {
        self.exclude_subset_of_users_device = true;
        self
    }
}

/// Source of location snapshots.
///
/// Must honor `force_refresh` by bypassing any internal cache, and must apply
/// `exclude_subset_of_users_device` itself rather than leave it to the caller.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait LocationRegistry: Send + Sync {
    /// Which set of locations this registry serves
    fn kind(&self) -> RegistryKind;

    /// Fetch all locations, in registry order
    async fn fetch_all(&self, options: FetchOptions) -> Result<Vec<Location>>;
}

// Lets a registry be shared between resolvers and tests
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<T: LocationRegistry + ?Sized> LocationRegistry for std::sync::Arc<T> {
    fn kind(&self) -> RegistryKind {
        (**self).kind()
    }

    async fn fetch_all(&self, options: FetchOptions) -> Result<Vec<Location>> {
        (**self).fetch_all(options).await
    }
}

/// In-memory registry for testing and offline snapshots.
///
/// Records every fetch so callers can check which filters were requested.
pub struct InMemoryRegistry {
    kind: RegistryKind,
    locations: RwLock<Vec<Location>>,
    /// When set, every fetch fails with this message
    failure: RwLock<Option<String>>,
    fetches: Mutex<Vec<FetchOptions>>,
}

impl InMemoryRegistry {
    pub fn new(kind: RegistryKind, locations: Vec<Location>) -> Self {
        Self {
            kind,
            locations: RwLock::new(locations),
            failure: RwLock::new(None),
            fetches: Mutex::new(Vec::new()),
        }
    }

    pub fn new_static(locations: Vec<Location>) -> Self {
        Self::new(RegistryKind::Static, locations)
    }

    pub fn new_dynamic(locations: Vec<Location>) -> Self {
        Self::new(RegistryKind::Dynamic, locations)
    }

    /// Replace the stored snapshot.
    pub fn set_locations(&self, locations: Vec<Location>) {
        *self.locations.write().unwrap_or_else(|e| e.into_inner()) = locations;
    }

    /// Make subsequent fetches fail (None restores normal behavior).
    pub fn set_failure(&self, message: Option<&str>) {
        *self.failure.write().unwrap_or_else(|e| e.into_inner()) = message.map(str::to_string);
    }

    /// Options of every fetch made so far, oldest first.
    pub fn fetches(&self) -> Vec<FetchOptions> {
        self.fetches.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl LocationRegistry for InMemoryRegistry {
    fn kind(&self) -> RegistryKind {
        self.kind
    }

    async fn fetch_all(&self, options: FetchOptions) -> Result<Vec<Location>> {
        self.fetches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(options);

        if let Some(message) = self.failure.read().unwrap_or_else(|e| e.into_inner()).clone() {
            return Err(RegistryError::Unavailable(message));
        }

        let locations = self.locations.read().unwrap_or_else(|e| e.into_inner());
        Ok(locations
            .iter()
            .filter(|l| !(options.exclude_subset_of_users_device && l.subset_of_users_device))
            .cloned()
            .collect())
    }
}
