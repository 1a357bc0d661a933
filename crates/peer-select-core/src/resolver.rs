//! Address resolution: turn a registry snapshot into a decision-ready list.
//!
//! One `AddressResolver` exists per registry (static or dynamic); the query
//! logic is shared. Per-location probes run concurrently and are joined in
//! registry order, so the output pairs each result with its own location
//! regardless of completion order. A probe can never fail the batch; only
//! the registry fetch can fail a resolution.

use crate::location::{Location, ResolvedLocation};
use crate::probe::{channel_available_at, facility_available_at, FacilityDirectory, RemoteCatalog};
use crate::query::AddressQuery;
use crate::registry::{FetchOptions, LocationRegistry, RegistryError};
use crate::version::meets_minimum_version;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Failed to fetch locations: {0}")]
    Registry(#[from] RegistryError),
}

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Outcome of a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Resolution {
    /// Every fetched location, annotated with `hasContent`
    Annotated(Vec<ResolvedLocation>),
    /// Locations eligible for local-discovery sync (no annotation)
    Eligible(Vec<Location>),
}

impl Resolution {
    pub fn len(&self) -> usize {
        match self {
            Resolution::Annotated(list) => list.len(),
            Resolution::Eligible(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Location ids in output order.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Resolution::Annotated(list) => list.iter().map(|l| l.id.as_str()).collect(),
            Resolution::Eligible(list) => list.iter().map(|l| l.id.as_str()).collect(),
        }
    }
}

/// Resolves address queries against one location registry.
pub struct AddressResolver<R> {
    registry: R,
    catalog: Arc<dyn RemoteCatalog>,
    facilities: Arc<dyn FacilityDirectory>,
}

impl<R: LocationRegistry> AddressResolver<R> {
    pub fn new(
        registry: R,
        catalog: Arc<dyn RemoteCatalog>,
        facilities: Arc<dyn FacilityDirectory>,
    ) -> Self {
        Self {
            registry,
            catalog,
            facilities,
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Resolve a query into a fresh list.
    pub async fn resolve(&self, query: &AddressQuery) -> Result<Resolution> {
        debug!("Resolving addresses for {} ({:?} registry)", query, self.registry.kind());

        let resolution = match query {
            AddressQuery::Channel(channel_id) => {
                Resolution::Annotated(self.with_channel(channel_id).await?)
            }
            AddressQuery::Facility(facility_id) => {
                Resolution::Annotated(self.with_facility(facility_id).await?)
            }
            AddressQuery::LocalDiscovery => Resolution::Eligible(self.for_local_discovery().await?),
            AddressQuery::Any => Resolution::Annotated(self.with_facility("").await?),
        };

        debug!("Resolved {} location(s) for {}", resolution.len(), query);
        Ok(resolution)
    }

    /// All locations, annotated with whether they expose `channel_id`.
    ///
    /// An empty `channel_id` skips probing and reports reachability instead.
    pub async fn with_channel(&self, channel_id: &str) -> Result<Vec<ResolvedLocation>> {
        let locations = self.registry.fetch_all(FetchOptions::fresh()).await?;

        if channel_id.is_empty() {
            return Ok(annotate_with_reachability(locations));
        }

        let catalog = self.catalog.as_ref();
        let probes = locations.into_iter().map(|location| async move {
            trace!("Probing {} for channel {}", location.id, channel_id);
            let has_content = channel_available_at(catalog, channel_id, &location).await;
            location.resolved(has_content)
        });

        Ok(join_all(probes).await)
    }

    /// Non-subset locations, annotated with whether they host `facility_id`.
    ///
    /// An empty `facility_id` skips probing and reports reachability instead.
    pub async fn with_facility(&self, facility_id: &str) -> Result<Vec<ResolvedLocation>> {
        let locations = self
            .registry
            .fetch_all(FetchOptions::fresh().excluding_subset_devices())
            .await?;

        if facility_id.is_empty() {
            return Ok(annotate_with_reachability(locations));
        }

        let facilities = self.facilities.as_ref();
        let probes = locations.into_iter().map(|location| async move {
            trace!("Probing {} for facility {}", location.id, facility_id);
            let has_content = facility_available_at(facilities, facility_id, &location).await;
            location.resolved(has_content)
        });

        Ok(join_all(probes).await)
    }

    /// Locally discovered locations that are full devices on a compatible version.
    ///
    /// Reachability is not considered. Registries that do not serve discovered
    /// peers always yield an empty list.
    pub async fn for_local_discovery(&self) -> Result<Vec<Location>> {
        if !self.registry.kind().supports_local_discovery() {
            debug!("Local discovery requested against a static registry, returning no locations");
            return Ok(Vec::new());
        }

        let locations = self.registry.fetch_all(FetchOptions::fresh()).await?;
        Ok(locations
            .into_iter()
            .filter(is_local_discovery_candidate)
            .collect())
    }
}

fn annotate_with_reachability(locations: Vec<Location>) -> Vec<ResolvedLocation> {
    locations
        .into_iter()
        .map(|location| {
            let available = location.available;
            location.resolved(available)
        })
        .collect()
}

fn is_local_discovery_candidate(location: &Location) -> bool {
    !location.subset_of_users_device
        && location
            .kolibri_version
            .as_deref()
            .is_some_and(meets_minimum_version)
}
