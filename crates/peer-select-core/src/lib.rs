//! peer-select-core: Resolves which network locations a device can sync with.
//!
//! This crate provides the core functionality for:
//! - Gating peers on a minimum compatible software version
//! - Probing peers for a content channel or a facility
//! - Resolving a registry snapshot into an annotated, decision-ready list
//! - LocationRegistry, RemoteCatalog, FacilityDirectory and AddressStore trait abstractions

pub mod addresses;
pub mod location;
pub mod probe;
pub mod query;
pub mod registry;
pub mod resolver;
pub mod version;

pub use addresses::{create_address, delete_address, AddressError, AddressStore};
pub use location::{Location, NewAddress, NewStaticLocation, ResolvedLocation};
pub use probe::{
    channel_available_at, facility_available_at, FacilityDirectory, FacilityInfo,
    FacilityListing, ProbeError, RemoteCatalog, RemoteChannel,
};
pub use query::AddressQuery;
pub use registry::{FetchOptions, InMemoryRegistry, LocationRegistry, RegistryError, RegistryKind};
pub use resolver::{AddressResolver, Resolution, ResolveError};
pub use version::meets_minimum_version;
