//! Network location data model.
//!
//! `Location` mirrors the device's registry records (snake_case JSON);
//! `ResolvedLocation` is the same record annotated with `hasContent` once a
//! resolution has decided whether the queried resource is present.

use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// A discoverable peer, as reported by a location registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Unique location identifier
    pub id: String,
    /// Human-readable name
    #[serde(default)]
    pub nickname: String,
    /// Base network address of the peer
    pub base_url: String,
    /// Whether the peer is currently reachable at the transport level
    #[serde(default)]
    pub available: bool,
    /// Whether the peer is a restricted mirror of a subset of this device's users
    #[serde(default)]
    pub subset_of_users_device: bool,
    /// Dotted software version reported by the peer (None if unknown)
    #[serde(default)]
    pub kolibri_version: Option<String>,
}

impl Location {
    /// Create a reachable, full (non-subset) location with no known version.
    pub fn new(id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nickname: String::new(),
            base_url: base_url.into(),
            available: true,
            subset_of_users_device: false,
            kolibri_version: None,
        }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = nickname.into();
        self
    }

    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    pub fn with_subset_of_users_device(mut self, subset: bool) -> Self {
        self.subset_of_users_device = subset;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.kolibri_version = Some(version.into());
        self
    }

    /// Annotate this location with a resolved content flag.
    pub fn resolved(self, has_content: bool) -> ResolvedLocation {
        ResolvedLocation {
            location: self,
            has_content,
        }
    }
}

/// A location annotated with whether it exposes the queried resource.
///
/// Serializes as the flattened location plus a `hasContent` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    #[serde(flatten)]
    pub location: Location,
    /// Peer currently exposes the queried channel or facility
    #[serde(rename = "hasContent")]
    pub has_content: bool,
}

impl Deref for ResolvedLocation {
    type Target = Location;

    fn deref(&self) -> &Location {
        &self.location
    }
}

/// An address entered by the user, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    /// Base URL of the peer
    pub base_url: String,
    /// Display name chosen by the user
    pub nickname: String,
}

/// Record submitted to the static registry when creating an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStaticLocation {
    pub base_url: String,
    pub device_name: String,
}

impl From<&NewAddress> for NewStaticLocation {
    fn from(address: &NewAddress) -> Self {
        Self {
            base_url: address.base_url.clone(),
            device_name: address.nickname.clone(),
        }
    }
}
