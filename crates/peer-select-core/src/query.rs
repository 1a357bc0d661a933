//! Address query modes.

use std::fmt::{self, Display, Formatter};

/// What a resolution is looking for.
///
/// An empty channel or facility id means "no specific resource": locations are
/// annotated with their reachability instead of being probed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AddressQuery {
    /// Peers exposing a content channel
    Channel(String),
    /// Peers hosting a facility (subset-of-users devices never qualify)
    Facility(String),
    /// Locally discovered peers eligible for sync, with no probing
    LocalDiscovery,
    /// Any online peer
    #[default]
    Any,
}

impl AddressQuery {
    pub fn channel(id: impl Into<String>) -> Self {
        Self::Channel(id.into())
    }

    pub fn facility(id: impl Into<String>) -> Self {
        Self::Facility(id.into())
    }

    /// The resource id to probe for, if this query needs probing at all.
    pub fn probe_target(&self) -> Option<&str> {
        match self {
            Self::Channel(id) | Self::Facility(id) if !id.is_empty() => Some(id.as_str()),
            _ => None,
        }
    }
}

impl Display for AddressQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel(id) if id.is_empty() => write!(f, "channel (any)"),
            Self::Channel(id) => write!(f, "channel {id}"),
            Self::Facility(id) if id.is_empty() => write!(f, "facility (any)"),
            Self::Facility(id) => write!(f, "facility {id}"),
            Self::LocalDiscovery => write!(f, "local discovery"),
            Self::Any => write!(f, "any"),
        }
    }
}
