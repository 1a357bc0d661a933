//! Command-line arguments.
//!
//! Query selectors are mutually exclusive and mapped once into an
//! `AddressQuery`; everything else becomes a `ClientConfig`.

use clap::{Args, Parser, Subcommand, ValueEnum};
use peer_select_core::{AddressQuery, NewAddress, RegistryKind};
use std::time::Duration;

use crate::config::ClientConfig;

#[derive(Parser, Debug)]
#[command(name = "peer-select")]
#[command(about = "Find network locations to sync channels and facilities with")]
pub struct Cli {
    /// Base URL of the local device API
    #[arg(long, global = true, default_value = "http://127.0.0.1:8080/")]
    pub device_url: String,

    /// Per-request timeout in seconds (bounds how long one peer probe may take)
    #[arg(long, global = true, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Enable verbose logging
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve locations and print them as JSON
    Resolve {
        /// Which location registry to query
        #[arg(long, value_enum, default_value_t = RegistryArg::Dynamic)]
        registry: RegistryArg,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Add a static address
    Add {
        /// Base URL of the peer
        #[arg(long)]
        url: String,

        /// Display name (defaults to the URL)
        #[arg(long)]
        name: Option<String>,
    },

    /// Remove a static address by location id
    Remove {
        /// Location id
        id: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryArg {
    Static,
    Dynamic,
}

impl From<RegistryArg> for RegistryKind {
    fn from(arg: RegistryArg) -> Self {
        match arg {
            RegistryArg::Static => RegistryKind::Static,
            RegistryArg::Dynamic => RegistryKind::Dynamic,
        }
    }
}

/// What to look for. At most one selector may be given.
#[derive(Args, Debug, Clone, Default)]
#[group(required = false, multiple = false)]
pub struct QueryArgs {
    /// Annotate locations with whether they expose this channel ("" = reachability only)
    #[arg(long)]
    pub channel: Option<String>,

    /// Annotate locations with whether they host this facility ("" = reachability only)
    #[arg(long)]
    pub facility: Option<String>,

    /// List locally discovered peers eligible for sync
    #[arg(long)]
    pub lod: bool,
}

impl QueryArgs {
    pub fn to_query(&self) -> AddressQuery {
        if let Some(channel) = &self.channel {
            AddressQuery::channel(channel.clone())
        } else if let Some(facility) = &self.facility {
            AddressQuery::facility(facility.clone())
        } else if self.lod {
            AddressQuery::LocalDiscovery
        } else {
            AddressQuery::Any
        }
    }
}

impl Cli {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_device_url(self.device_url.clone())
            .with_request_timeout(Duration::from_secs(self.timeout_secs))
    }
}

/// Build the address record for `add`, naming it after its URL if no name was given.
pub fn new_address(url: &str, name: Option<&str>) -> NewAddress {
    NewAddress {
        base_url: url.to_string(),
        nickname: name.unwrap_or(url).to_string(),
    }
}
