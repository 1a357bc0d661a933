//! peer-select: Resolve which network locations this device can sync with.
//!
//! Talks to the local device API for location registries and peer probes,
//! and prints resolved locations as JSON.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use peer_select::cli::{new_address, Cli, Command};
use peer_select::{DeviceClient, HttpRegistry};
use peer_select_core::{
    create_address, delete_address, AddressResolver, FacilityDirectory, RegistryKind,
    RemoteCatalog,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging - respects RUST_LOG env var, defaults to info (or debug with --verbose).
    // Logs go to stderr so stdout stays valid JSON.
    let default_filter = if cli.verbose {
        "debug,peer_select=debug,peer_select_core=debug"
    } else {
        "info,peer_select=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.client_config();
    debug!("Client config: {:?}", config);
    let client = DeviceClient::new(&config).context("failed to create device client")?;

    match cli.command {
        Command::Resolve { registry, query } => {
            let kind = RegistryKind::from(registry);
            let query = query.to_query();
            info!("Resolving {} against {:?} registry at {}", query, kind, client.base_url());

            let catalog: Arc<dyn RemoteCatalog> = Arc::new(client.clone());
            let facilities: Arc<dyn FacilityDirectory> = Arc::new(client.clone());
            let resolver = AddressResolver::new(HttpRegistry::new(client, kind), catalog, facilities);

            let resolution = resolver
                .resolve(&query)
                .await
                .context("could not reach the location registry")?;
            info!("Found {} location(s)", resolution.len());

            println!("{}", serde_json::to_string_pretty(&resolution)?);
        }
        Command::Add { url, name } => {
            let address = new_address(&url, name.as_deref());
            let location = create_address(&client, &address)
                .await
                .with_context(|| format!("failed to add address {}", url))?;
            println!("{}", serde_json::to_string_pretty(&location)?);
        }
        Command::Remove { id } => {
            delete_address(&client, &id)
                .await
                .with_context(|| format!("failed to remove address {}", id))?;
        }
    }

    Ok(())
}
