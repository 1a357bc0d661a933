//! Static address management.
//!
//! Thin helpers over an `AddressStore`: no probing or version gating happens
//! here, and store failures are returned unchanged.

use crate::location::{Location, NewAddress, NewStaticLocation};
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("Address rejected: {0}")]
    Rejected(String),

    #[error("Address not found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, AddressError>;

/// Persistence for manually entered (static) addresses.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait AddressStore: Send + Sync {
    /// Store a new static address, returning the created location
    async fn create(&self, record: &NewStaticLocation) -> Result<Location>;

    /// Delete a static address by location id
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Submit a user-entered address as a new static location.
pub async fn create_address<S>(store: &S, address: &NewAddress) -> Result<Location>
where
    S: AddressStore + ?Sized,
{
    let location = store.create(&NewStaticLocation::from(address)).await?;
    info!("Added static address {} ({})", location.id, location.base_url);
    Ok(location)
}

/// Delete a static address by id.
pub async fn delete_address<S>(store: &S, id: &str) -> Result<()>
where
    S: AddressStore + ?Sized,
{
    store.delete(id).await?;
    info!("Removed static address {}", id);
    Ok(())
}
