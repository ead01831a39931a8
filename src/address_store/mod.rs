//! Machine address lookup.
//!
//! Supports a generic, read-only interface for finding the private IPv4 address of a machine
//! by the name of the NixOps deployment it belongs to and its own resource name.
//!
//! Two implementations are provided, [`sqlite::NixopsStateStore`] and
//! [`memory::InMemoryAddressStore`]. The former reads the NixOps state file that `nixops`
//! maintains on disk. The latter holds a fixed set of records and is useful for tests.

use async_trait::async_trait;
use std::net::{AddrParseError, Ipv4Addr};
use std::sync::Arc;

pub mod memory;
pub mod sqlite;

#[allow(clippy::module_name_repetitions)]
pub use memory::InMemoryAddressStore;
pub use sqlite::NixopsStateStore;

/// `DynAddressStore` is a type alias for an [`AddressStore`] shared between concurrent
/// request handlers through an [`Arc`]. Stores are never written to, so no lock is needed.
#[allow(clippy::module_name_repetitions)]
pub type DynAddressStore = Arc<dyn AddressStore + Send + Sync>;

/// Returned when an address can't be produced for a (deployment, hostname) pair.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The deployment doesn't exist, or has no machine by that name with a private IPv4.
    #[error("host \"{hostname}\" not found in deployment \"{deployment}\"")]
    NotFound {
        deployment: String,
        hostname: String,
    },

    /// The store couldn't be queried, or holds a value that isn't an IPv4 address.
    #[error("state store failure: {0}")]
    StoreFailure(String),
}

impl LookupError {
    pub(crate) fn not_found(deployment: &str, hostname: &str) -> Self {
        LookupError::NotFound {
            deployment: deployment.to_string(),
            hostname: hostname.to_string(),
        }
    }
}

/// An async trait describing read-only lookups of machine addresses, keyed by deployment
/// name and machine name.
#[async_trait]
pub trait AddressStore {
    /// Get the private IPv4 address of `hostname` in `deployment`. Every call consults the
    /// backing store; results are never cached.
    async fn lookup(&self, deployment: &str, hostname: &str) -> Result<Ipv4Addr, LookupError>;
}

/// Parse an address value as stored. A value that isn't a dotted-quad IPv4 address means the
/// store is corrupt, not that the host is missing.
pub(crate) fn parse_stored_addr(
    deployment: &str,
    hostname: &str,
    value: &str,
) -> Result<Ipv4Addr, LookupError> {
    value.trim().parse().map_err(|err: AddrParseError| {
        LookupError::StoreFailure(format!(
            "invalid privateIpv4 {value:?} for host \"{hostname}\" in deployment \"{deployment}\": {err}"
        ))
    })
}
