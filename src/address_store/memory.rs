use crate::address_store::{parse_stored_addr, AddressStore, LookupError};
use std::collections::HashMap;
use std::net::Ipv4Addr;

/// A fixed set of machine addresses held in memory.
///
/// Values are kept as the raw strings a real state file would hold, so lookups go through the
/// same address parsing as [`NixopsStateStore`][super::NixopsStateStore].
#[derive(Default, Debug, Clone)]
pub struct InMemoryAddressStore {
    hosts: HashMap<(String, String), String>,
}

impl InMemoryAddressStore {
    /// Record `value` as the private IPv4 address of `hostname` in `deployment`, replacing any
    /// earlier value.
    pub fn insert(
        &mut self,
        deployment: impl Into<String>,
        hostname: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.hosts
            .insert((deployment.into(), hostname.into()), value.into());
    }

    #[must_use]
    pub fn with_host(
        mut self,
        deployment: impl Into<String>,
        hostname: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.insert(deployment, hostname, value);
        self
    }
}

#[async_trait::async_trait]
impl AddressStore for InMemoryAddressStore {
    async fn lookup(&self, deployment: &str, hostname: &str) -> Result<Ipv4Addr, LookupError> {
        let key = (deployment.to_string(), hostname.to_string());
        match self.hosts.get(&key) {
            None => Err(LookupError::not_found(deployment, hostname)),
            Some(value) => parse_stored_addr(deployment, hostname, value),
        }
    }
}
