//! NixOps DNS
//!
//! A tiny authoritative DNS server that answers `A` queries for the machines of [NixOps]
//! deployments, so that `db1.myapp.ops` resolves to the private IPv4 address of machine `db1`
//! in deployment `myapp` without maintaining any records by hand.
//!
//! Addresses are read straight from the NixOps state file (by default
//! `~/.nixops/deployments.nixops`), which is opened read-only.
//!
//! [NixOps]: https://github.com/NixOS/nixops
//!
#![warn(clippy::pedantic)]

pub mod address_store;
pub mod config;
pub mod dns;
pub mod error;

pub use address_store::{DynAddressStore, InMemoryAddressStore, NixopsStateStore};
pub use config::{Config, SharedConfig};
pub use dns::new as new_dns;
