//! Error types.

use std::path::PathBuf;
use trust_dns_server::proto::error::ProtoError;

/// Error enumerates the process-level NixOps DNS error states.
///
/// Per-query failures are not represented here: they are
/// [`LookupError`][crate::address_store::LookupError]s and
/// [`ParseError`][crate::dns::query::ParseError]s, which the
/// [resolver][crate::dns::resolver::Resolver] turns into negative answers.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when no state file location was configured and `$HOME` is unset, so the
    /// default `~/.nixops/deployments.nixops` location can't be derived.
    #[error("no NixOps state file configured and $HOME is not set")]
    NoStateFile,

    /// Returned when the NixOps state file can't be opened read-only.
    #[error("unable to open NixOps state file {path:?}")]
    StateFile {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when a [config file][crate::config::Config::try_from_file] contains invalid
    /// JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),

    /// Returned when the DNS server encounters a generic DNS protocol error.
    #[error("DNS error")]
    DNSError(#[from] ProtoError),
}
