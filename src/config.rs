use crate::dns::query::Suffix;
use crate::error::Error;
use serde::Deserialize;
use std::ffi::OsString;
use std::fs::File;
use std::io::BufReader;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub type SharedConfig = Arc<Config>;

/// Location of the NixOps state file, relative to the user's home directory.
const DEFAULT_STATE_FILE: &str = ".nixops/deployments.nixops";

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 5300));

/// What to do with a query whose name can't be split into a hostname and a deployment.
#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ParseFailurePolicy {
    /// Answer with an authoritative NXDOMAIN, like any other unknown name.
    #[default]
    Nxdomain,
    /// Don't answer at all and let the client time out.
    Drop,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub dns_udp_bind_addr: SocketAddr,
    /// Fake domain stripped from queried names, e.g. `.ops` turns `db1.myapp.ops` into
    /// `db1.myapp`.
    pub domain: String,
    pub state_db_path: Option<PathBuf>,
    /// Reject names that don't end with [`Config::domain`] instead of parsing them whole.
    pub strict_suffix: bool,
    pub on_parse_failure: ParseFailurePolicy,
}

/// Settings given on the command line. Every field that is set replaces the corresponding
/// [`Config`] value, whether that came from a config file or a default.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub dns_udp_bind_addr: Option<SocketAddr>,
    pub domain: Option<String>,
    pub state_db_path: Option<PathBuf>,
    pub strict_suffix: Option<bool>,
    pub on_parse_failure: Option<ParseFailurePolicy>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dns_udp_bind_addr: DEFAULT_BIND_ADDR,
            domain: String::new(),
            state_db_path: None,
            strict_suffix: false,
            on_parse_failure: ParseFailurePolicy::default(),
        }
    }
}

impl Config {
    /// Load a [`Config`] from the JSON file at the given path. Missing keys take their default
    /// values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] if the path can't be opened, or [`Error::InvalidJSON`] if the file
    /// isn't a valid config.
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        Ok(conf)
    }

    /// Load the config file at `path` if one is given, else start from the defaults, then apply
    /// the command line `overrides`.
    ///
    /// # Errors
    ///
    /// See [`Config::try_from_file`].
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, Error> {
        let config = match path {
            Some(path) => Self::try_from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_overrides(overrides))
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(addr) = overrides.dns_udp_bind_addr {
            self.dns_udp_bind_addr = addr;
        }
        if let Some(domain) = overrides.domain {
            self.domain = domain;
        }
        if let Some(path) = overrides.state_db_path {
            self.state_db_path = Some(path);
        }
        if let Some(strict) = overrides.strict_suffix {
            self.strict_suffix = strict;
        }
        if let Some(policy) = overrides.on_parse_failure {
            self.on_parse_failure = policy;
        }
        self
    }

    pub fn suffix(&self) -> Suffix {
        Suffix::new(&self.domain)
    }

    /// The NixOps state file to serve addresses from, falling back to
    /// `$HOME/.nixops/deployments.nixops`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoStateFile`] if no path is configured and `$HOME` is unset.
    pub fn state_db_path(&self) -> Result<PathBuf, Error> {
        match &self.state_db_path {
            Some(path) => Ok(path.clone()),
            None => default_state_db_path(std::env::var_os("HOME")),
        }
    }
}

fn default_state_db_path(home: Option<OsString>) -> Result<PathBuf, Error> {
    match home {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home).join(DEFAULT_STATE_FILE)),
        _ => Err(Error::NoStateFile),
    }
}
