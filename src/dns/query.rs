//! Splitting queried names into a machine name and a deployment name.

use std::fmt;

/// The fake domain stripped from the end of queried names, held in its fully-qualified form:
/// `.ops` is kept as `.ops.`, and no domain at all as the root `.`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suffix(String);

impl Suffix {
    /// Normalise a configured domain. `.ops`, `ops` and `ops.` are all the same suffix.
    #[must_use]
    pub fn new(domain: &str) -> Self {
        let domain = domain.trim_matches('.');
        if domain.is_empty() {
            Suffix(".".to_string())
        } else {
            Suffix(format!(".{domain}."))
        }
    }

    /// Remove the suffix from the end of `name`, ignoring ASCII case. Returns `None` if `name`
    /// doesn't end with it.
    fn strip<'a>(&self, name: &'a str) -> Option<&'a str> {
        let split = name.len().checked_sub(self.0.len())?;
        let tail = name.as_bytes().get(split..)?;
        if tail.eq_ignore_ascii_case(self.0.as_bytes()) {
            name.get(..split)
        } else {
            None
        }
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A queried name that has been split into the machine to look up and the deployment it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostQuery {
    pub hostname: String,
    pub deployment: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The name left after removing the suffix doesn't have both a hostname and a deployment.
    #[error("query \"{0}\" should contain both a hostname and a deployment name")]
    InsufficientLabels(String),

    /// The name doesn't end with the configured suffix and suffixes are enforced.
    #[error("query \"{name}\" is not within \"{suffix}\"")]
    OutsideDomain { name: String, suffix: Suffix },
}

impl HostQuery {
    /// Split a fully-qualified queried name into a [`HostQuery`].
    ///
    /// The suffix is removed from the end of `qname` and the remainder split on `.`: the first
    /// label is the hostname and the rest, joined back with `.`, the deployment. So with suffix
    /// `.ops`, `db1.staging.myapp.ops.` is host `db1` in deployment `staging.myapp`.
    ///
    /// A name that doesn't end with the suffix is split whole unless `strict` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InsufficientLabels`] if fewer than two labels remain, and
    /// [`ParseError::OutsideDomain`] for names outside the suffix when `strict` is set.
    pub fn parse(qname: &str, suffix: &Suffix, strict: bool) -> Result<Self, ParseError> {
        let remainder = match suffix.strip(qname) {
            Some(remainder) => remainder,
            None if strict => {
                return Err(ParseError::OutsideDomain {
                    name: qname.to_string(),
                    suffix: suffix.clone(),
                })
            }
            None => qname,
        };

        match remainder.split_once('.') {
            Some((hostname, deployment)) => Ok(HostQuery {
                hostname: hostname.to_string(),
                deployment: deployment.to_string(),
            }),
            None => Err(ParseError::InsufficientLabels(qname.to_string())),
        }
    }
}
