//! DNS server for NixOps machine names.
//!
//! # Names
//!
//! Every `A` class query is answered from the NixOps state file. The queried name is split
//! into a machine name and a deployment name after removing the configured
//! [`Config::domain`][`crate::config::Config::domain`]: the first label is the machine, the
//! remaining labels are the deployment.
//!
//! E.g. with config:
//! ```json
//! {
//!   "domain": ".ops",
//!   ...
//! }
//! ```
//!
//! and a deployment called `myapp` containing a machine `db1` with private IPv4 `10.0.0.5`,
//! an `A` class query for `db1.myapp.ops` would return:
//!
//! ```bash
//! ❯ dig @127.0.0.1 -p 5300 +short db1.myapp.ops A
//! 10.0.0.5
//! ```
//!
//! Deployment names may themselves contain dots: `db1.staging.myapp.ops` is the machine
//! `db1` in the deployment `staging.myapp`.
//!
//! Answers always carry a single record with a TTL of 30 seconds. The state file is consulted
//! for every query; nothing is cached.
//!
//! # Negative answers
//!
//! An authoritative NXDOMAIN is returned for:
//!
//! * queries of any type or class other than `A`/`IN`,
//! * names naming no machine of a known deployment, or a machine without a private IPv4,
//! * names that can't be split into a machine and a deployment, e.g. `onlyonelabel.ops`,
//!   unless [`Config::on_parse_failure`][`crate::config::Config::on_parse_failure`] is
//!   `"drop"`, in which case no reply is sent,
//! * names outside the domain when
//!   [`Config::strict_suffix`][`crate::config::Config::strict_suffix`] is set,
//! * any lookup that fails because the state file can't be read.
//!
//! Requests that aren't standard queries are answered with NOTIMP.

mod handlers;
pub mod query;
pub mod resolver;
pub mod response;
pub mod server;

pub use handlers::Handler;
pub use resolver::{Resolution, Resolver};
pub use server::new;
