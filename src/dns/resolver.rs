use crate::address_store::{DynAddressStore, LookupError};
use crate::config::{Config, ParseFailurePolicy};
use crate::dns::query::{HostQuery, Suffix};
use crate::dns::response::answer_record;
use tracing::{debug, error, info};
use trust_dns_proto::op::Query;
use trust_dns_proto::rr::{DNSClass, Record, RecordType};

/// The outcome of resolving one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Reply with this single `A` record.
    Answer(Record),
    /// Reply with an authoritative NXDOMAIN and no records.
    NxDomain,
    /// Send no reply at all.
    Drop,
}

/// Resolves `A` questions for `<hostname>.<deployment><suffix>` names against an
/// [`AddressStore`][crate::address_store::AddressStore].
///
/// Holds no mutable state: one resolver is shared by every in-flight request.
#[derive(Clone)]
pub struct Resolver {
    store: DynAddressStore,
    suffix: Suffix,
    strict_suffix: bool,
    on_parse_failure: ParseFailurePolicy,
}

impl Resolver {
    #[must_use]
    pub fn new(store: DynAddressStore, suffix: Suffix) -> Self {
        Resolver {
            store,
            suffix,
            strict_suffix: false,
            on_parse_failure: ParseFailurePolicy::default(),
        }
    }

    #[must_use]
    pub fn from_config(config: &Config, store: DynAddressStore) -> Self {
        Resolver::new(store, config.suffix())
            .strict_suffix(config.strict_suffix)
            .on_parse_failure(config.on_parse_failure)
    }

    #[must_use]
    pub fn strict_suffix(mut self, strict: bool) -> Self {
        self.strict_suffix = strict;
        self
    }

    #[must_use]
    pub fn on_parse_failure(mut self, policy: ParseFailurePolicy) -> Self {
        self.on_parse_failure = policy;
        self
    }

    /// Resolve a single question.
    ///
    /// Only `A`/`IN` questions can be answered; anything else gets NXDOMAIN without consulting
    /// the store. Names that can't be split into a hostname and deployment are answered
    /// according to the configured [`ParseFailurePolicy`]. Lookup failures of any kind,
    /// including a broken store, are answered with NXDOMAIN.
    pub async fn resolve(&self, query: &Query) -> Resolution {
        let name = query.name();
        debug!(
            "question: type={} class={} name={name}",
            query.query_type(),
            query.query_class()
        );

        if query.query_type() != RecordType::A || query.query_class() != DNSClass::IN {
            return Resolution::NxDomain;
        }

        let host = match HostQuery::parse(&name.to_ascii(), &self.suffix, self.strict_suffix) {
            Ok(host) => host,
            Err(err) => {
                info!("{err}");
                return match self.on_parse_failure {
                    ParseFailurePolicy::Nxdomain => Resolution::NxDomain,
                    ParseFailurePolicy::Drop => Resolution::Drop,
                };
            }
        };

        match self.store.lookup(&host.deployment, &host.hostname).await {
            Ok(ip) => {
                debug!("resolved \"{name}\" to {ip}");
                Resolution::Answer(answer_record(name.clone(), ip))
            }
            Err(err @ LookupError::NotFound { .. }) => {
                info!("{err}");
                Resolution::NxDomain
            }
            Err(err @ LookupError::StoreFailure(_)) => {
                error!("{err}");
                Resolution::NxDomain
            }
        }
    }
}
