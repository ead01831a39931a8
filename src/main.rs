use anyhow::Result;
use clap::Parser;
use is_terminal::IsTerminal;
use nixops_dns::config::{ConfigOverrides, ParseFailurePolicy};
use nixops_dns::error::Error::DNSError;
use nixops_dns::{Config, DynAddressStore, NixopsStateStore, SharedConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "nixops-dns", version)]
#[command(about = "Resolve NixOps machine names to their private IPv4 addresses")]
struct Cli {
    /// JSON configuration file. Command line options override its values.
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listen address [default: 127.0.0.1:5300]
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Fake domain name to strip from requests, e.g. host.ops -> host if --domain=.ops
    #[arg(long)]
    domain: Option<String>,

    /// NixOps state file [default: ~/.nixops/deployments.nixops]
    #[arg(long, env = "NIXOPS_STATE", value_name = "FILE")]
    state_db: Option<PathBuf>,

    /// Answer NXDOMAIN for names outside --domain instead of looking them up.
    /// `--strict-suffix=false` turns it off again.
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    strict_suffix: Option<bool>,

    /// How to answer names without both a hostname and a deployment
    #[arg(long, value_enum)]
    on_parse_failure: Option<ParseFailurePolicy>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let config = config_init(Cli::parse())?;
    let state_path = config.state_db_path()?;
    let state = NixopsStateStore::open(&state_path).await?;
    tracing::info!("serving addresses from {}", state_path.display());
    let store: DynAddressStore = Arc::new(state.clone());

    let dns_server = nixops_dns::new_dns(config.clone(), store).await?;
    tracing::info!("DNS listening on UDP {}", &config.dns_udp_bind_addr);
    let dns_handle = tokio::spawn(dns_server.block_until_done());

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
        },
        Ok(dns_res) = dns_handle => {
            if let Err(err) = dns_res {
                state.close().await;
                return Err(DNSError(err).into())
            }
        }
    }
    state.close().await;
    tracing::info!("goodbye");
    Ok(())
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal()))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nixops_dns=info".into()),
        )
        .init();
}

fn config_init(cli: Cli) -> Result<SharedConfig> {
    let overrides = ConfigOverrides {
        dns_udp_bind_addr: cli.addr,
        domain: cli.domain,
        state_db_path: cli.state_db,
        strict_suffix: cli.strict_suffix,
        on_parse_failure: cli.on_parse_failure,
    };
    let config = Config::load(cli.config.as_deref(), overrides)?;
    if let Some(config_file) = &cli.config {
        tracing::debug!("loaded config from {}", config_file.display());
    }
    Ok(Arc::new(config))
}
