use crate::address_store::DynAddressStore;
use crate::config::SharedConfig;
use crate::dns::handlers::Handler;
use crate::dns::resolver::Resolver;
use tokio::net::UdpSocket;
use trust_dns_server::ServerFuture;

/// Bind [`Config::dns_udp_bind_addr`][crate::config::Config::dns_udp_bind_addr] and build a
/// DNS server answering from `store`.
///
/// # Errors
///
/// Returns an error if the UDP socket can't be bound.
pub async fn new(
    config: SharedConfig,
    store: DynAddressStore,
) -> anyhow::Result<ServerFuture<Handler>> {
    let socket = UdpSocket::bind(config.dns_udp_bind_addr).await?;
    Ok(with_socket(&config, store, socket))
}

/// Build a DNS server answering from `store` on an already bound socket.
pub fn with_socket(
    config: &SharedConfig,
    store: DynAddressStore,
    socket: UdpSocket,
) -> ServerFuture<Handler> {
    let resolver = Resolver::from_config(config, store);
    let mut dns_server = ServerFuture::new(Handler::new(resolver));
    dns_server.register_socket(socket);
    dns_server
}
