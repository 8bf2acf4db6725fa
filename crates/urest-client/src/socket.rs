use std::{
    io,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4, ToSocketAddrs, UdpSocket},
    time::{Duration, Instant},
};

use tracing::trace;
use urest_core::{
    config::Config,
    error::Result,
    socket::{apply_socket_options, is_timeout},
    transport::{ClientTransport, Received},
};

/// UDP endpoint for clients.
///
/// Each exchange waits at most `Config::client_receive_timeout` for its reply.
/// Datagrams from anyone but the addressed server are discarded and do not
/// extend the wait.
#[derive(Debug)]
pub struct UdpClientTransport {
    socket: UdpSocket,
    timeout: Duration,
}

impl UdpClientTransport {
    /// Binds to an ephemeral port on all IPv4 interfaces.
    pub fn bind_any(config: &Config) -> Result<Self> {
        let address = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0);
        Self::bind(address, config)
    }

    /// Binds a new socket to the specified address.
    pub fn bind<A: ToSocketAddrs>(addresses: A, config: &Config) -> Result<Self> {
        let socket = UdpSocket::bind(addresses)?;
        apply_socket_options(&socket, config, config.client_receive_timeout)?;
        Ok(Self { socket, timeout: config.client_receive_timeout })
    }

    /// Returns the local socket address this transport is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

impl ClientTransport for UdpClientTransport {
    fn exchange(&self, addr: &SocketAddr, request: &[u8], reply: &mut [u8]) -> io::Result<Received> {
        let deadline = Instant::now() + self.timeout;
        self.socket.set_read_timeout(Some(self.timeout))?;
        self.socket.send_to(request, addr)?;
        loop {
            match self.socket.recv_from(reply) {
                Ok((len, from)) if from == *addr => return Ok(Received::Datagram(len)),
                Ok((len, from)) => {
                    trace!("Discarding {} bytes from {}", len, from);
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Ok(Received::Timeout);
                    }
                    self.socket.set_read_timeout(Some(remaining))?;
                }
                Err(err) if is_timeout(&err) => return Ok(Received::Timeout),
                Err(err) => return Err(err),
            }
        }
    }
}
