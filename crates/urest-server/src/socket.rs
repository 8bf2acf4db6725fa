use std::{
    io,
    net::{SocketAddr, ToSocketAddrs, UdpSocket},
};

use urest_core::{
    config::Config,
    error::Result,
    socket::{apply_socket_options, is_timeout},
    transport::{Received, ServerTransport},
};

use crate::{registry::Registry, server::Server};

/// UDP endpoint for a server: blocking receives bounded by
/// `Config::server_receive_timeout`, replies to whoever spoke last.
#[derive(Debug)]
pub struct UdpServerTransport {
    socket: UdpSocket,
    peer: Option<SocketAddr>,
}

impl UdpServerTransport {
    /// Binds a new socket to the specified address.
    pub fn bind<A: ToSocketAddrs>(addresses: A, config: &Config) -> Result<Self> {
        let socket = UdpSocket::bind(addresses)?;
        Self::from_socket(socket, config)
    }

    /// Wraps an already bound socket.
    pub fn from_socket(socket: UdpSocket, config: &Config) -> Result<Self> {
        apply_socket_options(&socket, config, config.server_receive_timeout)?;
        Ok(Self { socket, peer: None })
    }

    /// Returns the local socket address this transport is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Sender of the most recent datagram.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }
}

impl ServerTransport for UdpServerTransport {
    fn receive(&mut self, buffer: &mut [u8]) -> io::Result<Received> {
        match self.socket.recv_from(buffer) {
            Ok((len, address)) => {
                self.peer = Some(address);
                Ok(Received::Datagram(len))
            }
            Err(err) if is_timeout(&err) => Ok(Received::Timeout),
            Err(err) => Err(err),
        }
    }

    fn send(&mut self, payload: &[u8]) -> io::Result<()> {
        let peer = self
            .peer
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no datagram received yet"))?;
        self.socket.send_to(payload, peer)?;
        Ok(())
    }
}

impl Server<UdpServerTransport> {
    /// Creates a server listening on the specified address.
    pub fn bind<A: ToSocketAddrs>(addresses: A, registry: Registry, config: Config) -> Result<Self> {
        let transport = UdpServerTransport::bind(addresses, &config)?;
        Ok(Server::with_config(transport, registry, config))
    }

    /// Returns the local socket address the server listens on.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.transport().local_addr()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn config() -> Config {
        let mut config = Config::default();
        config.server_receive_timeout = Duration::from_millis(20);
        config
    }

    #[test]
    fn test_receive_times_out() {
        let mut transport = UdpServerTransport::bind("127.0.0.1:0", &config()).unwrap();
        let mut buffer = [0u8; 64];
        assert_eq!(transport.receive(&mut buffer).unwrap(), Received::Timeout);
        assert_eq!(transport.peer_addr(), None);
    }

    #[test]
    fn test_send_before_receive_fails() {
        let mut transport = UdpServerTransport::bind("127.0.0.1:0", &config()).unwrap();
        let err = transport.send(b"hello").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }

    #[test]
    fn test_replies_go_to_last_sender() {
        let mut transport = UdpServerTransport::bind("127.0.0.1:0", &config()).unwrap();
        let server_addr = transport.local_addr().unwrap();

        let client = UdpSocket::bind("127.0.0.1:0").unwrap();
        client.set_read_timeout(Some(Duration::from_secs(1))).unwrap();
        client.send_to(b"ping", server_addr).unwrap();

        let mut buffer = [0u8; 64];
        assert_eq!(transport.receive(&mut buffer).unwrap(), Received::Datagram(4));
        assert_eq!(&buffer[..4], b"ping");
        assert_eq!(transport.peer_addr(), Some(client.local_addr().unwrap()));

        transport.send(b"pong").unwrap();
        let (len, from) = client.recv_from(&mut buffer).unwrap();
        assert_eq!(&buffer[..len], b"pong");
        assert_eq!(from, server_addr);
    }

    #[test]
    fn test_server_bind_reports_address() {
        let server = Server::bind("127.0.0.1:0", Registry::new(), config()).unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
    }
}
