#![warn(missing_docs)]

//! Helpers around urest that the protocol crates do not need themselves.
//!
//! - [`base32`]: encoding arbitrary bytes for a request's query string
//! - address helpers: resolving a host name or parsing an IP literal

/// Unpadded RFC 4648 base32.
pub mod base32;

pub use base32::Base32Error;

use std::{
    io,
    net::{IpAddr, SocketAddr, ToSocketAddrs},
};

/// Address of `host` on `port`, where `host` is an IP literal or a name.
///
/// Literals never reach the system resolver. For names, the first address the
/// resolver returns is used, whichever family it belongs to.
///
/// ```no_run
/// let server = urest_utilities::resolve_host("lights.local", 4677)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn resolve_host(host: &str, port: u16) -> io::Result<SocketAddr> {
    if let Ok(addr) = parse_ip(host, port) {
        return Ok(addr);
    }
    (host, port).to_socket_addrs()?.next().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, format!("no address found for {}", host))
    })
}

/// Address of an IP literal (`10.0.0.7`, `fe80::1`) on `port`. Names are
/// rejected with `InvalidInput`.
pub fn parse_ip(literal: &str, port: u16) -> io::Result<SocketAddr> {
    let ip: IpAddr = literal.parse().map_err(|err| {
        let message = format!("{:?} is not an IP address: {}", literal, err);
        io::Error::new(io::ErrorKind::InvalidInput, message)
    })?;
    Ok(SocketAddr::new(ip, port))
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, Ipv6Addr};

    use super::*;

    #[test]
    fn test_literals_resolve_to_themselves() {
        let v4 = resolve_host("10.0.0.7", 4677).unwrap();
        assert_eq!(v4, SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)), 4677));

        let v6 = resolve_host("::1", 4677).unwrap();
        assert_eq!(v6, SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 4677));
    }

    #[test]
    fn test_parse_ip_rejects_names() {
        let err = parse_ip("lights.local", 4677).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_unresolvable_name_fails() {
        assert!(resolve_host("no-such-urest-server.invalid", 4677).is_err());
    }
}
