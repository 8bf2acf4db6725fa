//! Transport abstraction for pluggable I/O.

use std::{io::Result, net::SocketAddr};

/// Outcome of a blocking receive bounded by a transport-level timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received {
    /// A datagram of the given length was written to the front of the buffer.
    Datagram(usize),
    /// Nothing arrived before the timeout elapsed.
    Timeout,
}

/// Datagram endpoint used by the server exchange handler.
///
/// Replies always go to the sender of the most recently received datagram.
pub trait ServerTransport {
    /// Blocks for one datagram, up to the transport's timeout.
    fn receive(&mut self, buffer: &mut [u8]) -> Result<Received>;

    /// Sends one datagram to the last peer heard from.
    fn send(&mut self, payload: &[u8]) -> Result<()>;
}

/// Datagram endpoint used by the client exchange driver.
///
/// Every send is immediately followed by a blocking receive (stop-and-wait),
/// so both are one call. Takes `&self` so several sessions can share one socket.
pub trait ClientTransport {
    /// Sends `request` to `addr` and waits for one reply datagram.
    fn exchange(&self, addr: &SocketAddr, request: &[u8], reply: &mut [u8]) -> Result<Received>;
}
