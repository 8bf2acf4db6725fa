use std::{io, net::UdpSocket, time::Duration};

use socket2::Socket as Socket2;

use crate::config::Config;

/// Applies the read timeout and socket options from configuration to a UdpSocket.
///
/// The timeout is what turns a blocking receive into the timeout outcome the
/// exchange drivers rely on.
pub fn apply_socket_options(
    socket: &UdpSocket,
    config: &Config,
    read_timeout: Duration,
) -> io::Result<()> {
    socket.set_nonblocking(false)?;
    socket.set_read_timeout(Some(read_timeout))?;

    // Create socket2::Socket from UdpSocket for advanced options
    let socket2 = Socket2::from(socket.try_clone()?);

    // Apply receive buffer size
    if let Some(size) = config.socket_recv_buffer_size {
        socket2.set_recv_buffer_size(size)?;
    }

    // Apply send buffer size
    if let Some(size) = config.socket_send_buffer_size {
        socket2.set_send_buffer_size(size)?;
    }

    Ok(())
}

/// Returns true for the error kinds a timed-out blocking receive reports.
///
/// Unix reports `WouldBlock`, Windows `TimedOut`.
pub fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}
