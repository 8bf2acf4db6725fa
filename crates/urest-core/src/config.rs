use std::{default::Default, time::Duration};

use crate::constants::{DEFAULT_MAX_REQUEST_LEN, DEFAULT_RETRY_BUDGET, MAX_FRAME_SIZE};

#[derive(Clone, Debug)]
/// Configuration options to tune protocol and transport behavior.
pub struct Config {
    /// Max length of a reassembled request. Longer requests are answered with 414.
    ///
    /// Also bounds the response a handler may write back.
    pub max_request_len: usize,
    /// Max number of response bytes a client session keeps; the rest is dropped.
    pub max_response_len: usize,
    /// Mismatched or missing fragments tolerated over a whole exchange.
    pub retry_budget: u8,
    /// How long a server blocks waiting for a datagram before reporting a timeout.
    pub server_receive_timeout: Duration,
    /// How long a client blocks waiting for a reply before the exchange fails.
    pub client_receive_timeout: Duration,
    /// Size of the datagram scratch buffer; must hold the largest frame.
    pub max_datagram_size: usize,
    /// Socket receive buffer size in bytes (None = use system default).
    /// Corresponds to SO_RCVBUF socket option.
    pub socket_recv_buffer_size: Option<usize>,
    /// Socket send buffer size in bytes (None = use system default).
    /// Corresponds to SO_SNDBUF socket option.
    pub socket_send_buffer_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_request_len: DEFAULT_MAX_REQUEST_LEN,
            max_response_len: 1024,
            retry_budget: DEFAULT_RETRY_BUDGET,
            server_receive_timeout: Duration::from_millis(100),
            client_receive_timeout: Duration::from_millis(500),
            max_datagram_size: MAX_FRAME_SIZE,
            socket_recv_buffer_size: None, // Use system default
            socket_send_buffer_size: None, // Use system default
        }
    }
}
