#![warn(missing_docs)]

//! urest-client: drives request/response exchanges against a urest server.

/// Client exchange driver.
pub mod session;
/// UDP client transport.
pub mod socket;

pub use session::Session;
pub use socket::UdpClientTransport;
