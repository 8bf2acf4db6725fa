#![warn(missing_docs)]

//! urest-server: resource registry, dispatcher and exchange handler over a datagram transport.

/// Fixed-capacity request/response buffer handed to handlers.
pub mod body;
/// Resource registry and request dispatch.
pub mod registry;
/// Server exchange handler.
pub mod server;
/// UDP server transport.
pub mod socket;

pub use body::Body;
pub use registry::{Registry, Resource, Route, VerbHandler};
pub use server::{Outcome, Server};
pub use socket::UdpServerTransport;
