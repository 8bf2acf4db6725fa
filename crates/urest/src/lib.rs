#![warn(missing_docs)]

//! urest: REST verbs (GET, POST, PUT, DELETE) over an unreliable,
//! MTU-constrained datagram channel.
//!
//! This crate re-exports the surface needed to run a server or a client:
//!
//! - Server side: `Server`, `Registry`, `Resource`, `Body`
//! - Client side: `Session`
//! - Transports: `UdpServerTransport`, `UdpClientTransport`, or your own
//!   `ServerTransport` / `ClientTransport`
//! - Protocol types: `FragmentSize`, `Verb`, `Status`, `StatusCode`
//! - Core configuration (`Config`) and errors (`ErrorKind`)
//!
//! Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use urest::prelude::*;
//!
//! let mut registry = Registry::new();
//! registry.register(
//!     Resource::new("light1", "/lights/light1")
//!         .with_handler(Verb::Get, |_body: &mut Body| {})?
//!         .with_handler(Verb::Put, |body: &mut Body| {
//!             let _ = body.replace(b"value updated!");
//!         })?,
//! );
//! let mut server = Server::bind("0.0.0.0:4677", registry, Config::default())?;
//! std::thread::spawn(move || {
//!     server.serve();
//! });
//!
//! let transport = Arc::new(UdpClientTransport::bind_any(&Config::default())?);
//! let mut session = Session::link(transport, "127.0.0.1", 4677, FragmentSize::Bytes128)?;
//! let mut response = Vec::new();
//! let status = session.put(b"/lights/light1?state=on", &mut response)?;
//! assert_eq!(status, 200);
//! # Ok::<(), urest::ErrorKind>(())
//! ```

// Core: configuration, errors, transport seams
pub use urest_core::{
    config::Config,
    constants::{DEFAULT_PORT, HEADER_SIZE, MAX_FRAME_SIZE},
    error::{ErrorKind, Result},
    transport::{ClientTransport, Received, ServerTransport},
};
// Protocol: frame and status types
pub use urest_protocol::{FragmentSize, Header, Status, StatusCode, Verb};
// Server: registry, dispatcher and exchange handler
pub use urest_server::{Body, Outcome, Registry, Resource, Route, Server, UdpServerTransport, VerbHandler};
// Client: exchange driver
pub use urest_client::{Session, UdpClientTransport};
// Helpers
pub use urest_utilities::{base32, parse_ip, resolve_host};

/// Convenience prelude with the most commonly used items.
pub mod prelude {
    pub use crate::{
        Body, Config, ErrorKind, FragmentSize, Outcome, Registry, Resource, Server, Session,
        Status, StatusCode, UdpClientTransport, UdpServerTransport, Verb,
    };
}
