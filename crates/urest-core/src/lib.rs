#![warn(missing_docs)]

//! urest-core: foundational types and utilities.
//!
//! This crate provides the minimal set of core utilities shared across all layers:
//! - Configuration types
//! - Error handling
//! - Protocol constants
//! - Transport traits the exchange drivers are written against
//!
//! Protocol-specific logic lives in specialized crates:
//! - `urest-protocol`: frame codec, token/sequence guard, fragmentation engine
//! - `urest-server`: resource registry and the server exchange handler
//! - `urest-client`: the client exchange driver

/// Protocol constants shared across layers.
pub mod constants {
    /// The size of the fixed frame header.
    pub const HEADER_SIZE: usize = 6;
    /// Largest negotiable frame, header included.
    pub const MAX_FRAME_SIZE: usize = 1024;
    /// Well-known UDP port of a urest server.
    pub const DEFAULT_PORT: u16 = 4677;
    /// Maximum length of a reassembled request (and of a response body).
    pub const DEFAULT_MAX_REQUEST_LEN: usize = 4096;
    /// Number of mismatched fragments tolerated over one whole exchange.
    ///
    /// The mismatch that reaches this count is fatal.
    pub const DEFAULT_RETRY_BUDGET: u8 = 3;
    /// Token value a client puts on the first fragment, before the server assigned one.
    pub const UNASSIGNED_TOKEN: u16 = 0;
}

/// Configuration options for the protocol and transports.
pub mod config;
/// Error types and results.
pub mod error;
/// UDP socket setup shared by the server and client transports.
pub mod socket;
/// Transport abstraction for pluggable I/O.
pub mod transport;
