//! Error types for local exchange failures.
//!
//! Protocol outcomes (404, 405, 414, ...) are not errors: they travel on the
//! wire as status codes. `ErrorKind` covers the cases where an exchange lost
//! synchronisation with its peer, or the local I/O failed.

use std::io;

use thiserror::Error;

/// Which header field failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodingErrorKind {
    /// Message type outside UNSET/REQUEST/ACK/RESET
    MessageType,
    /// Method major class outside VERB/INFO/SUCCESS/CLIENT_ERROR/SERVER_ERROR
    MethodMajor,
    /// Minor code not defined for its major class
    MethodMinor,
}

/// Errors that abort the current exchange.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Frame size field is not one of the seven negotiable sizes.
    #[error("unknown fragment size: {0}")]
    UnknownFragmentSize(u8),
    /// A fragment used a different frame size than the first one of its exchange.
    #[error("fragment size changed within the exchange")]
    FragmentSizeMismatch,
    /// Sequence numbers went out of step and the retry budget is spent.
    #[error("sequence mismatch: expected {expected}, got {received}")]
    SequenceMismatch {
        /// Sequence the exchange was waiting for
        expected: u16,
        /// Sequence carried by the offending fragment
        received: u16,
    },
    /// A fragment carried a token other than the exchange's.
    #[error("wrong token: expected {expected:#06x}, got {received:#06x}")]
    WrongToken {
        /// Token bound to the exchange
        expected: u16,
        /// Token carried by the offending fragment
        received: u16,
    },
    /// The peer did not answer.
    #[error("request failed: no reply from peer")]
    RequestFailed,
    /// Reassembly would exceed the configured maximum request length.
    #[error("request exceeds {max} bytes")]
    RequestTooLong {
        /// Configured maximum
        max: usize,
    },
    /// Payload larger than the negotiated fragment can carry.
    #[error("payload of {len} bytes exceeds fragment capacity of {capacity}")]
    PayloadTooLarge {
        /// Offending payload length
        len: usize,
        /// Capacity of the fragment
        capacity: usize,
    },
    /// Datagram shorter than a frame header.
    #[error("received data is too short to hold a frame header")]
    ReceivedDataTooShort,
    /// Handlers can only be attached for GET, POST, PUT and DELETE.
    #[error("no handler slot for verb {0}")]
    UnsupportedVerb(u8),
    /// A header field could not be decoded.
    #[error("could not decode header field: {0:?}")]
    DecodingError(DecodingErrorKind),
    /// Transport I/O failure.
    #[error("io error: {0}")]
    IOError(#[from] io::Error),
}

/// Result type alias using `ErrorKind`.
pub type Result<T> = std::result::Result<T, ErrorKind>;
