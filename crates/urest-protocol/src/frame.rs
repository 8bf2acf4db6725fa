//! Frame header types.
//!
//! Every datagram is a 6-byte header followed by payload:
//!
//! ```text
//! byte 0   frag_size:3 | msg_type:3 | content_type:2     (MSB first)
//! byte 1   method_major:3 | method_minor:5
//! byte 2-3 token     (u16, big endian)
//! byte 4-5 sequence  (u16, big endian)
//! byte 6.. payload   (0 ..= frame_len - 6 bytes)
//! ```

use std::{convert::TryFrom, fmt};

use urest_core::{
    constants::HEADER_SIZE,
    error::{DecodingErrorKind, ErrorKind, Result},
};

use crate::status::{Status, StatusCode};

/// Helper trait to convert enums to u8 values for wire format.
pub trait EnumConverter {
    /// The enum type this converter works with.
    type Enum;

    /// Converts the enum to a u8 for serialization.
    fn to_u8(&self) -> u8;
}

// ============================================================================
// Fragment size
// ============================================================================

/// One of the seven negotiable frame sizes (header included).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FragmentSize {
    /// 16-byte frames, 10 bytes of payload
    Bytes16 = 1,
    /// 32-byte frames
    Bytes32 = 2,
    /// 64-byte frames
    Bytes64 = 3,
    /// 128-byte frames
    Bytes128 = 4,
    /// 256-byte frames
    Bytes256 = 5,
    /// 512-byte frames
    Bytes512 = 6,
    /// 1024-byte frames, 1018 bytes of payload
    Bytes1024 = 7,
}

impl FragmentSize {
    /// All sizes, smallest first.
    pub const ALL: [FragmentSize; 7] = [
        FragmentSize::Bytes16,
        FragmentSize::Bytes32,
        FragmentSize::Bytes64,
        FragmentSize::Bytes128,
        FragmentSize::Bytes256,
        FragmentSize::Bytes512,
        FragmentSize::Bytes1024,
    ];

    /// Total bytes on the wire per frame, header included.
    pub fn frame_len(self) -> usize {
        8 << (self as usize)
    }

    /// Payload bytes one fragment carries.
    pub fn payload_capacity(self) -> usize {
        self.frame_len() - HEADER_SIZE
    }
}

/// Payload capacity for a raw wire `frag_size` value.
pub fn payload_capacity(raw: u8) -> Result<usize> {
    FragmentSize::try_from(raw).map(FragmentSize::payload_capacity)
}

impl EnumConverter for FragmentSize {
    type Enum = FragmentSize;

    fn to_u8(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for FragmentSize {
    type Error = ErrorKind;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(FragmentSize::Bytes16),
            2 => Ok(FragmentSize::Bytes32),
            3 => Ok(FragmentSize::Bytes64),
            4 => Ok(FragmentSize::Bytes128),
            5 => Ok(FragmentSize::Bytes256),
            6 => Ok(FragmentSize::Bytes512),
            7 => Ok(FragmentSize::Bytes1024),
            _ => Err(ErrorKind::UnknownFragmentSize(value)),
        }
    }
}

// ============================================================================
// Message and content types
// ============================================================================

/// Role of a frame within an exchange.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MessageType {
    /// Not set
    Unset = 0,
    /// Request fragment or pull frame from the initiator
    Request = 1,
    /// Acknowledgment carrying a status
    Ack = 2,
    /// Reset
    Reset = 3,
}

impl EnumConverter for MessageType {
    type Enum = MessageType;

    fn to_u8(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for MessageType {
    type Error = ErrorKind;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(MessageType::Unset),
            1 => Ok(MessageType::Request),
            2 => Ok(MessageType::Ack),
            3 => Ok(MessageType::Reset),
            _ => Err(ErrorKind::DecodingError(DecodingErrorKind::MessageType)),
        }
    }
}

/// Payload encoding. Only `Flat` is processed by the server.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContentType {
    /// JSON document
    Json = 0,
    /// urest-native encoding
    Urest = 1,
    /// URI-encoded
    UriEncoded = 2,
    /// Flat string
    Flat = 3,
}

impl EnumConverter for ContentType {
    type Enum = ContentType;

    fn to_u8(&self) -> u8 {
        *self as u8
    }
}

impl From<u8> for ContentType {
    // two bits, every value is defined
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0 => ContentType::Json,
            1 => ContentType::Urest,
            2 => ContentType::UriEncoded,
            _ => ContentType::Flat,
        }
    }
}

// ============================================================================
// Method
// ============================================================================

/// Class of the method field; `major * 100 + minor` is the status code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum MethodMajor {
    /// Request verb
    Verb = 0,
    /// 1xx
    Info = 1,
    /// 2xx
    Success = 2,
    /// 4xx
    ClientError = 4,
    /// 5xx
    ServerError = 5,
}

impl EnumConverter for MethodMajor {
    type Enum = MethodMajor;

    fn to_u8(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for MethodMajor {
    type Error = ErrorKind;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(MethodMajor::Verb),
            1 => Ok(MethodMajor::Info),
            2 => Ok(MethodMajor::Success),
            4 => Ok(MethodMajor::ClientError),
            5 => Ok(MethodMajor::ServerError),
            _ => Err(ErrorKind::DecodingError(DecodingErrorKind::MethodMajor)),
        }
    }
}

/// Request verbs (minor codes under `MethodMajor::Verb`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    /// Read a resource
    Get = 1,
    /// Create
    Post = 2,
    /// Update
    Put = 3,
    /// Remove
    Delete = 4,
    /// Liveness check, answered with INFO/PING_ACK
    Ping = 31,
}

impl Verb {
    /// Verbs a resource can carry handlers for.
    pub const HANDLED: [Verb; 4] = [Verb::Get, Verb::Post, Verb::Put, Verb::Delete];

    /// Index of the handler slot for this verb. `Ping` has none.
    pub fn handler_slot(self) -> Option<usize> {
        match self {
            Verb::Get => Some(0),
            Verb::Post => Some(1),
            Verb::Put => Some(2),
            Verb::Delete => Some(3),
            Verb::Ping => None,
        }
    }
}

impl EnumConverter for Verb {
    type Enum = Verb;

    fn to_u8(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for Verb {
    type Error = ErrorKind;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Verb::Get),
            2 => Ok(Verb::Post),
            3 => Ok(Verb::Put),
            4 => Ok(Verb::Delete),
            31 => Ok(Verb::Ping),
            _ => Err(ErrorKind::DecodingError(DecodingErrorKind::MethodMinor)),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
            Verb::Ping => "PING",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Header
// ============================================================================

/// Decoded frame header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Header {
    /// Negotiated frame size of the exchange
    pub frag_size: FragmentSize,
    /// Request, ack, ...
    pub msg_type: MessageType,
    /// Payload encoding
    pub content_type: ContentType,
    /// Method class
    pub method_major: MethodMajor,
    /// Method code within the class (5 bits)
    pub method_minor: u8,
    /// Exchange token
    pub token: u16,
    /// Fragment index within the exchange
    pub sequence: u16,
}

impl Header {
    /// Header of a request fragment or pull frame.
    pub fn request(frag_size: FragmentSize, verb: Verb, token: u16, sequence: u16) -> Self {
        Self {
            frag_size,
            msg_type: MessageType::Request,
            content_type: ContentType::Flat,
            method_major: MethodMajor::Verb,
            method_minor: verb.to_u8(),
            token,
            sequence,
        }
    }

    /// Acknowledgment echoing this header's size, token and sequence.
    pub fn ack(&self, status: Status) -> Self {
        Self {
            msg_type: MessageType::Ack,
            method_major: status.major(),
            method_minor: status.minor(),
            ..*self
        }
    }

    /// Same header with another token.
    pub fn with_token(self, token: u16) -> Self {
        Self { token, ..self }
    }

    /// Payload bytes a fragment of this exchange carries.
    pub fn payload_capacity(&self) -> usize {
        self.frag_size.payload_capacity()
    }

    /// The verb, if this header carries one.
    pub fn verb(&self) -> Option<Verb> {
        match self.method_major {
            MethodMajor::Verb => Verb::try_from(self.method_minor).ok(),
            _ => None,
        }
    }

    /// The typed status, if the method field holds a known one.
    pub fn status(&self) -> Option<Status> {
        Status::from_parts(self.method_major, self.method_minor).ok()
    }

    /// `method_major * 100 + method_minor`.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_parts(self.method_major, self.method_minor)
    }
}
