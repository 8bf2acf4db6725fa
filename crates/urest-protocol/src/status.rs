//! HTTP-like status taxonomy carried in every acknowledgment.
//!
//! The method field of an ACK holds a class (`MethodMajor`) and a 5-bit code.
//! The numeric status is `major * 100 + minor`, so SUCCESS/OK is 200 and
//! CLIENT_ERROR/NOT_FOUND is 404.

use std::{convert::TryFrom, fmt};

use urest_core::error::{DecodingErrorKind, ErrorKind, Result};

use crate::frame::{EnumConverter, MethodMajor};

/// 1xx codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Info {
    /// 100: fragment accepted, send the next one
    Continue = 0,
    /// 102: request complete, handler running; start pulling
    Processing = 2,
    /// 131: answer to PING
    PingAck = 31,
}

/// 2xx codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Success {
    /// 200
    Ok = 0,
    /// 201
    Created = 1,
    /// 202
    Accepted = 2,
    /// 204
    Deleted = 4,
    /// 205
    Reset = 5,
}

/// 4xx codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClientError {
    /// 400
    BadRequest = 0,
    /// 401
    Unauthorized = 1,
    /// 403
    Forbidden = 3,
    /// 404
    NotFound = 4,
    /// 405
    NotAllowed = 5,
    /// 406
    NotAcceptable = 6,
    /// 408
    Timeout = 8,
    /// 409
    Conflict = 9,
    /// 414
    TooLong = 14,
    /// 418
    Teapot = 18,
    /// 422
    Unprocessable = 22,
    /// 423
    Locked = 23,
    /// 429
    TooMany = 29,
}

/// 5xx codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ServerError {
    /// 500
    Internal = 0,
    /// 501
    NotImplemented = 1,
    /// 502
    BadGateway = 2,
    /// 503
    Unavailable = 3,
    /// 504
    GatewayTimeout = 4,
}

impl TryFrom<u8> for Info {
    type Error = ErrorKind;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Info::Continue),
            2 => Ok(Info::Processing),
            31 => Ok(Info::PingAck),
            _ => Err(ErrorKind::DecodingError(DecodingErrorKind::MethodMinor)),
        }
    }
}

impl TryFrom<u8> for Success {
    type Error = ErrorKind;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Success::Ok),
            1 => Ok(Success::Created),
            2 => Ok(Success::Accepted),
            4 => Ok(Success::Deleted),
            5 => Ok(Success::Reset),
            _ => Err(ErrorKind::DecodingError(DecodingErrorKind::MethodMinor)),
        }
    }
}

impl TryFrom<u8> for ClientError {
    type Error = ErrorKind;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(ClientError::BadRequest),
            1 => Ok(ClientError::Unauthorized),
            3 => Ok(ClientError::Forbidden),
            4 => Ok(ClientError::NotFound),
            5 => Ok(ClientError::NotAllowed),
            6 => Ok(ClientError::NotAcceptable),
            8 => Ok(ClientError::Timeout),
            9 => Ok(ClientError::Conflict),
            14 => Ok(ClientError::TooLong),
            18 => Ok(ClientError::Teapot),
            22 => Ok(ClientError::Unprocessable),
            23 => Ok(ClientError::Locked),
            29 => Ok(ClientError::TooMany),
            _ => Err(ErrorKind::DecodingError(DecodingErrorKind::MethodMinor)),
        }
    }
}

impl TryFrom<u8> for ServerError {
    type Error = ErrorKind;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(ServerError::Internal),
            1 => Ok(ServerError::NotImplemented),
            2 => Ok(ServerError::BadGateway),
            3 => Ok(ServerError::Unavailable),
            4 => Ok(ServerError::GatewayTimeout),
            _ => Err(ErrorKind::DecodingError(DecodingErrorKind::MethodMinor)),
        }
    }
}

/// A typed (major, minor) outcome.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// 1xx
    Info(Info),
    /// 2xx
    Success(Success),
    /// 4xx
    ClientError(ClientError),
    /// 5xx
    ServerError(ServerError),
}

impl Status {
    /// 100
    pub const CONTINUE: Status = Status::Info(Info::Continue);
    /// 102
    pub const PROCESSING: Status = Status::Info(Info::Processing);
    /// 131
    pub const PING_ACK: Status = Status::Info(Info::PingAck);
    /// 200
    pub const OK: Status = Status::Success(Success::Ok);
    /// 400
    pub const BAD_REQUEST: Status = Status::ClientError(ClientError::BadRequest);
    /// 404
    pub const NOT_FOUND: Status = Status::ClientError(ClientError::NotFound);
    /// 405
    pub const NOT_ALLOWED: Status = Status::ClientError(ClientError::NotAllowed);
    /// 406
    pub const NOT_ACCEPTABLE: Status = Status::ClientError(ClientError::NotAcceptable);
    /// 414
    pub const TOO_LONG: Status = Status::ClientError(ClientError::TooLong);

    /// Class of this status.
    pub fn major(&self) -> MethodMajor {
        match self {
            Status::Info(_) => MethodMajor::Info,
            Status::Success(_) => MethodMajor::Success,
            Status::ClientError(_) => MethodMajor::ClientError,
            Status::ServerError(_) => MethodMajor::ServerError,
        }
    }

    /// 5-bit code within the class.
    pub fn minor(&self) -> u8 {
        match self {
            Status::Info(code) => *code as u8,
            Status::Success(code) => *code as u8,
            Status::ClientError(code) => *code as u8,
            Status::ServerError(code) => *code as u8,
        }
    }

    /// Numeric status code.
    pub fn code(&self) -> StatusCode {
        StatusCode::from_parts(self.major(), self.minor())
    }

    /// Rebuilds a status from the method field of a header.
    pub fn from_parts(major: MethodMajor, minor: u8) -> Result<Status> {
        match major {
            MethodMajor::Verb => Err(ErrorKind::DecodingError(DecodingErrorKind::MethodMajor)),
            MethodMajor::Info => Info::try_from(minor).map(Status::Info),
            MethodMajor::Success => Success::try_from(minor).map(Status::Success),
            MethodMajor::ClientError => ClientError::try_from(minor).map(Status::ClientError),
            MethodMajor::ServerError => ServerError::try_from(minor).map(Status::ServerError),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.code(), self)
    }
}

/// Numeric status code, `major * 100 + minor`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    /// Combines the two method fields.
    pub fn from_parts(major: MethodMajor, minor: u8) -> Self {
        StatusCode(u16::from(major.to_u8()) * 100 + u16::from(minor))
    }

    /// Raw numeric value.
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Hundreds digit, the wire `method_major`.
    pub fn major(&self) -> u8 {
        (self.0 / 100) as u8
    }

    /// The wire `method_minor`.
    pub fn minor(&self) -> u8 {
        (self.0 % 100) as u8
    }

    /// 1xx
    pub fn is_informational(&self) -> bool {
        (100..200).contains(&self.0)
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.0)
    }

    /// 4xx
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.0)
    }

    /// 5xx
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.0)
    }
}

impl From<Status> for StatusCode {
    fn from(status: Status) -> Self {
        status.code()
    }
}

impl PartialEq<u16> for StatusCode {
    fn eq(&self, other: &u16) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
