//! Frame encoding.

use std::io::{self, Write};

use byteorder::{BigEndian, WriteBytesExt};
use urest_core::error::{ErrorKind, Result};

use crate::frame::{EnumConverter, Header, MessageType, MethodMajor};

pub(crate) const ACK_BITS: u8 = MessageType::Ack as u8;

/// Packs the first header byte.
pub(crate) fn flags_byte(header: &Header) -> u8 {
    (header.frag_size.to_u8() & 0x07) << 5
        | (header.msg_type.to_u8() & 0x07) << 2
        | (header.content_type.to_u8() & 0x03)
}

/// Packs the method byte.
pub(crate) fn method_byte(major: MethodMajor, minor: u8) -> u8 {
    (major.to_u8() & 0x07) << 5 | (minor & 0x1f)
}

/// Serializes frames into bytes for transmission.
pub struct FrameEncoder;

impl FrameEncoder {
    /// Appends the 6 header bytes to `buffer`.
    pub fn encode_header_into(buffer: &mut Vec<u8>, header: &Header) -> io::Result<()> {
        buffer.write_u8(flags_byte(header))?;
        buffer.write_u8(method_byte(header.method_major, header.method_minor))?;
        buffer.write_u16::<BigEndian>(header.token)?;
        buffer.write_u16::<BigEndian>(header.sequence)?;
        Ok(())
    }

    /// Appends a full frame. The payload must fit the header's frame size.
    pub fn encode_frame_into(buffer: &mut Vec<u8>, header: &Header, payload: &[u8]) -> Result<()> {
        let capacity = header.payload_capacity();
        if payload.len() > capacity {
            return Err(ErrorKind::PayloadTooLarge { len: payload.len(), capacity });
        }
        Self::encode_header_into(buffer, header)?;
        buffer.write_all(payload)?;
        Ok(())
    }

    /// Encodes a frame into a fresh vector.
    pub fn encode_frame(header: &Header, payload: &[u8]) -> Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity(header.frag_size.frame_len());
        Self::encode_frame_into(&mut buffer, header, payload)?;
        Ok(buffer)
    }
}
