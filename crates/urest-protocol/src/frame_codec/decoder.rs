//! Frame decoding.

use std::{
    convert::TryFrom,
    io::{Cursor, Read},
};

use byteorder::{BigEndian, ReadBytesExt};
use urest_core::{
    constants::HEADER_SIZE,
    error::{ErrorKind, Result},
};

use crate::frame::{ContentType, FragmentSize, Header, MessageType, MethodMajor};

/// Deserializes frames from network bytes.
pub struct FrameDecoder;

impl FrameDecoder {
    /// Decodes the 6 header bytes at the cursor position.
    pub fn decode_header<R: Read>(reader: &mut R) -> Result<Header> {
        let flags = reader.read_u8().map_err(|_| ErrorKind::ReceivedDataTooShort)?;
        let method = reader.read_u8().map_err(|_| ErrorKind::ReceivedDataTooShort)?;
        let token = reader.read_u16::<BigEndian>().map_err(|_| ErrorKind::ReceivedDataTooShort)?;
        let sequence =
            reader.read_u16::<BigEndian>().map_err(|_| ErrorKind::ReceivedDataTooShort)?;

        Ok(Header {
            frag_size: FragmentSize::try_from(flags >> 5)?,
            msg_type: MessageType::try_from((flags >> 2) & 0x07)?,
            content_type: ContentType::from(flags & 0x03),
            method_major: MethodMajor::try_from(method >> 5)?,
            method_minor: method & 0x1f,
            token,
            sequence,
        })
    }

    /// Decodes a datagram into its header and a view of its payload.
    pub fn decode_frame(data: &[u8]) -> Result<(Header, &[u8])> {
        if data.len() < HEADER_SIZE {
            return Err(ErrorKind::ReceivedDataTooShort);
        }
        let mut cursor = Cursor::new(data);
        let header = Self::decode_header(&mut cursor)?;
        Ok((header, &data[HEADER_SIZE..]))
    }
}
