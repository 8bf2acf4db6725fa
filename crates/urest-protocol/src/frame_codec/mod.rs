//! Frame serialization and deserialization.
//!
//! Header bit order is part of the wire contract (MSB first within each byte):
//!
//! ```text
//! byte0 = frag_size << 5 | msg_type << 2 | content_type
//! byte1 = method_major << 5 | method_minor
//! ```
//!
//! # Module Organization
//!
//! - [`encoder`] - Header and frame encoding to binary format
//! - [`decoder`] - Header and frame decoding from binary format

pub mod decoder;
pub mod encoder;


pub use decoder::FrameDecoder;
pub use encoder::FrameEncoder;

use urest_core::{
    constants::HEADER_SIZE,
    error::{ErrorKind, Result},
};

use crate::{frame::Header, status::Status};

impl Header {
    /// Appends the 6 header bytes to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) -> Result<()> {
        FrameEncoder::encode_header_into(out, self)?;
        Ok(())
    }

    /// Decodes the header at the front of `data`.
    pub fn decode(data: &[u8]) -> Result<Header> {
        if data.len() < HEADER_SIZE {
            return Err(ErrorKind::ReceivedDataTooShort);
        }
        FrameDecoder::decode_header(&mut &data[..HEADER_SIZE])
    }
}

/// Clears `out` and writes one complete frame into it.
pub fn encode_frame_into(out: &mut Vec<u8>, header: &Header, payload: &[u8]) -> Result<()> {
    out.clear();
    FrameEncoder::encode_frame_into(out, header, payload)
}

/// Splits a datagram into its header and payload.
pub fn decode_frame(data: &[u8]) -> Result<(Header, &[u8])> {
    FrameDecoder::decode_frame(data)
}

/// Turns a raw inbound frame into an acknowledgment carrying `status`, in place.
///
/// Frame size, content type, token and sequence are left as received, so this
/// works on frames whose header did not fully decode. Returns the header length
/// so callers can send `&frame[..len]`.
pub fn rewrite_as_ack(frame: &mut [u8], status: Status) -> Result<usize> {
    if frame.len() < HEADER_SIZE {
        return Err(ErrorKind::ReceivedDataTooShort);
    }
    frame[0] = (frame[0] & 0b1110_0011) | (encoder::ACK_BITS << 2);
    frame[1] = encoder::method_byte(status.major(), status.minor());
    Ok(HEADER_SIZE)
}
