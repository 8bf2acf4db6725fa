//! Fragmentation and reassembly of message bodies.
//!
//! A body is cut into chunks of exactly `payload_capacity` bytes. The last
//! chunk is always strictly shorter, and that is the only end-of-message
//! signal on the wire. A body whose length is a multiple of the capacity,
//! the empty body included, therefore ends with an empty fragment:
//!
//! ```text
//! capacity 10, body 25 bytes  -> [10][10][5]
//! capacity 10, body 20 bytes  -> [10][10][0]
//! capacity 10, body  0 bytes  -> [0]
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let fragmenter = Fragmenter::new(body, FragmentSize::Bytes32);
//! for chunk in fragmenter.chunks() {
//!     // send chunk, wait for CONTINUE ...
//! }
//!
//! let mut reassembler = Reassembler::new(FragmentSize::Bytes32, 4096);
//! while let Reassembled::Incomplete = reassembler.push(payload)? {
//!     // ack CONTINUE, receive next payload ...
//! }
//! ```

use urest_core::error::{ErrorKind, Result};

use crate::frame::FragmentSize;

/// Number of fragments a body of `len` bytes needs.
pub fn fragment_count(len: usize, frag_size: FragmentSize) -> usize {
    len / frag_size.payload_capacity() + 1
}

/// Returns true if a fragment with `payload_len` bytes ends its message.
pub fn is_final_fragment(payload_len: usize, frag_size: FragmentSize) -> bool {
    payload_len < frag_size.payload_capacity()
}

/// Splits an outgoing body into fragment payloads.
#[derive(Debug, Clone, Copy)]
pub struct Fragmenter<'a> {
    body: &'a [u8],
    capacity: usize,
}

impl<'a> Fragmenter<'a> {
    /// Creates a fragmenter for `body` at the given frame size.
    pub fn new(body: &'a [u8], frag_size: FragmentSize) -> Self {
        Self { body, capacity: frag_size.payload_capacity() }
    }

    /// Payload bytes per full fragment.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of fragments, terminating fragment included.
    pub fn fragment_count(&self) -> usize {
        self.body.len() / self.capacity + 1
    }

    /// Payload of fragment `index`, or None past the terminating fragment.
    pub fn fragment(&self, index: usize) -> Option<&'a [u8]> {
        if index >= self.fragment_count() {
            return None;
        }
        let start = index * self.capacity;
        let end = (start + self.capacity).min(self.body.len());
        Some(&self.body[start..end])
    }

    /// Returns true if `index` is the terminating fragment.
    pub fn is_last(&self, index: usize) -> bool {
        index + 1 == self.fragment_count()
    }

    /// All fragment payloads in order.
    pub fn chunks(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        let this = *self;
        (0..this.fragment_count()).filter_map(move |index| this.fragment(index))
    }
}

/// Progress of a reassembly after one fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reassembled {
    /// A full fragment arrived; more follow.
    Incomplete,
    /// A short fragment arrived; the message is complete.
    Complete,
}

/// Collects incoming fragment payloads into one contiguous body.
#[derive(Debug)]
pub struct Reassembler {
    buffer: Vec<u8>,
    capacity: usize,
    max_len: usize,
}

impl Reassembler {
    /// Creates a reassembler bounded to `max_len` bytes.
    pub fn new(frag_size: FragmentSize, max_len: usize) -> Self {
        Self { buffer: Vec::with_capacity(max_len), capacity: frag_size.payload_capacity(), max_len }
    }

    /// Appends the next fragment's payload.
    ///
    /// Fails with `RequestTooLong` if the body would grow past `max_len`; the
    /// buffer is left as it was.
    pub fn push(&mut self, payload: &[u8]) -> Result<Reassembled> {
        if payload.len() > self.capacity {
            return Err(ErrorKind::PayloadTooLarge { len: payload.len(), capacity: self.capacity });
        }
        if self.buffer.len() + payload.len() > self.max_len {
            return Err(ErrorKind::RequestTooLong { max: self.max_len });
        }
        self.buffer.extend_from_slice(payload);

        if payload.len() == self.capacity {
            Ok(Reassembled::Incomplete)
        } else {
            Ok(Reassembled::Complete)
        }
    }

    /// Bytes collected so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of bytes collected so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Hands over the collected body.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}
