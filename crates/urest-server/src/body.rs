use std::io;

use urest_core::error::{ErrorKind, Result};

/// The request string a handler receives, and the response it leaves behind.
///
/// On entry the body holds the full request as it arrived, path and query
/// included. Whatever it holds when the handler returns is sent back as the
/// response, so a handler that does not touch it echoes the request.
/// The body never grows past its capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    bytes: Vec<u8>,
    capacity: usize,
}

impl Body {
    /// Creates an empty body bounded to `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { bytes: Vec::with_capacity(capacity), capacity }
    }

    /// Wraps a reassembled request. Fails if it does not fit `capacity`.
    pub fn from_request(request: Vec<u8>, capacity: usize) -> Result<Self> {
        if request.len() > capacity {
            return Err(ErrorKind::RequestTooLong { max: capacity });
        }
        Ok(Self { bytes: request, capacity })
    }

    /// Current contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Current contents as text, if they are valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    /// Part of the contents before the first `?`.
    pub fn path(&self) -> &[u8] {
        split_query(&self.bytes).0
    }

    /// Part of the contents after the first `?`, if there is one.
    pub fn query(&self) -> Option<&[u8]> {
        split_query(&self.bytes).1
    }

    /// Overwrites the contents. Fails, leaving the body untouched, if `content`
    /// does not fit.
    pub fn replace(&mut self, content: &[u8]) -> Result<()> {
        if content.len() > self.capacity {
            return Err(ErrorKind::RequestTooLong { max: self.capacity });
        }
        self.bytes.clear();
        self.bytes.extend_from_slice(content);
        Ok(())
    }

    /// Empties the body; an empty response is sent.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Maximum number of bytes the body holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of bytes held.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the body holds nothing.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Hands over the contents.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Appends up to the remaining capacity; a full body accepts 0 bytes.
impl io::Write for Body {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.capacity - self.bytes.len();
        let len = buf.len().min(room);
        self.bytes.extend_from_slice(&buf[..len]);
        Ok(len)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Splits a request string at its first `?`.
pub fn split_query(request: &[u8]) -> (&[u8], Option<&[u8]>) {
    match request.iter().position(|&byte| byte == b'?') {
        Some(index) => (&request[..index], Some(&request[index + 1..])),
        None => (request, None),
    }
}
