use urest_core::{
    constants::DEFAULT_RETRY_BUDGET,
    error::{ErrorKind, Result},
};

use crate::frame::{FragmentSize, Header};

/// Result of admitting an inbound fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Fragment is the one the exchange expects.
    InSequence,
    /// Fragment is out of step; the retry was charged, receive again.
    Retry,
}

/// Token, frame size and sequence bookkeeping for one exchange.
///
/// Once bound, every fragment is checked in the order frame size, token,
/// sequence. A single retry counter covers the whole exchange: both the
/// request and the response phase charge it, and it is never reset.
#[derive(Debug, Clone)]
pub struct ExchangeGuard {
    frag_size: Option<FragmentSize>,
    token: Option<u16>,
    expected_sequence: u16,
    retries: u8,
    retry_budget: u8,
}

impl Default for ExchangeGuard {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_BUDGET)
    }
}

impl ExchangeGuard {
    /// Creates an unbound guard expecting sequence 0.
    pub fn new(retry_budget: u8) -> Self {
        Self { frag_size: None, token: None, expected_sequence: 0, retries: 0, retry_budget }
    }

    /// Draws a token for a new exchange. Never 0, the "unassigned" value.
    pub fn mint_token() -> u16 {
        use rand::Rng;
        let mut rng = rand::rng();
        rng.random_range(1..=u16::MAX)
    }

    /// Binds the exchange to a frame size and token.
    pub fn bind(&mut self, frag_size: FragmentSize, token: u16) {
        self.frag_size = Some(frag_size);
        self.token = Some(token);
    }

    /// Binds only the frame size; the token follows from the first reply.
    pub fn bind_frag_size(&mut self, frag_size: FragmentSize) {
        self.frag_size = Some(frag_size);
    }

    /// Token of the exchange, once bound.
    pub fn token(&self) -> Option<u16> {
        self.token
    }

    /// Frame size of the exchange, once bound.
    pub fn frag_size(&self) -> Option<FragmentSize> {
        self.frag_size
    }

    /// Sequence the next fragment must carry.
    pub fn expected_sequence(&self) -> u16 {
        self.expected_sequence
    }

    /// Moves the expectation to the next fragment.
    pub fn advance(&mut self) {
        self.expected_sequence = self.expected_sequence.wrapping_add(1);
    }

    /// Retries charged so far.
    pub fn retries(&self) -> u8 {
        self.retries
    }

    /// Checks frame size, token and sequence; any mismatch is an error.
    ///
    /// Used where no retry is possible, e.g. a client checking a reply.
    pub fn validate(&self, header: &Header) -> Result<()> {
        self.validate_identity(header)?;
        if header.sequence != self.expected_sequence {
            return Err(ErrorKind::SequenceMismatch {
                expected: self.expected_sequence,
                received: header.sequence,
            });
        }
        Ok(())
    }

    /// Checks a fragment; a sequence mismatch is charged to the retry budget.
    ///
    /// Frame size and token mismatches are fatal straight away. The sequence
    /// mismatch that spends the last retry surfaces as `SequenceMismatch`.
    pub fn admit(&mut self, header: &Header) -> Result<Admission> {
        self.validate_identity(header)?;
        if header.sequence != self.expected_sequence {
            let expected = self.expected_sequence;
            self.charge_retry(ErrorKind::SequenceMismatch { expected, received: header.sequence })?;
            tracing::debug!(
                "Out of sequence fragment: expected {}, got {} (retry {}/{})",
                expected,
                header.sequence,
                self.retries,
                self.retry_budget
            );
            return Ok(Admission::Retry);
        }
        Ok(Admission::InSequence)
    }

    /// Charges one retry; returns `failure` once the budget is spent.
    pub fn charge_retry(&mut self, failure: ErrorKind) -> Result<()> {
        self.retries = self.retries.saturating_add(1);
        if self.retries >= self.retry_budget {
            return Err(failure);
        }
        Ok(())
    }

    fn validate_identity(&self, header: &Header) -> Result<()> {
        if let Some(frag_size) = self.frag_size {
            if header.frag_size != frag_size {
                return Err(ErrorKind::FragmentSizeMismatch);
            }
        }
        if let Some(token) = self.token {
            if header.token != token {
                return Err(ErrorKind::WrongToken { expected: token, received: header.token });
            }
        }
        Ok(())
    }
}
