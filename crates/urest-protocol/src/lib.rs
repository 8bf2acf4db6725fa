#![warn(missing_docs)]

//! urest-protocol: frame types, header codec and exchange bookkeeping.

/// Fragmentation and reassembly of message bodies.
pub mod fragment;
/// Frame header types.
pub mod frame;
/// Frame header serialization and deserialization.
pub mod frame_codec;
/// Token and sequence validation for one exchange.
pub mod guard;
/// HTTP-like status taxonomy.
pub mod status;

pub use fragment::{fragment_count, is_final_fragment, Fragmenter, Reassembled, Reassembler};
pub use frame::{payload_capacity, ContentType, FragmentSize, Header, MessageType, MethodMajor, Verb};
pub use frame_codec::{decode_frame, encode_frame_into, rewrite_as_ack};
pub use guard::{Admission, ExchangeGuard};
pub use status::{Status, StatusCode};
