//! Protocol module containing the packet model, the binary codec, and
//! request-id generation.

pub mod codec;
pub mod packet;
pub mod request_id;

pub use codec::{decode_packet, encode_packet, CodecError};
pub use packet::Packet;
pub use request_id::next_request_id;
