//! # craftcon-core
//!
//! Shared library for Craftcon containing the RCON wire codec, request-id
//! generation, domain result types, and the parsers that turn free-form
//! server response text into structured facts.
//!
//! This crate is used by the service/daemon crate. It has zero dependencies
//! on sockets, timers, or the filesystem – everything in here is pure and
//! unit-testable without a running game server.
//!
//! # Architecture overview (for beginners)
//!
//! RCON is the remote console protocol spoken by Minecraft-style game
//! servers: an administrator connects over TCP, authenticates with a
//! password, sends text commands ("list", "whitelist add Steve"), and reads
//! text output back.  The interesting parts are all at the edges:
//!
//! - **`protocol`** – How bytes travel over the wire.  Each command and each
//!   reply is one length-prefixed binary packet (little-endian size, id, and
//!   type fields followed by a NUL-terminated UTF-8 body).  The codec
//!   encodes packets to bytes and validates/decodes bytes back.
//!
//! - **`domain`** – Pure business logic over the *text* the server returns.
//!   The protocol carries no semantic success/failure flag, so "did the
//!   whitelist add work?" is answered by matching the reply against known
//!   phrases.  Servers disagree on phrasing, so every parser here has an
//!   explicit fallback instead of an error path.

// Declare the two top-level modules.  Rust will look for each in a
// subdirectory with the same name (e.g., src/protocol/mod.rs).
pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `craftcon_core::Packet` instead of `craftcon_core::protocol::packet::Packet`.
pub use domain::status::{ServerSnapshot, DEFAULT_TICKS_PER_SECOND, UNKNOWN_VERSION};
pub use domain::username::validate_username;
pub use domain::whitelist::{CommandResult, WhitelistRoster};
pub use protocol::codec::{decode_packet, encode_packet, CodecError};
pub use protocol::packet::Packet;
pub use protocol::request_id::next_request_id;
