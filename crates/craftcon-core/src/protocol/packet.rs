//! The RCON packet model and protocol constants.
//!
//! Wire format (all integers little-endian):
//! ```text
//! [size:4][id:4][type:4][body:N][0x00][0x00]
//! ```
//! `size` counts every byte *after* the size field itself, so
//! `size = 4 (id) + 4 (type) + N (body) + 2 (terminator + padding)`.

use serde::{Deserialize, Serialize};

// ── Protocol constants ────────────────────────────────────────────────────────

/// Request type for the authentication handshake.
pub const SERVERDATA_AUTH: i32 = 3;

/// Request type for an ordinary command.
pub const SERVERDATA_EXECCOMMAND: i32 = 2;

/// Response type for a successful (or failed) authentication.
///
/// The protocol assigns auth responses and exec requests the *same* numeric
/// value.  Responses are therefore disambiguated by context – which request
/// is currently outstanding – never by this value alone.  That is also why
/// packet types stay plain `i32` constants instead of an enum: an enum
/// variant per value would claim a one-to-one mapping the wire does not have.
pub const SERVERDATA_AUTH_RESPONSE: i32 = 2;

/// Response type for command output, identical in value to
/// [`SERVERDATA_AUTH_RESPONSE`] by protocol design.
pub const SERVERDATA_EXEC_RESPONSE: i32 = 2;

/// Smallest legal value of the size field: empty body, so 4 + 4 + 0 + 2.
pub const MIN_PACKET_SIZE: i32 = 10;

/// Largest legal value of the size field.  Anything bigger is rejected as
/// corrupt rather than allocated.
pub const MAX_PACKET_SIZE: i32 = 4096;

/// Response id sent by servers to signal a failed authentication.
///
/// This is the only in-band failure signal the protocol has; every other
/// failure is conveyed as human-readable text in the body.
pub const AUTH_FAILURE_ID: i32 = -1;

// ── Packet ────────────────────────────────────────────────────────────────────

/// One length-framed unit of the RCON protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    /// Caller-chosen correlation id, echoed by well-behaved servers.
    pub id: i32,
    /// Packet type code (see the `SERVERDATA_*` constants).
    pub kind: i32,
    /// UTF-8 payload.  Must not contain embedded NUL bytes – the wire format
    /// uses NUL as the body terminator.
    pub body: String,
}

impl Packet {
    /// Creates a packet with an arbitrary type code.
    pub fn new(id: i32, kind: i32, body: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            body: body.into(),
        }
    }

    /// Creates an authentication request carrying the server password.
    pub fn auth(id: i32, password: impl Into<String>) -> Self {
        Self::new(id, SERVERDATA_AUTH, password)
    }

    /// Creates a command-execution request.
    pub fn exec(id: i32, command: impl Into<String>) -> Self {
        Self::new(id, SERVERDATA_EXECCOMMAND, command)
    }

    /// The value the size field takes for this packet.
    pub fn wire_size(&self) -> usize {
        4 + 4 + self.body.len() + 2
    }
}
