//! Network infrastructure: the RCON protocol client.
//!
//! Handles one TCP connection to the game server and drives the
//! authenticate → execute → close lifecycle over it.
//!
//! Architecture:
//! - [`RconConnection`] owns a TCP stream for exactly one logical operation.
//! - One request is outstanding per connection at a time.  The protocol has
//!   no sequencing guarantee beyond id echoing, so pipelining would need a
//!   correlation table; a fresh connection per operation avoids interleaving
//!   ambiguity entirely.
//! - Every connect/read/write is bounded by the configured timeout.
//!
//! # Dialect variance
//!
//! Server implementations disagree on the finer points of the protocol.
//! Two quirks are tolerated deliberately rather than treated as errors:
//!
//! - Some servers do not echo the request id in the auth response.  As long
//!   as the id is not the `-1` failure sentinel, authentication proceeds
//!   (logged at debug level).  Command responses are held to the strict
//!   id-match rule.
//! - Some servers emit one extra empty packet after a successful auth.  A
//!   short best-effort read drains it; a timeout on that read is the normal
//!   case and is ignored.

use std::time::Duration;

use craftcon_core::protocol::packet::{
    AUTH_FAILURE_ID, MAX_PACKET_SIZE, MIN_PACKET_SIZE, SERVERDATA_AUTH_RESPONSE,
};
use craftcon_core::{decode_packet, encode_packet, next_request_id, CodecError, Packet};
use thiserror::Error;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time,
};
use tracing::{debug, trace, warn};

/// How long to wait for the stray post-auth packet some servers emit.
const POST_AUTH_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Errors that can occur in the RCON client.
#[derive(Debug, Error)]
pub enum RconError {
    /// The TCP connect did not complete within the configured timeout.
    #[error("connection to {addr} timed out")]
    ConnectTimeout { addr: String },

    /// The TCP connect failed at the socket level.
    #[error("failed to connect to {addr}: {source}")]
    ConnectError {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The server rejected the password (response id was `-1`).
    #[error("authentication failed: server rejected the password")]
    AuthenticationFailed,

    /// `execute` was called before a successful `authenticate`.
    #[error("connection is not authenticated")]
    NotAuthenticated,

    /// The server violated the protocol: wrong response type, mismatched
    /// command correlation id, or an out-of-bounds frame size.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// A malformed packet that the codec refused to decode.
    #[error("protocol violation: {0}")]
    Codec(#[from] CodecError),

    /// A read or write exceeded the configured timeout.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// An I/O error on the established connection.
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connection parameters for a single RCON endpoint.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// Server hostname or IP address.
    pub host: String,
    /// RCON TCP port.
    pub port: u16,
    /// RCON password.
    pub password: String,
    /// Timeout applied to connect and to every read/write round trip.
    pub timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 25575,
            password: String::new(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// One ephemeral RCON connection.
///
/// Created per logical operation, never reused across operations, never
/// shared between tasks.  Dropping the connection closes the socket on every
/// exit path; [`close`](Self::close) additionally performs a best-effort
/// shutdown of the write half.
pub struct RconConnection {
    stream: TcpStream,
    addr: String,
    timeout: Duration,
    authenticated: bool,
}

impl RconConnection {
    /// Opens a TCP connection to the server.
    ///
    /// # Errors
    ///
    /// Returns [`RconError::ConnectTimeout`] when the connect does not
    /// complete within `timeout` and [`RconError::ConnectError`] on socket
    /// failure.
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, RconError> {
        let addr = format!("{host}:{port}");

        let stream = match time::timeout(timeout, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(RconError::ConnectError { addr, source }),
            Err(_) => return Err(RconError::ConnectTimeout { addr }),
        };

        debug!("connected to rcon server at {addr}");
        Ok(Self {
            stream,
            addr,
            timeout,
            authenticated: false,
        })
    }

    /// Performs the authentication handshake.
    ///
    /// The only unambiguous failure signal the protocol provides is a
    /// response id of `-1`; a present-but-mismatched id is tolerated because
    /// some servers do not echo ids correctly on auth.
    ///
    /// # Errors
    ///
    /// Returns [`RconError::AuthenticationFailed`] for a rejected password,
    /// [`RconError::ProtocolViolation`] for an unexpected response type, and
    /// the usual timeout/I-O errors.
    pub async fn authenticate(&mut self, password: &str) -> Result<(), RconError> {
        let request_id = next_request_id();
        self.send_packet(&Packet::auth(request_id, password)).await?;

        let response = self.read_packet().await?;

        if response.id == AUTH_FAILURE_ID {
            return Err(RconError::AuthenticationFailed);
        }
        if response.kind != SERVERDATA_AUTH_RESPONSE {
            return Err(RconError::ProtocolViolation(format!(
                "unexpected auth response type {} (expected {})",
                response.kind, SERVERDATA_AUTH_RESPONSE
            )));
        }
        if response.id != request_id {
            // Tolerated dialect variance; the -1 check above already ruled
            // out a rejection.
            debug!(
                "server at {} did not echo auth request id ({} != {})",
                self.addr, response.id, request_id
            );
        }

        // Some servers send one extra empty packet after auth.  Drain it
        // with a short timeout; hitting the timeout means there was nothing
        // to drain, which is the normal case.
        match time::timeout(POST_AUTH_DRAIN_TIMEOUT, self.read_frame()).await {
            Ok(Ok(packet)) => {
                trace!(
                    "drained stray post-auth packet from {} ({} body bytes)",
                    self.addr,
                    packet.body.len()
                );
            }
            Ok(Err(e)) => debug!("ignoring error while draining post-auth packet: {e}"),
            Err(_) => {}
        }

        self.authenticated = true;
        debug!("authenticated against {}", self.addr);
        Ok(())
    }

    /// Sends one command and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns [`RconError::NotAuthenticated`] before a successful handshake
    /// and [`RconError::ProtocolViolation`] when the response id does not
    /// match the request id.
    pub async fn execute(&mut self, command: &str) -> Result<String, RconError> {
        if !self.authenticated {
            return Err(RconError::NotAuthenticated);
        }

        let request_id = next_request_id();
        trace!("executing {command:?} with request id {request_id}");
        self.send_packet(&Packet::exec(request_id, command)).await?;

        let response = self.read_packet().await?;
        if response.id != request_id {
            return Err(RconError::ProtocolViolation(format!(
                "response id {} does not match request id {}",
                response.id, request_id
            )));
        }

        Ok(response.body)
    }

    /// Shuts the connection down.
    ///
    /// Idempotent and infallible: shutdown errors are logged and swallowed,
    /// and dropping the connection releases the socket regardless.
    pub async fn close(&mut self) {
        self.authenticated = false;
        if let Err(e) = self.stream.shutdown().await {
            trace!("shutdown of connection to {}: {e}", self.addr);
        }
    }

    // ── Framing ───────────────────────────────────────────────────────────────

    async fn send_packet(&mut self, packet: &Packet) -> Result<(), RconError> {
        let bytes = encode_packet(packet)?;
        match time::timeout(self.timeout, self.stream.write_all(&bytes)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(RconError::Io(e)),
            Err(_) => Err(RconError::Timeout(self.timeout)),
        }
    }

    /// Reads one packet, bounded by the configured timeout.
    async fn read_packet(&mut self) -> Result<Packet, RconError> {
        match time::timeout(self.timeout, self.read_frame()).await {
            Ok(result) => result,
            Err(_) => {
                warn!("read from {} exceeded {:?}", self.addr, self.timeout);
                Err(RconError::Timeout(self.timeout))
            }
        }
    }

    /// Reads one length-prefixed frame and decodes it.  No timeout of its
    /// own – callers wrap it in whichever deadline applies.
    async fn read_frame(&mut self) -> Result<Packet, RconError> {
        let mut size_buf = [0u8; 4];
        self.stream.read_exact(&mut size_buf).await?;

        let declared = i32::from_le_bytes(size_buf);
        if !(MIN_PACKET_SIZE..=MAX_PACKET_SIZE).contains(&declared) {
            return Err(RconError::ProtocolViolation(format!(
                "declared packet size {declared} outside [{MIN_PACKET_SIZE}, {MAX_PACKET_SIZE}]"
            )));
        }

        let mut frame = vec![0u8; 4 + declared as usize];
        frame[..4].copy_from_slice(&size_buf);
        self.stream.read_exact(&mut frame[4..]).await?;

        let (packet, _consumed) = decode_packet(&frame)?;
        Ok(packet)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
