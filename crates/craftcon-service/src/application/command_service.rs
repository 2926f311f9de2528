//! RconCommandService: logical operations against the game server.
//!
//! Every operation acquires a fresh [`RconConnection`], authenticates,
//! performs one or more executes, and releases the connection on every exit
//! path – success, parse fallback, or protocol error.  Connections are never
//! reused across operations and never shared between callers, so concurrent
//! operations cannot corrupt each other's request/response correlation.
//!
//! Protocol- and connection-level failures always propagate to the caller as
//! [`RconError`]; the service never retries internally.  Response-*text*
//! surprises, by contrast, are recovered locally with documented defaults,
//! because server text is not a versioned contract.

use craftcon_core::domain::status::ServerSnapshot;
use craftcon_core::domain::whitelist::{
    classify_add_response, classify_remove_response, parse_whitelist_roster, CommandResult,
    WhitelistRoster,
};
use tracing::{debug, info, warn};

use crate::infrastructure::network::{ConnectionSettings, RconConnection, RconError};

/// Stateless facade over per-operation RCON connections.
///
/// Cheap to share behind an `Arc`; the only state is the endpoint settings.
pub struct RconCommandService {
    settings: ConnectionSettings,
}

impl RconCommandService {
    /// Creates a service for the given endpoint.
    pub fn new(settings: ConnectionSettings) -> Self {
        Self { settings }
    }

    /// The endpoint this service talks to.
    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Probes connectivity with a harmless inquiry command.
    ///
    /// Returns `true` iff connect, authenticate, and one execute all
    /// succeed.  Never errors – failures are logged and reported as `false`.
    pub async fn test_connectivity(&self) -> bool {
        match self.run_raw_command("list").await {
            Ok(_) => {
                info!("rcon connectivity test successful");
                true
            }
            Err(e) => {
                warn!("rcon connectivity test failed: {e}");
                false
            }
        }
    }

    /// Fetches and parses the whitelist.
    ///
    /// An unrecognised reply format yields an empty roster (logged), not an
    /// error; connection and protocol failures propagate.
    ///
    /// # Errors
    ///
    /// Returns [`RconError`] for connect/auth/protocol failures.
    pub async fn whitelist_roster(&self) -> Result<WhitelistRoster, RconError> {
        let response = self.run_raw_command("whitelist list").await?;
        Ok(parse_whitelist_roster(&response))
    }

    /// Case-insensitive whitelist membership check.
    ///
    /// # Errors
    ///
    /// Returns [`RconError`] for connect/auth/protocol failures.
    pub async fn is_whitelisted(&self, username: &str) -> Result<bool, RconError> {
        Ok(self.whitelist_roster().await?.contains(username))
    }

    /// Adds a player to the whitelist and classifies the server's reply.
    ///
    /// # Errors
    ///
    /// Returns [`RconError`] for connect/auth/protocol failures.  A reply
    /// that the server phrases unexpectedly is *not* an error – it becomes
    /// [`CommandResult::Failure`] carrying the raw text.
    pub async fn whitelist_add(&self, username: &str) -> Result<CommandResult, RconError> {
        let response = self
            .run_raw_command(&format!("whitelist add {username}"))
            .await?;
        let result = classify_add_response(&response, username);
        debug!("whitelist add {username}: {result:?}");
        Ok(result)
    }

    /// Removes a player from the whitelist and classifies the server's reply.
    ///
    /// # Errors
    ///
    /// Returns [`RconError`] for connect/auth/protocol failures.
    pub async fn whitelist_remove(&self, username: &str) -> Result<CommandResult, RconError> {
        let response = self
            .run_raw_command(&format!("whitelist remove {username}"))
            .await?;
        let result = classify_remove_response(&response, username);
        debug!("whitelist remove {username}: {result:?}");
        Ok(result)
    }

    /// Executes an arbitrary command and returns the raw response text.
    ///
    /// No allow/deny policy is applied here; callers that expose this to
    /// users are responsible for filtering commands before invoking it.
    ///
    /// # Errors
    ///
    /// Returns [`RconError`] for connect/auth/protocol failures.
    pub async fn run_raw_command(&self, command: &str) -> Result<String, RconError> {
        let mut conn = self.open_authenticated().await?;
        let result = conn.execute(command).await;
        conn.close().await;
        result
    }

    /// Takes a status snapshot: player list, tick rate, and version.
    ///
    /// The three commands run strictly in sequence on *one* authenticated
    /// connection – the protocol allows a single outstanding request per
    /// connection, and this composite operation is the only place a
    /// connection outlives one execute.  Each sub-parse degrades
    /// independently: a server that lacks `tps` or `version` still yields a
    /// complete snapshot with the documented defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RconError`] for connect/auth/protocol failures.
    pub async fn snapshot(&self) -> Result<ServerSnapshot, RconError> {
        let mut conn = self.open_authenticated().await?;

        let result = async {
            let list = conn.execute("list").await?;
            let tps = conn.execute("tps").await?;
            let version = conn.execute("version").await?;
            Ok(ServerSnapshot::from_responses(&list, &tps, &version))
        }
        .await;

        conn.close().await;
        result
    }

    /// Opens and authenticates a fresh connection for one operation.
    async fn open_authenticated(&self) -> Result<RconConnection, RconError> {
        let mut conn = RconConnection::connect(
            &self.settings.host,
            self.settings.port,
            self.settings.timeout,
        )
        .await?;

        if let Err(e) = conn.authenticate(&self.settings.password).await {
            // The connection is torn down on the error path as well; drop
            // closes the socket after the explicit shutdown.
            conn.close().await;
            return Err(e);
        }
        Ok(conn)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
//
// The service is exercised end-to-end against an in-process fake server in
// `tests/rcon_integration.rs`.  Only connection-free behaviour lives here.
