//! Server status parsing: player list, tick rate, and version.
//!
//! A status snapshot is assembled from the replies to three independent
//! commands (`list`, `tps`, `version`).  Not every server implements all
//! three – vanilla servers answer `tps` with "Unknown command" – so each
//! field degrades to a documented default on its own, without poisoning the
//! rest of the snapshot.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tick rate reported when the server does not expose one.  20 ticks per
/// second is the nominal healthy rate of a Minecraft-style server.
pub const DEFAULT_TICKS_PER_SECOND: f64 = 20.0;

/// Version string reported when none of the known version formats match.
pub const UNKNOWN_VERSION: &str = "Unknown";

/// Point-in-time view of the server, derived from up to three command
/// replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSnapshot {
    /// Players currently online.
    pub online_players: u32,
    /// Configured player capacity.
    pub max_players: u32,
    /// Names of the online players, in server order.
    pub players: Vec<String>,
    /// Measured tick rate, or [`DEFAULT_TICKS_PER_SECOND`] when unsupported.
    pub ticks_per_second: f64,
    /// Server software and version, or [`UNKNOWN_VERSION`].
    pub version: String,
}

impl ServerSnapshot {
    /// Assembles a snapshot from the three raw command replies.
    pub fn from_responses(list: &str, tps: &str, version: &str) -> Self {
        let (online_players, max_players, players) = parse_player_list(list);
        Self {
            online_players,
            max_players,
            players,
            ticks_per_second: parse_ticks_per_second(tps),
            version: parse_version(version),
        }
    }
}

// ── Response patterns ─────────────────────────────────────────────────────────

fn player_list_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"There are (\d+) of a max of (\d+) players online:?(.*)")
            .expect("hard-coded pattern compiles")
    })
}

fn tps_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"TPS: ([0-9.]+)").expect("hard-coded pattern compiles"))
}

fn version_full_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"This server is running (.+?) version (.+?) \(")
            .expect("hard-coded pattern compiles")
    })
}

fn version_short_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\S+) version (\S+)").expect("hard-coded pattern compiles"))
}

// ── Parsers ───────────────────────────────────────────────────────────────────

/// Parses a `list` reply into `(online, max, names)`.
///
/// An unmatched reply yields `(0, 0, [])`.  An empty name tail (zero players
/// online) yields an empty vector, never `[""]`.
pub fn parse_player_list(response: &str) -> (u32, u32, Vec<String>) {
    let Some(caps) = player_list_pattern().captures(response) else {
        warn!("unexpected player list response format: {response}");
        return (0, 0, Vec::new());
    };

    let online: u32 = caps[1].parse().unwrap_or(0);
    let max: u32 = caps[2].parse().unwrap_or(0);

    let tail = caps[3].trim();
    let players = if tail.is_empty() {
        Vec::new()
    } else {
        tail.split(", ").map(str::to_string).collect()
    };

    (online, max, players)
}

/// Parses a `tps` reply, defaulting to [`DEFAULT_TICKS_PER_SECOND`] when the
/// command is unsupported or the reply is unrecognised.
pub fn parse_ticks_per_second(response: &str) -> f64 {
    if response.contains("Unknown command") {
        return DEFAULT_TICKS_PER_SECOND;
    }
    tps_pattern()
        .captures(response)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(DEFAULT_TICKS_PER_SECOND)
}

/// Parses a `version` reply against three formats of decreasing specificity
/// before degrading to [`UNKNOWN_VERSION`]:
///
/// 1. `This server is running <name> version <ver> (…` – Paper/Spigot style.
/// 2. `<name> version <ver>` anywhere in the text.
/// 3. The first two whitespace-separated tokens.
pub fn parse_version(response: &str) -> String {
    if response.contains("Unknown command") {
        return UNKNOWN_VERSION.to_string();
    }

    if let Some(caps) = version_full_pattern().captures(response) {
        return format!("{} {}", &caps[1], &caps[2]);
    }
    if let Some(caps) = version_short_pattern().captures(response) {
        return format!("{} {}", &caps[1], &caps[2]);
    }

    let mut tokens = response.split_whitespace();
    if let (Some(first), Some(second)) = (tokens.next(), tokens.next()) {
        return format!("{first} {second}");
    }

    UNKNOWN_VERSION.to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Player list ───────────────────────────────────────────────────────────

    #[test]
    fn test_parse_player_list_with_names() {
        let (online, max, players) =
            parse_player_list("There are 2 of a max of 20 players online: Steve, Alex");
        assert_eq!(online, 2);
        assert_eq!(max, 20);
        assert_eq!(players, vec!["Steve", "Alex"]);
    }

    #[test]
    fn test_parse_player_list_empty_server_yields_no_names() {
        let (online, max, players) =
            parse_player_list("There are 0 of a max of 20 players online:");
        assert_eq!(online, 0);
        assert_eq!(max, 20);
        assert!(players.is_empty(), "zero players must not parse as [\"\"]");
    }

    #[test]
    fn test_parse_player_list_unrecognised_text_yields_zeroes() {
        let (online, max, players) = parse_player_list("some other dialect entirely");
        assert_eq!((online, max), (0, 0));
        assert!(players.is_empty());
    }

    // ── Tick rate ─────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_tps_extracts_value() {
        assert_eq!(parse_ticks_per_second("TPS: 19.87"), 19.87);
    }

    #[test]
    fn test_parse_tps_unknown_command_yields_default() {
        assert_eq!(
            parse_ticks_per_second("Unknown command. Type \"/help\" for help."),
            DEFAULT_TICKS_PER_SECOND
        );
    }

    #[test]
    fn test_parse_tps_unrecognised_text_yields_default() {
        assert_eq!(
            parse_ticks_per_second("MSPT over the last 5s: 2.1"),
            DEFAULT_TICKS_PER_SECOND
        );
    }

    // ── Version ───────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_version_paper_style() {
        let version = parse_version(
            "This server is running Paper version 1.20.4-496 (MC: 1.20.4) (Implementing API 1.20.4)",
        );
        assert_eq!(version, "Paper 1.20.4-496");
    }

    #[test]
    fn test_parse_version_short_form() {
        assert_eq!(
            parse_version("Spigot version 1.19.2-R0.1"),
            "Spigot 1.19.2-R0.1"
        );
    }

    #[test]
    fn test_parse_version_token_fallback() {
        assert_eq!(parse_version("CraftBukkit 1.18"), "CraftBukkit 1.18");
    }

    #[test]
    fn test_parse_version_unknown_command_yields_unknown() {
        assert_eq!(parse_version("Unknown command"), UNKNOWN_VERSION);
    }

    #[test]
    fn test_parse_version_single_token_yields_unknown() {
        assert_eq!(parse_version("1.20"), UNKNOWN_VERSION);
    }

    // ── Snapshot assembly ─────────────────────────────────────────────────────

    #[test]
    fn test_snapshot_from_responses_combines_all_fields() {
        let snapshot = ServerSnapshot::from_responses(
            "There are 1 of a max of 20 players online: Steve",
            "TPS: 20.0",
            "Spigot version 1.19.2",
        );
        assert_eq!(snapshot.online_players, 1);
        assert_eq!(snapshot.max_players, 20);
        assert_eq!(snapshot.players, vec!["Steve"]);
        assert_eq!(snapshot.ticks_per_second, 20.0);
        assert_eq!(snapshot.version, "Spigot 1.19.2");
    }

    #[test]
    fn test_snapshot_degrades_per_field_without_failing() {
        // A vanilla server knows `list` but answers the other two commands
        // with "Unknown command" – the snapshot still succeeds.
        let snapshot = ServerSnapshot::from_responses(
            "There are 1 of a max of 20 players online: Steve",
            "Unknown command",
            "Unknown command",
        );
        assert_eq!(snapshot.online_players, 1);
        assert_eq!(snapshot.ticks_per_second, DEFAULT_TICKS_PER_SECOND);
        assert_eq!(snapshot.version, UNKNOWN_VERSION);
    }
}
