//! Whitelist response parsing and result classification.
//!
//! The protocol has no success/failure flag, so the outcome of a whitelist
//! operation is recovered by matching the server's reply against the known
//! phrases, in order of specificity.  An unrecognised reply is *never*
//! treated as success – it becomes a failure carrying the raw text so the
//! caller can show the user what the server actually said.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Outcome of a whitelist add/remove command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandResult {
    /// The server confirmed the operation.
    Success { message: String },
    /// The server refused or replied with something unrecognised.
    Failure { reason: String },
}

impl CommandResult {
    /// `true` for the [`CommandResult::Success`] variant.
    pub fn is_success(&self) -> bool {
        matches!(self, CommandResult::Success { .. })
    }
}

/// Parsed contents of a `whitelist list` reply.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WhitelistRoster {
    /// The count the server reported.
    pub count: u32,
    /// Whitelisted player names in server order.
    pub players: Vec<String>,
}

impl WhitelistRoster {
    /// Case-insensitive exact-name membership check.
    pub fn contains(&self, name: &str) -> bool {
        self.players.iter().any(|p| p.eq_ignore_ascii_case(name))
    }
}

// ── Response patterns ─────────────────────────────────────────────────────────

fn roster_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"There are (\d+) whitelisted players?(?:\(s\))?: (.*)")
            .expect("hard-coded pattern compiles")
    })
}

fn added_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Added .+ to the whitelist").expect("hard-coded pattern compiles"))
}

fn removed_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Removed .+ from the whitelist").expect("hard-coded pattern compiles")
    })
}

// ── Parsers ───────────────────────────────────────────────────────────────────

/// Parses a `whitelist list` reply.
///
/// A reply that does not match the expected shape yields an empty roster –
/// dialect variance here is expected, not exceptional.  An empty name tail
/// yields an empty vector, never a vector holding one empty string.
pub fn parse_whitelist_roster(response: &str) -> WhitelistRoster {
    let Some(caps) = roster_pattern().captures(response) else {
        warn!("unexpected whitelist list response format: {response}");
        return WhitelistRoster::default();
    };

    // The count group is \d+ so the only parse failure mode is overflow.
    let count: u32 = caps[1].parse().unwrap_or(0);
    let players = if count > 0 {
        split_names(&caps[2])
    } else {
        Vec::new()
    };

    WhitelistRoster { count, players }
}

/// Classifies the reply to `whitelist add <username>`.
pub fn classify_add_response(response: &str, username: &str) -> CommandResult {
    if added_pattern().is_match(response) {
        CommandResult::Success {
            message: format!("Player {username} successfully added to the whitelist"),
        }
    } else if response.contains("already whitelisted") {
        CommandResult::Failure {
            reason: format!("Player {username} is already whitelisted"),
        }
    } else if response.contains("does not exist") {
        CommandResult::Failure {
            reason: format!("Player {username} does not exist (invalid username)"),
        }
    } else {
        warn!("unexpected whitelist add response: {response}");
        CommandResult::Failure {
            reason: format!("Unexpected server response: {response}"),
        }
    }
}

/// Classifies the reply to `whitelist remove <username>`.
pub fn classify_remove_response(response: &str, username: &str) -> CommandResult {
    if removed_pattern().is_match(response) {
        CommandResult::Success {
            message: format!("Player {username} successfully removed from the whitelist"),
        }
    } else if response.contains("is not whitelisted") {
        CommandResult::Failure {
            reason: format!("Player {username} is not whitelisted"),
        }
    } else if response.contains("does not exist") {
        CommandResult::Failure {
            reason: format!("Player {username} does not exist (invalid username)"),
        }
    } else {
        warn!("unexpected whitelist remove response: {response}");
        CommandResult::Failure {
            reason: format!("Unexpected server response: {response}"),
        }
    }
}

/// Splits a `", "`-separated name tail, discarding empty fragments.
fn split_names(tail: &str) -> Vec<String> {
    tail.split(", ")
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Roster parsing ────────────────────────────────────────────────────────

    #[test]
    fn test_parse_roster_with_two_players() {
        let roster = parse_whitelist_roster("There are 2 whitelisted players: Alice, Bob");
        assert_eq!(roster.count, 2);
        assert_eq!(roster.players, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_parse_roster_with_zero_players_yields_empty_vec() {
        // The trailing space after the colon must not become a player
        // named "".
        let roster = parse_whitelist_roster("There are 0 whitelisted players: ");
        assert_eq!(roster.count, 0);
        assert!(roster.players.is_empty());
    }

    #[test]
    fn test_parse_roster_accepts_parenthesised_plural() {
        let roster = parse_whitelist_roster("There are 1 whitelisted player(s): Steve");
        assert_eq!(roster.count, 1);
        assert_eq!(roster.players, vec!["Steve"]);
    }

    #[test]
    fn test_parse_roster_unrecognised_text_falls_back_to_empty() {
        let roster = parse_whitelist_roster("Unknown command. Type \"/help\" for help.");
        assert_eq!(roster, WhitelistRoster::default());
    }

    #[test]
    fn test_parse_roster_discards_empty_fragments() {
        let roster = parse_whitelist_roster("There are 2 whitelisted players: Alice, , Bob");
        assert_eq!(roster.players, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_roster_contains_is_case_insensitive() {
        let roster = parse_whitelist_roster("There are 1 whitelisted players: Steve");
        assert!(roster.contains("steve"));
        assert!(roster.contains("STEVE"));
        assert!(!roster.contains("Alex"));
    }

    // ── Add classification ────────────────────────────────────────────────────

    #[test]
    fn test_classify_add_success() {
        let result = classify_add_response("Added Steve to the whitelist", "Steve");
        assert!(result.is_success());
    }

    #[test]
    fn test_classify_add_already_whitelisted_is_failure_with_reason() {
        let result = classify_add_response("Player is already whitelisted", "Steve");
        assert_eq!(
            result,
            CommandResult::Failure {
                reason: "Player Steve is already whitelisted".to_string(),
            }
        );
    }

    #[test]
    fn test_classify_add_unknown_player_is_failure() {
        let result = classify_add_response("That player does not exist", "Ste ve");
        assert!(matches!(result, CommandResult::Failure { reason } if reason.contains("does not exist")));
    }

    #[test]
    fn test_classify_add_unrecognised_text_is_never_success() {
        let result = classify_add_response("An unexpected error occurred", "Steve");
        assert_eq!(
            result,
            CommandResult::Failure {
                reason: "Unexpected server response: An unexpected error occurred".to_string(),
            }
        );
    }

    #[test]
    fn test_classify_add_is_idempotent_on_reparsing() {
        let response = "Added Alex to the whitelist";
        let first = classify_add_response(response, "Alex");
        let second = classify_add_response(response, "Alex");
        assert_eq!(first, second);
    }

    // ── Remove classification ─────────────────────────────────────────────────

    #[test]
    fn test_classify_remove_success() {
        let result = classify_remove_response("Removed Steve from the whitelist", "Steve");
        assert!(result.is_success());
    }

    #[test]
    fn test_classify_remove_not_whitelisted_is_failure() {
        let result = classify_remove_response("Player is not whitelisted", "Steve");
        assert_eq!(
            result,
            CommandResult::Failure {
                reason: "Player Steve is not whitelisted".to_string(),
            }
        );
    }

    #[test]
    fn test_classify_remove_unrecognised_text_is_failure_with_raw_text() {
        let result = classify_remove_response("###", "Steve");
        assert_eq!(
            result,
            CommandResult::Failure {
                reason: "Unexpected server response: ###".to_string(),
            }
        );
    }
}
