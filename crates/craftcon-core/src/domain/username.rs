//! Player-name validation.
//!
//! Callers are expected to validate names *before* handing them to a
//! whitelist operation – a malformed name would otherwise travel all the way
//! to the server only to bounce off with a "does not exist" reply.

use std::sync::OnceLock;

use regex::Regex;

fn username_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]{1,16}$").expect("hard-coded pattern compiles"))
}

/// Checks that `name` is a plausible Java Edition player name: 1–16
/// characters, letters/digits/underscore only, and no longer than the
/// configured `max_len`.
pub fn validate_username(name: &str, max_len: usize) -> bool {
    !name.is_empty() && name.len() <= max_len && username_pattern().is_match(name)
}
