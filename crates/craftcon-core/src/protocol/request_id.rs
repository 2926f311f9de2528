//! Random request-id generation for request/response correlation.
//!
//! # Why random ids? (for beginners)
//!
//! Every RCON request carries a caller-chosen `i32` id that a well-behaved
//! server echoes back in its response.  Matching the echoed id against the
//! id we sent is the only correlation mechanism the protocol has – there is
//! no sequence numbering and no pipelining guarantee.
//!
//! A fresh random id per request (rather than a counter) means a stale or
//! duplicated response from a previous connection is overwhelmingly unlikely
//! to be mistaken for the answer to the current request.
//!
//! Two values are off-limits:
//!
//! - `-1` is the server's authentication-failure sentinel, so a request must
//!   never use it.
//! - Negative ids in general are avoided; some server implementations treat
//!   the sign bit as an error marker.

use rand::Rng;

/// Returns a fresh random request id in `0..i32::MAX`.
///
/// The id is always non-negative and can never collide with the `-1`
/// auth-failure sentinel.
pub fn next_request_id() -> i32 {
    rand::rng().random_range(0..i32::MAX)
}
