//! Transient vs fatal failure taxonomy

/// Outcome of classifying a failure message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Expected to succeed if retried after a delay
    Retryable,
    /// Retrying will not help
    Fatal,
}

/// Substrings that mark a failure as transient on their own
const TRANSIENT_MARKERS: &[&str] = &[
    // timeouts
    "timeout",
    "timed out",
    // network
    "econnreset",
    "connection reset",
    "socket hang up",
    "fetch failed",
    "network",
    // database contention and pool exhaustion
    "deadlock detected",
    "could not serialize access",
    "remaining connection slots are reserved",
    "too many connections",
    "the server closed the connection unexpectedly",
    // upstream throttling
    "rate limit",
    "429",
    "overloaded",
    "529",
];

const CONNECTION_STATES: &[&str] = &["closed", "terminated", "refused"];

/// Classify a failure by case-insensitive substring match on its message
pub fn classify(message: &str) -> FailureClass {
    let msg = message.to_lowercase();

    let transient = TRANSIENT_MARKERS.iter().any(|marker| msg.contains(marker))
        || (msg.contains("connection") && CONNECTION_STATES.iter().any(|s| msg.contains(s)))
        || (msg.contains("prepared statement") && msg.contains("already exists"));

    if transient {
        FailureClass::Retryable
    } else {
        FailureClass::Fatal
    }
}
