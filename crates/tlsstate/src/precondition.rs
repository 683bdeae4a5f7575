//! Named-invariant checks guarding every state mutator.
//!
//! Each check pairs a label with a predicate that is `true` when the
//! state is *wrong*: a required prior value is still absent, or a
//! set-once value is already present. Checks run in order and the first
//! violation aborts the operation before anything is written.

use tlsstate_types::TlsError;

/// A labelled violation predicate.
pub type Check<'a> = (&'static str, &'a dyn Fn() -> bool);

pub const NO_HANDSHAKE: &str = "no handshake in progress";
pub const NO_SERVER_RANDOM: &str = "server random not set";
pub const NO_MASTER_SECRET: &str = "master secret not set";
pub const NO_CIPHER: &str = "cipher not set";
pub const NO_DIGEST: &str = "handshake digest not initialized";
pub const NO_DIRECTION_STATE: &str = "direction state not derived";
pub const SERVER_RANDOM_SET: &str = "server random already set";
pub const KEYS_DERIVED: &str = "key schedule already derived";
pub const PUBLIC_KEY_SET: &str = "public key already set";
pub const PRIVATE_KEY_SET: &str = "private key already set";
pub const SEQUENCE_EXHAUSTED: &str = "sequence number exhausted";

/// Build the error for a violated invariant.
pub fn violation(context: &'static str, label: &'static str) -> TlsError {
    tracing::debug!(context, label, "protocol invariant violated");
    TlsError::InvariantViolation { context, label }
}

/// Evaluate `checks` in order; fail on the first predicate that holds.
/// Later predicates are not evaluated once one has fired.
pub fn check_invariants(context: &'static str, checks: &[Check<'_>]) -> Result<(), TlsError> {
    for &(label, violated) in checks {
        if violated() {
            return Err(violation(context, label));
        }
    }
    Ok(())
}

/// Unwrap a value whose absence is a protocol-ordering violation.
pub fn require<T>(context: &'static str, label: &'static str, value: Option<T>) -> Result<T, TlsError> {
    value.ok_or_else(|| violation(context, label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_all_pass() {
        assert!(check_invariants("op", &[("a", &|| false), ("b", &|| false)]).is_ok());
        assert!(check_invariants("op", &[]).is_ok());
    }

    #[test]
    fn test_first_violation_reported() {
        let err = check_invariants("op", &[("a", &|| false), ("b", &|| true), ("c", &|| true)])
            .unwrap_err();
        assert_eq!(err.violation(), Some(("op", "b")));
    }

    #[test]
    fn test_stops_at_first_violation() {
        let evaluated = Cell::new(false);
        let later = || {
            evaluated.set(true);
            true
        };
        let err = check_invariants("op", &[("first", &|| true), ("second", &later)]).unwrap_err();
        assert_eq!(err.violation(), Some(("op", "first")));
        assert!(!evaluated.get());
    }

    #[test]
    fn test_require() {
        assert_eq!(require("op", "missing", Some(5)).unwrap(), 5);
        let err = require::<u8>("op", "missing", None).unwrap_err();
        assert_eq!(err.violation(), Some(("op", "missing")));
    }
}
