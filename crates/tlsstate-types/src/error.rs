/// Cryptographic capability errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key")]
    InvalidKey,
    #[error("buffer length not enough: need {need}, got {got}")]
    BufferTooSmall { need: usize, got: usize },
}

/// Errors raised by the connection state engine.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    /// A mutator was called while a required prior state was absent, or a
    /// set-once state was already present. The connection state is untouched.
    #[error("protocol invariant violated in {context}: {label}")]
    InvariantViolation {
        context: &'static str,
        label: &'static str,
    },
    #[error("record layer error: {0}")]
    RecordError(String),
    #[error("unsupported protocol version")]
    UnsupportedVersion,
    #[error("no shared cipher suite")]
    NoSharedCipherSuite,
    #[error("crypto error: {0}")]
    CryptoError(#[from] CryptoError),
}

impl TlsError {
    /// Returns `(context, label)` if this is an invariant violation.
    pub fn violation(&self) -> Option<(&'static str, &'static str)> {
        match self {
            TlsError::InvariantViolation { context, label } => Some((*context, *label)),
            _ => None,
        }
    }
}
