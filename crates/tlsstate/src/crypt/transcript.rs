//! Dual running handshake hash for TLS 1.0/1.1 Finished computation.
//!
//! Maintains MD5 and SHA-1 over all handshake messages in arrival order.
//! Reading a digest never finalizes the live contexts, so both peers'
//! Finished values can be taken from the same accumulation.

use tlsstate_crypto::{Digest, Md5, Sha1};
use tlsstate_types::TlsError;

/// Running MD5 + SHA-1 transcript.
#[derive(Clone, Default)]
pub struct HandshakeDigest {
    md5: Md5,
    sha1: Sha1,
    bytes_hashed: usize,
}

impl HandshakeDigest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw handshake message bytes into both hashes.
    pub fn update(&mut self, data: &[u8]) -> Result<(), TlsError> {
        self.md5.update(data)?;
        self.sha1.update(data)?;
        self.bytes_hashed += data.len();
        Ok(())
    }

    /// Current MD5 of the transcript without consuming the state.
    pub fn md5_digest(&self) -> Result<Vec<u8>, TlsError> {
        Ok(self.md5.peek_vec()?)
    }

    /// Current SHA-1 of the transcript without consuming the state.
    pub fn sha1_digest(&self) -> Result<Vec<u8>, TlsError> {
        Ok(self.sha1.peek_vec()?)
    }

    /// Total number of bytes fed so far.
    pub fn bytes_hashed(&self) -> usize {
        self.bytes_hashed
    }
}
