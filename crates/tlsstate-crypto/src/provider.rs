//! Trait-based provider mechanism for hash algorithms.
//!
//! The handshake transcript only ever talks to hashes through [`Digest`],
//! so the running MD5/SHA-1 pair can be fed by any implementation.

use tlsstate_types::CryptoError;

/// A streaming hash / message digest.
pub trait Digest: Send + Sync {
    /// The output size in bytes.
    fn output_size(&self) -> usize;

    /// Feed data into the hash state.
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError>;

    /// Write the digest of everything fed so far to `out` without
    /// disturbing the running state. Later `update` calls continue
    /// the same stream.
    fn peek(&self, out: &mut [u8]) -> Result<(), CryptoError>;

    /// Convenience: `peek` into a freshly allocated buffer.
    fn peek_vec(&self) -> Result<Vec<u8>, CryptoError> {
        let mut out = vec![0u8; self.output_size()];
        self.peek(&mut out)?;
        Ok(out)
    }
}
