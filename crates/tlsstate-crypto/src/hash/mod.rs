//! Hash contexts for MD5 and SHA-1.
//!
//! Each context wraps the RustCrypto implementation behind the
//! [`Digest`] provider trait. Contexts are `Clone`, which is what makes
//! non-destructive finalization (`peek`) cheap.
//!
//! **Security warning**: MD5 and SHA-1 are provided only because the
//! TLS 1.0/1.1 Finished hash requires them.

use crate::provider::Digest;
use sha1::Digest as _;
use tlsstate_types::{CryptoError, HashAlgId};

fn write_out(out: &mut [u8], digest: &[u8]) -> Result<(), CryptoError> {
    if out.len() < digest.len() {
        return Err(CryptoError::BufferTooSmall {
            need: digest.len(),
            got: out.len(),
        });
    }
    out[..digest.len()].copy_from_slice(digest);
    Ok(())
}

macro_rules! impl_digest {
    ($(#[$meta:meta])* $name:ident, $inner:ty, $alg:expr) => {
        $(#[$meta])*
        #[derive(Clone, Default)]
        pub struct $name {
            inner: $inner,
        }

        impl $name {
            /// Create a new hash context.
            pub fn new() -> Self {
                Self::default()
            }

            /// One-shot digest of `data`.
            pub fn digest(data: &[u8]) -> Vec<u8> {
                <$inner>::digest(data).to_vec()
            }
        }

        impl Digest for $name {
            fn output_size(&self) -> usize {
                $alg.output_size()
            }

            fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
                sha1::Digest::update(&mut self.inner, data);
                Ok(())
            }

            fn peek(&self, out: &mut [u8]) -> Result<(), CryptoError> {
                let digest = self.inner.clone().finalize();
                write_out(out, &digest)
            }
        }
    };
}

impl_digest!(
    /// MD5 hash context (RFC 1321).
    Md5,
    md5::Md5,
    HashAlgId::Md5
);

impl_digest!(
    /// SHA-1 hash context (RFC 3174).
    Sha1,
    sha1::Sha1,
    HashAlgId::Sha1
);
