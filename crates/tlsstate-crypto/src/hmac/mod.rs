//! HMAC (RFC 2104) over the supported hash algorithms.
//!
//! HMAC(K, m) = H((K' XOR opad) || H((K' XOR ipad) || m))

use ::hmac::{Mac, SimpleHmac};
use tlsstate_types::{CryptoError, HashAlgId};

enum HmacState {
    Md5(SimpleHmac<md5::Md5>),
    Sha1(SimpleHmac<sha1::Sha1>),
    Sha256(SimpleHmac<sha2::Sha256>),
}

/// Streaming HMAC context for one of the supported hashes.
pub struct Hmac {
    alg: HashAlgId,
    state: HmacState,
}

impl Hmac {
    /// Create a new HMAC instance keyed with `key`. Any key length is accepted.
    pub fn new(alg: HashAlgId, key: &[u8]) -> Result<Self, CryptoError> {
        let state = match alg {
            HashAlgId::Md5 => HmacState::Md5(
                <SimpleHmac<md5::Md5> as Mac>::new_from_slice(key)
                    .map_err(|_| CryptoError::InvalidKey)?,
            ),
            HashAlgId::Sha1 => HmacState::Sha1(
                <SimpleHmac<sha1::Sha1> as Mac>::new_from_slice(key)
                    .map_err(|_| CryptoError::InvalidKey)?,
            ),
            HashAlgId::Sha256 => HmacState::Sha256(
                <SimpleHmac<sha2::Sha256> as Mac>::new_from_slice(key)
                    .map_err(|_| CryptoError::InvalidKey)?,
            ),
        };
        Ok(Self { alg, state })
    }

    /// MAC output size in bytes.
    pub fn output_size(&self) -> usize {
        self.alg.output_size()
    }

    /// Feed data into the HMAC computation.
    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            HmacState::Md5(m) => m.update(data),
            HmacState::Sha1(m) => m.update(data),
            HmacState::Sha256(m) => m.update(data),
        }
    }

    /// Finalize the HMAC computation.
    pub fn finish(self) -> Vec<u8> {
        match self.state {
            HmacState::Md5(m) => m.finalize().into_bytes().to_vec(),
            HmacState::Sha1(m) => m.finalize().into_bytes().to_vec(),
            HmacState::Sha256(m) => m.finalize().into_bytes().to_vec(),
        }
    }

    /// One-shot HMAC computation.
    pub fn mac(alg: HashAlgId, key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut ctx = Self::new(alg, key)?;
        ctx.update(data);
        Ok(ctx.finish())
    }
}
