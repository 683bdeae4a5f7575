//! TLS 1.0/1.1 key derivation using the PRF (RFC 2246 §6.3, §8.1).
//!
//! Derives the master secret from the pre-master secret, then expands
//! the master secret into a key block containing per-direction MAC
//! secrets, write keys and IVs.

use super::prf::prf;
use super::Cipher;
use crate::handshake::{MasterSecret, Random, MASTER_SECRET_LEN};
use tlsstate_types::{CryptoError, TlsError};
use zeroize::Zeroize;

/// Length of Finished.verify_data in TLS 1.0/1.1.
pub const VERIFY_DATA_LEN: usize = 12;

pub const CLIENT_FINISHED_LABEL: &str = "client finished";
pub const SERVER_FINISHED_LABEL: &str = "server finished";

/// Key block sliced into per-direction material.
pub struct KeyBlock {
    pub client_write_mac_secret: Vec<u8>,
    pub server_write_mac_secret: Vec<u8>,
    pub client_write_key: Vec<u8>,
    pub server_write_key: Vec<u8>,
    pub client_write_iv: Vec<u8>,
    pub server_write_iv: Vec<u8>,
}

impl Drop for KeyBlock {
    fn drop(&mut self) {
        self.client_write_mac_secret.zeroize();
        self.server_write_mac_secret.zeroize();
        self.client_write_key.zeroize();
        self.server_write_key.zeroize();
        self.client_write_iv.zeroize();
        self.server_write_iv.zeroize();
    }
}

impl KeyBlock {
    /// Partition raw key-block bytes in the fixed RFC order:
    /// ```text
    /// client_write_MAC_secret[mac_len] || server_write_MAC_secret[mac_len] ||
    /// client_write_key[key_len]        || server_write_key[key_len]        ||
    /// client_write_IV[iv_len]          || server_write_IV[iv_len]
    /// ```
    /// Trailing bytes beyond the six slices are ignored.
    pub fn split(key_block: &[u8], cipher: &Cipher) -> Result<Self, TlsError> {
        let need = 2 * (cipher.mac_len + cipher.key_len + cipher.iv_len);
        if key_block.len() < need {
            return Err(CryptoError::BufferTooSmall {
                need,
                got: key_block.len(),
            }
            .into());
        }

        let mut offset = 0;
        let mut take = |len: usize| {
            let slice = key_block[offset..offset + len].to_vec();
            offset += len;
            slice
        };
        let client_write_mac_secret = take(cipher.mac_len);
        let server_write_mac_secret = take(cipher.mac_len);
        let client_write_key = take(cipher.key_len);
        let server_write_key = take(cipher.key_len);
        let client_write_iv = take(cipher.iv_len);
        let server_write_iv = take(cipher.iv_len);

        Ok(Self {
            client_write_mac_secret,
            server_write_mac_secret,
            client_write_key,
            server_write_key,
            client_write_iv,
            server_write_iv,
        })
    }
}

/// Derive the 48-byte master secret from the pre-master secret.
///
/// ```text
/// master_secret = PRF(pre_master_secret, "master secret",
///                     ClientHello.random + ServerHello.random)[0..47]
/// ```
pub fn derive_master_secret(
    pre_master_secret: &[u8],
    client_random: &Random,
    server_random: &Random,
) -> Result<MasterSecret, TlsError> {
    let mut seed = Vec::with_capacity(64);
    seed.extend_from_slice(client_random.as_bytes());
    seed.extend_from_slice(server_random.as_bytes());
    prf(pre_master_secret, "master secret", &seed, MASTER_SECRET_LEN).map(MasterSecret::new)
}

/// Derive `len` bytes of key block from the master secret.
///
/// ```text
/// key_block = PRF(master_secret, "key expansion",
///                 ServerHello.random + ClientHello.random)
/// ```
pub fn derive_key_block(
    master_secret: &MasterSecret,
    server_random: &Random,
    client_random: &Random,
    len: usize,
) -> Result<Vec<u8>, TlsError> {
    // Note: key expansion seed is server_random + client_random (reversed from master_secret)
    let mut seed = Vec::with_capacity(64);
    seed.extend_from_slice(server_random.as_bytes());
    seed.extend_from_slice(client_random.as_bytes());
    prf(master_secret.as_bytes(), "key expansion", &seed, len)
}

/// Compute the Finished message verify_data (12 bytes).
///
/// ```text
/// verify_data = PRF(master_secret, finished_label,
///                   MD5(handshake_messages) + SHA-1(handshake_messages))[0..11]
/// ```
pub fn compute_verify_data(
    master_secret: &MasterSecret,
    label: &str,
    md5_digest: &[u8],
    sha1_digest: &[u8],
) -> Result<Vec<u8>, TlsError> {
    let mut seed = Vec::with_capacity(md5_digest.len() + sha1_digest.len());
    seed.extend_from_slice(md5_digest);
    seed.extend_from_slice(sha1_digest);
    prf(master_secret.as_bytes(), label, &seed, VERIFY_DATA_LEN)
}
