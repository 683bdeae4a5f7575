//! TLS cryptographic operations wrapper.
//!
//! Bridges the state engine with the hash/HMAC capabilities in
//! `tlsstate-crypto`: cipher descriptors, the PRF-based key schedule,
//! the dual handshake transcript and key logging.

pub mod key_schedule;
pub mod keylog;
pub mod prf;
pub mod transcript;

use crate::handshake::{MasterSecret, Random};
use crate::{CipherSuite, TlsRole};
use key_schedule::{CLIENT_FINISHED_LABEL, SERVER_FINISHED_LABEL};
use tlsstate_crypto::hmac::Hmac;
use tlsstate_types::{HashAlgId, TlsError};

/// Bulk encryption algorithm of a cipher suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkCipher {
    Null,
    Rc4_128,
    TripleDesEdeCbc,
    Aes128Cbc,
    Aes256Cbc,
}

/// Parameters associated with a negotiated cipher suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cipher {
    /// The cipher suite identifier.
    pub suite: CipherSuite,
    /// Bulk encryption algorithm.
    pub bulk: BulkCipher,
    /// Hash used for the record MAC.
    pub mac_alg: HashAlgId,
    /// MAC secret and MAC output length in bytes.
    pub mac_len: usize,
    /// Encryption key length in bytes.
    pub key_len: usize,
    /// IV length from the key block (block size for CBC, 0 for stream/NULL).
    pub iv_len: usize,
}

impl Cipher {
    /// Look up parameters for a cipher suite.
    ///
    /// `TLS_RSA_WITH_AES_128_CBC_SHA256` is a TLS 1.2 suite. It is listed
    /// only to exercise a 32-byte record MAC; keys derived for it with
    /// [`Tls10Prf`] will not interoperate with a real TLS 1.2 peer.
    pub fn from_suite(suite: CipherSuite) -> Result<Self, TlsError> {
        let (bulk, mac_alg, key_len, iv_len) = match suite {
            CipherSuite::TLS_RSA_WITH_NULL_MD5 => (BulkCipher::Null, HashAlgId::Md5, 0, 0),
            CipherSuite::TLS_RSA_WITH_NULL_SHA => (BulkCipher::Null, HashAlgId::Sha1, 0, 0),
            CipherSuite::TLS_RSA_WITH_RC4_128_MD5 => (BulkCipher::Rc4_128, HashAlgId::Md5, 16, 0),
            CipherSuite::TLS_RSA_WITH_RC4_128_SHA => (BulkCipher::Rc4_128, HashAlgId::Sha1, 16, 0),
            CipherSuite::TLS_RSA_WITH_3DES_EDE_CBC_SHA => {
                (BulkCipher::TripleDesEdeCbc, HashAlgId::Sha1, 24, 8)
            }
            CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA => {
                (BulkCipher::Aes128Cbc, HashAlgId::Sha1, 16, 16)
            }
            CipherSuite::TLS_RSA_WITH_AES_256_CBC_SHA => {
                (BulkCipher::Aes256Cbc, HashAlgId::Sha1, 32, 16)
            }
            CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA256 => {
                (BulkCipher::Aes128Cbc, HashAlgId::Sha256, 16, 16)
            }
            _ => return Err(TlsError::NoSharedCipherSuite),
        };
        Ok(Self {
            suite,
            bulk,
            mac_alg,
            mac_len: mac_alg.output_size(),
            key_len,
            iv_len,
        })
    }

    /// Total key material needed from the key block: 2*mac + 2*key + 2*iv.
    pub fn key_block_len(&self) -> usize {
        2 * self.mac_len + 2 * self.key_len + 2 * self.iv_len
    }

    /// HMAC with this suite's MAC hash.
    pub fn hmac(&self, secret: &[u8], message: &[u8]) -> Result<Vec<u8>, TlsError> {
        Ok(Hmac::mac(self.mac_alg, secret, message)?)
    }
}

/// PRF-based derivations the engine delegates to.
///
/// The engine owns ordering and storage; implementations own the math.
pub trait KeyScheduleCrypto {
    /// Derive the master secret from the pre-master secret and both randoms.
    fn master_secret(
        &self,
        pre_master_secret: &[u8],
        client_random: &Random,
        server_random: &Random,
    ) -> Result<MasterSecret, TlsError>;

    /// Expand the master secret into `len` bytes of key block.
    fn key_block(
        &self,
        client_random: &Random,
        server_random: &Random,
        master_secret: &MasterSecret,
        len: usize,
    ) -> Result<Vec<u8>, TlsError>;

    /// Finished.verify_data for `role` over the given transcript digests.
    fn finished_verify_data(
        &self,
        master_secret: &MasterSecret,
        md5_digest: &[u8],
        sha1_digest: &[u8],
        role: TlsRole,
    ) -> Result<Vec<u8>, TlsError>;
}

/// The TLS 1.0/1.1 key schedule (MD5/SHA-1 PRF).
#[derive(Debug, Clone, Copy, Default)]
pub struct Tls10Prf;

impl KeyScheduleCrypto for Tls10Prf {
    fn master_secret(
        &self,
        pre_master_secret: &[u8],
        client_random: &Random,
        server_random: &Random,
    ) -> Result<MasterSecret, TlsError> {
        key_schedule::derive_master_secret(pre_master_secret, client_random, server_random)
    }

    fn key_block(
        &self,
        client_random: &Random,
        server_random: &Random,
        master_secret: &MasterSecret,
        len: usize,
    ) -> Result<Vec<u8>, TlsError> {
        key_schedule::derive_key_block(master_secret, server_random, client_random, len)
    }

    fn finished_verify_data(
        &self,
        master_secret: &MasterSecret,
        md5_digest: &[u8],
        sha1_digest: &[u8],
        role: TlsRole,
    ) -> Result<Vec<u8>, TlsError> {
        let label = match role {
            TlsRole::Client => CLIENT_FINISHED_LABEL,
            TlsRole::Server => SERVER_FINISHED_LABEL,
        };
        key_schedule::compute_verify_data(master_secret, label, md5_digest, sha1_digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cipher_params_aes128_sha() {
        let c = Cipher::from_suite(CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA).unwrap();
        assert_eq!(c.mac_len, 20);
        assert_eq!(c.key_len, 16);
        assert_eq!(c.iv_len, 16);
        // 2*20 + 2*16 + 2*16 = 104
        assert_eq!(c.key_block_len(), 104);
    }

    #[test]
    fn test_cipher_params_table() {
        let cases = [
            (CipherSuite::TLS_RSA_WITH_NULL_MD5, 16, 0, 0, 32),
            (CipherSuite::TLS_RSA_WITH_NULL_SHA, 20, 0, 0, 40),
            (CipherSuite::TLS_RSA_WITH_RC4_128_MD5, 16, 16, 0, 64),
            (CipherSuite::TLS_RSA_WITH_RC4_128_SHA, 20, 16, 0, 72),
            (CipherSuite::TLS_RSA_WITH_3DES_EDE_CBC_SHA, 20, 24, 8, 104),
            (CipherSuite::TLS_RSA_WITH_AES_256_CBC_SHA, 20, 32, 16, 136),
            (CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA256, 32, 16, 16, 128),
        ];
        for (suite, mac, key, iv, total) in cases {
            let c = Cipher::from_suite(suite).unwrap();
            assert_eq!((c.mac_len, c.key_len, c.iv_len), (mac, key, iv), "{suite:?}");
            assert_eq!(c.key_block_len(), total, "{suite:?}");
        }
    }

    #[test]
    fn test_unknown_suite() {
        assert!(matches!(
            Cipher::from_suite(CipherSuite(0xC02F)),
            Err(TlsError::NoSharedCipherSuite)
        ));
    }

    #[test]
    fn test_cipher_hmac_uses_suite_hash() {
        let md5 = Cipher::from_suite(CipherSuite::TLS_RSA_WITH_RC4_128_MD5).unwrap();
        let sha = Cipher::from_suite(CipherSuite::TLS_RSA_WITH_RC4_128_SHA).unwrap();
        assert_eq!(md5.hmac(b"k", b"m").unwrap().len(), 16);
        assert_eq!(sha.hmac(b"k", b"m").unwrap().len(), 20);
        assert_eq!(
            sha.hmac(b"k", b"m").unwrap(),
            Hmac::mac(HashAlgId::Sha1, b"k", b"m").unwrap()
        );
    }

    #[test]
    fn test_tls10_prf_finished_roles_differ() {
        let ms = MasterSecret::new(vec![0x42; 48]);
        let client = Tls10Prf
            .finished_verify_data(&ms, &[1; 16], &[2; 20], TlsRole::Client)
            .unwrap();
        let server = Tls10Prf
            .finished_verify_data(&ms, &[1; 16], &[2; 20], TlsRole::Server)
            .unwrap();
        assert_eq!(client.len(), 12);
        assert_eq!(server.len(), 12);
        assert_ne!(client, server);
    }

    #[test]
    fn test_tls10_prf_key_block_length() {
        let ms = MasterSecret::new(vec![0x42; 48]);
        let kb = Tls10Prf
            .key_block(&Random([1; 32]), &Random([2; 32]), &ms, 104)
            .unwrap();
        assert_eq!(kb.len(), 104);
    }
}
