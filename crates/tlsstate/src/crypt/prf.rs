//! TLS 1.0/1.1 PRF as defined in RFC 2246 §5 / RFC 4346 §5.
//!
//! ```text
//! PRF(secret, label, seed) = P_MD5(S1, label + seed) XOR
//!                            P_SHA-1(S2, label + seed)
//!
//! P_hash(secret, seed) = HMAC_hash(secret, A(1) + seed) ||
//!                         HMAC_hash(secret, A(2) + seed) || ...
//! A(0) = seed
//! A(i) = HMAC_hash(secret, A(i-1))
//! ```
//!
//! S1 and S2 are the first and last `ceil(len(secret) / 2)` bytes of the
//! secret; they share the middle byte when the length is odd.

use tlsstate_crypto::hmac::Hmac;
use tlsstate_types::{HashAlgId, TlsError};
use zeroize::Zeroize;

/// TLS 1.0 PRF: derive `output_len` bytes from `secret`, `label`, and `seed`.
pub fn prf(secret: &[u8], label: &str, seed: &[u8], output_len: usize) -> Result<Vec<u8>, TlsError> {
    let mut label_seed = Vec::with_capacity(label.len() + seed.len());
    label_seed.extend_from_slice(label.as_bytes());
    label_seed.extend_from_slice(seed);

    let half = secret.len().div_ceil(2);
    let s1 = &secret[..half];
    let s2 = &secret[secret.len() - half..];

    let mut result = p_hash(HashAlgId::Md5, s1, &label_seed, output_len)?;
    let mut sha1_stream = p_hash(HashAlgId::Sha1, s2, &label_seed, output_len)?;
    for (out, b) in result.iter_mut().zip(sha1_stream.iter()) {
        *out ^= b;
    }
    sha1_stream.zeroize();
    Ok(result)
}

/// P_hash expansion function.
pub fn p_hash(
    alg: HashAlgId,
    secret: &[u8],
    seed: &[u8],
    output_len: usize,
) -> Result<Vec<u8>, TlsError> {
    let mut result = Vec::with_capacity(output_len);

    // A(0) = seed
    let mut a = seed.to_vec();

    while result.len() < output_len {
        // A(i) = HMAC_hash(secret, A(i-1))
        let next = Hmac::mac(alg, secret, &a)?;
        a.zeroize();
        a = next;

        // HMAC_hash(secret, A(i) + seed)
        let mut ctx = Hmac::new(alg, secret)?;
        ctx.update(&a);
        ctx.update(seed);
        result.extend_from_slice(&ctx.finish());
    }

    a.zeroize();
    result.truncate(output_len);
    Ok(result)
}
