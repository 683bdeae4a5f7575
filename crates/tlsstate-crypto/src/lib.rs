#![forbid(unsafe_code)]
#![doc = "Hash and HMAC capabilities consumed by the tlsstate engine."]

// Core traits
pub mod provider;

// Hash algorithms
pub mod hash;

// MAC algorithms
pub mod hmac;

pub use hash::{Md5, Sha1};
pub use provider::Digest;
