#![forbid(unsafe_code)]
#![doc = "Per-connection cryptographic state engine for legacy TLS."]

pub mod config;
pub mod crypt;
pub mod engine;
pub mod handshake;
pub mod precondition;
pub mod record;
pub mod state;

pub use config::StateConfig;
pub use crypt::{Cipher, KeyScheduleCrypto, Tls10Prf};
pub use engine::StateEngine;
pub use handshake::{classify_handshake_material, HandshakeType, Random};
pub use record::{ContentType, RecordHeader};
pub use state::direction::{Direction, DirectionState};
pub use state::{ConnectionState, MemoryStore, StateStore};
pub use tlsstate_types::TlsError;

/// TLS protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TlsVersion {
    Ssl3,
    Tls10,
    Tls11,
    Tls12,
}

impl TlsVersion {
    /// Wire encoding (major, minor) as a big-endian u16.
    pub fn to_u16(self) -> u16 {
        match self {
            TlsVersion::Ssl3 => 0x0300,
            TlsVersion::Tls10 => 0x0301,
            TlsVersion::Tls11 => 0x0302,
            TlsVersion::Tls12 => 0x0303,
        }
    }

    /// Decode a wire version.
    pub fn from_u16(v: u16) -> Result<Self, TlsError> {
        match v {
            0x0300 => Ok(TlsVersion::Ssl3),
            0x0301 => Ok(TlsVersion::Tls10),
            0x0302 => Ok(TlsVersion::Tls11),
            0x0303 => Ok(TlsVersion::Tls12),
            _ => Err(TlsError::UnsupportedVersion),
        }
    }
}

/// TLS cipher suite identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CipherSuite(pub u16);

impl CipherSuite {
    pub const TLS_RSA_WITH_NULL_MD5: Self = Self(0x0001);
    pub const TLS_RSA_WITH_NULL_SHA: Self = Self(0x0002);
    pub const TLS_RSA_WITH_RC4_128_MD5: Self = Self(0x0004);
    pub const TLS_RSA_WITH_RC4_128_SHA: Self = Self(0x0005);
    pub const TLS_RSA_WITH_3DES_EDE_CBC_SHA: Self = Self(0x000A);
    pub const TLS_RSA_WITH_AES_128_CBC_SHA: Self = Self(0x002F);
    pub const TLS_RSA_WITH_AES_256_CBC_SHA: Self = Self(0x0035);
    pub const TLS_RSA_WITH_AES_128_CBC_SHA256: Self = Self(0x003C);
}

/// The role of a TLS endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsRole {
    Client,
    Server,
}
