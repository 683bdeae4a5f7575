//! Handshake-scoped state: message types, randoms, secrets and the
//! running transcript that exist only while a handshake is in progress.

use std::fmt;

use crate::crypt::transcript::HandshakeDigest;
use crate::TlsVersion;
use zeroize::Zeroize;

/// Length of ClientHello.random / ServerHello.random.
pub const RANDOM_LEN: usize = 32;

/// Length of the TLS 1.0/1.1 master secret.
pub const MASTER_SECRET_LEN: usize = 48;

/// Handshake message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HandshakeType {
    HelloRequest = 0,
    ClientHello = 1,
    ServerHello = 2,
    Certificate = 11,
    ServerKeyExchange = 12,
    CertificateRequest = 13,
    ServerHelloDone = 14,
    CertificateVerify = 15,
    ClientKeyExchange = 16,
    Finished = 20,
}

impl HandshakeType {
    /// Convert from u8 to HandshakeType.
    pub fn from_u8(v: u8) -> Result<Self, u8> {
        match v {
            0 => Ok(HandshakeType::HelloRequest),
            1 => Ok(HandshakeType::ClientHello),
            2 => Ok(HandshakeType::ServerHello),
            11 => Ok(HandshakeType::Certificate),
            12 => Ok(HandshakeType::ServerKeyExchange),
            13 => Ok(HandshakeType::CertificateRequest),
            14 => Ok(HandshakeType::ServerHelloDone),
            15 => Ok(HandshakeType::CertificateVerify),
            16 => Ok(HandshakeType::ClientKeyExchange),
            20 => Ok(HandshakeType::Finished),
            _ => Err(v),
        }
    }
}

/// Whether a handshake message of this type is fed into the running
/// handshake digest.
pub fn classify_handshake_material(msg_type: HandshakeType) -> bool {
    match msg_type {
        HandshakeType::HelloRequest => false,
        HandshakeType::CertificateVerify => false,
        HandshakeType::ClientHello
        | HandshakeType::ServerHello
        | HandshakeType::Certificate
        | HandshakeType::ServerHelloDone
        | HandshakeType::ClientKeyExchange
        | HandshakeType::ServerKeyExchange
        | HandshakeType::CertificateRequest
        | HandshakeType::Finished => true,
    }
}

/// A 32-byte hello random.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Random(pub [u8; RANDOM_LEN]);

impl Random {
    pub fn as_bytes(&self) -> &[u8; RANDOM_LEN] {
        &self.0
    }
}

/// The master secret. Zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct MasterSecret(Vec<u8>);

impl MasterSecret {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for MasterSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterSecret([{} bytes])", self.0.len())
    }
}

/// Peer or ephemeral public key material, kept opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(pub Vec<u8>);

/// Local private key material, kept opaque. Zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(Vec<u8>);

impl PrivateKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey([{} bytes])", self.0.len())
    }
}

/// Progress of the secret derivation within one handshake.
///
/// A master secret can only exist next to a server random.
#[derive(Debug, Clone)]
enum SecretPhase {
    /// Only the client random is known.
    ClientRandom,
    /// ServerHello.random has been recorded.
    ServerRandom { server_random: Random },
    /// The master secret has been derived.
    MasterSecret {
        server_random: Random,
        master_secret: MasterSecret,
    },
}

/// Transient per-handshake state. Present only between handshake start
/// and handshake end.
#[derive(Clone)]
pub struct HandshakeState {
    client_version: TlsVersion,
    client_random: Random,
    phase: SecretPhase,
    public_key: Option<PublicKey>,
    private_key: Option<PrivateKey>,
    digest: Option<HandshakeDigest>,
}

impl HandshakeState {
    pub fn new(client_version: TlsVersion, client_random: Random) -> Self {
        Self {
            client_version,
            client_random,
            phase: SecretPhase::ClientRandom,
            public_key: None,
            private_key: None,
            digest: None,
        }
    }

    pub fn client_version(&self) -> TlsVersion {
        self.client_version
    }

    pub fn client_random(&self) -> &Random {
        &self.client_random
    }

    pub fn server_random(&self) -> Option<&Random> {
        match &self.phase {
            SecretPhase::ClientRandom => None,
            SecretPhase::ServerRandom { server_random }
            | SecretPhase::MasterSecret { server_random, .. } => Some(server_random),
        }
    }

    pub fn master_secret(&self) -> Option<&MasterSecret> {
        match &self.phase {
            SecretPhase::MasterSecret { master_secret, .. } => Some(master_secret),
            _ => None,
        }
    }

    pub fn public_key(&self) -> Option<&PublicKey> {
        self.public_key.as_ref()
    }

    pub fn private_key(&self) -> Option<&PrivateKey> {
        self.private_key.as_ref()
    }

    pub fn digest(&self) -> Option<&HandshakeDigest> {
        self.digest.as_ref()
    }

    /// Record the server random. Callers check that none is set yet.
    pub(crate) fn set_server_random(&mut self, server_random: Random) {
        self.phase = SecretPhase::ServerRandom { server_random };
    }

    /// Store the master secret next to the already recorded server random.
    /// Returns `false` (and changes nothing) without a server random.
    pub(crate) fn set_master_secret(&mut self, master_secret: MasterSecret) -> bool {
        match self.server_random().copied() {
            Some(server_random) => {
                self.phase = SecretPhase::MasterSecret {
                    server_random,
                    master_secret,
                };
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_public_key(&mut self, key: PublicKey) {
        self.public_key = Some(key);
    }

    pub(crate) fn set_private_key(&mut self, key: PrivateKey) {
        self.private_key = Some(key);
    }

    /// The running digest, created empty on first use.
    pub(crate) fn digest_mut(&mut self) -> &mut HandshakeDigest {
        self.digest.get_or_insert_with(HandshakeDigest::new)
    }
}

impl fmt::Debug for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandshakeState")
            .field("client_version", &self.client_version)
            .field("client_random", &self.client_random)
            .field("phase", &self.phase)
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key)
            .field("digest", &self.digest.as_ref().map(|d| d.bytes_hashed()))
            .finish()
    }
}
