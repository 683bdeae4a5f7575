//! Connection-wide state record and the store it lives in.
//!
//! Every engine operation is one transaction against a [`StateStore`]:
//! read the whole state, compute, write the whole state back. A failed
//! operation never writes, so the last committed state stays intact.

pub mod direction;

use std::fmt;

use crate::crypt::Cipher;
use crate::handshake::HandshakeState;
use crate::TlsVersion;
use direction::{Direction, DirectionPair, DirectionState};
use rand::rngs::StdRng;
use tlsstate_types::TlsError;

/// The mutable record of one connection's cryptographic progress.
#[derive(Clone)]
pub struct ConnectionState {
    pub(crate) is_client: bool,
    pub(crate) version: TlsVersion,
    pub(crate) client_version: Option<TlsVersion>,
    pub(crate) handshake: Option<HandshakeState>,
    pub(crate) tx_encrypted: bool,
    pub(crate) rx_encrypted: bool,
    pub(crate) directions: Option<DirectionPair>,
    pub(crate) cipher: Option<Cipher>,
    pub(crate) rng: StdRng,
}

impl ConnectionState {
    /// Initial state: no handshake, no cipher, plaintext in both directions.
    pub fn new(is_client: bool, version: TlsVersion, rng: StdRng) -> Self {
        Self {
            is_client,
            version,
            client_version: None,
            handshake: None,
            tx_encrypted: false,
            rx_encrypted: false,
            directions: None,
            cipher: None,
            rng,
        }
    }

    pub fn is_client(&self) -> bool {
        self.is_client
    }

    pub fn version(&self) -> TlsVersion {
        self.version
    }

    pub fn client_version(&self) -> Option<TlsVersion> {
        self.client_version
    }

    pub fn handshake(&self) -> Option<&HandshakeState> {
        self.handshake.as_ref()
    }

    pub fn tx_encrypted(&self) -> bool {
        self.tx_encrypted
    }

    pub fn rx_encrypted(&self) -> bool {
        self.rx_encrypted
    }

    pub fn cipher(&self) -> Option<&Cipher> {
        self.cipher.as_ref()
    }

    pub fn direction(&self, direction: Direction) -> Option<&DirectionState> {
        self.directions.as_ref().map(|pair| pair.get(direction))
    }

    pub fn tx(&self) -> Option<&DirectionState> {
        self.direction(Direction::Tx)
    }

    pub fn rx(&self) -> Option<&DirectionState> {
        self.direction(Direction::Rx)
    }
}

impl fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionState")
            .field("is_client", &self.is_client)
            .field("version", &self.version)
            .field("client_version", &self.client_version)
            .field("handshake", &self.handshake)
            .field("tx_encrypted", &self.tx_encrypted)
            .field("rx_encrypted", &self.rx_encrypted)
            .field("directions", &self.directions)
            .field("cipher", &self.cipher)
            .finish_non_exhaustive()
    }
}

/// Exclusive accessor for one connection's state.
///
/// `read` and `write` are the only primitives; everything else is
/// expressed as read-compute-write on the full state. The store does no
/// locking: callers that reach one connection from several execution
/// contexts must serialize access themselves.
pub trait StateStore {
    /// Snapshot of the current state.
    fn read(&self) -> ConnectionState;

    /// Replace the whole state.
    fn write(&mut self, state: ConnectionState);

    /// Run `f` against the current state without copying it.
    fn inspect<T>(&self, f: impl FnOnce(&ConnectionState) -> T) -> T {
        f(&self.read())
    }

    /// `write(f(read()))`.
    fn modify(&mut self, f: impl FnOnce(ConnectionState) -> ConnectionState) {
        let state = self.read();
        self.write(f(state));
    }

    /// Read, let `f` edit a private copy, and write it back only if `f`
    /// succeeds. On error the stored state is left exactly as it was.
    fn transact<T>(
        &mut self,
        f: impl FnOnce(&mut ConnectionState) -> Result<T, TlsError>,
    ) -> Result<T, TlsError> {
        let mut state = self.read();
        let out = f(&mut state)?;
        self.write(state);
        Ok(out)
    }
}

/// A store that owns its state in place.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: ConnectionState,
}

impl MemoryStore {
    pub fn new(state: ConnectionState) -> Self {
        Self { state }
    }

    pub fn into_inner(self) -> ConnectionState {
        self.state
    }
}

impl StateStore for MemoryStore {
    fn read(&self) -> ConnectionState {
        self.state.clone()
    }

    fn write(&mut self, state: ConnectionState) {
        self.state = state;
    }

    fn inspect<T>(&self, f: impl FnOnce(&ConnectionState) -> T) -> T {
        f(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn fresh() -> ConnectionState {
        ConnectionState::new(true, TlsVersion::Tls10, StdRng::seed_from_u64(1))
    }

    #[test]
    fn test_initial_state() {
        let s = fresh();
        assert!(s.is_client());
        assert_eq!(s.version(), TlsVersion::Tls10);
        assert!(s.client_version().is_none());
        assert!(s.handshake().is_none());
        assert!(!s.tx_encrypted());
        assert!(!s.rx_encrypted());
        assert!(s.cipher().is_none());
        assert!(s.tx().is_none());
        assert!(s.rx().is_none());
    }

    #[test]
    fn test_modify_writes_back() {
        let mut store = MemoryStore::new(fresh());
        store.modify(|mut s| {
            s.tx_encrypted = true;
            s
        });
        assert!(store.inspect(|s| s.tx_encrypted()));
    }

    #[test]
    fn test_transact_commits_on_success() {
        let mut store = MemoryStore::new(fresh());
        let out = store
            .transact(|s| {
                s.version = TlsVersion::Tls11;
                Ok(7)
            })
            .unwrap();
        assert_eq!(out, 7);
        assert_eq!(store.read().version(), TlsVersion::Tls11);
    }

    #[test]
    fn test_transact_discards_on_error() {
        let mut store = MemoryStore::new(fresh());
        let res: Result<(), TlsError> = store.transact(|s| {
            s.version = TlsVersion::Tls12;
            s.rx_encrypted = true;
            Err(TlsError::UnsupportedVersion)
        });
        assert!(res.is_err());
        let s = store.into_inner();
        assert_eq!(s.version(), TlsVersion::Tls10);
        assert!(!s.rx_encrypted());
    }

    #[test]
    fn test_debug_omits_rng() {
        let dbg = format!("{:?}", fresh());
        assert!(dbg.contains("ConnectionState"));
        assert!(!dbg.contains("rng"));
    }
}
