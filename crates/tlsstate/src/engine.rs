//! The per-connection state engine.
//!
//! Every operation is a single transaction against the [`StateStore`]:
//! preconditions are checked on a snapshot, the new state is computed on
//! that snapshot, and it is written back only when nothing failed.
//!
//! Handshake lifecycle enforced by the preconditions:
//!
//! ```text
//!   NoHandshake
//!     | start_handshake(version, client_random)
//!     v
//!   InHandshake{client_random}
//!     | set_server_random
//!     v
//!   InHandshake{+server_random}
//!     | derive_master_secret(pre_master_secret)
//!     v
//!   InHandshake{+master_secret}
//!     | derive_key_schedule            (requires cipher)
//!     v
//!   InHandshake{+keys}
//!     | compute_finished*              (requires accumulated digest)
//!     | end_handshake
//!     v
//!   NoHandshake                        (cipher, directions, flags survive)
//! ```

use rand::rngs::StdRng;
use rand::RngCore;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::config::StateConfig;
use crate::crypt::key_schedule::KeyBlock;
use crate::crypt::{keylog, Cipher, KeyScheduleCrypto, Tls10Prf};
use crate::handshake::{
    HandshakeState, HandshakeType, MasterSecret, PrivateKey, PublicKey, Random, RANDOM_LEN,
};
use crate::precondition::{
    check_invariants, require, violation, KEYS_DERIVED, NO_CIPHER, NO_DIGEST, NO_DIRECTION_STATE,
    NO_HANDSHAKE, NO_MASTER_SECRET, NO_SERVER_RANDOM, PRIVATE_KEY_SET, PUBLIC_KEY_SET,
    SEQUENCE_EXHAUSTED, SERVER_RANDOM_SET,
};
use crate::record::{mac_input, RecordHeader};
use crate::state::direction::{Direction, DirectionPair, DirectionState};
use crate::state::{ConnectionState, MemoryStore, StateStore};
use crate::{TlsRole, TlsVersion};
use tlsstate_types::TlsError;

/// Cryptographic state engine for one connection.
pub struct StateEngine<S: StateStore = MemoryStore, K: KeyScheduleCrypto = Tls10Prf> {
    store: S,
    crypto: K,
    config: StateConfig,
}

impl StateEngine<MemoryStore, Tls10Prf> {
    /// Fresh engine with an in-memory store and the TLS 1.0/1.1 key schedule.
    pub fn new(config: StateConfig, rng: StdRng) -> Self {
        let state = ConnectionState::new(config.is_client(), config.initial_version, rng);
        Self::with_parts(MemoryStore::new(state), Tls10Prf, config)
    }
}

impl<S: StateStore, K: KeyScheduleCrypto> StateEngine<S, K> {
    pub fn with_parts(store: S, crypto: K, config: StateConfig) -> Self {
        Self {
            store,
            crypto,
            config,
        }
    }

    pub fn crypto(&self) -> &K {
        &self.crypto
    }

    /// A full copy of the current state.
    pub fn snapshot(&self) -> ConnectionState {
        self.store.read()
    }

    // ---------------------------------------------------------------
    // Phase transitions
    // ---------------------------------------------------------------

    /// Begin a handshake. A second call while one is active changes nothing.
    pub fn start_handshake(&mut self, version: TlsVersion, client_random: Random) {
        self.store.modify(|mut state| {
            if state.handshake.is_some() {
                tracing::trace!("start_handshake ignored: handshake already active");
                return state;
            }
            state.handshake = Some(HandshakeState::new(version, client_random));
            tracing::debug!(?version, "handshake started");
            state
        });
    }

    /// Drop all handshake-scoped state. Cipher, direction state and the
    /// encryption flags carry over into data transfer.
    pub fn end_handshake(&mut self) {
        self.store.modify(|mut state| {
            if state.handshake.take().is_some() {
                tracing::debug!("handshake ended");
            }
            state
        });
    }

    pub fn switch_tx_encryption(&mut self) {
        self.store.modify(|mut state| {
            if !state.tx_encrypted {
                state.tx_encrypted = true;
                tracing::debug!("tx encryption enabled");
            }
            state
        });
    }

    pub fn switch_rx_encryption(&mut self) {
        self.store.modify(|mut state| {
            if !state.rx_encrypted {
                state.rx_encrypted = true;
                tracing::debug!("rx encryption enabled");
            }
            state
        });
    }

    pub fn set_cipher(&mut self, cipher: Cipher) {
        self.store.modify(|mut state| {
            tracing::debug!(suite = cipher.suite.0, "cipher set");
            state.cipher = Some(cipher);
            state
        });
    }

    pub fn set_version(&mut self, version: TlsVersion) {
        self.store.modify(|mut state| {
            state.version = version;
            state
        });
    }

    /// Record the version offered in ClientHello.
    pub fn set_client_version(&mut self, version: TlsVersion) {
        self.store.modify(|mut state| {
            state.client_version = Some(version);
            state
        });
    }

    // ---------------------------------------------------------------
    // Handshake-scoped values
    // ---------------------------------------------------------------

    pub fn set_server_random(&mut self, server_random: Random) -> Result<(), TlsError> {
        const CTX: &str = "set_server_random";
        self.store.transact(|state| {
            let handshake = state.handshake.as_ref();
            check_invariants(
                CTX,
                &[
                    (NO_HANDSHAKE, &|| handshake.is_none()),
                    (SERVER_RANDOM_SET, &|| {
                        handshake.is_some_and(|hs| hs.server_random().is_some())
                    }),
                ],
            )?;
            require(CTX, NO_HANDSHAKE, state.handshake.as_mut())?.set_server_random(server_random);
            Ok(())
        })
    }

    pub fn set_public_key(&mut self, key: PublicKey) -> Result<(), TlsError> {
        const CTX: &str = "set_public_key";
        self.store.transact(|state| {
            let handshake = state.handshake.as_ref();
            check_invariants(
                CTX,
                &[
                    (NO_HANDSHAKE, &|| handshake.is_none()),
                    (PUBLIC_KEY_SET, &|| {
                        handshake.is_some_and(|hs| hs.public_key().is_some())
                    }),
                ],
            )?;
            require(CTX, NO_HANDSHAKE, state.handshake.as_mut())?.set_public_key(key);
            Ok(())
        })
    }

    pub fn set_private_key(&mut self, key: PrivateKey) -> Result<(), TlsError> {
        const CTX: &str = "set_private_key";
        self.store.transact(|state| {
            let handshake = state.handshake.as_ref();
            check_invariants(
                CTX,
                &[
                    (NO_HANDSHAKE, &|| handshake.is_none()),
                    (PRIVATE_KEY_SET, &|| {
                        handshake.is_some_and(|hs| hs.private_key().is_some())
                    }),
                ],
            )?;
            require(CTX, NO_HANDSHAKE, state.handshake.as_mut())?.set_private_key(key);
            Ok(())
        })
    }

    // ---------------------------------------------------------------
    // Key schedule
    // ---------------------------------------------------------------

    /// Derive and store the master secret from the pre-master secret.
    ///
    /// A repeated call inside the same handshake recomputes and replaces
    /// the stored value.
    pub fn derive_master_secret(&mut self, pre_master_secret: &[u8]) -> Result<(), TlsError> {
        const CTX: &str = "derive_master_secret";
        let crypto = &self.crypto;
        let (client_random, master_secret) = self.store.transact(|state| {
            let handshake = state.handshake.as_ref();
            check_invariants(
                CTX,
                &[
                    (NO_HANDSHAKE, &|| handshake.is_none()),
                    (NO_SERVER_RANDOM, &|| {
                        handshake.map_or(true, |hs| hs.server_random().is_none())
                    }),
                ],
            )?;

            let hs = require(CTX, NO_HANDSHAKE, state.handshake.as_mut())?;
            let client_random = *hs.client_random();
            let server_random = *require(CTX, NO_SERVER_RANDOM, hs.server_random())?;
            let master_secret =
                crypto.master_secret(pre_master_secret, &client_random, &server_random)?;
            if !hs.set_master_secret(master_secret.clone()) {
                return Err(violation(CTX, NO_SERVER_RANDOM));
            }
            Ok((client_random, master_secret))
        })?;

        tracing::debug!("master secret derived");
        keylog::log_master_secret(&self.config, &client_random, &master_secret);
        Ok(())
    }

    /// Expand the master secret into both directions' key material.
    ///
    /// The key block is sliced as
    ///
    /// ```text
    /// client_mac | server_mac | client_key | server_key | client_iv | server_iv
    /// ```
    ///
    /// and the client half becomes tx on a client, rx on a server.
    pub fn derive_key_schedule(&mut self) -> Result<(), TlsError> {
        const CTX: &str = "derive_key_schedule";
        let crypto = &self.crypto;
        self.store.transact(|state| {
            let handshake = state.handshake.as_ref();
            check_invariants(
                CTX,
                &[
                    (NO_CIPHER, &|| state.cipher.is_none()),
                    (NO_HANDSHAKE, &|| handshake.is_none()),
                    (NO_SERVER_RANDOM, &|| {
                        handshake.map_or(true, |hs| hs.server_random().is_none())
                    }),
                    (NO_MASTER_SECRET, &|| {
                        handshake.map_or(true, |hs| hs.master_secret().is_none())
                    }),
                    (KEYS_DERIVED, &|| state.directions.is_some()),
                ],
            )?;

            let cipher = require(CTX, NO_CIPHER, state.cipher.as_ref())?;
            let hs = require(CTX, NO_HANDSHAKE, state.handshake.as_ref())?;
            let server_random = require(CTX, NO_SERVER_RANDOM, hs.server_random())?;
            let master_secret = require(CTX, NO_MASTER_SECRET, hs.master_secret())?;

            let mut block = crypto.key_block(
                hs.client_random(),
                server_random,
                master_secret,
                cipher.key_block_len(),
            )?;
            let keys = KeyBlock::split(&block, cipher);
            block.zeroize();
            let mut keys = keys?;

            let client = DirectionState::new(
                std::mem::take(&mut keys.client_write_key),
                std::mem::take(&mut keys.client_write_iv),
                std::mem::take(&mut keys.client_write_mac_secret),
            );
            let server = DirectionState::new(
                std::mem::take(&mut keys.server_write_key),
                std::mem::take(&mut keys.server_write_iv),
                std::mem::take(&mut keys.server_write_mac_secret),
            );
            let pair = if state.is_client {
                DirectionPair::new(client, server)
            } else {
                DirectionPair::new(server, client)
            };
            state.directions = Some(pair);
            tracing::debug!(is_client = state.is_client, "key schedule derived");
            Ok(())
        })
    }

    // ---------------------------------------------------------------
    // Record MAC
    // ---------------------------------------------------------------

    /// HMAC over `seq_num || header || content` for `direction`, then
    /// advance that direction's sequence number by one.
    pub fn compute_mac(
        &mut self,
        direction: Direction,
        header: &RecordHeader,
        content: &[u8],
    ) -> Result<Vec<u8>, TlsError> {
        const CTX: &str = "compute_mac";
        self.store.transact(|state| {
            let directions = state.directions.as_ref();
            check_invariants(
                CTX,
                &[
                    (NO_CIPHER, &|| state.cipher.is_none()),
                    (NO_DIRECTION_STATE, &|| directions.is_none()),
                    (SEQUENCE_EXHAUSTED, &|| {
                        directions.is_some_and(|pair| {
                            pair.get(direction).sequence_number() == u64::MAX
                        })
                    }),
                ],
            )?;

            let cipher = require(CTX, NO_CIPHER, state.cipher.as_ref())?;
            let dir = require(CTX, NO_DIRECTION_STATE, state.directions.as_mut())?
                .get_mut(direction);
            let seq = dir.sequence_number();
            let digest = cipher.hmac(dir.mac_secret(), &mac_input(seq, header, content))?;
            if !dir.advance() {
                return Err(violation(CTX, SEQUENCE_EXHAUSTED));
            }
            tracing::trace!(?direction, seq, "record MAC computed");
            Ok(digest)
        })
    }

    // ---------------------------------------------------------------
    // Handshake digest and Finished
    // ---------------------------------------------------------------

    /// Feed raw handshake message bytes into the running MD5/SHA-1 digest.
    pub fn accumulate_handshake_bytes(&mut self, bytes: &[u8]) -> Result<(), TlsError> {
        const CTX: &str = "accumulate_handshake_bytes";
        self.store.transact(|state| {
            let digest = require(CTX, NO_HANDSHAKE, state.handshake.as_mut())?.digest_mut();
            digest.update(bytes)?;
            tracing::trace!(
                len = bytes.len(),
                total = digest.bytes_hashed(),
                "handshake bytes accumulated"
            );
            Ok(())
        })
    }

    /// Whether a message of `msg_type` belongs in the handshake digest.
    pub fn classify_handshake_material(&self, msg_type: HandshakeType) -> bool {
        crate::handshake::classify_handshake_material(msg_type)
    }

    /// Finished.verify_data for the client (`for_client`) or the server,
    /// over the digest accumulated so far. The digest keeps running.
    pub fn compute_finished(&self, for_client: bool) -> Result<Vec<u8>, TlsError> {
        const CTX: &str = "compute_finished";
        self.store.inspect(|state| -> Result<Vec<u8>, TlsError> {
            let handshake = state.handshake.as_ref();
            check_invariants(
                CTX,
                &[
                    (NO_HANDSHAKE, &|| handshake.is_none()),
                    (NO_MASTER_SECRET, &|| {
                        handshake.map_or(true, |hs| hs.master_secret().is_none())
                    }),
                    (NO_DIGEST, &|| handshake.map_or(true, |hs| hs.digest().is_none())),
                ],
            )?;

            let hs = require(CTX, NO_HANDSHAKE, handshake)?;
            let master_secret = require(CTX, NO_MASTER_SECRET, hs.master_secret())?;
            let digest = require(CTX, NO_DIGEST, hs.digest())?;
            let role = if for_client {
                TlsRole::Client
            } else {
                TlsRole::Server
            };
            self.crypto.finished_verify_data(
                master_secret,
                &digest.md5_digest()?,
                &digest.sha1_digest()?,
                role,
            )
        })
    }

    /// Compare a peer's verify_data against the expected value in constant time.
    pub fn verify_finished(&self, for_client: bool, received: &[u8]) -> Result<bool, TlsError> {
        let expected = self.compute_finished(for_client)?;
        Ok(bool::from(expected.as_slice().ct_eq(received)))
    }

    // ---------------------------------------------------------------
    // Randomness
    // ---------------------------------------------------------------

    /// Draw `len` bytes from the connection's generator.
    pub fn gen_random(&mut self, len: usize) -> Vec<u8> {
        let mut state = self.store.read();
        let mut out = vec![0u8; len];
        state.rng.fill_bytes(&mut out);
        self.store.write(state);
        out
    }

    /// Fresh ClientHello random.
    pub fn gen_client_random(&mut self) -> Random {
        self.gen_hello_random()
    }

    /// Fresh ServerHello random.
    pub fn gen_server_random(&mut self) -> Random {
        self.gen_hello_random()
    }

    fn gen_hello_random(&mut self) -> Random {
        let mut state = self.store.read();
        let mut out = [0u8; RANDOM_LEN];
        state.rng.fill_bytes(&mut out);
        self.store.write(state);
        Random(out)
    }

    // ---------------------------------------------------------------
    // Introspection
    // ---------------------------------------------------------------

    pub fn is_client(&self) -> bool {
        self.store.inspect(|s| s.is_client())
    }

    pub fn version(&self) -> TlsVersion {
        self.store.inspect(|s| s.version())
    }

    pub fn client_version(&self) -> Option<TlsVersion> {
        self.store.inspect(|s| s.client_version())
    }

    pub fn cipher(&self) -> Option<Cipher> {
        self.store.inspect(|s| s.cipher().cloned())
    }

    pub fn tx_encrypted(&self) -> bool {
        self.store.inspect(|s| s.tx_encrypted())
    }

    pub fn rx_encrypted(&self) -> bool {
        self.store.inspect(|s| s.rx_encrypted())
    }

    pub fn handshake_active(&self) -> bool {
        self.store.inspect(|s| s.handshake().is_some())
    }

    /// Next sequence number for `direction`, once keys are derived.
    pub fn sequence_number(&self, direction: Direction) -> Option<u64> {
        self.store
            .inspect(|s| s.direction(direction).map(DirectionState::sequence_number))
    }

    pub fn direction_state(&self, direction: Direction) -> Option<DirectionState> {
        self.store.inspect(|s| s.direction(direction).cloned())
    }

    pub fn master_secret(&self) -> Option<MasterSecret> {
        self.store
            .inspect(|s| s.handshake().and_then(|hs| hs.master_secret()).cloned())
    }
}
