//! Per-direction record protection state.

use std::fmt;

use zeroize::Zeroize;

/// Traffic direction relative to this endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Records this endpoint sends.
    Tx,
    /// Records this endpoint receives.
    Rx,
}

/// Key material and MAC sequence counter for one direction.
///
/// `key`, `iv` and `mac_secret` never change after construction; only the
/// sequence number advances, by one per MAC computed.
#[derive(Clone, PartialEq, Eq)]
pub struct DirectionState {
    key: Vec<u8>,
    iv: Vec<u8>,
    mac_secret: Vec<u8>,
    pub(crate) sequence_number: u64,
}

impl DirectionState {
    /// Fresh direction state with the sequence number at zero.
    pub fn new(key: Vec<u8>, iv: Vec<u8>, mac_secret: Vec<u8>) -> Self {
        Self {
            key,
            iv,
            mac_secret,
            sequence_number: 0,
        }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    pub fn mac_secret(&self) -> &[u8] {
        &self.mac_secret
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    /// Advance the sequence number. Returns `false` at `u64::MAX`.
    pub(crate) fn advance(&mut self) -> bool {
        match self.sequence_number.checked_add(1) {
            Some(next) => {
                self.sequence_number = next;
                true
            }
            None => false,
        }
    }
}

impl Drop for DirectionState {
    fn drop(&mut self) {
        self.key.zeroize();
        self.iv.zeroize();
        self.mac_secret.zeroize();
    }
}

impl fmt::Debug for DirectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectionState")
            .field("key", &format_args!("[{} bytes]", self.key.len()))
            .field("iv", &format_args!("[{} bytes]", self.iv.len()))
            .field("mac_secret", &format_args!("[{} bytes]", self.mac_secret.len()))
            .field("sequence_number", &self.sequence_number)
            .finish()
    }
}

/// Send and receive state, only ever installed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionPair {
    pub(crate) tx: DirectionState,
    pub(crate) rx: DirectionState,
}

impl DirectionPair {
    pub fn new(tx: DirectionState, rx: DirectionState) -> Self {
        Self { tx, rx }
    }

    pub fn get(&self, direction: Direction) -> &DirectionState {
        match direction {
            Direction::Tx => &self.tx,
            Direction::Rx => &self.rx,
        }
    }

    pub(crate) fn get_mut(&mut self, direction: Direction) -> &mut DirectionState {
        match direction {
            Direction::Tx => &mut self.tx,
            Direction::Rx => &mut self.rx,
        }
    }
}
