//! NSS Key Log Format support (SSLKEYLOGFILE).
//!
//! Provides Wireshark-compatible key logging for TLS debugging.
//! Format: `<label> <client_random_hex> <secret_hex>`

use crate::config::StateConfig;
use crate::handshake::{MasterSecret, Random};

/// Log a key material line in NSS key log format.
///
/// Calls the `key_log_callback` on `config` (if set) with a line:
/// `<label> <client_random_hex> <secret_hex>`
pub fn log_key(config: &StateConfig, label: &str, client_random: &Random, secret: &[u8]) {
    if let Some(cb) = &config.key_log_callback {
        let line = format!(
            "{} {} {}",
            label,
            hex::encode(client_random.as_bytes()),
            hex::encode(secret)
        );
        cb(&line);
    }
}

/// Log the master secret under the `CLIENT_RANDOM` label.
pub fn log_master_secret(config: &StateConfig, client_random: &Random, master_secret: &MasterSecret) {
    log_key(config, "CLIENT_RANDOM", client_random, master_secret.as_bytes());
}
