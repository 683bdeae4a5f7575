//! State engine configuration with builder pattern.

use std::fmt;
use std::sync::Arc;

use crate::{TlsRole, TlsVersion};

/// Key log sink: receives one NSS key-log line per call.
pub type KeyLogCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Per-connection engine configuration.
#[derive(Clone)]
pub struct StateConfig {
    /// The role (client or server). Fixed for the connection's lifetime.
    pub role: TlsRole,
    /// Protocol version recorded before any negotiation has happened.
    pub initial_version: TlsVersion,
    /// Optional callback for NSS key logging (SSLKEYLOGFILE format).
    pub key_log_callback: Option<KeyLogCallback>,
}

impl fmt::Debug for StateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateConfig")
            .field("role", &self.role)
            .field("initial_version", &self.initial_version)
            .field(
                "key_log_callback",
                &self.key_log_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl StateConfig {
    /// Create a builder for the engine configuration.
    pub fn builder() -> StateConfigBuilder {
        StateConfigBuilder::default()
    }

    pub fn is_client(&self) -> bool {
        self.role == TlsRole::Client
    }
}

/// Builder for `StateConfig`.
pub struct StateConfigBuilder {
    role: TlsRole,
    initial_version: TlsVersion,
    key_log_callback: Option<KeyLogCallback>,
}

impl Default for StateConfigBuilder {
    fn default() -> Self {
        Self {
            role: TlsRole::Client,
            initial_version: TlsVersion::Tls10,
            key_log_callback: None,
        }
    }
}

impl StateConfigBuilder {
    pub fn role(mut self, role: TlsRole) -> Self {
        self.role = role;
        self
    }

    pub fn initial_version(mut self, version: TlsVersion) -> Self {
        self.initial_version = version;
        self
    }

    pub fn key_log(mut self, callback: KeyLogCallback) -> Self {
        self.key_log_callback = Some(callback);
        self
    }

    pub fn build(self) -> StateConfig {
        StateConfig {
            role: self.role,
            initial_version: self.initial_version,
            key_log_callback: self.key_log_callback,
        }
    }
}
