//! Server configuration.
//!
//! Only the transport side is configurable; routes and middleware are code.
//!
//! ```toml
//! addr = "127.0.0.1:8080"
//! log_filter = "switchyard=debug,info"
//! ```

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::Error;

/// Environment variable that overrides [`Config::addr`].
pub const ADDR_ENV: &str = "SWITCHYARD_ADDR";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Socket address to listen on.
    pub addr: SocketAddr,
    /// `tracing-subscriber` `EnvFilter` directive for binaries that install
    /// a subscriber. The library itself only emits events.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_filter: "info".to_owned(),
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        Ok(toml::from_str(s)?)
    }

    /// Reads and parses a TOML file. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Applies `SWITCHYARD_ADDR` if it is set. A value that does not parse
    /// as a socket address is logged and ignored.
    pub fn with_env_overrides(mut self) -> Self {
        let Ok(raw) = std::env::var(ADDR_ENV) else {
            return self;
        };
        match raw.parse() {
            Ok(addr) => self.addr = addr,
            Err(e) => warn!(value = %raw, "ignoring invalid {ADDR_ENV}: {e}"),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn parses_fields() {
        let config = Config::from_toml_str(
            r#"
            addr = "127.0.0.1:8080"
            log_filter = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn rejects_unknown_keys_and_bad_addresses() {
        assert!(matches!(Config::from_toml_str("port = 1"), Err(Error::Config(_))));
        assert!(matches!(Config::from_toml_str(r#"addr = "nope""#), Err(Error::Config(_))));
    }

    #[test]
    fn env_overrides_valid_addresses_only() {
        // The only test touching this variable.
        unsafe { std::env::set_var(ADDR_ENV, "127.0.0.1:9999") };
        assert_eq!(Config::default().with_env_overrides().addr, "127.0.0.1:9999".parse().unwrap());

        unsafe { std::env::set_var(ADDR_ENV, "not an address") };
        assert_eq!(Config::default().with_env_overrides(), Config::default());

        unsafe { std::env::remove_var(ADDR_ENV) };
        assert_eq!(Config::default().with_env_overrides(), Config::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(Config::load("/definitely/not/here.toml"), Err(Error::Io(_))));
    }
}
