//! Configuration for the Chipmunk client
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::error::{ChipmunkError, Result};

/// Default store host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default store port
pub const DEFAULT_PORT: u16 = 8909;

/// Default write chunk / read buffer size (bytes)
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Connection settings shared by every call a client makes
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Endpoint
    // -------------------------------------------------------------------------
    /// Store host name or IP address (never empty)
    pub host: String,

    /// Store TCP port (never 0)
    pub port: u16,

    // -------------------------------------------------------------------------
    // Framing
    // -------------------------------------------------------------------------
    /// Upper bound on the size of each socket write; also the read buffer size
    pub chunk_size: usize,

    /// How the end of a response is recognised
    pub end_of_response: EndOfResponse,

    // -------------------------------------------------------------------------
    // Time Bounds
    // -------------------------------------------------------------------------
    /// Bound on establishing the TCP connection
    pub connect_timeout: Duration,

    /// Bound on each individual read while receiving a response
    pub read_timeout: Duration,

    /// Bound on each individual write while sending a request
    pub write_timeout: Duration,

    /// Bound on the whole receive loop
    pub response_timeout: Duration,

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------
    /// What to do with an invalid host or port
    pub validation: ValidationMode,
}

/// Response termination rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndOfResponse {
    /// The response ends only when the store closes the connection.
    /// A read that times out fails the call.
    #[default]
    PeerClose,

    /// The response also ends when the store stops sending for one
    /// `read_timeout` after at least one byte has arrived.
    Idle,
}

/// Handling of invalid host/port values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Reject with `ChipmunkError::Validation`
    #[default]
    Strict,

    /// Log a warning and fall back to the default value
    Lenient,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            end_of_response: EndOfResponse::PeerClose,
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(5),
            response_timeout: Duration::from_secs(30),
            validation: ValidationMode::Strict,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// `host:port` as used for address resolution and logging
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate and store a new host according to `self.validation`
    pub fn set_host(&mut self, host: impl Into<String>) -> Result<()> {
        let host = host.into();
        if host.trim().is_empty() {
            self.host = self.fallback("host", DEFAULT_HOST.to_string(), &host)?;
        } else {
            self.host = host;
        }
        Ok(())
    }

    /// Validate and store a new port according to `self.validation`
    pub fn set_port(&mut self, port: u16) -> Result<()> {
        if port == 0 {
            self.port = self.fallback("port", DEFAULT_PORT, &port)?;
        } else {
            self.port = port;
        }
        Ok(())
    }

    /// Validate and store a new chunk size. Zero is always rejected.
    pub fn set_chunk_size(&mut self, chunk_size: usize) -> Result<()> {
        if chunk_size == 0 {
            return Err(ChipmunkError::Validation(
                "chunk size must be a positive number of bytes".to_string(),
            ));
        }
        self.chunk_size = chunk_size;
        Ok(())
    }

    /// Check every field, applying the validation mode to host and port
    pub fn validate(mut self) -> Result<Self> {
        let host = std::mem::take(&mut self.host);
        self.set_host(host)?;
        self.set_port(self.port)?;
        self.set_chunk_size(self.chunk_size)?;

        for (name, bound) in [
            ("connect timeout", self.connect_timeout),
            ("read timeout", self.read_timeout),
            ("write timeout", self.write_timeout),
            ("response timeout", self.response_timeout),
        ] {
            if bound.is_zero() {
                return Err(ChipmunkError::Validation(format!("{} must be non-zero", name)));
            }
        }

        Ok(self)
    }

    fn fallback<T: std::fmt::Debug>(
        &self,
        field: &str,
        default: T,
        given: &dyn std::fmt::Debug,
    ) -> Result<T> {
        match self.validation {
            ValidationMode::Strict => Err(ChipmunkError::Validation(format!(
                "invalid {}: {:?}",
                field, given
            ))),
            ValidationMode::Lenient => {
                tracing::warn!("Invalid {} provided ({:?}), using {:?}", field, given, default);
                Ok(default)
            }
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the store port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the maximum write size (in bytes)
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set how the end of a response is detected
    pub fn end_of_response(mut self, rule: EndOfResponse) -> Self {
        self.config.end_of_response = rule;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout = Duration::from_millis(ms);
        self
    }

    /// Set the per-read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout = Duration::from_millis(ms);
        self
    }

    /// Set the per-write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout = Duration::from_millis(ms);
        self
    }

    /// Set the total receive timeout (in milliseconds)
    pub fn response_timeout_ms(mut self, ms: u64) -> Self {
        self.config.response_timeout = Duration::from_millis(ms);
        self
    }

    /// Set the host/port validation mode
    pub fn validation(mut self, mode: ValidationMode) -> Self {
        self.config.validation = mode;
        self
    }

    /// Validate and produce the config
    pub fn build(self) -> Result<Config> {
        self.config.validate()
    }
}
