//! Client Module
//!
//! The public face of the crate: five store operations over the protocol
//! codec and the per-request connection.
//!
//! ## Responsibilities
//! - Own the connection settings
//! - Build the request, send it, read the reply, decode it
//! - Apply the payload codec to `get`/`set` values

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{Config, ValidationMode};
use crate::error::Result;
use crate::network::Connection;
use crate::payload::{BincodeCodec, PayloadCodec};
use crate::protocol::{
    decode_find, decode_get, decode_get_raw, decode_remove, decode_set, encode_command, Command,
    Metadata, Record, Response,
};

/// Client for a Chipmunk store
///
/// ## Concurrency
///
/// Every operation opens its own connection, so calls from many threads on a
/// shared `Client` are independent. Settings sit behind a lock and each call
/// works from a snapshot taken when it starts; changing the host or port
/// affects later calls only.
pub struct Client<C = BincodeCodec> {
    /// Connection settings
    config: RwLock<Config>,

    /// Caller-side payload serialization
    codec: C,
}

impl Client<BincodeCodec> {
    /// Client for `host:port` with default settings otherwise
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        let config = Config::builder().host(host).port(port).build()?;
        Ok(Self::with_config(config))
    }

    /// Client with the given settings and the bincode payload codec
    pub fn with_config(config: Config) -> Self {
        Self::with_codec(config, BincodeCodec)
    }
}

impl Default for Client<BincodeCodec> {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl<C: PayloadCodec> Client<C> {
    /// Client with the given settings and payload codec
    pub fn with_codec(config: Config, codec: C) -> Self {
        Self {
            config: RwLock::new(config),
            codec,
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Snapshot of the current settings
    pub fn config(&self) -> Config {
        self.config.read().clone()
    }

    pub fn host(&self) -> String {
        self.config.read().host.clone()
    }

    pub fn port(&self) -> u16 {
        self.config.read().port
    }

    pub fn chunk_size(&self) -> usize {
        self.config.read().chunk_size
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Change the store host. An empty host is rejected or replaced by the
    /// default, depending on the validation mode.
    pub fn set_host(&self, host: impl Into<String>) -> Result<()> {
        self.config.write().set_host(host)
    }

    /// Change the store port. Port 0 is rejected or replaced by the default,
    /// depending on the validation mode.
    pub fn set_port(&self, port: u16) -> Result<()> {
        self.config.write().set_port(port)
    }

    /// Change the maximum write size
    pub fn set_chunk_size(&self, chunk_size: usize) -> Result<()> {
        self.config.write().set_chunk_size(chunk_size)
    }

    /// Switch between strict and lenient host/port validation
    pub fn set_validation(&self, mode: ValidationMode) {
        self.config.write().validation = mode;
    }

    // =========================================================================
    // Store Operations
    // =========================================================================

    /// Fetch and decode the payload stored under `id`
    ///
    /// Returns `Ok(None)` when the store answers `NODATA`.
    pub fn get<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>> {
        let response = self.execute(Command::Get { id: id.to_string() })?;
        decode_get(&response, &self.codec)
    }

    /// Fetch the payload stored under `id` as raw bytes
    pub fn get_raw(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let response = self.execute(Command::Get { id: id.to_string() })?;
        Ok(decode_get_raw(response))
    }

    /// Remove the entry under `id`, returning the store's record of it
    pub fn remove(&self, id: &str) -> Result<Option<Record>> {
        let response = self.execute(Command::Remove { id: id.to_string() })?;
        decode_remove(&response)
    }

    /// Identifiers of all entries matching ANY clause of `metadata`
    pub fn find_or(&self, metadata: &Metadata) -> Result<Option<Vec<String>>> {
        self.find_or_subset(metadata, None)
    }

    /// Like [`Client::find_or`], restricted to the identifiers in `subset`
    pub fn find_or_in<S: AsRef<str>>(
        &self,
        metadata: &Metadata,
        subset: &[S],
    ) -> Result<Option<Vec<String>>> {
        self.find_or_subset(metadata, Some(to_owned_ids(subset)))
    }

    /// FindOr with an optional subset; `None` searches every entry
    pub fn find_or_subset(
        &self,
        metadata: &Metadata,
        subset: Option<Vec<String>>,
    ) -> Result<Option<Vec<String>>> {
        let response = self.execute(Command::FindOr {
            metadata: metadata.clone(),
            subset,
        })?;
        decode_find(&response)
    }

    /// Identifiers of all entries matching EVERY clause of `metadata`
    pub fn find_and(&self, metadata: &Metadata) -> Result<Option<Vec<String>>> {
        self.find_and_subset(metadata, None)
    }

    /// Like [`Client::find_and`], restricted to the identifiers in `subset`
    pub fn find_and_in<S: AsRef<str>>(
        &self,
        metadata: &Metadata,
        subset: &[S],
    ) -> Result<Option<Vec<String>>> {
        self.find_and_subset(metadata, Some(to_owned_ids(subset)))
    }

    /// FindAnd with an optional subset; `None` searches every entry
    pub fn find_and_subset(
        &self,
        metadata: &Metadata,
        subset: Option<Vec<String>>,
    ) -> Result<Option<Vec<String>>> {
        let response = self.execute(Command::FindAnd {
            metadata: metadata.clone(),
            subset,
        })?;
        decode_find(&response)
    }

    /// Encode `payload` with the codec and store it under `id`
    ///
    /// Returns `Ok(true)` only when the store answers exactly `SAVED`.
    pub fn set<T: Serialize + ?Sized>(
        &self,
        id: &str,
        metadata: &Metadata,
        payload: &T,
    ) -> Result<bool> {
        let payload = self.codec.encode(payload)?;
        self.set_raw(id, metadata, &payload)
    }

    /// Store raw bytes under `id`
    pub fn set_raw(&self, id: &str, metadata: &Metadata, payload: &[u8]) -> Result<bool> {
        let response = self.execute(Command::Set {
            id: id.to_string(),
            metadata: metadata.clone(),
            payload: payload.to_vec(),
        })?;
        Ok(decode_set(&response))
    }

    /// One full exchange: encode, connect, write, read until close
    pub fn execute(&self, command: Command) -> Result<Response> {
        let message = encode_command(&command)?;
        let config = self.config();

        tracing::debug!(
            "{:?} request of {} bytes to {}",
            command.command_type(),
            message.len(),
            config.addr()
        );

        let connection = Connection::send(&config, &message)?;
        connection.receive()
    }
}

fn to_owned_ids<S: AsRef<str>>(ids: &[S]) -> Vec<String> {
    ids.iter().map(|id| id.as_ref().to_string()).collect()
}
