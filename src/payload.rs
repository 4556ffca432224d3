//! Payload codecs
//!
//! The store treats the `Set` payload as opaque bytes. A `PayloadCodec`
//! decides how caller values become those bytes and back again.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ChipmunkError, Result};

/// Converts caller values to and from the payload slot
pub trait PayloadCodec: Send + Sync {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// Compact binary encoding via bincode (default)
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl PayloadCodec for BincodeCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        bincode::serialize(value)
            .map_err(|e| ChipmunkError::Serialization(format!("bincode encode: {}", e)))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        bincode::deserialize(bytes)
            .map_err(|e| ChipmunkError::Serialization(format!("bincode decode: {}", e)))
    }
}

/// JSON text encoding, readable by non-Rust clients of the same store
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl PayloadCodec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value)
            .map_err(|e| ChipmunkError::Serialization(format!("json encode: {}", e)))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes)
            .map_err(|e| ChipmunkError::Serialization(format!("json decode: {}", e)))
    }
}
