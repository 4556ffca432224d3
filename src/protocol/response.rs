//! Response definitions
//!
//! Raw bytes read back from the store before per-command decoding.

/// Sentinel meaning "no applicable result"
pub const NODATA: &[u8] = b"NODATA";

/// Success token for `Set`
pub const SAVED: &[u8] = b"SAVED";

/// Decoded `Remove` result: the removed entry as a key/value document
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Everything the store wrote before the response ended
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    bytes: Vec<u8>,
}

impl Response {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into() }
    }

    /// Exactly `NODATA`
    pub fn is_no_data(&self) -> bool {
        self.bytes == NODATA
    }

    /// Exactly `SAVED`
    pub fn is_saved(&self) -> bool {
        self.bytes == SAVED
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
