//! Protocol codec
//!
//! Encoding of requests and decoding of responses for the text protocol.
//!
//! ## Wire Format
//!
//! ### Request Format
//! ```text
//! ┌──────────┬─────────────────────────────────────────────┐
//! │ Cmd (1)  │ Payload (no length prefix, no terminator)   │
//! └──────────┴─────────────────────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - GET:      id
//! - REMOVE:   id
//! - FIND_OR:  metadata + "\n" + subset ids joined by "#" (nothing if no subset)
//! - FIND_AND: same as FIND_OR
//! - SET:      id + "|" + metadata + "|" + payload bytes
//!
//! ### Response Format
//! Raw bytes up to connection close. `NODATA` means no result; `Set`
//! succeeds only on exactly `SAVED`; Find results are ids joined by `|`.

use std::io::Write;

use super::metadata::Metadata;
use super::response::{Record, Response};
use super::search_term::validate_token;
use super::Command;
use crate::error::{ChipmunkError, Result};
use crate::payload::PayloadCodec;

/// Separates the query clause from the optional subset in Find requests
pub const QUERY_TERMINATOR: u8 = b'\n';

/// Separates subset identifiers in Find requests
pub const SUBSET_SEPARATOR: char = '#';

/// Separates the positional fields of a Set request
pub const FIELD_SEPARATOR: u8 = b'|';

/// Separates identifiers in a Find response
pub const RESULT_SEPARATOR: char = '|';

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a command to bytes
///
/// Identifiers, subset identifiers and metadata entries are checked for
/// delimiter characters before any byte is produced.
pub fn encode_command(command: &Command) -> Result<Vec<u8>> {
    let prefix = command.command_type().prefix();

    let message = match command {
        Command::Get { id } | Command::Remove { id } => {
            validate_token("identifier", id)?;
            let mut message = Vec::with_capacity(1 + id.len());
            message.push(prefix);
            message.extend_from_slice(id.as_bytes());
            message
        }
        Command::FindOr { metadata, subset } | Command::FindAnd { metadata, subset } => {
            encode_find(prefix, metadata, subset.as_deref())?
        }
        Command::Set {
            id,
            metadata,
            payload,
        } => {
            validate_token("identifier", id)?;
            metadata.validate()?;
            let metadata = metadata.to_protocol_string();
            let mut message =
                Vec::with_capacity(3 + id.len() + metadata.len() + payload.len());
            message.push(prefix);
            message.extend_from_slice(id.as_bytes());
            message.push(FIELD_SEPARATOR);
            message.extend_from_slice(metadata.as_bytes());
            message.push(FIELD_SEPARATOR);
            message.extend_from_slice(payload);
            message
        }
    };

    Ok(message)
}

/// Encode FIND_OR / FIND_AND: metadata, `\n`, then the subset if present
fn encode_find(
    prefix: u8,
    metadata: &Metadata,
    subset: Option<&[String]>,
) -> Result<Vec<u8>> {
    metadata.validate()?;
    let metadata = metadata.to_protocol_string();
    let mut message = Vec::with_capacity(2 + metadata.len());
    message.push(prefix);
    message.extend_from_slice(metadata.as_bytes());
    message.push(QUERY_TERMINATOR);

    if let Some(ids) = subset {
        for (i, id) in ids.iter().enumerate() {
            validate_token("subset identifier", id)?;
            if i > 0 {
                message.push(SUBSET_SEPARATOR as u8);
            }
            message.extend_from_slice(id.as_bytes());
        }
    }

    Ok(message)
}

// =============================================================================
// Response Decoding
// =============================================================================

/// Decode a GET response with the caller's payload codec
pub fn decode_get<C, T>(response: &Response, codec: &C) -> Result<Option<T>>
where
    C: PayloadCodec,
    T: serde::de::DeserializeOwned,
{
    if response.is_no_data() {
        return Ok(None);
    }
    codec.decode(response.as_bytes()).map(Some)
}

/// Decode a GET response without a codec
pub fn decode_get_raw(response: Response) -> Option<Vec<u8>> {
    if response.is_no_data() {
        return None;
    }
    Some(response.into_bytes())
}

/// Decode a REMOVE response: the removed entry as a JSON object
pub fn decode_remove(response: &Response) -> Result<Option<Record>> {
    if response.is_no_data() {
        return Ok(None);
    }

    let value: serde_json::Value = serde_json::from_slice(response.as_bytes()).map_err(|e| {
        ChipmunkError::Protocol(format!("REMOVE response is not a JSON record: {}", e))
    })?;

    match value {
        serde_json::Value::Object(record) => Ok(Some(record)),
        other => Err(ChipmunkError::Protocol(format!(
            "REMOVE response is not a key/value record: {}",
            other
        ))),
    }
}

/// Decode a FIND_OR / FIND_AND response into identifiers
///
/// An empty response yields an empty list.
pub fn decode_find(response: &Response) -> Result<Option<Vec<String>>> {
    if response.is_no_data() {
        return Ok(None);
    }

    let text = std::str::from_utf8(response.as_bytes())
        .map_err(|e| ChipmunkError::Protocol(format!("FIND response is not UTF-8: {}", e)))?;

    if text.is_empty() {
        return Ok(Some(Vec::new()));
    }

    Ok(Some(text.split(RESULT_SEPARATOR).map(str::to_string).collect()))
}

/// Decode a SET response: exactly `SAVED` is success, anything else is not
pub fn decode_set(response: &Response) -> bool {
    response.is_saved()
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write `message` as sequential writes of at most `chunk_size` bytes
///
/// Returns the number of chunks written. Stops at the first failed write.
pub fn write_chunked<W: Write>(
    writer: &mut W,
    message: &[u8],
    chunk_size: usize,
) -> std::io::Result<usize> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = 0;
    for chunk in message.chunks(chunk_size) {
        writer.write_all(chunk)?;
        chunks += 1;
    }
    writer.flush()?;
    Ok(chunks)
}
