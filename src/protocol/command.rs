//! Command definitions
//!
//! Represents requests sent to the store.

use super::metadata::Metadata;

/// Command types, tagged by their ASCII prefix byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Get = b'G',
    Remove = b'R',
    FindOr = b'O',
    FindAnd = b'A',
    Set = b'S',
}

impl CommandType {
    /// The single-letter dispatch tag written first on the wire
    pub fn prefix(self) -> u8 {
        self as u8
    }
}

/// A request to the store
#[derive(Debug, Clone)]
pub enum Command {
    /// Fetch the payload stored under `id`
    Get { id: String },

    /// Delete the entry under `id`, returning its record
    Remove { id: String },

    /// Identifiers matching ANY clause, optionally restricted to `subset`
    FindOr {
        metadata: Metadata,
        subset: Option<Vec<String>>,
    },

    /// Identifiers matching ALL clauses, optionally restricted to `subset`
    FindAnd {
        metadata: Metadata,
        subset: Option<Vec<String>>,
    },

    /// Store `payload` under `id` with `metadata`
    Set {
        id: String,
        metadata: Metadata,
        payload: Vec<u8>,
    },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Remove { .. } => CommandType::Remove,
            Command::FindOr { .. } => CommandType::FindOr,
            Command::FindAnd { .. } => CommandType::FindAnd,
            Command::Set { .. } => CommandType::Set,
        }
    }
}
