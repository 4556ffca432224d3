//! # Chipmunk
//!
//! Blocking client for the Chipmunk key/value store:
//! - Identifier-addressed payloads with metadata attributes
//! - Boolean (AND/OR) metadata search over all or a subset of entries
//! - Plain TCP text protocol, one connection per request
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Client                              │
//! │        get / remove / find_or / find_and / set              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Protocol   │          │   Payload   │
//!   │   Codec     │          │   Codec     │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │ Connection  │  connect → chunked write → read until close
//!   └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use chipmunk::{Client, Metadata, SearchTerm};
//!
//! # fn main() -> chipmunk::Result<()> {
//! let client = Client::new("127.0.0.1", 8909)?;
//! let meta = Metadata::new().with_literal("color", "red")?;
//! client.set("apple", &meta, &vec![1u32, 2, 3])?;
//!
//! let query = Metadata::new().with_term(SearchTerm::equals("color", "red")?);
//! let ids = client.find_or(&query)?.unwrap_or_default();
//! # let _ = ids;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod payload;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ChipmunkError, Result};
pub use config::{Config, EndOfResponse, ValidationMode};
pub use client::Client;
pub use payload::{BincodeCodec, JsonCodec, PayloadCodec};
pub use protocol::{Condition, LiteralEntry, Metadata, MetadataEntry, Record, SearchTerm};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
