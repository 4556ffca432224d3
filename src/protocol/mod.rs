//! Protocol Module
//!
//! Defines the text wire protocol spoken with the store.
//!
//! ## Request Format
//! ```text
//! ┌──────────┬─────────────────────────────────────────────┐
//! │ Cmd (1)  │ Payload                                     │
//! └──────────┴─────────────────────────────────────────────┘
//! ```
//!
//! ### Commands
//! - `G`: GET       - Payload: id
//! - `R`: REMOVE    - Payload: id
//! - `O`: FIND_OR   - Payload: metadata `\n` [subset ids joined by `#`]
//! - `A`: FIND_AND  - Payload: metadata `\n` [subset ids joined by `#`]
//! - `S`: SET       - Payload: id `|` metadata `|` payload
//!
//! ### Metadata
//! Entries joined by `#`; each is `key:value` or `key:<cond>:value` where
//! `<cond>` is `=` or `!`. Keys, values and ids never contain `\n`, `|`, `#`.
//!
//! ### Responses
//! No header and no length: the response is everything read before the
//! store closes the connection.
//! - `NODATA`: no result
//! - `SAVED`: SET succeeded

mod search_term;
mod metadata;
mod command;
mod response;
mod codec;

pub use search_term::{validate_token, Condition, SearchTerm, FORBIDDEN_DELIMITERS};
pub use metadata::{serialize_metadata, LiteralEntry, Metadata, MetadataEntry};
pub use command::{Command, CommandType};
pub use response::{Record, Response, NODATA, SAVED};
pub use codec::{
    decode_find, decode_get, decode_get_raw, decode_remove, decode_set, encode_command,
    write_chunked,
};
