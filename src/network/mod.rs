//! Network Module
//!
//! TCP transport to the store.
//!
//! ## Architecture
//! - One connection per request, never reused
//! - Request written in bounded chunks
//! - Response read until the store closes the connection

mod connection;

pub use connection::Connection;
