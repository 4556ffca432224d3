//! Client Tests
//!
//! The public operations against scripted stores, plus configuration.

#[path = "../common/mod.rs"]
mod common;
