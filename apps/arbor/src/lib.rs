//! # arbor (library surface of the binary crate)
//!
//! Exposes the API and CLI modules so integration tests can drive the
//! router without starting a real server.

pub mod api;
pub mod cli;
