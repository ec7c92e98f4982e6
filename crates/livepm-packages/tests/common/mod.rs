//! Common test infrastructure for livepm-packages tests
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_server;

pub use fixtures::*;
pub use mock_server::*;
