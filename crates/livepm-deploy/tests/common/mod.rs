//! Common test infrastructure for livepm-deploy tests
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

pub mod fixtures;

pub use fixtures::*;
