//! # livepm-core
//!
//! Core library for livepm providing:
//! - Error types shared by the deploy and package pipelines
//! - Platform detection
//! - Type definitions for deploy structures, package descriptors,
//!   installed-package manifests and registry responses

pub mod error;
pub mod platform;
pub mod types;

pub use error::{Error, Result};
pub use platform::PlatformKind;
