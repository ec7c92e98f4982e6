//! Command implementations

pub mod deploy;
pub mod install;
pub mod version;
