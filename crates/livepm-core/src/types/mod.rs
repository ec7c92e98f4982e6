//! Type definitions for deploy structures, package descriptors, manifests
//! and registry responses

mod deploy_spec;
mod manifest;
mod package;
mod registry;

pub use deploy_spec::*;
pub use manifest::*;
pub use package::*;
pub use registry::*;
