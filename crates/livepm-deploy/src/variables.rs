//! Path variable resolution
//!
//! Source expressions may start with a `{name}` token naming a root directory,
//! e.g. `{qtbuild}/bin`. The token is replaced once by the table value; values
//! are never expanded again.

use livepm_core::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const VARIABLE_OPEN: char = '{';
const VARIABLE_CLOSE: char = '}';

/// Mapping of variable name to filesystem path for one deploy invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
    values: BTreeMap<String, String>,
}

impl VariableTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a variable
    pub fn insert(&mut self, name: impl Into<String>, value: impl AsRef<Path>) {
        self.values.insert(
            name.into(),
            value.as_ref().to_string_lossy().into_owned(),
        );
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, value: impl AsRef<Path>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up a variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Iterate variables in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolve an expression to a path
    pub fn resolve_path(&self, expr: &str) -> Result<PathBuf> {
        resolve(expr, self).map(PathBuf::from)
    }
}

/// Name of the variable an expression starts with, if any
pub fn leading_variable(expr: &str) -> Option<&str> {
    let rest = expr.strip_prefix(VARIABLE_OPEN)?;
    let end = rest.find(VARIABLE_CLOSE)?;
    Some(&rest[..end])
}

/// Replace a leading `{name}` token with its table value
///
/// Expressions without a leading token are returned unchanged.
pub fn resolve(expr: &str, table: &VariableTable) -> Result<String> {
    let Some(name) = leading_variable(expr) else {
        return Ok(expr.to_string());
    };

    let value = table
        .get(name)
        .ok_or_else(|| Error::unknown_variable(name, expr))?;

    // token length: name plus both braces
    let remainder = &expr[name.len() + 2..];
    Ok(format!("{}{}", value, remainder))
}
