//! Deploy structure types
//!
//! A deploy structure describes which files of a build end up where in the
//! release bundle. In JSON it is a nested object:
//!
//! ```json
//! {
//!     "{qtbuild}/bin": { "Qt*Core.dll": "-", "libEGL.dll": "-" },
//!     "{release}/application/release/livecv.exe": "-",
//!     "{release}/application/release": {
//!         "plugins": { "lcvcore/qmldir": "plugins/lcvcore/-" }
//!     }
//! }
//! ```
//!
//! Keys are `/`-separated source paths, string values are copy destinations
//! and object values descend into a directory. Key order is significant and
//! preserved.

use crate::error::{Error, Result};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Destination marker meaning "keep the source file name"
pub const SAME_NAME: &str = "-";

/// Wildcard accepted in pattern keys
pub const WILDCARD: char = '*';

/// Where a single source is copied to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyLeaf {
    /// `-`: the accumulated relative path plus the source file name
    SameName,
    /// An explicit path relative to the output root. A trailing `/-` keeps the
    /// source file name inside that directory.
    Path(String),
}

impl CopyLeaf {
    /// Parse a destination expression
    pub fn parse(value: &str) -> Self {
        if value == SAME_NAME {
            CopyLeaf::SameName
        } else {
            CopyLeaf::Path(value.to_string())
        }
    }

    /// Destination relative to the output root
    pub fn relative_destination(&self, accumulated: &Path, basename: &OsStr) -> PathBuf {
        match self {
            CopyLeaf::SameName => accumulated.join(basename),
            CopyLeaf::Path(path) => match path.strip_suffix("/-") {
                Some(dir) => Path::new(dir).join(basename),
                None => PathBuf::from(path),
            },
        }
    }
}

impl fmt::Display for CopyLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyLeaf::SameName => write!(f, "{}", SAME_NAME),
            CopyLeaf::Path(path) => write!(f, "{}", path),
        }
    }
}

/// One rule of a deploy structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEntry {
    /// Copy a single file or directory
    Copy { source: String, leaf: CopyLeaf },

    /// Copy every entry matching a wildcard in the last path segment
    Pattern { pattern: String, leaf: CopyLeaf },

    /// Descend into a directory
    Subtree {
        segment: String,
        children: Vec<DeployEntry>,
    },
}

impl DeployEntry {
    /// The source key this entry was declared under
    pub fn key(&self) -> &str {
        match self {
            DeployEntry::Copy { source, .. } => source,
            DeployEntry::Pattern { pattern, .. } => pattern,
            DeployEntry::Subtree { segment, .. } => segment,
        }
    }

    /// Build an entry from a key and its raw value, validating its shape
    fn from_raw(key: String, node: RawNode) -> Result<Self> {
        if key.is_empty() {
            return Err(Error::invalid_deploy_spec(key, "empty source path"));
        }

        if key.contains(WILDCARD) {
            validate_pattern(&key)?;
            return match node {
                RawNode::Leaf(value) => Ok(DeployEntry::Pattern {
                    leaf: parse_leaf(&key, &value)?,
                    pattern: key,
                }),
                RawNode::Tree(_) => Err(Error::invalid_deploy_spec(
                    key,
                    "a pattern must map to a destination, not a subtree",
                )),
            };
        }

        match node {
            RawNode::Leaf(value) => Ok(DeployEntry::Copy {
                leaf: parse_leaf(&key, &value)?,
                source: key,
            }),
            RawNode::Tree(entries) => Ok(DeployEntry::Subtree {
                children: entries_from_raw(entries)?,
                segment: key,
            }),
        }
    }
}

fn parse_leaf(key: &str, value: &str) -> Result<CopyLeaf> {
    if value.is_empty() {
        return Err(Error::invalid_deploy_spec(key, "empty destination"));
    }
    let escapes = Path::new(value).components().any(|c| {
        matches!(
            c,
            Component::RootDir | Component::Prefix(_) | Component::ParentDir
        )
    });
    if escapes {
        return Err(Error::invalid_deploy_spec(
            key,
            format!("destination '{}' must stay inside the output root", value),
        ));
    }
    Ok(CopyLeaf::parse(value))
}

/// Patterns allow a single `*`, in the last segment only
fn validate_pattern(key: &str) -> Result<()> {
    let (dir, last) = match key.rsplit_once('/') {
        Some((dir, last)) => (dir, last),
        None => ("", key),
    };

    if dir.contains(WILDCARD) {
        return Err(Error::invalid_pattern(
            key,
            "wildcards are only supported in the last path segment",
        ));
    }
    if last.matches(WILDCARD).count() > 1 {
        return Err(Error::invalid_pattern(
            key,
            "only a single '*' is supported",
        ));
    }
    Ok(())
}

fn entries_from_raw(entries: Vec<(String, RawNode)>) -> Result<Vec<DeployEntry>> {
    entries
        .into_iter()
        .map(|(key, node)| DeployEntry::from_raw(key, node))
        .collect()
}

/// An ordered deploy structure for one target platform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploySpec {
    entries: Vec<DeployEntry>,
}

impl DeploySpec {
    /// Create a structure from already validated entries
    pub fn new(entries: Vec<DeployEntry>) -> Self {
        Self { entries }
    }

    /// Parse a structure from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawNode = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawNode) -> Result<Self> {
        match raw {
            RawNode::Tree(entries) => Ok(Self {
                entries: entries_from_raw(entries)?,
            }),
            RawNode::Leaf(value) => Err(Error::invalid_deploy_spec(
                value,
                "a deploy structure must be an object",
            )),
        }
    }

    /// Top-level entries in declaration order
    pub fn entries(&self) -> &[DeployEntry] {
        &self.entries
    }

    /// Number of top-level entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the structure has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for DeploySpec {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawNode::deserialize(deserializer)?;
        Self::from_raw(raw).map_err(de::Error::custom)
    }
}

/// Untyped, order-preserving view of the JSON structure
#[derive(Debug)]
enum RawNode {
    Leaf(String),
    Tree(Vec<(String, RawNode)>),
}

impl<'de> Deserialize<'de> for RawNode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawNodeVisitor;

        impl<'de> Visitor<'de> for RawNodeVisitor {
            type Value = RawNode;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a destination string or a nested object")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<RawNode, E> {
                Ok(RawNode::Leaf(value.to_string()))
            }

            fn visit_string<E: de::Error>(self, value: String) -> std::result::Result<RawNode, E> {
                Ok(RawNode::Leaf(value))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<RawNode, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some((key, value)) = map.next_entry::<String, RawNode>()? {
                    entries.push((key, value));
                }
                Ok(RawNode::Tree(entries))
            }
        }

        deserializer.deserialize_any(RawNodeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_order() {
        let spec = DeploySpec::from_json(
            r#"{ "{root}/z.txt": "-", "{root}/a.txt": "-", "{root}/m": { "b": "-" } }"#,
        )
        .unwrap();

        let keys: Vec<_> = spec.entries().iter().map(|e| e.key()).collect();
        assert_eq!(keys, vec!["{root}/z.txt", "{root}/a.txt", "{root}/m"]);
    }

    #[test]
    fn test_parse_variants() {
        let spec = DeploySpec::from_json(
            r#"{
                "{root}/libs": {
                    "foo*.dll": "out/-",
                    "plugins": { "core/qmldir": "plugins/core/-" }
                },
                "{root}/a.txt": "-"
            }"#,
        )
        .unwrap();

        assert_eq!(spec.len(), 2);
        match &spec.entries()[0] {
            DeployEntry::Subtree { segment, children } => {
                assert_eq!(segment, "{root}/libs");
                assert_eq!(
                    children[0],
                    DeployEntry::Pattern {
                        pattern: "foo*.dll".to_string(),
                        leaf: CopyLeaf::Path("out/-".to_string()),
                    }
                );
                assert!(matches!(children[1], DeployEntry::Subtree { .. }));
            }
            other => panic!("expected subtree, got {:?}", other),
        }
        assert_eq!(
            spec.entries()[1],
            DeployEntry::Copy {
                source: "{root}/a.txt".to_string(),
                leaf: CopyLeaf::SameName,
            }
        );
    }

    #[test]
    fn test_pattern_with_subtree_rejected() {
        let err = DeploySpec::from_json(r#"{ "{root}": { "*.dll": { "x": "-" } } }"#)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDeploySpec { .. }));
    }

    #[test]
    fn test_pattern_double_wildcard_rejected() {
        let err = DeploySpec::from_json(r#"{ "{root}": { "*foo*.dll": "-" } }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn test_pattern_wildcard_in_directory_rejected() {
        let err = DeploySpec::from_json(r#"{ "{root}": { "*/qmldir": "-" } }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn test_destination_outside_root_rejected() {
        for dest in ["/tmp/escaped.txt", "../dotdot.txt", "plugins/../../up/-"] {
            let json = format!(r#"{{ "{{root}}/a.txt": "{}" }}"#, dest);
            let err = DeploySpec::from_json(&json).unwrap_err();
            assert!(
                matches!(err, Error::InvalidDeploySpec { .. }),
                "{} accepted",
                dest
            );
        }

        let err = DeploySpec::from_json(r#"{ "{root}": { "*.dll": "../-" } }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidDeploySpec { .. }));
    }

    #[test]
    fn test_dotted_destination_names_accepted() {
        let spec = DeploySpec::from_json(r#"{ "{root}/a.txt": "docs/..hidden/a.txt" }"#).unwrap();
        assert_eq!(spec.len(), 1);
    }

    #[test]
    fn test_non_object_rejected() {
        let err = DeploySpec::from_json(r#""-""#).unwrap_err();
        assert!(matches!(err, Error::InvalidDeploySpec { .. }));

        assert!(DeploySpec::from_json(r#"{ "a": 3 }"#).is_err());
    }

    #[test]
    fn test_relative_destination() {
        let acc = Path::new("seg1/seg2");
        let name = OsStr::new("lib.dll");

        assert_eq!(
            CopyLeaf::SameName.relative_destination(acc, name),
            PathBuf::from("seg1/seg2/lib.dll")
        );
        assert_eq!(
            CopyLeaf::parse("plugins/core/-").relative_destination(acc, name),
            PathBuf::from("plugins/core/lib.dll")
        );
        assert_eq!(
            CopyLeaf::parse("platforms/qwindows.dll").relative_destination(acc, name),
            PathBuf::from("platforms/qwindows.dll")
        );
    }
}
