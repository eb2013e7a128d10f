//! Tree (de)serialization: the stored document, the version gate, and the
//! byte transform.
//!
//! Everything here is pure: it works on a [`ConfigTree`] and byte buffers.
//! Reading and writing the store file lives in [`file`](crate::file).
//!
//! The stored document is a JSON object mapping field names to saved values
//! and child names to nested objects, plus the reserved `__version__` key at
//! the top level. Keys are written sorted and pretty-printed, so saving an
//! unchanged tree twice yields identical bytes.

use std::path::Path;

use serde_json::{Map, Value as Json};
use tracing::warn;

use crate::error::ConfigError;
use crate::obfuscate::ByteTransform;
use crate::tree::{ConfigTree, NodeId};
use crate::value::Value;

/// Reserved top-level key holding the schema version.
pub const VERSION_KEY: &str = "__version__";

/// What happened when a store was applied to a tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadReport {
    pub outcome: LoadOutcome,
    /// Number of fields that took their value from the store.
    pub applied: usize,
    /// Paths of stored values the handlers rejected (defaults kept).
    pub rejected: Vec<String>,
    /// Stored keys that match nothing in the tree.
    pub unknown: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadOutcome {
    /// No store exists yet; defaults are in use.
    #[default]
    Missing,
    /// The store could not be read or parsed; defaults are in use.
    Unreadable(String),
    /// The store was written under another version; defaults are in use.
    VersionMismatch { stored: Json },
    /// The store was applied.
    Loaded,
}

/// Convert the subtree at `node` to its stored JSON form.
pub fn snapshot(tree: &ConfigTree, node: NodeId) -> Result<Map<String, Json>, ConfigError> {
    let mut map = Map::new();
    for (index, field) in tree.fields(node).iter().enumerate() {
        let json = field
            .saved()
            .to_json()
            .map_err(|reason| ConfigError::Unrepresentable {
                path: tree.field_path(node, index),
                reason,
            })?;
        map.insert(field.name().to_string(), json);
    }
    for child in tree.children(node) {
        map.insert(
            tree.name(*child).to_string(),
            Json::Object(snapshot(tree, *child)?),
        );
    }
    Ok(map)
}

/// The full stored document: the root snapshot plus the version tag.
pub fn to_document(tree: &ConfigTree, version: i64) -> Result<Map<String, Json>, ConfigError> {
    let mut doc = snapshot(tree, tree.root())?;
    doc.insert(VERSION_KEY.to_string(), Json::from(version));
    Ok(doc)
}

/// Serialize and transform the tree into the bytes written to disk.
pub fn encode(
    tree: &ConfigTree,
    version: i64,
    transform: &dyn ByteTransform,
) -> Result<Vec<u8>, ConfigError> {
    let doc = to_document(tree, version)?;
    let mut bytes =
        serde_json::to_vec_pretty(&doc).map_err(|e| ConfigError::Unrepresentable {
            path: VERSION_KEY.into(),
            reason: e.to_string(),
        })?;
    bytes.push(b'\n');
    Ok(transform.encrypt(&bytes))
}

/// Undo the transform and parse the stored document.
pub fn decode(
    bytes: &[u8],
    transform: &dyn ByteTransform,
    path: &Path,
) -> Result<Map<String, Json>, ConfigError> {
    let plain = transform.decrypt(bytes);
    serde_json::from_slice(&plain).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Apply a decoded document to a tree holding defaults.
///
/// A `__version__` different from `declared` discards the whole document.
/// A document without the tag is treated as current. Otherwise every stored
/// value goes through its field's handler; rejected and unknown entries are
/// skipped with a warning, or fail the load in `strict` mode. Either way the
/// tree is only mutated once every entry has been checked, so a strict
/// failure leaves it untouched.
pub fn apply_document(
    tree: &mut ConfigTree,
    doc: &Map<String, Json>,
    declared: i64,
    strict: bool,
    path: &Path,
) -> Result<LoadReport, ConfigError> {
    if let Some(stored) = doc.get(VERSION_KEY)
        && stored.as_i64() != Some(declared)
    {
        warn!(
            stored = %stored,
            declared,
            "config version mismatch, restoring defaults"
        );
        return Ok(LoadReport {
            outcome: LoadOutcome::VersionMismatch {
                stored: stored.clone(),
            },
            ..LoadReport::default()
        });
    }

    let mut pass = Pass::default();
    collect(tree, tree.root(), doc, &mut pass);

    if strict {
        if let Some(key) = pass.unknown.first() {
            return Err(ConfigError::UnknownKey {
                key: key.clone(),
                path: path.to_path_buf(),
            });
        }
        if let Some((field_path, reason)) = pass.rejected.first() {
            return Err(ConfigError::InvalidValue {
                path: field_path.clone(),
                reason: reason.clone(),
            });
        }
    }
    for (field_path, reason) in &pass.rejected {
        warn!(field = %field_path, %reason, "stored value rejected, keeping default");
    }
    for key in &pass.unknown {
        warn!(key = %key, "ignoring unknown key in stored config");
    }

    let applied = pass.accepted.len();
    for (node, index, value) in pass.accepted {
        tree.field_mut(node, index).commit(value);
    }

    Ok(LoadReport {
        outcome: LoadOutcome::Loaded,
        applied,
        rejected: pass.rejected.into_iter().map(|(p, _)| p).collect(),
        unknown: pass.unknown,
    })
}

#[derive(Default)]
struct Pass {
    accepted: Vec<(NodeId, usize, Value)>,
    rejected: Vec<(String, String)>,
    unknown: Vec<String>,
}

fn collect(tree: &ConfigTree, node: NodeId, map: &Map<String, Json>, pass: &mut Pass) {
    for (key, json) in map {
        if node == tree.root() && key == VERSION_KEY {
            continue;
        }
        if let Some(index) = tree.field_index(node, key) {
            let field_path = tree.field_path(node, index);
            let checked = Value::from_json(json)
                .ok_or_else(|| "null is not a value".to_string())
                .and_then(|raw| {
                    tree.field(node, index)
                        .check(&raw)
                        .map_err(|e| e.to_string())
                });
            match checked {
                Ok(value) => pass.accepted.push((node, index, value)),
                Err(reason) => pass.rejected.push((field_path, reason)),
            }
        } else if let Some(child) = tree.child(node, key) {
            match json {
                Json::Object(inner) => collect(tree, child, inner, pass),
                other => pass.rejected.push((
                    tree.path_of(child),
                    format!("expected a section, found {other}"),
                )),
            }
        } else {
            pass.unknown
                .push(crate::tree::join(&tree.path_of(node), key));
        }
    }
}
