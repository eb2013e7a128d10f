//! Declarations and field discovery.
//!
//! A [`Declaration`] describes one level of configuration: its attributes
//! (defaults and nested declarations) plus metadata tags that configure them.
//! [`discover`] turns a declaration into a [`ConfigTree`], resolving one
//! handler per field and recursing into nested declarations.
//!
//! # Inclusion rule
//!
//! An attribute whose name starts or ends with `_` is private: it is kept out
//! of the tree (never prompted, listed, or stored). Metadata set through
//! [`typed`](Declaration::typed), [`hint`](Declaration::hint), and the
//! root-level setters travels on a separate channel and is never a field.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::error::ConfigError;
use crate::field::Field;
use crate::handler::{self, SharedHandler, TypeHandler};
use crate::obfuscate::{ByteTransform, Identity, SharedTransform, XorCipher};
use crate::tree::{ConfigTree, NodeId, SEPARATOR};
use crate::types::StorageLocation;
use crate::value::Value;

/// Names starting or ending with this character are not fields.
pub const MARKER: char = '_';

/// Whether `name` is excluded from discovery.
pub fn is_private(name: &str) -> bool {
    name.starts_with(MARKER) || name.ends_with(MARKER)
}

#[derive(Debug, Clone)]
pub(crate) enum Attr {
    Default(Value),
    Nested(Declaration),
}

#[derive(Debug, Clone)]
pub(crate) enum Storage {
    File(PathBuf),
    Located(StorageLocation, String),
}

/// Settings that only mean something on the root declaration.
#[derive(Debug, Clone, Default)]
pub(crate) struct RootMeta {
    pub(crate) storage: Option<Storage>,
    pub(crate) version: Option<i64>,
    pub(crate) transform: Option<SharedTransform>,
    pub(crate) strict: Option<bool>,
}

impl RootMeta {
    fn is_set(&self) -> bool {
        self.storage.is_some()
            || self.version.is_some()
            || self.transform.is_some()
            || self.strict.is_some()
    }
}

/// Declarative description of a configuration level.
///
/// ```ignore
/// let walls = Declaration::new()
///     .field("east", Value::tuple([255, 0, 0]))
///     .typed("east", ColorHandler)
///     .hint("east", "The color of the eastern wall");
///
/// let decl = Declaration::new()
///     .storage_path("assets/config.json")
///     .version(1)
///     .field("name", "Archibald")
///     .hint("name", "Your name")
///     .nested("walls", walls);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Declaration {
    pub(crate) attrs: Vec<(String, Attr)>,
    types: Vec<(String, SharedHandler)>,
    hints: Vec<(String, String)>,
    pub(crate) root: RootMeta,
}

impl Declaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field with its default value. The handler is inferred from
    /// the default unless [`typed`](Self::typed) names one.
    pub fn field(mut self, name: &str, default: impl Into<Value>) -> Self {
        self.attrs
            .push((name.to_string(), Attr::Default(default.into())));
        self
    }

    /// Declare a sub-configuration.
    pub fn nested(mut self, name: &str, declaration: Declaration) -> Self {
        self.attrs
            .push((name.to_string(), Attr::Nested(declaration)));
        self
    }

    /// Bind an explicit handler to a field.
    pub fn typed(self, name: &str, handler: impl TypeHandler + 'static) -> Self {
        self.typed_shared(name, Arc::new(handler))
    }

    /// Like [`typed`](Self::typed), for a handler shared between fields.
    pub fn typed_shared(mut self, name: &str, handler: SharedHandler) -> Self {
        self.types.push((name.to_string(), handler));
        self
    }

    /// Attach a human-readable hint to a field or sub-configuration.
    pub fn hint(mut self, name: &str, hint: &str) -> Self {
        self.hints.push((name.to_string(), hint.to_string()));
        self
    }

    /// Store the configuration at `path` (default: `config.json`).
    pub fn storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.root.storage = Some(Storage::File(path.into()));
        self
    }

    /// Store the configuration as `file_name` inside `location`.
    pub fn storage_in(mut self, location: StorageLocation, file_name: &str) -> Self {
        self.root.storage = Some(Storage::Located(location, file_name.to_string()));
        self
    }

    /// Schema version (default: 0). Stores written under another version are
    /// discarded on load.
    pub fn version(mut self, version: i64) -> Self {
        self.root.version = Some(version);
        self
    }

    /// Obfuscate the store with [`XorCipher`]. An empty key disables it.
    pub fn obfuscation_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        let key = key.into();
        let transform: SharedTransform = if key.is_empty() {
            Arc::new(Identity)
        } else {
            Arc::new(XorCipher::new(key))
        };
        self.root.transform = Some(transform);
        self
    }

    /// Replace the store transform with any reversible one.
    pub fn transform(mut self, transform: impl ByteTransform + 'static) -> Self {
        self.root.transform = Some(Arc::new(transform));
        self
    }

    /// Enable or disable strict loading (default: `false`).
    /// In strict mode, unknown or rejected stored values fail the load.
    pub fn strict(mut self, strict: bool) -> Self {
        self.root.strict = Some(strict);
        self
    }

    fn type_override(&self, name: &str) -> Option<&SharedHandler> {
        self.types
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, h)| h)
    }

    fn hint_for(&self, name: &str) -> Option<String> {
        self.hints
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, h)| h.clone())
    }
}

/// Build the tree described by `declaration`.
pub fn discover(declaration: &Declaration) -> Result<ConfigTree, ConfigError> {
    let mut tree = ConfigTree::new();
    let root = tree.root();
    populate(&mut tree, root, declaration)?;
    Ok(tree)
}

fn populate(tree: &mut ConfigTree, node: NodeId, decl: &Declaration) -> Result<(), ConfigError> {
    if node != tree.root() && decl.root.is_set() {
        debug!(
            node = %tree.path_of(node),
            "ignoring root-level settings on a nested declaration"
        );
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for (name, attr) in &decl.attrs {
        if is_private(name) {
            debug!(node = %tree.path_of(node), name = %name, "skipping private attribute");
            continue;
        }
        if name.is_empty() || name.contains(SEPARATOR) {
            return Err(ConfigError::InvalidName(name.clone()));
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::NameCollision {
                node: tree.path_of(node),
                name: name.clone(),
            });
        }

        match attr {
            Attr::Default(default) => {
                let field = bind_field(tree, node, decl, name, default)?;
                tree.add_field(node, field);
            }
            Attr::Nested(child_decl) => {
                let child = tree.add_child(node, name, decl.hint_for(name));
                populate(tree, child, child_decl)?;
            }
        }
    }

    let fields: HashSet<&str> = decl
        .attrs
        .iter()
        .filter(|(_, attr)| matches!(attr, Attr::Default(_)))
        .map(|(name, _)| name.as_str())
        .collect();
    let dangling_type = decl
        .types
        .iter()
        .map(|(name, _)| name)
        .find(|name| !is_private(name) && !fields.contains(name.as_str()));
    let dangling_hint = decl
        .hints
        .iter()
        .map(|(name, _)| name)
        .find(|name| !is_private(name) && !seen.contains(name.as_str()));
    if let Some(name) = dangling_type.or(dangling_hint) {
        return Err(ConfigError::DanglingMetadata {
            node: tree.path_of(node),
            name: name.clone(),
        });
    }

    Ok(())
}

fn bind_field(
    tree: &ConfigTree,
    node: NodeId,
    decl: &Declaration,
    name: &str,
    default: &Value,
) -> Result<Field, ConfigError> {
    let (handler, overridden) = match decl.type_override(name) {
        Some(h) => (h.clone(), true),
        None => (handler::infer(default), false),
    };

    // Defaults go through the handler too, so a color may be declared as
    // "#ff0000" or as (255, 0, 0).
    let default = handler
        .load(default)
        .ok()
        .filter(|v| handler.is_valid(v))
        .ok_or_else(|| ConfigError::InvalidDefault {
            path: crate::tree::join(&tree.path_of(node), name),
            handler: handler.name().to_string(),
        })?;

    debug!(
        field = %crate::tree::join(&tree.path_of(node), name),
        handler = handler.name(),
        overridden,
        "bound field"
    );
    Ok(Field::new(
        name.to_string(),
        default,
        handler,
        decl.hint_for(name),
        overridden,
    ))
}
