//! The configuration root: a discovered tree bound to its store.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::discover::{Declaration, discover};
use crate::error::ConfigError;
use crate::field::Field;
use crate::file;
use crate::handler::SharedHandler;
use crate::obfuscate::{Identity, SharedTransform};
use crate::persist::{self, LoadOutcome, LoadReport};
use crate::tree::{ConfigTree, Selection};
use crate::value::Value;

/// A configuration tree together with where and how it is stored.
///
/// The instance is the single mutable source of truth for the process.
/// Nothing is written until [`save`](Config::save) (or an operation that
/// saves) is called.
#[derive(Debug, Clone)]
pub struct Config {
    tree: ConfigTree,
    path: PathBuf,
    version: i64,
    transform: SharedTransform,
    strict: bool,
    last_load: LoadReport,
}

impl Config {
    /// Build the default tree without touching storage.
    pub fn new(declaration: &Declaration) -> Result<Self, ConfigError> {
        let tree = discover(declaration)?;
        let meta = &declaration.root;
        Ok(Self {
            tree,
            path: file::resolve_storage(meta.storage.as_ref())?,
            version: meta.version.unwrap_or(0),
            transform: meta
                .transform
                .clone()
                .unwrap_or_else(|| Arc::new(Identity)),
            strict: meta.strict.unwrap_or(false),
            last_load: LoadReport::default(),
        })
    }

    /// Build the default tree and apply the store on top of it.
    pub fn load(declaration: &Declaration) -> Result<Self, ConfigError> {
        let mut config = Self::new(declaration)?;
        config.reload()?;
        Ok(config)
    }

    /// Restore defaults, then re-apply the store.
    ///
    /// A missing, unreadable, or unparsable store leaves the defaults in place
    /// (in strict mode the last two are errors). A version mismatch does too.
    pub fn reload(&mut self) -> Result<&LoadReport, ConfigError> {
        self.tree.restore_defaults();
        self.last_load = self.read_into_tree()?;
        Ok(&self.last_load)
    }

    fn read_into_tree(&mut self) -> Result<LoadReport, ConfigError> {
        let bytes = match file::read_store(&self.path) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                info!(path = %self.path.display(), "no stored config, using defaults");
                return Ok(LoadReport::default());
            }
            Err(e) => return self.degrade(e),
        };
        let doc = match persist::decode(&bytes, self.transform.as_ref(), &self.path) {
            Ok(doc) => doc,
            Err(e) => return self.degrade(e),
        };
        let report =
            persist::apply_document(&mut self.tree, &doc, self.version, self.strict, &self.path)?;
        info!(
            path = %self.path.display(),
            applied = report.applied,
            "loaded stored config"
        );
        Ok(report)
    }

    fn degrade(&self, error: ConfigError) -> Result<LoadReport, ConfigError> {
        if self.strict {
            return Err(error);
        }
        warn!(%error, "stored config unusable, using defaults");
        Ok(LoadReport {
            outcome: LoadOutcome::Unreadable(error.to_string()),
            ..LoadReport::default()
        })
    }

    /// Write the whole tree to the store.
    pub fn save(&self) -> Result<(), ConfigError> {
        let bytes = persist::encode(&self.tree, self.version, self.transform.as_ref())?;
        file::write_store(&self.path, &bytes)?;
        info!(path = %self.path.display(), "saved config");
        Ok(())
    }

    /// Restore every default and persist.
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        self.tree.restore_defaults();
        self.save()
    }

    /// Re-save the current tree, normalizing the stored file.
    pub fn clean(&self) -> Result<(), ConfigError> {
        self.save()
    }

    pub fn tree(&self) -> &ConfigTree {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut ConfigTree {
        &mut self.tree
    }

    pub fn storage_path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// What the most recent load did.
    pub fn last_load(&self) -> &LoadReport {
        &self.last_load
    }

    pub fn select(&self, path: &str) -> Result<Selection, ConfigError> {
        self.tree.select(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.tree.select(path).is_ok()
    }

    pub fn field(&self, path: &str) -> Result<&Field, ConfigError> {
        let (node, index) = self.tree.resolve_leaf(path)?;
        Ok(self.tree.field(node, index))
    }

    pub fn get(&self, path: &str) -> Result<&Value, ConfigError> {
        Ok(self.field(path)?.value())
    }

    /// Hint of the field or section at `path`.
    pub fn hint(&self, path: &str) -> Result<Option<&str>, ConfigError> {
        Ok(match self.tree.select(path)? {
            Selection::Field(node, index) => self.tree.field(node, index).hint(),
            Selection::Node(node) => self.tree.hint(node),
        })
    }

    pub fn handler(&self, path: &str) -> Result<&SharedHandler, ConfigError> {
        Ok(self.field(path)?.handler())
    }

    /// Validate `input` for the field at `path` and assign it. Nothing is
    /// persisted.
    pub fn set(&mut self, path: &str, input: impl Into<Value>) -> Result<(), ConfigError> {
        let (node, index) = self.tree.resolve_leaf(path)?;
        let checked = self
            .tree
            .field(node, index)
            .check(&input.into())
            .map_err(|e| ConfigError::InvalidValue {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        self.tree.field_mut(node, index).commit(checked);
        Ok(())
    }

    /// Apply textual `path=value` assignments and persist once.
    ///
    /// Every assignment is checked before any is committed: on the first
    /// failure nothing changes in memory or on disk.
    pub fn assign_all(&mut self, assignments: &[(String, String)]) -> Result<(), ConfigError> {
        let mut checked = Vec::with_capacity(assignments.len());
        for (path, text) in assignments {
            let (node, index) = self.tree.resolve_leaf(path)?;
            let value = self
                .tree
                .field(node, index)
                .check(&Value::from(text.as_str()))
                .map_err(|e| ConfigError::InvalidValue {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            checked.push((node, index, value));
        }
        for (node, index, value) in checked {
            self.tree.field_mut(node, index).commit(value);
        }
        self.save()
    }

    /// The stored form of the tree, without the version tag.
    pub fn snapshot(&self) -> Result<serde_json::Value, ConfigError> {
        persist::snapshot(&self.tree, self.tree.root()).map(serde_json::Value::Object)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tree.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{person_at, rooms_at};
    use crate::types::StorageLocation;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn stored(path: &Path) -> serde_json::Value {
        serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn missing_store_uses_defaults_and_save_creates_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config::load(&person_at(&path)).unwrap();
        assert_eq!(config.last_load().outcome, LoadOutcome::Missing);
        assert_eq!(config.get("age").unwrap(), &Value::Int(42));
        assert!(!path.exists());

        config.save().unwrap();
        assert_eq!(
            stored(&path),
            json!({"__version__": 0, "name": "John", "age": 42})
        );
    }

    #[test]
    fn one_shot_assignment_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::load(&person_at(&path)).unwrap();
        config
            .assign_all(&[("age".into(), "43".into())])
            .unwrap();

        let doc = stored(&path);
        assert_eq!(doc["age"], json!(43));
        assert_eq!(doc["name"], json!("John"));
        let again = Config::load(&person_at(&path)).unwrap();
        assert_eq!(again.get("age").unwrap(), &Value::Int(43));
    }

    #[test]
    fn rejected_assignment_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::load(&person_at(&path)).unwrap();
        config.save().unwrap();
        let before = fs::read(&path).unwrap();

        let err = config
            .assign_all(&[("age".into(), "-1".into())])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { path, .. } if path == "age"));
        assert_eq!(fs::read(&path).unwrap(), before);
        assert_eq!(config.get("age").unwrap(), &Value::Int(42));
    }

    #[test]
    fn assignments_are_all_or_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::load(&person_at(&path)).unwrap();
        let err = config
            .assign_all(&[
                ("name".into(), "Jane".into()),
                ("nope".into(), "1".into()),
            ])
            .unwrap_err();
        assert!(matches!(err, ConfigError::PathNotFound(_)));
        assert_eq!(config.get("name").unwrap(), &Value::from("John"));
        assert!(!path.exists());
    }

    #[test]
    fn out_of_range_float_in_list_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let decl = person_at(&path).field("nums", vec![1, 2]);
        let mut config = Config::load(&decl).unwrap();
        let err = config
            .assign_all(&[("nums".into(), "[1e999]".into())])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { path, .. } if path == "nums"));
        assert_eq!(config.get("nums").unwrap(), &Value::from(vec![1, 2]));
        assert!(!path.exists());
    }

    #[test]
    fn assigning_a_section_is_not_a_leaf() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::load(&rooms_at(&dir.path().join("c.json"))).unwrap();
        let err = config
            .assign_all(&[("colors.walls".into(), "#fff".into())])
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotALeaf(_)));
    }

    #[test]
    fn version_mismatch_restores_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"__version__": 1, "name": "Jane", "age": 7}"#,
        )
        .unwrap();
        let config = Config::load(&person_at(&path).version(2)).unwrap();
        assert!(matches!(
            config.last_load().outcome,
            LoadOutcome::VersionMismatch { .. }
        ));
        assert_eq!(config.get("name").unwrap(), &Value::from("John"));
        assert_eq!(config.get("age").unwrap(), &Value::Int(42));
    }

    #[test]
    fn corrupt_store_degrades_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let config = Config::load(&person_at(&path)).unwrap();
        assert!(matches!(
            config.last_load().outcome,
            LoadOutcome::Unreadable(_)
        ));
        assert_eq!(config.get("name").unwrap(), &Value::from("John"));
    }

    #[test]
    fn corrupt_store_fails_strict_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = Config::load(&person_at(&path).strict(true)).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn obfuscated_round_trip_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secret.bin");
        let decl = rooms_at(&path).obfuscation_key("s3cret");
        let mut config = Config::load(&decl).unwrap();
        config.set("colors.walls.east", "#00ff00").unwrap();
        config.save().unwrap();

        assert!(serde_json::from_slice::<serde_json::Value>(&fs::read(&path).unwrap()).is_err());
        let again = Config::load(&decl).unwrap();
        assert_eq!(
            again.get("colors.walls.east").unwrap(),
            &Value::tuple([0, 255, 0])
        );
    }

    #[test]
    fn repeated_saves_are_byte_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let config = Config::load(&rooms_at(&path)).unwrap();
        config.save().unwrap();
        let first = fs::read(&path).unwrap();
        Config::load(&rooms_at(&path)).unwrap().save().unwrap();
        assert_eq!(fs::read(&path).unwrap(), first);
    }

    #[test]
    fn reset_restores_and_persists_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::load(&person_at(&path)).unwrap();
        config
            .assign_all(&[("name".into(), "Jane".into())])
            .unwrap();
        config.reset().unwrap();
        assert_eq!(config.get("name").unwrap(), &Value::from("John"));
        assert_eq!(stored(&path)["name"], json!("John"));
    }

    #[test]
    fn clean_drops_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"name": "Jane", "legacy": true}"#).unwrap();
        let config = Config::load(&person_at(&path)).unwrap();
        assert_eq!(config.last_load().unknown, vec!["legacy".to_string()]);
        config.clean().unwrap();
        assert_eq!(
            stored(&path),
            json!({"__version__": 0, "name": "Jane", "age": 42})
        );
    }

    #[test]
    fn reload_discards_unsaved_edits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::load(&person_at(&path)).unwrap();
        config.set("name", "Jane").unwrap();
        config.reload().unwrap();
        assert_eq!(config.get("name").unwrap(), &Value::from("John"));
    }

    #[test]
    fn lookups_by_path() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(&rooms_at(&dir.path().join("c.json"))).unwrap();
        assert!(config.contains("colors.walls"));
        assert!(config.contains("colors.walls.east"));
        assert!(!config.contains("colors.roof"));
        assert_eq!(config.hint("name").unwrap(), Some("Your name"));
        assert_eq!(config.hint("colors").unwrap(), Some("The colors around you."));
        assert_eq!(config.handler("colors.light").unwrap().name(), "color");
        assert!(matches!(config.get("colors"), Err(ConfigError::NotALeaf(_))));
    }

    #[test]
    fn set_rejects_without_mutating() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::new(&person_at(&dir.path().join("c.json"))).unwrap();
        assert!(config.set("age", "old").is_err());
        assert_eq!(config.get("age").unwrap(), &Value::Int(42));
        config.set("age", 7).unwrap();
        assert_eq!(config.get("age").unwrap(), &Value::Int(7));
    }

    #[test]
    fn storage_in_location() {
        let dir = TempDir::new().unwrap();
        let decl = crate::fixtures::test::person()
            .storage_in(StorageLocation::Path(dir.path().to_path_buf()), "app.json");
        let config = Config::new(&decl).unwrap();
        assert_eq!(config.storage_path(), dir.path().join("app.json"));
    }

    #[test]
    fn display_matches_tree() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(&person_at(&dir.path().join("c.json"))).unwrap();
        assert_eq!(config.to_string(), "name = John\nage = 42\n");
    }
}
