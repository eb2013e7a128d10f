use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for '{path}': {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("'{0}' is a section, not a field")]
    NotALeaf(String),

    #[error("'{name}' is declared more than once in '{node}'")]
    NameCollision { node: String, name: String },

    #[error("Invalid field name '{0}'")]
    InvalidName(String),

    #[error("Metadata for '{name}' in '{node}' does not match any declared attribute")]
    DanglingMetadata { node: String, name: String },

    #[error("Default of '{path}' is rejected by its {handler} handler")]
    InvalidDefault { path: String, handler: String },

    #[error("Unknown key '{key}' in {path}")]
    UnknownKey { key: String, path: PathBuf },

    #[error("Value of '{path}' cannot be stored: {reason}")]
    Unrepresentable { path: String, reason: String },

    #[error("Failed to access {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Could not resolve the storage directory (no home directory?)")]
    StorageUnresolved,

    #[error("Cannot mix field selection and assignment: '{0}'")]
    MalformedAssignment(String),

    #[error("Input ended before the edit was complete; nothing was saved")]
    Interrupted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_formats_correctly() {
        let err = ConfigError::InvalidValue {
            path: "colors.walls.east".into(),
            reason: "not a color".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("colors.walls.east"));
        assert!(msg.contains("not a color"));
    }

    #[test]
    fn path_not_found_formats() {
        let err = ConfigError::PathNotFound("colors.nope".into());
        assert!(err.to_string().contains("colors.nope"));
    }

    #[test]
    fn unknown_key_includes_file() {
        let err = ConfigError::UnknownKey {
            key: "typo".into(),
            path: "/home/user/.config/app/config.json".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("typo"));
        assert!(msg.contains("config.json"));
    }
}
