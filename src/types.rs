use std::path::PathBuf;

use crate::error::ConfigError;

/// A directory the store file can live in.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageLocation {
    /// Platform config directory for the named app (XDG on Linux,
    /// ~/Library/Application Support on macOS).
    Platform(&'static str),
    /// A subdirectory under the user's home directory, e.g. `Home(".myapp")`.
    Home(&'static str),
    /// Current working directory.
    Cwd,
    /// An explicit directory.
    Path(PathBuf),
}

/// A config operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    /// Render the whole tree.
    Show,
    /// List fields with their types and hints.
    List,
    /// Restore every default and persist. Unconfirmed resets ask first.
    Reset { confirmed: bool },
    /// Re-save the store in canonical form.
    Clean,
    /// Prompt for every field under `path` (the root when `None`), then persist.
    Edit { path: Option<String> },
    /// Apply `path=value` pairs and persist, all or nothing.
    Assign { assignments: Vec<(String, String)> },
}

impl ConfigAction {
    /// Interpret positional arguments.
    ///
    /// No arguments edit the whole tree, a single bare path edits that part,
    /// and `path=value` arguments assign. Mixing the two forms is an error.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, ConfigError> {
        match fields {
            [] => Ok(ConfigAction::Edit { path: None }),
            [only] if !only.as_ref().contains('=') => Ok(ConfigAction::Edit {
                path: Some(only.as_ref().to_string()),
            }),
            many => {
                let assignments = many
                    .iter()
                    .map(|arg| {
                        let arg = arg.as_ref();
                        arg.split_once('=')
                            .map(|(path, value)| (path.trim().to_string(), value.to_string()))
                            .ok_or_else(|| ConfigError::MalformedAssignment(arg.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ConfigAction::Assign { assignments })
            }
        }
    }
}
