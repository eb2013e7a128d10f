//! Config operations behind the CLI: show, list, reset, clean, edit, assign.
//!
//! [`handle`] runs one [`ConfigAction`] against a loaded [`Config`] and
//! returns a [`ConfigResult`] for the caller to display. Interaction (the
//! editor and the reset confirmation) goes through a [`LineSource`];
//! `--show` output goes through a [`Render`].

use std::fmt;
use std::path::PathBuf;

use crate::config::Config;
use crate::edit::{self, LineSource, Session};
use crate::error::ConfigError;
use crate::render::Render;
use crate::tree::{ConfigTree, NodeId};
use crate::types::ConfigAction;

/// Width of the dotted leader in listings.
const LEADER: usize = 42;

/// One row of `--list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// Nesting level, 0 for the root's own fields.
    pub depth: usize,
    pub name: String,
    /// Handler name; `None` for sections.
    pub type_name: Option<String>,
    pub hint: Option<String>,
}

impl fmt::Display for ListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = "    ".repeat(self.depth);
        let text = match &self.type_name {
            Some(type_name) => format!("{} ({type_name})", self.name),
            None => format!("{}:", self.name),
        };
        match &self.hint {
            Some(hint) => write!(
                f,
                "{prefix} - {:.<width$}  {hint}",
                format!("{text}  "),
                width = LEADER
            ),
            None => write!(f, "{prefix} - {text}"),
        }
    }
}

/// Result of a config operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResult {
    /// The rendered tree.
    Shown(String),
    /// Every field and section with its type and hint.
    Listing { entries: Vec<ListEntry> },
    /// An interactive session finished and was saved.
    Edited { path: PathBuf },
    /// One-shot assignments, with the value each field now displays.
    Assigned { assignments: Vec<(String, String)> },
    /// Every field was reset to its default and saved.
    Reset { path: PathBuf },
    /// The reset confirmation was declined.
    ResetAborted,
    /// The store was rewritten in canonical form.
    Cleaned { path: PathBuf },
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::Shown(text) => write!(f, "{text}"),
            ConfigResult::Listing { entries } => {
                write!(f, "The following fields are available:")?;
                for entry in entries {
                    write!(f, "\n{entry}")?;
                }
                Ok(())
            }
            ConfigResult::Edited { path } => write!(f, "Saved to {}", path.display()),
            ConfigResult::Assigned { assignments } => {
                for (i, (path, value)) in assignments.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "Set {path} = {value}")?;
                }
                Ok(())
            }
            ConfigResult::Reset { path } => {
                write!(f, "Reset every field to its default in {}", path.display())
            }
            ConfigResult::ResetAborted => write!(f, "Reset aborted"),
            ConfigResult::Cleaned { path } => write!(f, "Cleaned {}", path.display()),
        }
    }
}

const RESET_QUESTION: &str =
    "Are you sure you want to reset ALL fields to the defaults? This cannot be undone.";

/// Run `action` against `config`.
pub fn handle(
    config: &mut Config,
    action: &ConfigAction,
    lines: &mut dyn LineSource,
    renderer: &dyn Render,
) -> Result<ConfigResult, ConfigError> {
    match action {
        ConfigAction::Show => Ok(ConfigResult::Shown(renderer.render(&config.snapshot()?))),
        ConfigAction::List => Ok(ConfigResult::Listing {
            entries: list_fields(config.tree()),
        }),
        ConfigAction::Reset { confirmed } => {
            if !confirmed && !edit::confirm(lines, RESET_QUESTION)? {
                return Ok(ConfigResult::ResetAborted);
            }
            config.reset()?;
            Ok(ConfigResult::Reset {
                path: config.storage_path().to_path_buf(),
            })
        }
        ConfigAction::Clean => {
            config.clean()?;
            Ok(ConfigResult::Cleaned {
                path: config.storage_path().to_path_buf(),
            })
        }
        ConfigAction::Edit { path } => {
            Session::new(config, path.as_deref())?.run(lines)?;
            Ok(ConfigResult::Edited {
                path: config.storage_path().to_path_buf(),
            })
        }
        ConfigAction::Assign { assignments } => {
            config.assign_all(assignments)?;
            let shown = assignments
                .iter()
                .map(|(path, _)| {
                    config
                        .field(path)
                        .map(|field| (path.clone(), field.display_value()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ConfigResult::Assigned { assignments: shown })
        }
    }
}

/// Like [`handle`], printing the result to stdout.
pub fn handle_and_print(
    config: &mut Config,
    action: &ConfigAction,
    lines: &mut dyn LineSource,
    renderer: &dyn Render,
) -> Result<(), ConfigError> {
    let result = handle(config, action, lines, renderer)?;
    println!("{result}");
    Ok(())
}

/// Fields first, then sections, recursively.
pub fn list_fields(tree: &ConfigTree) -> Vec<ListEntry> {
    let mut entries = Vec::new();
    collect_entries(tree, tree.root(), 0, &mut entries);
    entries
}

fn collect_entries(tree: &ConfigTree, node: NodeId, depth: usize, out: &mut Vec<ListEntry>) {
    for field in tree.fields(node) {
        out.push(ListEntry {
            depth,
            name: field.name().to_string(),
            type_name: Some(field.type_name().to_string()),
            hint: field.hint().map(str::to_string),
        });
    }
    for child in tree.children(node) {
        out.push(ListEntry {
            depth,
            name: tree.name(*child).to_string(),
            type_name: None,
            hint: tree.hint(*child).map(str::to_string),
        });
        collect_entries(tree, *child, depth + 1, out);
    }
}
