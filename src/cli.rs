//! Clap adapter for configtree.
//!
//! This module is the optional integration layer between the framework-agnostic
//! core and the [clap](https://docs.rs/clap) CLI parser. It is compiled only
//! when the `clap` Cargo feature is enabled (on by default).
//!
//! [`ConfigArgs`] can be flattened into any `#[derive(Parser)]` struct. The
//! only bridge to the core is [`ConfigArgs::into_action()`], which converts
//! the parsed flags and positional fields into a
//! [`ConfigAction`](crate::ConfigAction). Without clap, build
//! `ConfigAction` values directly.

use clap::Args;

use crate::error::ConfigError;
use crate::types::ConfigAction;

/// Flags and fields of a config-editing command.
///
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     config: ConfigArgs,
/// }
/// ```
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// View the configuration.
    #[arg(short, long, conflicts_with_all = ["list", "reset", "clean"])]
    pub show: bool,

    /// List the available configuration fields.
    #[arg(short, long, conflicts_with_all = ["reset", "clean"])]
    pub list: bool,

    /// Reset all the fields to their default value.
    #[arg(long, conflicts_with = "clean")]
    pub reset: bool,

    /// Do not ask for confirmation before resetting.
    #[arg(short, long, requires = "reset")]
    pub yes: bool,

    /// Rewrite the file where the configuration is stored.
    #[arg(short, long)]
    pub clean: bool,

    /// A section or field to edit interactively, or `path=value` pairs to set.
    #[arg(
        value_name = "FIELD",
        conflicts_with_all = ["show", "list", "reset", "clean"]
    )]
    pub fields: Vec<String>,
}

impl ConfigArgs {
    /// Convert clap-parsed args into a framework-agnostic `ConfigAction`.
    ///
    /// Flags win over positional fields; with no flag, the fields decide
    /// between interactive editing and assignment
    /// (see [`ConfigAction::from_fields`]).
    pub fn into_action(self) -> Result<ConfigAction, ConfigError> {
        if self.show {
            Ok(ConfigAction::Show)
        } else if self.list {
            Ok(ConfigAction::List)
        } else if self.reset {
            Ok(ConfigAction::Reset {
                confirmed: self.yes,
            })
        } else if self.clean {
            Ok(ConfigAction::Clean)
        } else {
            ConfigAction::from_fields(self.fields.as_slice())
        }
    }
}
