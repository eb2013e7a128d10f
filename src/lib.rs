//! Declarative, versioned configuration trees with an interactive editor.
//!
//! Describe your configuration once as a [`Declaration`]: fields with their
//! defaults, nested sections, optional type overrides and hints. configtree
//! turns it into a typed tree, loads and saves it as JSON, and gives end
//! users a small CLI to show, list, and edit it.
//!
//! ```ignore
//! let walls = Declaration::new()
//!     .field("east", "#ff0000")
//!     .typed("east", ColorHandler)
//!     .hint("east", "The color of the eastern wall");
//!
//! let decl = Declaration::new()
//!     .storage_in(StorageLocation::Platform("myapp"), "config.json")
//!     .version(1)
//!     .field("name", "Archibald")
//!     .hint("name", "Your name")
//!     .field("age", 42)
//!     .typed("age", IntHandler::new().min(0))
//!     .nested("walls", walls);
//!
//! let mut config = Config::load(&decl)?;
//! config.set("walls.east", "#00ff00")?;
//! config.save()?;
//! ```
//!
//! # Fields and handlers
//!
//! Every field is bound to exactly one [`TypeHandler`] when the declaration
//! is processed. Booleans, integers, floats, and strings get a built-in
//! handler inferred from the default. Lists, tuples, and maps get a
//! [`LiteralHandler`] that reads a restricted literal syntax
//! (`[1, 2]`, `("a", 1)`, `{"k": true}`); it never evaluates code. Anything
//! else, like [`ColorHandler`], [`PathHandler`], or your own type, is bound
//! with [`Declaration::typed`].
//!
//! A handler's `load` must accept both the stored form and free text typed by
//! a user. Every assignment, whether from the store, the CLI, or
//! [`Config::set`], runs `load` followed by `is_valid`; a rejected input
//! leaves the field unchanged.
//!
//! Attributes whose name starts or ends with `_` are private and never become
//! fields.
//!
//! # Paths
//!
//! Sections nest, and any field or section is addressed by a dotted path
//! such as `colors.walls.east`. The same paths are used by the store layout,
//! by [`Config::get`]/[`Config::set`], and on the command line.
//!
//! # Storage
//!
//! The store is a pretty-printed JSON object with sorted keys and a reserved
//! `__version__` entry:
//!
//! ```text
//! {
//!   "__version__": 1,
//!   "age": 42,
//!   "walls": {
//!     "east": "#ff0000"
//!   }
//! }
//! ```
//!
//! - A store written under another [`version`](Declaration::version) is
//!   discarded entirely and the defaults are used. There is no migration.
//! - A missing store means defaults; the next save creates it, along with
//!   any parent directories.
//! - Unknown keys and rejected values are skipped with a warning, or fail the
//!   load when [`strict`](Declaration::strict) is set.
//! - [`obfuscation_key`](Declaration::obfuscation_key) XORs the bytes with a
//!   repeating key. This only keeps casual readers out; it is **not**
//!   encryption. Any other reversible [`ByteTransform`] can be plugged in.
//!
//! # CLI
//!
//! The core has no dependency on a CLI framework: [`ConfigAction`] describes
//! what to do and [`ops::handle`] does it, prompting through a
//! [`LineSource`] and rendering through a [`Render`].
//!
//! | Invocation        | Effect                                           |
//! |-------------------|--------------------------------------------------|
//! | `-s`, `--show`    | render the whole tree                            |
//! | `-l`, `--list`    | list fields with their types and hints           |
//! | *(no args)*       | prompt for every field, then save                |
//! | `<path>`          | prompt for the fields under `<path>`, then save  |
//! | `<path>=<value>…` | assign all or nothing, then save                 |
//! | `--reset [-y]`    | restore every default and save                   |
//! | `-c`, `--clean`   | rewrite the store in canonical form              |
//!
//! With the `clap` feature (on by default), flatten [`ConfigArgs`] into your
//! parser and call [`ConfigArgs::into_action`]. The `color` feature adds a
//! highlighting `ColorRender` for `--show`.

pub mod config;
pub mod discover;
pub mod edit;
pub mod error;
pub mod field;
pub mod file;
pub mod handler;
pub mod literal;
pub mod obfuscate;
pub mod ops;
pub mod persist;
pub mod render;
pub mod tree;
pub mod types;
pub mod value;

#[cfg(feature = "clap")]
mod cli;

#[cfg(test)]
mod fixtures;

#[cfg(feature = "clap")]
pub use cli::ConfigArgs;
pub use config::Config;
pub use discover::{Declaration, discover};
pub use edit::{LineSource, Lines, Session};
pub use error::ConfigError;
pub use field::Field;
pub use handler::{
    BoolHandler, ColorHandler, Container, FloatHandler, IntHandler, LiteralHandler, PathHandler,
    Rejection, SharedHandler, StrHandler, TypeHandler,
};
pub use obfuscate::{ByteTransform, Identity, XorCipher};
pub use ops::{ConfigResult, ListEntry};
#[cfg(feature = "color")]
pub use render::ColorRender;
pub use render::{PlainRender, Render};
pub use tree::{ConfigTree, NodeId, Selection};
pub use types::{ConfigAction, StorageLocation};
pub use value::Value;
