//! Interactive editing.
//!
//! A [`Session`] walks part of the tree and prompts for each field through a
//! [`LineSource`]. It is a small state machine:
//!
//! - `Browsing(node)` queues every field of `node`, then every child node,
//!   depth-first.
//! - `EditingField(node, index)` reads one line. Empty input keeps the value;
//!   anything else goes through the field's handler and is either assigned or
//!   reported, in which case the same field is asked again.
//! - `Done` once the queue is empty. [`Session::run`] then saves once.
//!
//! End of input aborts the session with [`ConfigError::Interrupted`] before
//! anything is saved.

use std::io::{self, BufRead, Write};

use crate::config::Config;
use crate::error::ConfigError;
use crate::tree::{NodeId, Selection};
use crate::value::Value;

/// Current values longer than this are shortened in prompts.
const MAX_SHOWN: usize = 14;
const SHORTENED: usize = 10;

/// Where interactive input comes from.
pub trait LineSource {
    /// Show `prompt` and read one line without its terminator.
    /// `Ok(None)` means end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Show a message that needs no answer.
    fn notice(&mut self, message: &str) -> io::Result<()>;
}

/// A [`LineSource`] over any reader/writer pair.
pub struct Lines<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Lines<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl Lines<io::StdinLock<'static>, io::Stdout> {
    /// The process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LineSource for Lines<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.writer, "{prompt}")?;
        self.writer.flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn notice(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.writer, "{message}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Browsing(NodeId),
    EditingField(NodeId, usize),
    Done,
}

/// One interactive pass over a node or a single field.
pub struct Session<'c> {
    config: &'c mut Config,
    state: EditState,
    pending: Vec<EditState>,
}

impl<'c> Session<'c> {
    /// Start at `path`, or at the root when `None`.
    pub fn new(config: &'c mut Config, path: Option<&str>) -> Result<Self, ConfigError> {
        let state = match config.select(path.unwrap_or(""))? {
            Selection::Node(node) => EditState::Browsing(node),
            Selection::Field(node, index) => EditState::EditingField(node, index),
        };
        Ok(Self {
            config,
            state,
            pending: Vec::new(),
        })
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    /// Advance by one transition.
    pub fn step(&mut self, lines: &mut dyn LineSource) -> Result<EditState, ConfigError> {
        match self.state {
            EditState::Browsing(node) => {
                self.enter(node, lines)?;
                self.advance();
            }
            EditState::EditingField(node, index) => {
                if self.edit_field(node, index, lines)? {
                    self.advance();
                }
            }
            EditState::Done => {}
        }
        Ok(self.state)
    }

    /// Drive the session to `Done` and save once.
    pub fn run(mut self, lines: &mut dyn LineSource) -> Result<(), ConfigError> {
        while self.step(lines)? != EditState::Done {}
        self.config.save()
    }

    fn enter(&mut self, node: NodeId, lines: &mut dyn LineSource) -> Result<(), ConfigError> {
        let tree = self.config.tree();
        if node != tree.root() {
            let header = match tree.hint(node) {
                Some(hint) => format!("{}:  # {hint}", tree.path_of(node)),
                None => format!("{}:", tree.path_of(node)),
            };
            lines.notice(&header).map_err(interrupted)?;
        }
        // Stack: push in reverse so fields pop first, then children in order.
        for child in tree.children(node).iter().rev() {
            self.pending.push(EditState::Browsing(*child));
        }
        for index in (0..tree.fields(node).len()).rev() {
            self.pending.push(EditState::EditingField(node, index));
        }
        Ok(())
    }

    /// Prompt once. Returns whether the field is finished.
    fn edit_field(
        &mut self,
        node: NodeId,
        index: usize,
        lines: &mut dyn LineSource,
    ) -> Result<bool, ConfigError> {
        let field = self.config.tree().field(node, index);
        let prompt = prompt_for(field.label(), field.type_name(), &field.display_value());
        let Some(input) = lines.read_line(&prompt).map_err(interrupted)? else {
            return Err(ConfigError::Interrupted);
        };
        if input.is_empty() {
            return Ok(true);
        }
        match field.check(&Value::from(input)) {
            Ok(value) => {
                self.config.tree_mut().field_mut(node, index).commit(value);
                Ok(true)
            }
            Err(e) => {
                let path = self.config.tree().field_path(node, index);
                let message = ConfigError::InvalidValue {
                    path,
                    reason: e.to_string(),
                };
                lines.notice(&message.to_string()).map_err(interrupted)?;
                Ok(false)
            }
        }
    }

    fn advance(&mut self) {
        self.state = self.pending.pop().unwrap_or(EditState::Done);
    }
}

fn interrupted(error: io::Error) -> ConfigError {
    tracing::debug!(%error, "line source failed");
    ConfigError::Interrupted
}

/// `label (type) [current]: `, with long current values shortened.
pub(crate) fn prompt_for(label: &str, type_name: &str, current: &str) -> String {
    let shown = if current.chars().count() > MAX_SHOWN {
        let head: String = current.chars().take(SHORTENED).collect();
        format!("{head}...")
    } else {
        current.to_string()
    };
    format!("{label} ({type_name}) [{shown}]: ")
}

/// Ask a yes/no question. Anything but an explicit yes declines.
pub fn confirm(lines: &mut dyn LineSource, question: &str) -> Result<bool, ConfigError> {
    let answer = lines
        .read_line(&format!("{question} [y/N]: "))
        .map_err(interrupted)?
        .ok_or(ConfigError::Interrupted)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
