//! Directive handlers. Each command maps its argument text and the run
//! context to replacement text for the directive.

mod assign;
mod comment;
mod include;
mod sidenav;

use std::collections::HashMap;

pub use assign::{Set, SetDefault};
pub use comment::{Comment, Uncomment, comment, uncomment};
pub use include::Include;
pub use sidenav::Sidenav;

use crate::context::Context;
use crate::error::ProcessError;

/// What a directive leaves in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Replaces the directive text.
    Text(String),
    /// Replaces the directive with nothing and marks the enclosing comment as
    /// the place the rendered sidebar goes once the whole document is seen.
    SidebarAnchor,
}

impl Output {
    pub fn text(text: impl Into<String>) -> Self {
        Output::Text(text.into())
    }

    pub fn empty() -> Self {
        Output::Text(String::new())
    }
}

pub trait Directive {
    /// Command name matched against `#<name>`.
    fn name(&self) -> &str;

    /// Execute with trimmed `args`. Conditions go through
    /// [`Context::report`]; an `Err` means the run must abort.
    fn execute(&self, args: &str, ctx: &mut Context) -> Result<Output, ProcessError>;
}

/// Command name to handler.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Directive>>,
}

impl CommandRegistry {
    /// Registry without any commands.
    pub fn empty() -> Self {
        CommandRegistry {
            commands: HashMap::new(),
        }
    }

    /// Registry with the built-in commands: `include`, `set`, `default`,
    /// `comment`, `uncomment` and `sidenav`.
    pub fn new() -> Self {
        CommandRegistry::empty()
            .with(Include)
            .with(Set)
            .with(SetDefault)
            .with(Comment)
            .with(Uncomment)
            .with(Sidenav)
    }

    /// Register `directive`, replacing any handler with the same name.
    pub fn with(mut self, directive: impl Directive + 'static) -> Self {
        self.commands
            .insert(directive.name().to_string(), Box::new(directive));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Directive> {
        self.commands.get(name).map(|d| d.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        CommandRegistry::new()
    }
}
