//! The preprocessing engine: runs directive comments found in an HTML
//! document against a [`Context`] and produces the rewritten document.

mod buffer;
pub mod commands;
pub mod conditional;
pub mod context;
pub mod error;
pub mod markup;
pub mod scanner;
pub mod sidebar;
pub mod store;
pub mod substitute;

pub use commands::{CommandRegistry, Directive, Output};
pub use context::Context;
pub use error::ProcessError;
pub use markup::{ConversionError, Markdown, MarkupConverter};
pub use scanner::{MAX_EXPANSIONS, Scanner};
pub use sidebar::Sidebar;
pub use store::VariableStore;

/// Process `source` with the built-in commands.
pub fn process(source: &str, ctx: &mut Context) -> Result<String, ProcessError> {
    let registry = CommandRegistry::new();
    Scanner::new(&registry).process(source, ctx)
}
