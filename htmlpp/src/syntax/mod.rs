//! Surface syntax of preprocessor documents: comment markers, directive
//! calls, variable references, conditional maps, headings and `sidenav`
//! sub-commands.

pub mod conditional;
pub mod directive;
pub mod heading;
pub mod sidenav;
pub mod variable;

pub use conditional::{Branch, ConditionalMap};
pub use directive::{DirectiveCall, parse_directive};
pub use heading::{Heading, find_headings};
pub use sidenav::{SidenavCommand, SidenavError};
pub use variable::{VariableRef, find_references, replace_references};

/// Opens a comment region. Directives are only recognized inside one.
pub const COMMENT_OPEN: &str = "<!--";
/// Closes a comment region.
pub const COMMENT_CLOSE: &str = "-->";
