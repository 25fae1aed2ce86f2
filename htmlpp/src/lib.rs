pub mod nav;
pub mod report;
pub mod syntax;

pub use nav::{NavEntry, NavTemplate};
pub use report::{Condition, Report, Severity, SeverityParseError};
