use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity as DiagnosticSeverity};

/// How serious a reported condition is. Ordered: `Light < Serious < Critical`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Light,
    #[default]
    Serious,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Light => "light",
            Severity::Serious => "serious",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid severity '{0}' (expected light, serious or critical)")]
pub struct SeverityParseError(pub String);

impl FromStr for Severity {
    type Err = SeverityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Severity::Light),
            "serious" => Ok(Severity::Serious),
            "critical" => Ok(Severity::Critical),
            other => Err(SeverityParseError(other.to_string())),
        }
    }
}

/// Every condition the preprocessor can report. Each one has a fixed
/// severity and a fixed process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    UnknownCommand,
    UnknownSidenavCommand,
    MalformedCustomEntry,
    UnterminatedComment,
    IncludeNotFound,
    MarkupConversion,
}

impl Condition {
    pub fn severity(self) -> Severity {
        match self {
            Condition::UnknownCommand
            | Condition::UnknownSidenavCommand
            | Condition::MalformedCustomEntry
            | Condition::UnterminatedComment => Severity::Light,
            Condition::IncludeNotFound => Severity::Serious,
            Condition::MarkupConversion => Severity::Critical,
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            Condition::IncludeNotFound => 2,
            Condition::MarkupConversion => 3,
            _ => 1,
        }
    }
}

/// A reported condition with an optional location in the target source.
#[derive(Debug, Clone)]
pub struct Report {
    pub condition: Condition,
    pub message: String,
    pub span: Option<Range<usize>>,
}

impl Report {
    pub fn new(condition: Condition, message: impl Into<String>) -> Self {
        Report {
            condition,
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(mut self, span: Option<Range<usize>>) -> Self {
        self.span = span;
        self
    }

    pub fn severity(&self) -> Severity {
        self.condition.severity()
    }

    pub fn exit_code(&self) -> i32 {
        self.condition.exit_code()
    }

    /// Convert to a codespan-reporting Diagnostic for display. Fatal reports
    /// render as errors, recorded ones as warnings.
    pub fn to_diagnostic(&self, file_id: usize, fatal: bool) -> Diagnostic<usize> {
        let level = if fatal {
            DiagnosticSeverity::Error
        } else {
            DiagnosticSeverity::Warning
        };
        let labels = match &self.span {
            Some(span) => vec![Label::primary(file_id, span.clone())],
            None => Vec::new(),
        };
        Diagnostic::new(level)
            .with_message(&self.message)
            .with_labels(labels)
            .with_notes(vec![format!("severity: {}", self.severity())])
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
