use std::ops::Range;
use std::path::{Path, PathBuf};

use htmlpp::{Condition, NavTemplate, Report, Severity};

use crate::error::ProcessError;
use crate::markup::{Markdown, MarkupConverter};
use crate::sidebar::Sidebar;
use crate::store::VariableStore;

/// All mutable state of one preprocessing run. Runs never share a context.
pub struct Context {
    pub variables: VariableStore,
    pub sidebar: Sidebar,
    /// Included paths as written, in discovery order. Duplicates allowed.
    pub dependencies: Vec<String>,
    diagnostics: Vec<Report>,
    threshold: Severity,
    base_dir: PathBuf,
    converter: Box<dyn MarkupConverter>,
    /// Source span of the line currently being processed.
    location: Option<Range<usize>>,
}

impl Default for Context {
    fn default() -> Self {
        Context {
            variables: VariableStore::new(),
            sidebar: Sidebar::default(),
            dependencies: Vec::new(),
            diagnostics: Vec::new(),
            threshold: Severity::default(),
            base_dir: PathBuf::from("."),
            converter: Box::new(Markdown),
            location: None,
        }
    }
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    pub fn with_variables(mut self, variables: VariableStore) -> Self {
        self.variables = variables;
        self
    }

    /// Reports at or above `threshold` abort the run.
    pub fn with_threshold(mut self, threshold: Severity) -> Self {
        self.threshold = threshold;
        self
    }

    /// Directory relative include paths are resolved against.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_converter(mut self, converter: impl MarkupConverter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    pub fn with_nav_template(mut self, template: NavTemplate) -> Self {
        self.sidebar = Sidebar::new(template);
        self
    }

    pub fn converter(&self) -> &dyn MarkupConverter {
        self.converter.as_ref()
    }

    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Non-fatal reports recorded so far, in order.
    pub fn diagnostics(&self) -> &[Report] {
        &self.diagnostics
    }

    pub(crate) fn set_location(&mut self, location: Option<Range<usize>>) {
        self.location = location;
    }

    /// Report `condition` at the line being processed.
    ///
    /// Below the threshold the report is recorded and `Ok` lets the caller
    /// continue with a degraded result. At or above it the run aborts.
    pub fn report(&mut self, condition: Condition, message: impl Into<String>) -> Result<(), ProcessError> {
        let location = self.location.clone();
        self.report_at(condition, message, location)
    }

    pub fn report_at(
        &mut self,
        condition: Condition,
        message: impl Into<String>,
        span: Option<Range<usize>>,
    ) -> Result<(), ProcessError> {
        let report = Report::new(condition, message).with_span(span);
        if report.severity() >= self.threshold {
            tracing::debug!(severity = %report.severity(), message = %report.message, "aborting run");
            return Err(ProcessError::Aborted(report));
        }
        tracing::warn!(severity = %report.severity(), message = %report.message, "condition recorded");
        self.diagnostics.push(report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_decides_between_record_and_abort() {
        let mut ctx = Context::new().with_threshold(Severity::Serious);
        assert!(ctx.report(Condition::UnknownCommand, "light one").is_ok());
        let err = ctx.report(Condition::IncludeNotFound, "missing").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(ctx.diagnostics().len(), 1);
        assert_eq!(ctx.diagnostics()[0].message, "light one");
    }

    #[test]
    fn light_threshold_aborts_on_everything() {
        let mut ctx = Context::new().with_threshold(Severity::Light);
        assert!(ctx.report(Condition::UnterminatedComment, "x").is_err());
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn relative_paths_resolve_against_base_dir() {
        let ctx = Context::new().with_base_dir("/site/src");
        assert_eq!(ctx.resolve_path("part.html"), PathBuf::from("/site/src/part.html"));
        assert_eq!(ctx.resolve_path("/abs/part.html"), PathBuf::from("/abs/part.html"));
    }
}
