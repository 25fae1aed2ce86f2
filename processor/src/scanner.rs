use std::ops::Range;

use htmlpp::Condition;
use htmlpp::syntax::{COMMENT_CLOSE, COMMENT_OPEN, find_headings, parse_directive};
use tracing::trace;

use crate::buffer::{Buffer, shift};
use crate::commands::{CommandRegistry, Output};
use crate::context::Context;
use crate::error::ProcessError;
use crate::substitute::substitutions;

/// Directives a single run may expand before it is treated as runaway
/// recursion.
pub const MAX_EXPANSIONS: usize = 10_000;

/// Scans a document for directive comments and splices their output in
/// place.
///
/// One left-to-right pass, line by line. Text produced by a directive is
/// scanned again once its comment closes, so directives may emit
/// directives, variable references and headings.
pub struct Scanner<'r> {
    registry: &'r CommandRegistry,
}

impl<'r> Scanner<'r> {
    pub fn new(registry: &'r CommandRegistry) -> Self {
        Scanner { registry }
    }

    /// Process `source`, reading and updating `ctx`. On `Err` no output
    /// exists; `ctx` still holds what was recorded before the abort.
    pub fn process(&self, source: &str, ctx: &mut Context) -> Result<String, ProcessError> {
        Pass {
            registry: self.registry,
            ctx,
            buf: Buffer::new(source),
            region: None,
            headings: Vec::new(),
            anchor: None,
            expansions: 0,
        }
        .run()
    }
}

/// The comment currently open. Comments do not nest.
struct Region {
    /// Window position of the open marker.
    begin: usize,
    /// Whether a directive ran inside; if so the delimiters are stripped on
    /// close.
    fired: bool,
    /// Source line and span where the comment opened.
    line: usize,
    span: Option<Range<usize>>,
}

struct Pass<'a, 's> {
    registry: &'a CommandRegistry,
    ctx: &'a mut Context,
    buf: Buffer<'s>,
    region: Option<Region>,
    /// Window positions of headings already added to the sidebar. Revisited
    /// text must not add them twice.
    headings: Vec<usize>,
    /// Output offset where the rendered sidebar goes.
    anchor: Option<usize>,
    expansions: usize,
}

impl Pass<'_, '_> {
    fn run(mut self) -> Result<String, ProcessError> {
        let mut i = 0;
        while self.buf.has_more(i) {
            let mut line_end = self.buf.line_end(i);
            self.ctx.set_location(self.buf.source_span());

            if self.region.is_none() {
                let open = self.buf.find(COMMENT_OPEN, i..line_end);
                let delta = self.substitute(i..open.unwrap_or(line_end));
                line_end = shift(line_end, delta);
                let open = open.map(|pos| shift(pos, delta));
                self.register_headings(i..line_end, open.unwrap_or(line_end));
                let Some(begin) = open else {
                    i = self.next_line(line_end);
                    continue;
                };
                trace!(line = self.buf.source_line(), "comment opened");
                self.region = Some(Region {
                    begin,
                    fired: false,
                    line: self.buf.source_line(),
                    span: self.buf.source_span(),
                });
                i = begin + COMMENT_OPEN.len();
            }

            if self.abandon_unterminated(i)? {
                continue;
            }

            // Directives never span lines, even when their comment does.
            let mut close = self.buf.find(COMMENT_CLOSE, i..line_end);
            let mut boundary = close.unwrap_or(line_end);
            let delta = self.substitute(i..boundary);
            boundary = shift(boundary, delta);
            line_end = shift(line_end, delta);
            close = close.map(|pos| shift(pos, delta));
            self.register_headings(i..line_end, boundary);

            if let Some(delta) = self.expand_directive(i, boundary)? {
                boundary = shift(boundary, delta);
                line_end = shift(line_end, delta);
                close = close.map(|pos| shift(pos, delta));
            }

            i = if close == Some(boundary) {
                self.close_region(i, boundary)
            } else {
                self.next_line(line_end)
            };
        }

        if let Some(region) = self.region.take() {
            self.ctx.report_at(
                Condition::UnterminatedComment,
                format!("comment opened on line {} is never closed", region.line),
                region.span,
            )?;
        }

        let anchor = self.anchor;
        let mut out = self.buf.finish();
        if let Some(anchor) = anchor {
            out.insert_str(anchor, &self.ctx.sidebar.render());
        }
        Ok(out)
    }

    /// Substitute variables in `range`. Returns the length change.
    fn substitute(&mut self, range: Range<usize>) -> isize {
        let start = range.start;
        let edits = substitutions(self.buf.text(range), &self.ctx.variables);
        let mut delta = 0;
        for (edit, value) in edits.into_iter().rev() {
            delta += self.splice(start + edit.start..start + edit.end, &value);
        }
        delta
    }

    /// Add the headings in `line` that start before `settled` to the sidebar.
    /// Text from `settled` on has not been substituted yet; headings there are
    /// picked up on a later visit. Headings may contain comments, so the
    /// whole rest of the line is matched.
    fn register_headings(&mut self, line: Range<usize>, settled: usize) {
        let start = line.start;
        for heading in find_headings(self.buf.text(line)) {
            let pos = start + heading.span.start;
            if pos >= settled || self.headings.contains(&pos) {
                continue;
            }
            self.headings.push(pos);
            trace!(id = %heading.id, "heading found");
            self.ctx.sidebar.add_link(&heading.label, &heading.target());
        }
    }

    /// Abandon the open comment if another one begins before it closes.
    /// Scanning resumes right after the abandoned open marker.
    fn abandon_unterminated(&mut self, i: usize) -> Result<bool, ProcessError> {
        let Some(next_open) = self.buf.find_ahead(COMMENT_OPEN, i) else {
            return Ok(false);
        };
        if self
            .buf
            .find_ahead(COMMENT_CLOSE, i)
            .is_some_and(|close| close < next_open)
        {
            return Ok(false);
        }
        let Some(region) = self.region.take() else {
            return Ok(false);
        };
        trace!(line = region.line, "comment abandoned");
        self.ctx.report_at(
            Condition::UnterminatedComment,
            format!(
                "comment opened on line {} is not closed before the next comment begins; skipping it",
                region.line
            ),
            region.span,
        )?;
        Ok(true)
    }

    /// Run the directive in `[i, boundary)`, if there is one, and splice its
    /// output over it. Returns the length change.
    fn expand_directive(&mut self, i: usize, boundary: usize) -> Result<Option<isize>, ProcessError> {
        let Some(call) = parse_directive(self.buf.text(i..boundary)) else {
            return Ok(None);
        };
        let name = call.name.to_string();
        let args = call.args;
        let Some(region) = self.region.as_mut() else {
            return Ok(None);
        };
        region.fired = true;
        let begin = region.begin;

        self.expansions += 1;
        if self.expansions > MAX_EXPANSIONS {
            return Err(ProcessError::ExpansionLimit(MAX_EXPANSIONS));
        }
        trace!(command = %name, args = %args, "directive");

        let registry = self.registry;
        let replacement = match registry.get(&name) {
            Some(directive) => match directive.execute(&args, self.ctx)? {
                Output::Text(text) => text,
                Output::SidebarAnchor => {
                    self.anchor = Some(self.buf.absolute(begin));
                    String::new()
                }
            },
            None => {
                let known = registry.names().join(", ");
                self.ctx.report(
                    Condition::UnknownCommand,
                    format!("invalid command: {name} (known commands: {known})"),
                )?;
                String::new()
            }
        };
        Ok(Some(self.splice(i..boundary, &replacement)))
    }

    /// Close the open comment at `close`. A comment that ran a directive
    /// loses its delimiters, plus the line break after the close marker if
    /// that leaves its line empty;
    /// scanning then restarts where the comment began so the directive
    /// output is processed. Returns the new cursor.
    fn close_region(&mut self, i: usize, close: usize) -> usize {
        let Some(region) = self.region.take() else {
            return i;
        };
        if !region.fired {
            trace!(line = region.line, "comment closed verbatim");
            return i;
        }
        let after_close = close + COMMENT_CLOSE.len();
        let inner = self.buf.text(region.begin + COMMENT_OPEN.len()..close);
        let close_starts_line = if inner.is_empty() {
            matches!(self.buf.char_before(region.begin), None | Some('\n'))
        } else {
            inner.ends_with('\n')
        };
        let own_line = close_starts_line && self.buf.char_at(after_close) == Some('\n');
        let strip_end = if own_line { after_close + 1 } else { after_close };
        self.splice(close..strip_end, "");
        self.splice(region.begin..region.begin + COMMENT_OPEN.len(), "");
        trace!(line = region.line, own_line, "comment stripped");
        region.begin
    }

    /// Cursor for the line after `line_end`. Outside a comment everything
    /// before it is final and gets committed.
    fn next_line(&mut self, line_end: usize) -> usize {
        let next = line_end + 1;
        if self.region.is_some() {
            return next;
        }
        self.headings.clear();
        next - self.buf.commit(next)
    }

    fn splice(&mut self, range: Range<usize>, text: &str) -> isize {
        let delta = self.buf.splice(range.clone(), text);
        self.headings.retain_mut(|pos| {
            if *pos >= range.end {
                *pos = shift(*pos, delta);
                true
            } else {
                *pos < range.start
            }
        });
        delta
    }
}
