use std::ops::Range;

/// The document being rewritten, held as three parts:
///
/// - `committed`: output that no later splice can touch,
/// - `window`: the mutable tail the scanner works in (positions are relative
///   to its start),
/// - `rest`: source lines not loaded yet.
///
/// Lines move from `rest` into `window` on demand and from `window` into
/// `committed` once the scanner is past them, so each splice only rewrites
/// the short window instead of the whole document.
pub(crate) struct Buffer<'s> {
    committed: String,
    window: String,
    rest: &'s str,
    /// Source bytes loaded so far.
    consumed: usize,
    /// Source lines loaded so far.
    lines: usize,
    /// Source span (without line break) of the most recently loaded line.
    line_span: Option<Range<usize>>,
    /// Next source offset of each marker in `rest`, as last searched. Stays
    /// valid until that line is loaded; `None` stays valid for good.
    unread_markers: Vec<(&'static str, Option<usize>)>,
}

/// Apply a signed length change to a window position.
pub(crate) fn shift(pos: usize, delta: isize) -> usize {
    pos.saturating_add_signed(delta)
}

impl<'s> Buffer<'s> {
    pub fn new(source: &'s str) -> Self {
        Buffer {
            committed: String::with_capacity(source.len()),
            window: String::new(),
            rest: source,
            consumed: 0,
            lines: 0,
            line_span: None,
            unread_markers: Vec::new(),
        }
    }

    /// True while `pos` is before the end of the document.
    pub fn has_more(&self, pos: usize) -> bool {
        pos < self.window.len() || !self.rest.is_empty()
    }

    /// Position of the line break ending the line that contains `from`, or
    /// the end of the document.
    pub fn line_end(&mut self, from: usize) -> usize {
        loop {
            if let Some(offset) = self.window.get(from..).and_then(|tail| tail.find('\n')) {
                return from + offset;
            }
            if !self.load_line() {
                return self.window.len();
            }
        }
    }

    fn load_line(&mut self) -> bool {
        if self.rest.is_empty() {
            return false;
        }
        let len = self.rest.find('\n').map_or(self.rest.len(), |pos| pos + 1);
        let (line, rest) = self.rest.split_at(len);
        let content = line.trim_end_matches(['\n', '\r']).len();
        self.window.push_str(line);
        self.line_span = Some(self.consumed..self.consumed + content);
        self.consumed += len;
        self.lines += 1;
        self.rest = rest;
        true
    }

    pub fn text(&self, range: Range<usize>) -> &str {
        &self.window[range]
    }

    /// First `marker` fully inside `range`.
    pub fn find(&self, marker: &str, range: Range<usize>) -> Option<usize> {
        let start = range.start;
        self.window[range].find(marker).map(|pos| start + pos)
    }

    /// First `marker` at or after `from` anywhere in the remaining document,
    /// loaded or not. Positions past the window are virtual; they are only
    /// good for comparisons.
    pub fn find_ahead(&mut self, marker: &'static str, from: usize) -> Option<usize> {
        if let Some(pos) = self.window.get(from..).and_then(|tail| tail.find(marker)) {
            return Some(from + pos);
        }
        self.next_unread(marker)
            .map(|offset| self.window.len() + offset - self.consumed)
    }

    /// Source offset of the next `marker` not loaded yet. Searches `rest`
    /// only once the previous hit has been loaded.
    fn next_unread(&mut self, marker: &'static str) -> Option<usize> {
        let cached = self
            .unread_markers
            .iter()
            .find(|(known, _)| *known == marker)
            .map(|(_, offset)| *offset);
        match cached {
            Some(None) => return None,
            Some(Some(offset)) if offset >= self.consumed => return Some(offset),
            _ => {}
        }
        let found = self.rest.find(marker).map(|pos| self.consumed + pos);
        self.unread_markers.retain(|(known, _)| *known != marker);
        self.unread_markers.push((marker, found));
        found
    }

    /// Replace `range` with `text`, returning the length change.
    pub fn splice(&mut self, range: Range<usize>, text: &str) -> isize {
        let removed = range.len();
        self.window.replace_range(range, text);
        text.len() as isize - removed as isize
    }

    pub fn char_before(&self, pos: usize) -> Option<char> {
        match self.window.get(..pos) {
            Some(head) if !head.is_empty() => head.chars().next_back(),
            _ => self.committed.chars().next_back(),
        }
    }

    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.window.get(pos..).and_then(|tail| tail.chars().next())
    }

    /// Move everything before `upto` into the committed output. Window
    /// positions shift down by the returned amount.
    pub fn commit(&mut self, upto: usize) -> usize {
        let upto = upto.min(self.window.len());
        self.committed.push_str(&self.window[..upto]);
        self.window.drain(..upto);
        upto
    }

    /// Offset of window position `pos` in the final output.
    pub fn absolute(&self, pos: usize) -> usize {
        self.committed.len() + pos
    }

    pub fn source_span(&self) -> Option<Range<usize>> {
        self.line_span.clone()
    }

    /// 1-based number of the most recently loaded source line.
    pub fn source_line(&self) -> usize {
        self.lines.max(1)
    }

    pub fn finish(mut self) -> String {
        self.committed.push_str(&self.window);
        self.committed.push_str(self.rest);
        self.committed
    }
}
