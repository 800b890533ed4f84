use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// A contiguous run of normalized input lines.
///
/// A `Source` is a view into the shared line buffer produced by the
/// normalizer, plus the absolute index of its first line. It selects the
/// half-open range `[line_offset, line_offset + num_lines)` of the input
/// file, which is what diagnostics print and what lossless reconstruction
/// concatenates.
///
/// The `take_*` methods consume a prefix of the view in place and return
/// it as a new `Source`. The parser uses this to walk the input strictly
/// front to back.
#[derive(Clone)]
pub struct Source {
    buf: Arc<[String]>,
    /// Index into `buf` of the first line in view.
    start: usize,
    /// Index into `buf` one past the last line in view.
    end: usize,
    /// Absolute 0-based line number of `buf[start]` in the input.
    line_offset: usize,
}

impl Source {
    /// Creates a source covering all of `lines`, starting at line 0.
    pub fn new(lines: Vec<String>) -> Self {
        let buf: Arc<[String]> = lines.into();
        let end = buf.len();
        Self {
            buf,
            start: 0,
            end,
            line_offset: 0,
        }
    }

    /// Creates a one-line source standing at absolute line `line_offset`.
    pub(crate) fn single(line: String, line_offset: usize) -> Self {
        Self {
            buf: Arc::from(vec![line]),
            start: 0,
            end: 1,
            line_offset,
        }
    }

    /// The lines in view.
    pub fn lines(&self) -> &[String] {
        &self.buf[self.start..self.end]
    }

    pub fn num_lines(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Absolute 0-based index of the first line.
    pub fn line_offset(&self) -> usize {
        self.line_offset
    }

    /// Absolute 0-based index one past the last line.
    pub fn end_offset(&self) -> usize {
        self.line_offset + self.num_lines()
    }

    /// Returns the text of the source, lines joined with `\n`.
    pub fn text(&self) -> Cow<'_, str> {
        match self.lines() {
            [one] => Cow::Borrowed(one.as_str()),
            lines => Cow::Owned(lines.join("\n")),
        }
    }

    /// Returns the first line's text without consuming it.
    pub fn peek(&self) -> Option<&str> {
        self.lines().first().map(String::as_str)
    }

    /// Returns a one-line view of the first line.
    ///
    /// # Panics
    /// Panics if the source is empty. Callers check [`Source::is_empty`]
    /// first.
    pub fn first(&self) -> Source {
        assert!(!self.is_empty(), "first() called on an empty Source");
        self.slice(0, 1)
    }

    fn slice(&self, from: usize, to: usize) -> Source {
        assert!(
            from <= to && to <= self.num_lines(),
            "invalid slice {from}..{to} of a {}-line Source",
            self.num_lines()
        );
        Source {
            buf: Arc::clone(&self.buf),
            start: self.start + from,
            end: self.start + to,
            line_offset: self.line_offset + from,
        }
    }

    /// Removes the first `n` lines and returns them.
    ///
    /// # Panics
    /// Panics if fewer than `n` lines remain.
    pub fn take_n(&mut self, n: usize) -> Source {
        let taken = self.slice(0, n);
        self.start += n;
        self.line_offset += n;
        taken
    }

    /// Removes the first line and returns it.
    ///
    /// # Panics
    /// Panics if the source is empty.
    pub fn take_one(&mut self) -> Source {
        self.take_n(1)
    }

    /// Removes the (possibly empty) run of leading lines matching `pred`.
    pub fn take_while(&mut self, mut pred: impl FnMut(&str) -> bool) -> Source {
        let n = self
            .lines()
            .iter()
            .position(|line| !pred(line.as_str()))
            .unwrap_or(self.num_lines());
        self.take_n(n)
    }

    /// Removes the (possibly empty) run of leading lines not matching `pred`.
    pub fn take_while_not(&mut self, mut pred: impl FnMut(&str) -> bool) -> Source {
        self.take_while(|line| !pred(line))
    }

    /// Removes lines up to and including the first line matching `pred`.
    ///
    /// Returns the removed lines and whether a matching line was found. If
    /// nothing matches, the entire remaining source is removed.
    pub fn take_until(&mut self, mut pred: impl FnMut(&str) -> bool) -> (Source, bool) {
        match self.lines().iter().position(|line| pred(line.as_str())) {
            Some(idx) => (self.take_n(idx + 1), true),
            None => (self.take_n(self.num_lines()), false),
        }
    }

    /// Extends this source with the lines of `other`.
    ///
    /// The merged lines are copied into a fresh buffer, so growing one
    /// block's source never exposes lines that a sibling still owns.
    ///
    /// # Panics
    /// Panics if `other` does not start exactly where `self` ends.
    pub fn append(&mut self, other: &Source) {
        assert_eq!(
            self.end_offset(),
            other.line_offset,
            "invalid append of non-adjacent sources ({self} and {other})"
        );
        let merged: Vec<String> = self.lines().iter().chain(other.lines()).cloned().collect();
        let len = merged.len();
        self.buf = merged.into();
        self.start = 0;
        self.end = len;
    }

    /// Returns a human location string: `line N` or `lines N-M`, 1-indexed.
    pub fn location(&self) -> String {
        // 0-indexed half-open ranges are not how editors number lines.
        let start = self.line_offset + 1;
        let end = self.end_offset();
        if end < start {
            // Zero-line sources only exist transiently inside the parser.
            format!("<empty range before line {start}>")
        } else if start == end {
            format!("line {start}")
        } else {
            format!("lines {start}-{end}")
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location())
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("location", &self.location())
            .field("lines", &self.lines())
            .finish()
    }
}

impl PartialEq for Source {
    fn eq(&self, other: &Self) -> bool {
        self.line_offset == other.line_offset && self.lines() == other.lines()
    }
}

impl Eq for Source {}
