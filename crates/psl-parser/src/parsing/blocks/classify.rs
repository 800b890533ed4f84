use crate::parsing::options::GroupMarkers;

use super::markers::SECTION_MARKER_PREFIX;

pub const COMMENT_PREFIX: &str = "// ";
/// A `// ` comment line after trailing whitespace was trimmed.
pub const BARE_COMMENT: &str = "//";
pub const EXCEPTION_PREFIX: char = '!';

/// Classification of a single line, from local facts only.
///
/// This is phase 1 of block parsing: each line is classified without
/// looking at its neighbours. The parser decides what a class means in the
/// current context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'g> {
    Blank,
    /// Starts with `// ===`, well-formed or not.
    SectionMarker,
    GroupStart(&'g GroupMarkers),
    GroupEnd(&'g GroupMarkers),
    Comment,
    /// Starts with `!`.
    Exception,
    Suffix,
    Invalid,
}

impl LineClass<'_> {
    /// Whether the line may appear inside a suffix block.
    ///
    /// Blank lines and structural markers end a suffix block.
    pub fn is_suffix_block_content(self) -> bool {
        matches!(
            self,
            LineClass::Comment | LineClass::Exception | LineClass::Suffix | LineClass::Invalid
        )
    }
}

/// Classifies individual lines against the configured group markers.
#[derive(Debug, Clone, Copy)]
pub struct PslLineClassifier<'g> {
    groups: &'g [GroupMarkers],
}

impl<'g> PslLineClassifier<'g> {
    pub fn new(groups: &'g [GroupMarkers]) -> Self {
        Self { groups }
    }

    /// Classifies a normalized line.
    ///
    /// Precedence: blank, section marker, group delimiters, comment,
    /// exception, suffix, and finally invalid.
    pub fn classify(&self, line: &str) -> LineClass<'g> {
        if line.is_empty() {
            return LineClass::Blank;
        }
        if line.starts_with(SECTION_MARKER_PREFIX) {
            return LineClass::SectionMarker;
        }
        if let Some(group) = self.groups.iter().find(|g| g.start == line) {
            return LineClass::GroupStart(group);
        }
        if let Some(group) = self.groups.iter().find(|g| g.end == line) {
            return LineClass::GroupEnd(group);
        }
        if line.starts_with(COMMENT_PREFIX) || line == BARE_COMMENT {
            return LineClass::Comment;
        }
        if !is_suffix_text(line) {
            return LineClass::Invalid;
        }
        if line.starts_with(EXCEPTION_PREFIX) {
            LineClass::Exception
        } else {
            LineClass::Suffix
        }
    }
}

/// Suffix and exception lines are a single whitespace-free token that is
/// not a comment.
fn is_suffix_text(line: &str) -> bool {
    !line.starts_with('/') && !line.chars().any(char::is_whitespace)
}
