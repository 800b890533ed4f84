use thiserror::Error;

use crate::parsing::source::Source;

/// A problem found in a PSL file.
///
/// Parsing never stops on these: each one is recorded in
/// [`File::errors`](crate::parsing::File::errors) and the offending lines
/// are kept in the block tree, usually as `InvalidSource`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // Encoding
    #[error("file uses invalid character encoding {encoding}")]
    InvalidEncoding { encoding: String },

    #[error("file starts with an unnecessary UTF-8 BOM (byte order mark)")]
    Utf8Bom,

    /// Input that cannot be turned into text at all. The built-in decoders
    /// are lossy and never give up, so this is for callers with their own.
    #[error("could not decode file as {encoding}: {reason}")]
    Decode { encoding: String, reason: String },

    #[error("found non UTF-8 bytes at {line}")]
    InvalidUtf8 { line: Source },

    #[error("{line} has a DOS line ending (\\r\\n instead of just \\n)")]
    DosNewline { line: Source },

    #[error("{line} has trailing whitespace")]
    TrailingWhitespace { line: Source },

    #[error("{line} has leading whitespace")]
    LeadingWhitespace { line: Source },

    // Structure
    #[error("unknown kind of section marker {:?} at {line}", .line.text())]
    UnknownSectionMarker { line: Source },

    #[error("section marker {:?} at {line} is missing trailing \"===\"", .line.text())]
    UnterminatedSectionMarker { line: Source },

    #[error("section {name:?} started at {start} is never closed")]
    UnclosedSection { name: String, start: Source },

    #[error(
        "new section {name:?} started at {line} while still in section {section:?} (started at {section_start})"
    )]
    NestedSection {
        line: Source,
        name: String,
        section: String,
        section_start: Source,
    },

    #[error("section {name:?} closed at {line} but was not started")]
    UnstartedSection { line: Source, name: String },

    #[error(
        "section {end_name:?} closed at {line} while in section {section:?} (started at {section_start})"
    )]
    MismatchedSection {
        line: Source,
        end_name: String,
        section: String,
        section_start: Source,
    },

    #[error("group {name:?} started at {start} is never closed")]
    UnclosedGroup { name: String, start: Source },

    #[error(
        "new group {name:?} started at {line} while still in group {group:?} (started at {group_start})"
    )]
    NestedGroup {
        line: Source,
        name: String,
        group: String,
        group_start: Source,
    },

    #[error("group {name:?} closed at {line} but was not started")]
    UnstartedGroup { line: Source, name: String },

    #[error("group {end_name:?} closed at {line} while in group {group:?} (started at {group_start})")]
    MismatchedGroup {
        line: Source,
        end_name: String,
        group: String,
        group_start: Source,
    },

    #[error("group {name:?} started at {line} outside of any section")]
    GroupOutsideSection { line: Source, name: String },

    #[error("unexpected {:?} at {line}", .line.text())]
    UnparseableLine { line: Source },

    // Suffix semantics
    #[error(
        "suffix {:?} at {line} is both a wildcard exception and a wildcard, which is not allowed",
        .line.text()
    )]
    ExceptionAndWildcardSuffix { line: Source },

    #[error(
        "exception {:?} at {line} must directly follow the suffix it's modifying",
        .line.text()
    )]
    ExceptionNotDirectlyFollowingBase { line: Source },

    #[error(
        "exception {:?} at {line} is not a valid exception to suffix {:?} at {base}",
        .line.text(),
        .base.text()
    )]
    InvalidException { line: Source, base: Source },

    #[error("duplicate exception {:?} at {line}", .line.text())]
    DuplicateException { line: Source },

    #[error("could not find entity name for {short_name} at {block}")]
    MissingEntityName { block: Source, short_name: String },

    #[error("could not find a contact email for {short_name} at {block}")]
    MissingEntityEmail { block: Source, short_name: String },

    // Ordering
    #[error("{}", describe_moves(.edit_script))]
    SuffixBlocksInWrongPlace { edit_script: Vec<MoveSuffixBlock> },
}

impl Error {
    /// The input lines the diagnostic points at, if it has a location.
    pub fn location(&self) -> Option<&Source> {
        match self {
            Error::InvalidEncoding { .. }
            | Error::Utf8Bom
            | Error::Decode { .. }
            | Error::SuffixBlocksInWrongPlace { .. } => None,
            Error::InvalidUtf8 { line }
            | Error::DosNewline { line }
            | Error::TrailingWhitespace { line }
            | Error::LeadingWhitespace { line }
            | Error::UnknownSectionMarker { line }
            | Error::UnterminatedSectionMarker { line }
            | Error::NestedSection { line, .. }
            | Error::UnstartedSection { line, .. }
            | Error::MismatchedSection { line, .. }
            | Error::NestedGroup { line, .. }
            | Error::UnstartedGroup { line, .. }
            | Error::MismatchedGroup { line, .. }
            | Error::GroupOutsideSection { line, .. }
            | Error::UnparseableLine { line }
            | Error::ExceptionAndWildcardSuffix { line }
            | Error::ExceptionNotDirectlyFollowingBase { line }
            | Error::InvalidException { line, .. }
            | Error::DuplicateException { line } => Some(line),
            Error::UnclosedSection { start, .. } | Error::UnclosedGroup { start, .. } => {
                Some(start)
            }
            Error::MissingEntityName { block, .. } | Error::MissingEntityEmail { block, .. } => {
                Some(block)
            }
        }
    }
}

/// Movement of one suffix block to a different place in the private
/// domains section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSuffixBlock {
    /// Name of the block to move.
    pub name: String,
    /// Block immediately before the correct position, or `None` if the block
    /// belongs at the start of the section.
    pub insert_after: Option<String>,
}

/// Each step of an edit script assumes the previous steps were applied.
fn describe_moves(edit_script: &[MoveSuffixBlock]) -> String {
    if let [single] = edit_script {
        return match &single.insert_after {
            None => format!(
                "suffix block {:?} is in the wrong place, should be at the start of the private section",
                single.name
            ),
            Some(after) => format!(
                "suffix block {:?} is in the wrong place, it should go immediately after block {after:?}",
                single.name
            ),
        };
    }

    let moves: String = edit_script
        .iter()
        .map(|edit| match &edit.insert_after {
            None => format!(
                "\tmove block: {}\n\t        to: start of private section\n",
                edit.name
            ),
            Some(after) => format!("\tmove block: {}\n\t     after: {after}\n", edit.name),
        })
        .collect();
    format!(
        "{} suffix blocks are in the wrong place, make these changes to fix:\n{moves}",
        edit_script.len()
    )
}
