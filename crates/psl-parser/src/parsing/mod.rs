pub mod blocks;
pub mod encoding;
pub mod errors;
pub mod options;
pub mod snapshot;
pub mod source;

#[cfg(test)]
mod tests;

use blocks::{Block, BlockParser, Suffixes};
use errors::Error;
use options::ParseOptions;
use source::Source;

/// A parsed PSL file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// Top-level blocks. Together they cover every line of the input.
    pub blocks: Vec<Block>,
    /// Problems found while parsing, in the order they were found.
    pub errors: Vec<Error>,
    /// Problems that were reported but are not considered fatal.
    pub warnings: Vec<Error>,
}

impl File {
    /// Moves every error matching `pred` into `warnings`, keeping both lists
    /// in their original order.
    pub fn downgrade_errors(&mut self, mut pred: impl FnMut(&Error) -> bool) {
        let (warnings, errors) = std::mem::take(&mut self.errors)
            .into_iter()
            .partition::<Vec<_>, _>(|err| pred(err));
        self.errors = errors;
        self.warnings.extend(warnings);
    }

    /// True when parsing found no errors. Warnings don't count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// All suffix blocks, depth-first in document order.
    pub fn suffix_blocks(&self) -> impl Iterator<Item = &Suffixes> {
        let mut stack: Vec<&Block> = self.blocks.iter().rev().collect();
        std::iter::from_fn(move || {
            while let Some(block) = stack.pop() {
                match block {
                    Block::Suffixes(suffixes) => return Some(suffixes),
                    other => stack.extend(other.children().iter().rev()),
                }
            }
            None
        })
    }
}

/// Parses a PSL file with the default options.
pub fn parse(bytes: &[u8]) -> File {
    parse_with_options(bytes, &ParseOptions::default())
}

/// Parses a PSL file.
///
/// Never fails: undecodable bytes, malformed lines and broken structure are
/// reported in [`File::errors`] and the affected lines are kept as
/// `InvalidSource` blocks.
pub fn parse_with_options(bytes: &[u8], options: &ParseOptions) -> File {
    let (lines, mut errors) = encoding::normalize(bytes);
    log::debug!("normalized {} bytes into {} lines", bytes.len(), lines.len());

    let (blocks, parse_errors) = BlockParser::new(Source::new(lines), options).parse();
    errors.extend(parse_errors);
    log::debug!(
        "parsed {} top-level blocks with {} errors",
        blocks.len(),
        errors.len()
    );

    File {
        blocks,
        errors,
        warnings: Vec::new(),
    }
}
