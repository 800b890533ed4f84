use crate::parsing::source::Source;

use super::labels::DnsLabels;

/// A parsed chunk of a PSL file.
///
/// The tree is lossless: every input line belongs to exactly one leaf, and
/// every container's source spans all of its children plus its own delimiter
/// lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// One or more empty lines.
    BlankLines(Source),
    /// Lines that failed to parse. Adjacent invalid lines share one block.
    InvalidSource(Source),
    /// A run of `// ` comment lines.
    Comment(Source),
    /// A `===BEGIN <NAME>===` .. `===END <NAME>===` region.
    Section(Section),
    /// A named region of suffix blocks within a section.
    Group(Group),
    /// A run of suffixes and comments bounded by blank lines.
    Suffixes(Suffixes),
    /// One suffix and its exceptions.
    Suffix(Suffix),
}

impl Block {
    /// The input lines this block covers.
    pub fn source(&self) -> &Source {
        match self {
            Block::BlankLines(src) | Block::InvalidSource(src) | Block::Comment(src) => src,
            Block::Section(s) => &s.source,
            Block::Group(g) => &g.source,
            Block::Suffixes(s) => &s.source,
            Block::Suffix(s) => &s.source,
        }
    }

    /// Child blocks, in input order. Empty for leaf blocks.
    pub fn children(&self) -> &[Block] {
        match self {
            Block::BlankLines(_)
            | Block::InvalidSource(_)
            | Block::Comment(_)
            | Block::Suffix(_) => &[],
            Block::Section(s) => &s.blocks,
            Block::Group(g) => &g.blocks,
            Block::Suffixes(s) => &s.blocks,
        }
    }

    /// Short kind label used in logs and rendered trees.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::BlankLines(_) => "BlankLines",
            Block::InvalidSource(_) => "InvalidSource",
            Block::Comment(_) => "Comment",
            Block::Section(_) => "Section",
            Block::Group(_) => "Group",
            Block::Suffixes(_) => "Suffixes",
            Block::Suffix(_) => "Suffix",
        }
    }
}

/// A top-level named section, e.g. `ICANN DOMAINS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub source: Source,
    pub name: String,
    /// Groups, suffix blocks, blank lines and invalid lines.
    pub blocks: Vec<Block>,
}

/// A named group of suffix blocks, e.g. `Amazon`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub source: Source,
    pub name: String,
    /// Suffix blocks, blank lines and invalid lines.
    pub blocks: Vec<Block>,
}

/// A block of suffixes with optional owner metadata.
///
/// The parser leaves the metadata fields empty. Tools that understand the
/// block's header comment may fill them in afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suffixes {
    pub source: Source,
    /// Name of the entity responsible for the suffixes.
    pub entity: Option<String>,
    /// Links to information about the entity.
    pub urls: Vec<String>,
    /// Contact addresses for the entity.
    pub emails: Vec<String>,
    /// `Suffix`, `Comment` and `InvalidSource` blocks.
    pub blocks: Vec<Block>,
}

impl Suffixes {
    /// Returns the quoted entity name, or a count of suffixes when the block
    /// has no known owner.
    pub fn short_name(&self) -> String {
        match &self.entity {
            Some(entity) => format!("{entity:?}"),
            None => format!("{} unowned suffixes", self.suffixes().count()),
        }
    }

    /// The suffix entries of this block, skipping comments.
    pub fn suffixes(&self) -> impl Iterator<Item = &Suffix> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Suffix(s) => Some(s),
            _ => None,
        })
    }
}

/// A single public suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suffix {
    /// The suffix line followed by its exception lines.
    pub source: Source,
    /// Suffix labels, without the wildcard label.
    pub labels: DnsLabels,
    /// Whether the suffix was written as `*.<labels>`.
    pub wildcard: bool,
    /// Exceptions carved out of this suffix, in input order.
    pub exceptions: Vec<DnsLabels>,
}
