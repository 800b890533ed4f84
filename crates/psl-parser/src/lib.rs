//! Parser and validator for the Public Suffix List file format.
//!
//! ```
//! let file = psl_parser::parse(b"// ===BEGIN ICANN DOMAINS===\ncom\n// ===END ICANN DOMAINS===\n");
//! assert!(file.is_valid());
//! assert_eq!(file.suffix_blocks().count(), 1);
//! ```

pub mod parsing;

// Re-export key types for easier usage
pub use parsing::{
    File,
    blocks::{Block, DnsLabels, Group, Section, Suffix, Suffixes},
    errors::{Error, MoveSuffixBlock},
    options::{GroupMarkers, ParseOptions},
    parse, parse_with_options,
    source::Source,
};
