//! # Block Parsing
//!
//! Two-phase block parsing of normalized PSL lines.
//!
//! ## Parsing Phases
//!
//! 1. **Line Classification** (`classify`): Each line is classified into a `LineClass`
//!    from local facts only (blank, section marker, group delimiter, comment, suffix)
//!
//! 2. **Block Construction** (`builder`): A `BlockParser` walks the classified lines
//!    with one recursive-descent rule per construct and an explicit frame stack
//!
//! ## Modules
//!
//! - **`types`**: The block tree (`Block`, `Section`, `Group`, `Suffixes`, `Suffix`)
//! - **`labels`**: `DnsLabels` for suffix and exception names
//! - **`markers`**: Section marker parsing (`// ===BEGIN NAME===`)
//! - **`classify`**: `PslLineClassifier` produces `LineClass` for each line
//! - **`builder`**: `BlockParser` for block construction and validation
//!
//! ## Key Invariants
//!
//! - Every input line ends up in exactly one leaf block
//! - Sections never nest, groups only appear inside sections
//! - Lines that fit nowhere become `InvalidSource` with a matching diagnostic

pub mod builder;
pub mod classify;
pub mod labels;
pub mod markers;
pub mod types;

pub use builder::BlockParser;
pub use classify::{LineClass, PslLineClassifier};
pub use labels::DnsLabels;
pub use markers::{SectionMarker, parse_section_marker};
pub use types::{Block, Group, Section, Suffix, Suffixes};
