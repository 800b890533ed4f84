//! # Snapshot Testing Support
//!
//! Utilities for testing the parser via snapshot assertions and invariant checks.
//!
//! ## Modules
//!
//! - **`normalize`**: Converts a parsed `File` into a `Snap` whose `Display`
//!   output is a stable, indented rendering for `insta` snapshots
//! - **`invariants`**: Runtime checks for parser correctness (lossless line
//!   coverage, children contained in parents, maximal invalid runs, every
//!   invalid line explained by a diagnostic)

pub mod invariants;
pub mod normalize;

pub use invariants::check as invariants;
pub use normalize::{Snap, normalize};
