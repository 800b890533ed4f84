use serde::{Deserialize, Serialize};

/// Literal delimiter lines of one named group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMarkers {
    /// Group name, e.g. `Amazon`.
    pub name: String,
    /// Exact line that opens the group.
    pub start: String,
    /// Exact line that closes the group.
    pub end: String,
}

impl GroupMarkers {
    /// The bulk-managed Amazon group, the only group in today's PSL.
    pub fn amazon() -> Self {
        Self {
            name: "Amazon".to_string(),
            start: "// Amazon : https://www.amazon.com/".to_string(),
            end: "// concludes Amazon".to_string(),
        }
    }
}

/// Knobs for [`parse_with_options`](crate::parsing::parse_with_options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Groups recognized inside sections.
    pub groups: Vec<GroupMarkers>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            groups: vec![GroupMarkers::amazon()],
        }
    }
}
