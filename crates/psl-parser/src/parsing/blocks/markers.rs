/// Prefix shared by every section marker, well-formed or not.
pub const SECTION_MARKER_PREFIX: &str = "// ===";
pub const SECTION_MARKER_SUFFIX: &str = "===";
pub const BEGIN_VERB: &str = "BEGIN";
pub const END_VERB: &str = "END";

/// A section marker line broken into its parts.
///
/// Markers look like `// ===BEGIN ICANN DOMAINS===`. `terminated` is false
/// when the trailing `===` is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionMarker<'a> {
    Begin { name: &'a str, terminated: bool },
    End { name: &'a str, terminated: bool },
    /// No parseable name, or a verb other than BEGIN/END.
    Unknown,
}

impl<'a> SectionMarker<'a> {
    /// Reports whether this is an END marker for the section `name`,
    /// regardless of its terminator.
    pub fn ends(&self, section: &str) -> bool {
        matches!(self, SectionMarker::End { name, .. } if *name == section)
    }
}

/// Parses a `// ===<VERB> <NAME>===` line.
pub fn parse_section_marker(line: &str) -> SectionMarker<'_> {
    let Some(marker) = line.strip_prefix(SECTION_MARKER_PREFIX) else {
        return SectionMarker::Unknown;
    };
    let (marker, terminated) = match marker.strip_suffix(SECTION_MARKER_SUFFIX) {
        Some(marker) => (marker, true),
        None => (marker, false),
    };
    let Some((verb, name)) = marker.split_once(' ') else {
        return SectionMarker::Unknown;
    };
    if name.is_empty() {
        return SectionMarker::Unknown;
    }
    match verb {
        BEGIN_VERB => SectionMarker::Begin { name, terminated },
        END_VERB => SectionMarker::End { name, terminated },
        _ => SectionMarker::Unknown,
    }
}
