use std::fmt;

/// The label written in place of a child label by wildcard suffixes.
pub const WILDCARD_LABEL: &str = "*";

/// A domain name split into its labels, in written order.
///
/// The most significant label comes last, exactly as produced by splitting
/// on `.`: `foo.example.uk` is `["foo", "example", "uk"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DnsLabels(Vec<String>);

impl DnsLabels {
    /// Splits a domain name on `.`.
    ///
    /// No DNS validation happens here: empty labels, over-long labels and
    /// non-ASCII text are all accepted as written.
    pub fn parse(s: &str) -> Self {
        Self(s.split('.').map(str::to_string).collect())
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reports whether the leftmost label is the `*` wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.0.first().is_some_and(|l| l == WILDCARD_LABEL)
    }

    /// Removes a leading wildcard label, reporting whether there was one.
    pub fn strip_wildcard(mut self) -> (Self, bool) {
        if self.is_wildcard() {
            self.0.remove(0);
            (self, true)
        } else {
            (self, false)
        }
    }

    /// Reports whether `self` is exactly one label below `parent`.
    pub fn is_direct_child_of(&self, parent: &DnsLabels) -> bool {
        self.0.len() == parent.0.len() + 1 && self.0[1..] == parent.0[..]
    }
}

impl fmt::Display for DnsLabels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}
