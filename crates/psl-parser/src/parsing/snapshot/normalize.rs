use std::fmt;

use crate::parsing::{File, blocks::Block};

/// A parsed file reduced to what snapshot tests compare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snap {
    pub blocks: Vec<BlockSnap>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSnap {
    pub kind: &'static str,
    /// Kind-specific summary, e.g. a section name or suffix labels.
    pub detail: Option<String>,
    /// 1-based location, as in diagnostics.
    pub location: String,
    pub children: Vec<BlockSnap>,
}

pub fn normalize(file: &File) -> Snap {
    Snap {
        blocks: file.blocks.iter().map(block_snap).collect(),
        errors: file.errors.iter().map(ToString::to_string).collect(),
        warnings: file.warnings.iter().map(ToString::to_string).collect(),
    }
}

fn block_snap(block: &Block) -> BlockSnap {
    let detail = match block {
        Block::Section(s) => Some(format!("{:?}", s.name)),
        Block::Group(g) => Some(format!("{:?}", g.name)),
        Block::Suffix(s) => {
            let mut out = if s.wildcard {
                format!("*.{}", s.labels)
            } else {
                s.labels.to_string()
            };
            for exception in &s.exceptions {
                out.push_str(&format!(" !{exception}"));
            }
            Some(out)
        }
        Block::BlankLines(_) | Block::InvalidSource(_) | Block::Comment(_) | Block::Suffixes(_) => {
            None
        }
    };
    BlockSnap {
        kind: block.kind_name(),
        detail,
        location: block.source().location(),
        children: block.children().iter().map(block_snap).collect(),
    }
}

impl BlockSnap {
    fn render(&self, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:indent$}{}", "", self.kind, indent = depth * 2)?;
        if let Some(detail) = &self.detail {
            write!(f, " {detail}")?;
        }
        writeln!(f, " ({})", self.location)?;
        for child in &self.children {
            child.render(depth + 1, f)?;
        }
        Ok(())
    }
}

/// One line per block, children indented under their parent, followed by
/// `error:` and `warning:` lines.
impl fmt::Display for Snap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            block.render(0, f)?;
        }
        for err in &self.errors {
            writeln!(f, "error: {err}")?;
        }
        for warning in &self.warnings {
            writeln!(f, "warning: {warning}")?;
        }
        Ok(())
    }
}
