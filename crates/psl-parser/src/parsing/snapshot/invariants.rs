use crate::parsing::{File, blocks::Block, source::Source};

/// Asserts the structural guarantees of a parse result over `lines`, the
/// normalized input.
pub fn check(lines: &[String], file: &File) {
    assert_contiguous(&file.blocks, 0, lines.len(), "file");

    let covered: Vec<&String> = file
        .blocks
        .iter()
        .flat_map(|b| b.source().lines())
        .collect();
    let expected: Vec<&String> = lines.iter().collect();
    assert_eq!(covered, expected, "top-level blocks do not reproduce the input");

    for block in &file.blocks {
        check_block(block);
    }

    for (idx, line) in invalid_lines(&file.blocks) {
        assert!(
            file.errors
                .iter()
                .chain(&file.warnings)
                .filter_map(|e| e.location())
                .any(|loc| (loc.line_offset()..loc.end_offset()).contains(&idx)),
            "invalid line {} ({line:?}) has no diagnostic",
            idx + 1
        );
    }
}

fn check_block(block: &Block) {
    let src = block.source();
    assert!(!src.is_empty(), "empty {} block", block.kind_name());

    let children = block.children();
    if !children.is_empty() {
        assert_contiguous(
            children,
            src.line_offset(),
            src.end_offset(),
            block.kind_name(),
        );
        for child in children {
            check_block(child);
        }
    }
}

/// Siblings must follow each other without gaps and stay inside their
/// parent. Invalid siblings must have been merged.
fn assert_contiguous(blocks: &[Block], start: usize, end: usize, parent: &str) {
    let mut cursor: Option<usize> = None;
    for pair in blocks.windows(2) {
        assert!(
            !matches!(pair, [Block::InvalidSource(_), Block::InvalidSource(_)]),
            "adjacent InvalidSource blocks in {parent} at {}",
            pair[1].source()
        );
    }
    for block in blocks {
        let src = block.source();
        assert!(
            src.line_offset() >= start && src.end_offset() <= end,
            "{} at {src} escapes its {parent} (lines {}..{end})",
            block.kind_name(),
            start + 1
        );
        if let Some(prev_end) = cursor {
            assert_eq!(
                src.line_offset(),
                prev_end,
                "gap or overlap before {} at {src} in {parent}",
                block.kind_name()
            );
        }
        cursor = Some(src.end_offset());
    }
}

fn invalid_lines(blocks: &[Block]) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    for block in blocks {
        match block {
            Block::InvalidSource(src) => out.extend(numbered(src)),
            other => out.extend(invalid_lines(other.children())),
        }
    }
    out
}

fn numbered(src: &Source) -> impl Iterator<Item = (usize, String)> + '_ {
    src.lines()
        .iter()
        .enumerate()
        .map(|(i, line)| (src.line_offset() + i, line.clone()))
}
