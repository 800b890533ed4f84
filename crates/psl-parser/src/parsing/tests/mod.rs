//! Parser behaviour tests.
//!
//! Every parse goes through `invariants::check` before assertions run, so
//! each case also exercises lossless coverage and invalid-run merging.


use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::parsing::{
    File,
    blocks::{Block, DnsLabels},
    encoding,
    errors::Error,
    options::{GroupMarkers, ParseOptions},
    parse_with_options, snapshot,
};

const AMAZON_START: &str = "// Amazon : https://www.amazon.com/";
const AMAZON_END: &str = "// concludes Amazon";

pub(super) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(super) fn parse_checked_with(input: &[u8], options: &ParseOptions) -> File {
    init_logging();
    let file = parse_with_options(input, options);
    let (lines, _) = encoding::normalize(input);
    snapshot::invariants(&lines, &file);
    file
}

fn parse_checked(input: &str) -> File {
    parse_checked_with(input.as_bytes(), &ParseOptions::default())
}

fn render(input: &str) -> String {
    snapshot::normalize(&parse_checked(input)).to_string()
}

fn in_section(body: &str) -> String {
    format!("// ===BEGIN ICANN DOMAINS===\n{body}\n// ===END ICANN DOMAINS===")
}

fn messages(file: &File) -> Vec<String> {
    file.errors.iter().map(ToString::to_string).collect()
}

fn labels(s: &str) -> DnsLabels {
    DnsLabels::parse(s)
}

// Whole-file snapshots

#[test]
fn realistic_excerpt() {
    let input = "\
// This Source Code Form is subject to the terms of the Mozilla Public
// ===BEGIN ICANN DOMAINS===

// ac : https://en.wikipedia.org/wiki/.ac
ac
com.ac

// ck : https://en.wikipedia.org/wiki/.ck
*.ck
!www.ck

// ===END ICANN DOMAINS===

// ===BEGIN PRIVATE DOMAINS===

// Amazon : https://www.amazon.com/
// Amazon CloudFront
cloudfront.net
// concludes Amazon

// ===END PRIVATE DOMAINS===
";
    insta::assert_snapshot!(render(input), @r#"
    Comment (line 1)
    Section "ICANN DOMAINS" (lines 2-12)
      BlankLines (line 3)
      Suffixes (lines 4-6)
        Comment (line 4)
        Suffix ac (line 5)
        Suffix com.ac (line 6)
      BlankLines (line 7)
      Suffixes (lines 8-10)
        Comment (line 8)
        Suffix *.ck !www.ck (lines 9-10)
      BlankLines (line 11)
    BlankLines (line 13)
    Section "PRIVATE DOMAINS" (lines 14-21)
      BlankLines (line 15)
      Group "Amazon" (lines 16-19)
        Suffixes (lines 17-18)
          Comment (line 17)
          Suffix cloudfront.net (line 18)
      BlankLines (line 20)
    BlankLines (line 22)
    "#);
}

#[test]
fn broken_file_still_covers_every_line() {
    let input = "\
// ===BEGIN A
com
// ===END A===
// ===BEGIN B===
net
foo bar
// ===END C===
org";
    insta::assert_snapshot!(render(input), @r#"
    InvalidSource (lines 1-3)
    Section "B" (lines 4-8)
      Suffixes (lines 5-6)
        Suffix net (line 5)
        InvalidSource (line 6)
      InvalidSource (line 7)
      Suffixes (line 8)
        Suffix org (line 8)
    error: section marker "// ===BEGIN A" at line 1 is missing trailing "==="
    error: unexpected "com" at line 2
    error: section "A" closed at line 3 but was not started
    error: section "B" started at line 4 is never closed
    error: unexpected "foo bar" at line 6
    error: section "C" closed at line 7 while in section "B" (started at line 4)
    "#);
}

#[test]
fn empty_input() {
    let file = parse_checked("");
    assert_eq!(file, File {
        blocks: vec![],
        errors: vec![],
        warnings: vec![],
    });
    assert!(file.is_valid());
}

// Top level

#[test]
fn comments_and_blank_lines() {
    let file = parse_checked("// a\n// b\n\n//\n// c");
    let kinds: Vec<_> = file.blocks.iter().map(|b| b.kind_name()).collect();
    assert_eq!(kinds, ["Comment", "BlankLines", "Comment"]);
    assert_eq!(file.blocks[2].source().lines(), ["//", "// c"]);
    assert!(file.is_valid());
}

#[rstest]
#[case::suffix("com", r#"unexpected "com" at line 1"#)]
#[case::exception("!www.ck", r#"unexpected "!www.ck" at line 1"#)]
#[case::junk("not a suffix", r#"unexpected "not a suffix" at line 1"#)]
#[case::unknown_marker("// ===FOO A===", r#"unknown kind of section marker "// ===FOO A===" at line 1"#)]
#[case::unstarted("// ===END A===", r#"section "A" closed at line 1 but was not started"#)]
#[case::group_start(AMAZON_START, r#"group "Amazon" started at line 1 outside of any section"#)]
#[case::group_end(AMAZON_END, r#"group "Amazon" closed at line 1 but was not started"#)]
fn top_level_lines_outside_sections_are_invalid(#[case] line: &str, #[case] message: &str) {
    let file = parse_checked(line);
    assert!(matches!(file.blocks.as_slice(), [Block::InvalidSource(_)]));
    assert_eq!(messages(&file), [message]);
}

// Sections

#[test]
fn balanced_section() {
    let file = parse_checked("// ===BEGIN A===\ncom\n// ===END A===");
    let [Block::Section(section)] = file.blocks.as_slice() else {
        panic!("expected one section, got {:?}", file.blocks);
    };
    assert_eq!(section.name, "A");
    assert_eq!(section.source.location(), "lines 1-3");
    assert!(matches!(section.blocks.as_slice(), [Block::Suffixes(_)]));
    assert!(file.is_valid());
}

#[test]
fn empty_section() {
    let file = parse_checked("// ===BEGIN A===\n// ===END A===");
    let [Block::Section(section)] = file.blocks.as_slice() else {
        panic!("expected one section, got {:?}", file.blocks);
    };
    assert!(section.blocks.is_empty());
    assert!(file.is_valid());
}

#[test]
fn consecutive_sections() {
    let file = parse_checked("// ===BEGIN A===\n// ===END A===\n// ===BEGIN B===\n// ===END B===");
    let names: Vec<_> = file
        .blocks
        .iter()
        .filter_map(|b| match b {
            Block::Section(s) => Some(s.name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(names, ["A", "B"]);
    assert!(file.is_valid());
}

#[test]
fn unclosed_section_takes_rest_of_file() {
    let file = parse_checked("// ===BEGIN A===\ncom\n\nnet");
    let [Block::Section(section)] = file.blocks.as_slice() else {
        panic!("expected one section, got {:?}", file.blocks);
    };
    assert_eq!(section.source.location(), "lines 1-4");
    assert_eq!(
        messages(&file),
        [r#"section "A" started at line 1 is never closed"#]
    );
}

#[test]
fn mismatched_section_end_does_not_close_section() {
    let file = parse_checked("// ===BEGIN A===\ncom\n// ===END B===\nnet\n// ===END A===");
    let [Block::Section(section)] = file.blocks.as_slice() else {
        panic!("expected one section, got {:?}", file.blocks);
    };
    let kinds: Vec<_> = section.blocks.iter().map(|b| b.kind_name()).collect();
    assert_eq!(kinds, ["Suffixes", "InvalidSource", "Suffixes"]);
    assert_eq!(file.suffix_blocks().count(), 2);
    assert_eq!(
        file.errors,
        [Error::MismatchedSection {
            line: section.blocks[1].source().clone(),
            end_name: "B".to_string(),
            section: "A".to_string(),
            section_start: section.source.first(),
        }]
    );
}

#[test]
fn nested_section() {
    let file = parse_checked("// ===BEGIN A===\n// ===BEGIN B===\ncom\n// ===END B===\n// ===END A===");
    assert_eq!(
        messages(&file),
        [
            r#"new section "B" started at line 2 while still in section "A" (started at line 1)"#,
            r#"section "B" closed at line 4 while in section "A" (started at line 1)"#,
        ]
    );
}

#[test]
fn unterminated_end_marker_still_closes_section() {
    let file = parse_checked("// ===BEGIN A===\ncom\n// ===END A\nnet");
    assert!(matches!(
        file.blocks.as_slice(),
        [Block::Section(s), Block::InvalidSource(_)] if s.source.location() == "lines 1-3"
    ));
    assert_eq!(
        messages(&file),
        [
            r#"section marker "// ===END A" at line 3 is missing trailing "===""#,
            r#"unexpected "net" at line 4"#,
        ]
    );
}

#[test]
fn unknown_marker_inside_section() {
    let file = parse_checked(&in_section("// ===whatever\ncom"));
    assert_eq!(
        messages(&file),
        [r#"unknown kind of section marker "// ===whatever" at line 2"#]
    );
    assert_eq!(file.suffix_blocks().count(), 1);
}

// Groups

#[test]
fn group_inside_section() {
    let file = parse_checked(&in_section(&format!("{AMAZON_START}\ncom\n{AMAZON_END}")));
    let [Block::Section(section)] = file.blocks.as_slice() else {
        panic!("expected one section, got {:?}", file.blocks);
    };
    let [Block::Group(group)] = section.blocks.as_slice() else {
        panic!("expected one group, got {:?}", section.blocks);
    };
    assert_eq!(group.name, "Amazon");
    assert_eq!(group.source.location(), "lines 2-4");
    assert!(file.is_valid());
}

#[test]
fn unclosed_group_ends_with_section() {
    let file = parse_checked(&format!(
        "{}\n{AMAZON_END}",
        in_section(&format!("{AMAZON_START}\ncom"))
    ));
    assert_eq!(
        messages(&file),
        [
            r#"group "Amazon" started at line 2 is never closed"#,
            r#"group "Amazon" closed at line 5 but was not started"#,
        ]
    );
    assert_eq!(file.suffix_blocks().count(), 1);
}

#[test]
fn nested_group() {
    let file = parse_checked(&in_section(&format!(
        "{AMAZON_START}\n{AMAZON_START}\ncom\n{AMAZON_END}"
    )));
    assert_eq!(
        messages(&file),
        [r#"new group "Amazon" started at line 3 while still in group "Amazon" (started at line 2)"#]
    );
}

#[test]
fn mismatched_group() {
    let example = GroupMarkers {
        name: "Example".to_string(),
        start: "// Example : https://example.com/".to_string(),
        end: "// concludes Example".to_string(),
    };
    let options = ParseOptions {
        groups: vec![GroupMarkers::amazon(), example],
    };
    let input = in_section(&format!(
        "{AMAZON_START}\ncom\n// concludes Example\n{AMAZON_END}"
    ));
    let file = parse_checked_with(input.as_bytes(), &options);
    assert_eq!(
        messages(&file),
        [r#"group "Example" closed at line 4 while in group "Amazon" (started at line 2)"#]
    );
}

#[test]
fn unstarted_group() {
    let file = parse_checked(&in_section(&format!("com\n\n{AMAZON_END}")));
    assert_eq!(
        messages(&file),
        [r#"group "Amazon" closed at line 4 but was not started"#]
    );
}

#[test]
fn section_marker_inside_group() {
    let file = parse_checked(&in_section(&format!(
        "{AMAZON_START}\n// ===BEGIN PRIVATE DOMAINS===\n{AMAZON_END}"
    )));
    assert_eq!(
        messages(&file),
        [
            r#"new section "PRIVATE DOMAINS" started at line 3 while still in section "ICANN DOMAINS" (started at line 1)"#
        ]
    );
}

#[test]
fn unconfigured_group_is_a_comment() {
    let options = ParseOptions { groups: vec![] };
    let input = in_section(&format!("{AMAZON_START}\ncom\n{AMAZON_END}"));
    let file = parse_checked_with(input.as_bytes(), &options);
    assert!(file.is_valid());
    let block = file.suffix_blocks().next().expect("one suffix block");
    assert_eq!(block.blocks.len(), 3);
    assert_eq!(block.suffixes().count(), 1);
}

// Suffix blocks

#[test]
fn suffix_blocks_split_on_blank_lines() {
    let file = parse_checked(&in_section("// a\na\n\n\n// b\nb\nc"));
    let counts: Vec<_> = file
        .suffix_blocks()
        .map(|block| block.suffixes().count())
        .collect();
    assert_eq!(counts, [1, 2]);
    assert_eq!(
        file.suffix_blocks().nth(1).map(|b| b.short_name()),
        Some("2 unowned suffixes".to_string())
    );
}

#[test]
fn wildcard_suffix() {
    let file = parse_checked(&in_section("*.kawasaki.jp"));
    let suffix = file
        .suffix_blocks()
        .flat_map(|b| b.suffixes())
        .next()
        .expect("one suffix");
    assert!(suffix.wildcard);
    assert_eq!(suffix.labels, labels("kawasaki.jp"));
}

#[test]
fn adjacent_invalid_lines_merge() {
    let file = parse_checked(&in_section("com\nfoo bar\nbaz qux\nnet"));
    let block = file.suffix_blocks().next().expect("one suffix block");
    let kinds: Vec<_> = block.blocks.iter().map(|b| b.kind_name()).collect();
    assert_eq!(kinds, ["Suffix", "InvalidSource", "Suffix"]);
    assert_eq!(block.blocks[1].source().location(), "lines 3-4");
    assert_eq!(file.errors.len(), 2);
}

// Exceptions

#[test]
fn exception_accepted() {
    let file = parse_checked(&in_section("example.uk\n!foo.example.uk"));
    assert!(file.is_valid(), "{:?}", file.errors);
    let suffixes: Vec<_> = file.suffix_blocks().flat_map(|b| b.suffixes()).collect();
    let [suffix] = suffixes.as_slice() else {
        panic!("expected one suffix, got {suffixes:?}");
    };
    assert_eq!(suffix.labels, labels("example.uk"));
    assert!(!suffix.wildcard);
    assert_eq!(suffix.exceptions, [labels("foo.example.uk")]);
    assert_eq!(suffix.source.lines(), ["example.uk", "!foo.example.uk"]);
}

#[test]
fn several_exceptions_to_wildcard() {
    let file = parse_checked(&in_section("*.kobe.jp\n!city.kobe.jp\n!www.kobe.jp"));
    assert!(file.is_valid(), "{:?}", file.errors);
    let suffix = file
        .suffix_blocks()
        .flat_map(|b| b.suffixes())
        .next()
        .expect("one suffix");
    assert!(suffix.wildcard);
    assert_eq!(
        suffix.exceptions,
        [labels("city.kobe.jp"), labels("www.kobe.jp")]
    );
}

#[rstest]
#[case::no_base(
    "!foo.example.uk",
    r#"exception "!foo.example.uk" at line 2 must directly follow the suffix it's modifying"#
)]
#[case::comment_between(
    "example.uk\n// note\n!foo.example.uk",
    r#"exception "!foo.example.uk" at line 4 must directly follow the suffix it's modifying"#
)]
#[case::grandchild(
    "example.uk\n!bar.baz.example.uk",
    r#"exception "!bar.baz.example.uk" at line 3 is not a valid exception to suffix "example.uk" at line 2"#
)]
#[case::unrelated(
    "example.uk\n!foo.example.com",
    r#"exception "!foo.example.com" at line 3 is not a valid exception to suffix "example.uk" at line 2"#
)]
#[case::wildcard_exception(
    "*.ck\n!*.www.ck",
    r#"suffix "!*.www.ck" at line 3 is both a wildcard exception and a wildcard, which is not allowed"#
)]
fn exception_rejected(#[case] body: &str, #[case] message: &str) {
    let file = parse_checked(&in_section(body));
    assert_eq!(messages(&file), [message]);
    let block = file.suffix_blocks().next().expect("one suffix block");
    assert!(matches!(block.blocks.last(), Some(Block::InvalidSource(_))));
    assert!(block.suffixes().all(|s| s.exceptions.is_empty()));
}

#[test]
fn duplicate_exception_reported_once() {
    let file = parse_checked(&in_section("example.uk\n!a.example.uk\n!a.example.uk"));
    assert_eq!(
        messages(&file),
        [r#"duplicate exception "!a.example.uk" at line 4"#]
    );
    let suffix = file
        .suffix_blocks()
        .flat_map(|b| b.suffixes())
        .next()
        .expect("one suffix");
    assert_eq!(suffix.exceptions, [labels("a.example.uk")]);
    assert_eq!(suffix.source.location(), "lines 2-3");
}

#[test]
fn exception_after_rejected_exception_has_no_base() {
    let file = parse_checked(&in_section("example.uk\n!bar.baz.example.uk\n!foo.example.uk"));
    assert_eq!(file.errors.len(), 2);
    assert!(matches!(
        file.errors[1],
        Error::ExceptionNotDirectlyFollowingBase { .. }
    ));
    let block = file.suffix_blocks().next().expect("one suffix block");
    assert_eq!(block.blocks[1].source().location(), "lines 3-4");
}

// Encoding

#[test]
fn encoding_problems_reported_before_structure() {
    let file = parse_checked("// ===BEGIN A===\r\n com\n// ===END B===");
    assert_eq!(
        messages(&file),
        [
            r"line 1 has a DOS line ending (\r\n instead of just \n)",
            "line 2 has leading whitespace",
            r#"section "A" started at line 1 is never closed"#,
            r#"section "B" closed at line 3 while in section "A" (started at line 1)"#,
        ]
    );
}

#[test]
fn utf16_input_parses_like_utf8() {
    let text = in_section("com\nnet");
    let utf16: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
    let file = parse_checked_with(&utf16, &ParseOptions::default());
    assert_eq!(
        file.errors,
        [Error::InvalidEncoding {
            encoding: "UTF-16LE (guessed)".to_string()
        }]
    );
    assert_eq!(file.blocks, parse_checked(&text).blocks);
}

#[test]
fn utf16_dangling_byte_keeps_the_file() {
    let text = format!("{}\n", in_section("com\nnet\norg"));
    let mut bytes: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
    bytes.push(b'\n');
    let file = parse_checked_with(&bytes, &ParseOptions::default());

    let names: Vec<String> = file
        .suffix_blocks()
        .flat_map(|b| b.suffixes())
        .map(|s| s.labels.to_string())
        .collect();
    assert_eq!(names, ["com", "net", "org"]);
    assert!(matches!(file.blocks.as_slice(), [Block::Section(_), Block::InvalidSource(_)]));
    assert_eq!(
        messages(&file),
        [
            "file uses invalid character encoding UTF-16LE (guessed)",
            "found non UTF-8 bytes at line 6",
            "unexpected \"\u{FFFD}\" at line 6",
        ]
    );
}

// Collaborator hooks

#[test]
fn downgrade_errors_moves_matching_errors_in_order() {
    let mut file = parse_checked(&in_section(" com \nfoo bar"));
    assert_eq!(file.errors.len(), 3);
    file.downgrade_errors(|err| {
        matches!(
            err,
            Error::LeadingWhitespace { .. } | Error::TrailingWhitespace { .. }
        )
    });
    assert_eq!(messages(&file), [r#"unexpected "foo bar" at line 3"#]);
    let warnings: Vec<_> = file.warnings.iter().map(ToString::to_string).collect();
    assert_eq!(
        warnings,
        [
            "line 2 has trailing whitespace",
            "line 2 has leading whitespace"
        ]
    );
    assert!(!file.is_valid());

    file.downgrade_errors(|_| true);
    assert!(file.is_valid());
    assert_eq!(file.warnings.len(), 3);
}

#[test]
fn suffix_blocks_walks_sections_and_groups_in_order() {
    let input = format!(
        "// ===BEGIN ICANN DOMAINS===\na\n// ===END ICANN DOMAINS===\n\
         // ===BEGIN PRIVATE DOMAINS===\nb\n\n{AMAZON_START}\nc\n\nd\n{AMAZON_END}\n\ne\n\
         // ===END PRIVATE DOMAINS==="
    );
    let file = parse_checked(&input);
    assert!(file.is_valid(), "{:?}", file.errors);
    let names: Vec<String> = file
        .suffix_blocks()
        .map(|b| b.suffixes().map(|s| s.labels.to_string()).collect())
        .collect();
    assert_eq!(names, ["a", "b", "c", "d", "e"]);
}
