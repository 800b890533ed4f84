use crate::parsing::{
    errors::Error,
    options::{GroupMarkers, ParseOptions},
    source::Source,
};

use super::{
    classify::{EXCEPTION_PREFIX, LineClass, PslLineClassifier},
    labels::DnsLabels,
    markers::{SectionMarker, parse_section_marker},
    types::{Block, Group, Section, Suffix, Suffixes},
};

/// Input and output of one grammar rule in progress.
///
/// Each nested construct gets its own frame, so a section's body cannot
/// consume lines past its end marker or append to its parent's blocks.
#[derive(Debug)]
struct Frame {
    /// Unparsed input of this construct, shrinking from the front.
    src: Source,
    /// Blocks produced so far.
    blocks: Vec<Block>,
}

impl Frame {
    fn new(src: Source) -> Self {
        Self {
            src,
            blocks: Vec::new(),
        }
    }
}

/// Name and opening line of a section or group being parsed, for
/// diagnostics about lines inside it.
#[derive(Debug, Clone)]
struct OpenConstruct {
    name: String,
    start: Source,
}

/// Recursive-descent parser turning normalized lines into a block tree.
///
/// Grammar, one function per rule:
///
/// ```text
///     top_level := (blank | comment | section | invalid)*
///       section := BEGIN (blank | group | suffix_block | invalid)* END
///         group := START (blank | suffix_block | invalid)* END
///  suffix_block := (comment | suffix | invalid)*
///        suffix := suffix_line exception_line*
/// ```
///
/// Every rule consumes a prefix of the current frame's input, pushes zero or
/// more blocks, and records diagnostics instead of failing. Lines that fit
/// nowhere become `InvalidSource` blocks, so the tree always covers the
/// whole input.
pub struct BlockParser<'o> {
    classifier: PslLineClassifier<'o>,
    /// Frame of the rule currently running.
    frame: Frame,
    /// Suspended frames of enclosing rules, innermost last.
    parents: Vec<Frame>,
    errors: Vec<Error>,
}

impl<'o> BlockParser<'o> {
    pub fn new(src: Source, options: &'o ParseOptions) -> Self {
        Self {
            classifier: PslLineClassifier::new(&options.groups),
            frame: Frame::new(src),
            parents: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Consumes all input, returning the top-level blocks and diagnostics.
    pub fn parse(mut self) -> (Vec<Block>, Vec<Error>) {
        self.parse_top_level();
        debug_assert!(self.parents.is_empty(), "unbalanced parse frames");
        (self.frame.blocks, self.errors)
    }

    // Frame management

    fn push_frame(&mut self, src: Source) {
        let parent = std::mem::replace(&mut self.frame, Frame::new(src));
        self.parents.push(parent);
    }

    fn pop_frame(&mut self) -> Vec<Block> {
        let Some(parent) = self.parents.pop() else {
            unreachable!("pop_frame without a matching push_frame");
        };
        let done = std::mem::replace(&mut self.frame, parent);
        debug_assert!(done.src.is_empty(), "frame popped with unparsed input");
        done.blocks
    }

    fn add_block(&mut self, block: Block) {
        self.frame.blocks.push(block);
    }

    fn add_error(&mut self, err: Error) {
        log::trace!("{err}");
        self.errors.push(err);
    }

    /// Adds `src` as invalid text, merging it into a directly preceding
    /// invalid block.
    fn add_invalid(&mut self, src: Source) {
        match self.frame.blocks.last_mut() {
            Some(Block::InvalidSource(prev)) => prev.append(&src),
            _ => self.add_block(Block::InvalidSource(src)),
        }
    }

    /// Records `err` and turns the next line into invalid text.
    fn reject_line(&mut self, err: Error) {
        self.add_error(err);
        let src = self.frame.src.take_one();
        self.add_invalid(src);
    }

    /// Rejects the next line because it has no place in the current rule.
    fn reject_unparseable(&mut self) {
        let line = self.frame.src.first();
        self.reject_line(Error::UnparseableLine { line });
    }

    fn peek_class(&self) -> Option<LineClass<'o>> {
        let line = self.frame.src.peek()?;
        let class = self.classifier.classify(line);
        log::trace!("line {} is {class:?}", self.frame.src.line_offset() + 1);
        Some(class)
    }

    /// Consumes blank lines into a `BlankLines` block, and reports whether
    /// any input remains.
    fn parse_blank_lines(&mut self) -> bool {
        let src = self.frame.src.take_while(str::is_empty);
        if !src.is_empty() {
            self.add_block(Block::BlankLines(src));
        }
        !self.frame.src.is_empty()
    }

    // Grammar rules

    fn parse_top_level(&mut self) {
        while self.parse_blank_lines() {
            match self.peek_class() {
                Some(LineClass::Comment) => self.parse_comment(),
                Some(LineClass::SectionMarker) => self.parse_section(),
                Some(LineClass::GroupStart(group)) => {
                    let line = self.frame.src.first();
                    let name = group.name.clone();
                    self.reject_line(Error::GroupOutsideSection { line, name });
                }
                Some(LineClass::GroupEnd(group)) => {
                    let line = self.frame.src.first();
                    let name = group.name.clone();
                    self.reject_line(Error::UnstartedGroup { line, name });
                }
                _ => self.reject_unparseable(),
            }
        }
    }

    fn parse_comment(&mut self) {
        let classifier = self.classifier;
        let src = self
            .frame
            .src
            .take_while(|line| classifier.classify(line) == LineClass::Comment);
        debug_assert!(!src.is_empty(), "parse_comment called without a comment");
        self.add_block(Block::Comment(src));
    }

    /// Parses a section starting at a section marker line.
    ///
    /// Malformed markers get exactly one diagnostic, the most severe one,
    /// and are kept as invalid text.
    fn parse_section(&mut self) {
        let line = self.frame.src.first();
        let text = line.text();
        let name = match parse_section_marker(&text) {
            SectionMarker::Unknown => {
                return self.reject_line(Error::UnknownSectionMarker { line: line.clone() });
            }
            SectionMarker::End { name, .. } => {
                let name = name.to_string();
                return self.reject_line(Error::UnstartedSection {
                    line: line.clone(),
                    name,
                });
            }
            SectionMarker::Begin {
                terminated: false, ..
            } => {
                return self.reject_line(Error::UnterminatedSectionMarker { line: line.clone() });
            }
            SectionMarker::Begin {
                name,
                terminated: true,
            } => name.to_string(),
        };

        let start = self.frame.src.take_one();
        let (mut rest, closed) = self
            .frame
            .src
            .take_until(|l| parse_section_marker(l).ends(&name));
        let body = rest.take_n(rest.num_lines() - usize::from(closed));
        log::debug!("section {name:?} at {start}, body {body}, closed: {closed}");

        let section = OpenConstruct {
            name,
            start: start.clone(),
        };
        if !closed {
            self.add_error(Error::UnclosedSection {
                name: section.name.clone(),
                start: start.clone(),
            });
        }

        let mut source = start;
        source.append(&body);
        self.push_frame(body);
        self.parse_section_body(&section);
        let blocks = self.pop_frame();

        // `rest` is now the END marker line, if there was one.
        if closed {
            if let SectionMarker::End {
                terminated: false, ..
            } = parse_section_marker(&rest.text())
            {
                self.add_error(Error::UnterminatedSectionMarker { line: rest.clone() });
            }
            source.append(&rest);
        }

        self.add_block(Block::Section(Section {
            source,
            name: section.name,
            blocks,
        }));
    }

    fn parse_section_body(&mut self, section: &OpenConstruct) {
        while self.parse_blank_lines() {
            match self.peek_class() {
                Some(LineClass::SectionMarker) => self.parse_rogue_section_marker(section),
                Some(LineClass::GroupStart(group)) => self.parse_group(section, group),
                Some(LineClass::GroupEnd(group)) => {
                    let line = self.frame.src.first();
                    let name = group.name.clone();
                    self.reject_line(Error::UnstartedGroup { line, name });
                }
                _ => self.parse_suffix_block(),
            }
        }
    }

    /// Handles a section marker inside an open section or group. It can
    /// neither open nor close anything here.
    fn parse_rogue_section_marker(&mut self, section: &OpenConstruct) {
        let line = self.frame.src.first();
        let text = line.text();
        let err = match parse_section_marker(&text) {
            SectionMarker::Unknown => Error::UnknownSectionMarker { line: line.clone() },
            SectionMarker::Begin { name, .. } => Error::NestedSection {
                line: line.clone(),
                name: name.to_string(),
                section: section.name.clone(),
                section_start: section.start.clone(),
            },
            SectionMarker::End { name, .. } => Error::MismatchedSection {
                line: line.clone(),
                end_name: name.to_string(),
                section: section.name.clone(),
                section_start: section.start.clone(),
            },
        };
        self.reject_line(err);
    }

    /// Parses a group starting at its start marker line.
    fn parse_group(&mut self, section: &OpenConstruct, markers: &'o GroupMarkers) {
        let start = self.frame.src.take_one();
        let (mut rest, closed) = self.frame.src.take_until(|l| l == markers.end);
        let body = rest.take_n(rest.num_lines() - usize::from(closed));
        log::debug!(
            "group {:?} at {start}, body {body}, closed: {closed}",
            markers.name
        );

        let group = OpenConstruct {
            name: markers.name.clone(),
            start: start.clone(),
        };
        if !closed {
            self.add_error(Error::UnclosedGroup {
                name: group.name.clone(),
                start: start.clone(),
            });
        }

        let mut source = start;
        source.append(&body);
        self.push_frame(body);
        self.parse_group_body(section, &group);
        let blocks = self.pop_frame();
        source.append(&rest);

        self.add_block(Block::Group(Group {
            source,
            name: group.name,
            blocks,
        }));
    }

    fn parse_group_body(&mut self, section: &OpenConstruct, group: &OpenConstruct) {
        while self.parse_blank_lines() {
            match self.peek_class() {
                Some(LineClass::SectionMarker) => self.parse_rogue_section_marker(section),
                Some(LineClass::GroupStart(nested)) => {
                    let err = Error::NestedGroup {
                        line: self.frame.src.first(),
                        name: nested.name.clone(),
                        group: group.name.clone(),
                        group_start: group.start.clone(),
                    };
                    self.reject_line(err);
                }
                Some(LineClass::GroupEnd(other)) => {
                    let err = Error::MismatchedGroup {
                        line: self.frame.src.first(),
                        end_name: other.name.clone(),
                        group: group.name.clone(),
                        group_start: group.start.clone(),
                    };
                    self.reject_line(err);
                }
                _ => self.parse_suffix_block(),
            }
        }
    }

    /// Parses a run of suffixes and comments up to the next blank line or
    /// structural marker.
    fn parse_suffix_block(&mut self) {
        let classifier = self.classifier;
        let src = self
            .frame
            .src
            .take_while(|line| classifier.classify(line).is_suffix_block_content());
        debug_assert!(!src.is_empty(), "parse_suffix_block called without content");

        let source = src.clone();
        self.push_frame(src);
        while let Some(class) = self.peek_class() {
            match class {
                LineClass::Comment => self.parse_comment(),
                LineClass::Suffix => self.parse_suffix(),
                LineClass::Exception => self.parse_exception(),
                _ => self.reject_unparseable(),
            }
        }
        let blocks = self.pop_frame();

        self.add_block(Block::Suffixes(Suffixes {
            source,
            entity: None,
            urls: Vec::new(),
            emails: Vec::new(),
            blocks,
        }));
    }

    fn parse_suffix(&mut self) {
        let source = self.frame.src.take_one();
        let (labels, wildcard) = DnsLabels::parse(&source.text()).strip_wildcard();
        self.add_block(Block::Suffix(Suffix {
            source,
            labels,
            wildcard,
            exceptions: Vec::new(),
        }));
    }

    /// Validates an exception line against the suffix right before it, and
    /// folds it into that suffix if it checks out.
    fn parse_exception(&mut self) {
        let line = self.frame.src.first();
        let text = line.text();
        let labels = DnsLabels::parse(text.strip_prefix(EXCEPTION_PREFIX).unwrap_or(&*text));

        let verdict = if labels.is_wildcard() {
            Err(Error::ExceptionAndWildcardSuffix { line: line.clone() })
        } else {
            match self.frame.blocks.last() {
                Some(Block::Suffix(base)) if !labels.is_direct_child_of(&base.labels) => {
                    Err(Error::InvalidException {
                        line: line.clone(),
                        base: base.source.first(),
                    })
                }
                Some(Block::Suffix(base)) if base.exceptions.contains(&labels) => {
                    Err(Error::DuplicateException { line: line.clone() })
                }
                Some(Block::Suffix(_)) => Ok(()),
                _ => Err(Error::ExceptionNotDirectlyFollowingBase { line: line.clone() }),
            }
        };

        if let Err(err) = verdict {
            return self.reject_line(err);
        }
        let src = self.frame.src.take_one();
        if let Some(Block::Suffix(base)) = self.frame.blocks.last_mut() {
            base.source.append(&src);
            base.exceptions.push(labels);
        }
    }
}
