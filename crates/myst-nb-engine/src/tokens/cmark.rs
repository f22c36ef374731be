//! Block tokenizer built on pulldown-cmark.
//!
//! pulldown-cmark reports nested `Start`/`End` events for every element. This
//! module folds them into the flat token stream the cell extractor expects:
//!
//! ````markdown
//! - item
//!
//!   ```{code-cell}
//!   x = 1
//!   ```
//! ````
//! Events and resulting tokens:
//! 1. `Start(List)` → `Other` (+1)
//! 2. `Start(Item)` → `Other` (+1)
//! 3. `Start(Paragraph)` … `End(Paragraph)` → `Other` (0)
//! 4. `Start(CodeBlock)`, `Text`, `End(CodeBlock)` → `Fence` (0)
//! 5. `End(Item)` → `Other` (-1)
//! 6. `End(List)` → `Other` (-1)
//!
//! Block breaks (`+++`) are not CommonMark. Left to pulldown-cmark they would
//! be read as lazy paragraph continuations, setext underlines or `+` bullets,
//! so they are found first and the text between them is tokenized piece by
//! piece.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

use super::{BlockTokenizer, LineIndex, LineSpan, Token, TokenKind};
use crate::parsing::front_matter::split_front_matter;

/// The default [`BlockTokenizer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CmarkTokenizer;

impl CmarkTokenizer {
    /// Markdown extensions enabled while tokenizing.
    pub fn options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
    }
}

impl BlockTokenizer for CmarkTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let index = LineIndex::new(text);
        let mut collector = TokenCollector::new(&index);

        // Front matter is split off by hand so that detection and conversion agree
        // on exactly where it ends.
        let mut body_start = 0;
        if let Some(front_matter) = split_front_matter(text) {
            body_start = index.line_start(front_matter.lines.end);
            collector.tokens.push(
                Token::new(TokenKind::FrontMatter, 0, front_matter.lines)
                    .with_content(front_matter.body),
            );
        }

        let mut segment_start = body_start;
        for (line, content) in find_block_breaks(text, body_start, &index) {
            collector.tokenize_segment(text, segment_start..index.line_start(line));
            collector.tokens.push(
                Token::new(TokenKind::BlockBreak, 0, LineSpan::new(line, line + 1))
                    .with_content(content),
            );
            segment_start = index.line_start(line + 1);
        }
        collector.tokenize_segment(text, segment_start..text.len());

        collector.finish()
    }
}

/// Finds the top-level block break lines after `body_start`.
///
/// Lines inside code and HTML blocks are skipped, as are lines indented far
/// enough to belong to an open list item.
fn find_block_breaks<'t>(
    text: &'t str,
    body_start: usize,
    index: &LineIndex,
) -> Vec<(usize, &'t str)> {
    let body = &text[body_start..];

    let mut verbatim: Vec<Range<usize>> = Vec::new();
    let mut items: Vec<(Range<usize>, usize)> = Vec::new();
    for (event, range) in Parser::new_ext(body, CmarkTokenizer::options()).into_offset_iter() {
        let range = range.start + body_start..range.end + body_start;
        match event {
            Event::Start(Tag::CodeBlock(_) | Tag::HtmlBlock) => verbatim.push(range),
            Event::Start(Tag::Item) => {
                if let Some(indent) = item_content_indent(text, range.start, index) {
                    items.push((range, indent));
                }
            }
            _ => {}
        }
    }

    let mut breaks = Vec::new();
    let mut offset = body_start;
    for line in body.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        let Some(content) = block_break_content(line.trim_end_matches(['\r', '\n'])) else {
            continue;
        };
        let indent = line.len() - line.trim_start_matches(' ').len();
        let in_verbatim = verbatim.iter().any(|range| range.contains(&line_start));
        let in_item = items.iter().any(|(range, content_indent)| {
            range.start < line_start && range.contains(&line_start) && indent >= *content_indent
        });
        if !in_verbatim && !in_item {
            breaks.push((index.line_of(line_start), content));
        }
    }
    breaks
}

/// Column at which the content of the list item starting at `item_start` begins.
///
/// Returns `None` when no list marker is found there.
fn item_content_indent(text: &str, item_start: usize, index: &LineIndex) -> Option<usize> {
    let line_start = index.line_start(index.line_of(item_start));
    let prefix = text[line_start..item_start].chars().count();

    let rest = &text[item_start..];
    let leading = rest.len() - rest.trim_start_matches(' ').len();
    let rest = &rest[leading..];

    let marker = match rest.chars().next()? {
        '-' | '+' | '*' => 1,
        _ => {
            let digits = rest.chars().take_while(char::is_ascii_digit).count();
            match rest[digits..].chars().next() {
                Some('.' | ')') if digits > 0 => digits + 1,
                _ => return None,
            }
        }
    };

    let after = rest[marker..].lines().next().unwrap_or("");
    let spaces = after.len() - after.trim_start_matches(' ').len();
    // blank after the marker, or indented code as the first line
    let padding = if spaces == 0 || spaces > 4 || spaces == after.len() {
        1
    } else {
        spaces
    };
    Some(prefix + leading + marker + padding)
}

/// What an open pulldown-cmark element turns into once it closes.
#[derive(Debug)]
enum Frame {
    /// Block quotes, lists, items, footnote definitions.
    Container,
    /// A fenced code block and its info string.
    Fence(String),
    /// Any other leaf block.
    Leaf,
    /// Inline elements and table internals; produce no token.
    Inline,
}

struct TokenCollector<'a> {
    index: &'a LineIndex,
    /// Open elements, innermost last.
    stack: Vec<Frame>,
    /// Text of the fence currently being read.
    fence_content: String,
    tokens: Vec<Token>,
}

impl<'a> TokenCollector<'a> {
    fn new(index: &'a LineIndex) -> Self {
        Self {
            index,
            stack: Vec::new(),
            fence_content: String::new(),
            tokens: Vec::new(),
        }
    }

    /// Tokenizes `text[range]` on its own, keeping offsets relative to `text`.
    fn tokenize_segment(&mut self, text: &str, range: Range<usize>) {
        let offset = range.start;
        let parser = Parser::new_ext(&text[range], CmarkTokenizer::options());
        for (event, range) in parser.into_offset_iter() {
            self.process_event(event, range.start + offset..range.end + offset);
        }
    }

    fn process_event(&mut self, event: Event, range: Range<usize>) {
        match event {
            Event::Start(tag) => {
                let frame = match tag {
                    Tag::BlockQuote(_) | Tag::List(_) | Tag::Item | Tag::FootnoteDefinition(_) => {
                        self.push(TokenKind::Other, 1, &range);
                        Frame::Container
                    }
                    Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
                        self.fence_content.clear();
                        Frame::Fence(info.to_string())
                    }
                    Tag::Paragraph
                    | Tag::CodeBlock(CodeBlockKind::Indented)
                    | Tag::Heading { .. }
                    | Tag::HtmlBlock
                    | Tag::Table(_)
                    | Tag::MetadataBlock(_) => Frame::Leaf,
                    _ => Frame::Inline,
                };
                self.stack.push(frame);
            }
            Event::End(_) => match self.stack.pop() {
                Some(Frame::Container) => self.push(TokenKind::Other, -1, &range),
                Some(Frame::Fence(info)) => {
                    let content = std::mem::take(&mut self.fence_content);
                    let lines = self.index.span_of(&range);
                    self.tokens.push(
                        Token::new(TokenKind::Fence, 0, lines)
                            .with_info(info)
                            .with_content(content),
                    );
                }
                Some(Frame::Leaf) => self.push(TokenKind::Other, 0, &range),
                Some(Frame::Inline) | None => {}
            },
            Event::Text(text) => {
                if let Some(Frame::Fence(_)) = self.stack.last() {
                    self.fence_content.push_str(&text);
                }
            }
            Event::Rule => self.push(TokenKind::Other, 0, &range),
            _ => {}
        }
    }

    fn push(&mut self, kind: TokenKind, nesting: i8, range: &Range<usize>) {
        let lines = self.index.span_of(range);
        self.tokens.push(Token::new(kind, nesting, lines));
    }

    fn finish(self) -> Vec<Token> {
        self.tokens
    }
}

/// Recognises a block break line, returning the metadata text that follows it.
///
/// A break is at most three spaces of indentation followed by three or more `+`
/// markers, which may be separated by spaces.
pub fn block_break_content(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches(' ');
    if line.len() - rest.len() > 3 {
        return None;
    }

    let mut markers = 0;
    let mut end = 0;
    for (i, ch) in rest.char_indices() {
        match ch {
            '+' => markers += 1,
            ' ' | '\t' => {}
            _ => break,
        }
        end = i + ch.len_utf8();
    }

    if markers < 3 || !rest.starts_with('+') {
        return None;
    }
    Some(rest[end..].trim())
}
