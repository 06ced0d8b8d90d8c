//! Single-pass scanner turning diagram text into a [`RawDocument`].
//!
//! The scanner walks the normalized source once, keeping a byte index plus
//! the current line and column. Each construct of the grammar has its own
//! scanning method (global state, box headers, link header, root header,
//! attributes, quoted strings, comments and link-type tokens). Boxes are
//! inserted into the raw tree as soon as their header is read, so paths can
//! be followed and intermediate containers created on demand.
//!
//! Reading stops at the first error.

use std::borrow::Cow;

use tessera_core::{compass::Direct, semantic::NodeKind};

use crate::{
    access::{self, is_word_char},
    error::{Diagnostic, ErrorCode, Result},
    raw::{LinkToken, RawAccess, RawAttribute, RawDocument, RawEndpoint, RawLink, RawNode},
    span::{Position, Span},
};

/// Characters a link-type body is made of.
const LINK_CHARS: &[char] = &['-', '=', '.', '~', '<', '>'];

fn is_link_char(c: char) -> bool {
    LINK_CHARS.contains(&c)
}

fn is_bare_value_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ',' | '.' | '+' | '-')
}

/// Replaces `\r\n` and lone `\r` with `\n`.
///
/// All spans produced by the reader refer to the normalized text.
pub fn normalize_newlines(source: &str) -> Cow<'_, str> {
    if source.contains('\r') {
        Cow::Owned(source.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(source)
    }
}

/// Reads an already normalized source.
pub(crate) fn read_document(src: &str) -> Result<RawDocument> {
    Reader::new(src).run()
}

/// A box just declared, remembered for short links.
#[derive(Debug, Clone)]
struct BoxRef {
    address: Vec<usize>,
    span: Span,
    position: Position,
}

/// A short link whose target box has not been read yet.
#[derive(Debug)]
struct PendingLink {
    from: BoxRef,
    token: LinkToken,
    span: Span,
    position: Position,
}

/// Where a box header path starts.
#[derive(Debug)]
struct HeaderPath {
    relative: bool,
    segments: Vec<String>,
    span: Span,
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: usize,
    line: usize,
    column: usize,
    line_start: usize,
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    line_start: usize,
    doc: RawDocument,
    /// Tree address of the open container.
    open: Vec<usize>,
    /// Document attributes are accepted until the first box or separator.
    header_open: bool,
    root_config: Option<Span>,
    last_box: Option<BoxRef>,
    pending: Option<PendingLink>,
}

impl<'a> Reader<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            line_start: 0,
            doc: RawDocument::default(),
            open: Vec::new(),
            header_open: true,
            root_config: None,
            last_box: None,
            pending: None,
        }
    }

    // ---------------------------------------------------------------------
    // Scanner primitives
    // ---------------------------------------------------------------------

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
            self.line_start = self.pos;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Advances over `bytes` bytes, keeping line and column in sync.
    fn advance(&mut self, bytes: usize) {
        let target = self.pos + bytes;
        while self.pos < target && self.bump().is_some() {}
    }

    fn eat_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&predicate) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            column: self.column,
            line_start: self.line_start,
        }
    }

    fn reset(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
        self.column = mark.column;
        self.line_start = mark.line_start;
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start..self.pos)
    }

    /// Only blanks precede the cursor on the current line.
    fn at_line_start(&self) -> bool {
        self.src[self.line_start..self.pos]
            .chars()
            .all(|c| c == ' ' || c == '\t')
    }

    fn skip_blanks(&mut self) {
        self.eat_while(|c| c == ' ' || c == '\t');
    }

    /// Skips blanks, newlines and comments.
    fn skip_trivia(&mut self) {
        loop {
            self.eat_while(char::is_whitespace);
            if self.peek() == Some('#') {
                self.comment();
            } else {
                break;
            }
        }
    }

    fn error(
        &self,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        label: impl Into<String>,
        position: Position,
    ) -> Diagnostic {
        Diagnostic::error(message)
            .with_code(code)
            .with_label(span, label)
            .with_position(position)
    }

    /// Error pointing at the character under the cursor.
    fn unexpected_here(&self, context: &str) -> Diagnostic {
        let (message, span) = match self.peek() {
            Some(ch) => (
                format!("unexpected character `{ch}` {context}"),
                Span::new(self.pos..self.pos + ch.len_utf8()),
            ),
            None => (
                format!("unexpected end of input {context}"),
                Span::new(self.pos..self.pos),
            ),
        };
        self.error(
            ErrorCode::E002,
            message,
            span,
            "not valid here",
            self.position(),
        )
    }

    // ---------------------------------------------------------------------
    // Global state
    // ---------------------------------------------------------------------

    fn run(mut self) -> Result<RawDocument> {
        loop {
            self.skip_blanks();
            let Some(ch) = self.peek() else {
                break;
            };

            match ch {
                '\n' => {
                    self.bump();
                }
                '#' => self.comment(),
                '-' if self.at_line_start() && self.rest().starts_with("---") => {
                    self.root_header()?
                }
                '[' if self.peek_nth(1) == Some('[') => self.box_header(NodeKind::Group)?,
                '[' => self.box_header(NodeKind::Unit)?,
                '(' => self.box_header(NodeKind::Cell)?,
                '{' => self.link_header()?,
                _ if self.starts_link_token() => self.short_link_token()?,
                c if is_word_char(c) && self.header_open => {
                    let attribute = self.attribute()?;
                    self.doc.attributes.push(attribute);
                }
                c if is_word_char(c) => {
                    let start = self.pos;
                    let position = self.position();
                    self.eat_while(is_word_char);
                    return Err(self
                        .error(
                            ErrorCode::E104,
                            "document attributes must come before the first box or separator",
                            self.span_from(start),
                            "out of place",
                            position,
                        )
                        .with_help("move this attribute to the top of the document"));
                }
                _ => return Err(self.unexpected_here("at the top level")),
            }
        }

        self.ensure_no_pending()?;
        Ok(self.doc)
    }

    /// Comment state: `#` up to the end of the line.
    fn comment(&mut self) {
        self.eat_while(|c| c != '\n');
    }

    fn ensure_no_pending(&self) -> Result<()> {
        match &self.pending {
            Some(pending) => Err(self
                .error(
                    ErrorCode::E102,
                    "link-type token has no box after it",
                    pending.span,
                    "expected a box after this link",
                    pending.position,
                )
                .with_help("write the target box right after the link, e.g. `(a) -> (b)`")),
            None => Ok(()),
        }
    }

    // ---------------------------------------------------------------------
    // Root header
    // ---------------------------------------------------------------------

    /// Root header state: `---` plus optional root attributes up to the end
    /// of the line.
    fn root_header(&mut self) -> Result<()> {
        self.ensure_no_pending()?;

        let start = self.pos;
        let position = self.position();
        self.eat_while(|c| c == '-');

        let mut attributes = Vec::new();
        loop {
            self.skip_blanks();
            match self.peek() {
                None | Some('\n') => break,
                Some('#') => self.comment(),
                Some(c) if is_word_char(c) => attributes.push(self.attribute()?),
                Some(_) => return Err(self.unexpected_here("in a root separator line")),
            }
        }
        let span = self.span_from(start);

        if !attributes.is_empty() {
            if let Some(first) = self.root_config {
                return Err(self
                    .error(
                        ErrorCode::E101,
                        "the root is configured more than once",
                        span,
                        "second root configuration",
                        position,
                    )
                    .with_secondary_label(first, "first configured here")
                    .with_help("merge the attributes into one separator line"));
            }
            self.root_config = Some(span);
            self.doc.root.attributes = attributes;
            self.doc.root.span = span;
            self.doc.root.position = position;
        }

        self.open.clear();
        self.header_open = false;
        self.last_box = None;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Attributes and quoted strings
    // ---------------------------------------------------------------------

    /// Attribute state: `key` or `key=value`.
    fn attribute(&mut self) -> Result<RawAttribute> {
        let start = self.pos;
        let position = self.position();
        let key = self.eat_while(is_word_char).to_string();

        let value = if self.peek() == Some('=') {
            self.bump();
            match self.peek() {
                Some('"') => Some(self.quoted_string()?),
                Some(c) if is_bare_value_char(c) => {
                    Some(self.eat_while(is_bare_value_char).to_string())
                }
                _ => {
                    return Err(self.error(
                        ErrorCode::E100,
                        format!("expected a value after `{key}=`"),
                        self.span_from(start),
                        "missing value",
                        position,
                    ));
                }
            }
        } else {
            None
        };

        Ok(RawAttribute::new(key, value, self.span_from(start), position))
    }

    /// Quoted string state. Only `\"` and `\\` are escapes.
    fn quoted_string(&mut self) -> Result<String> {
        let start = self.pos;
        let position = self.position();
        self.bump();

        let mut text = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(self
                        .error(
                            ErrorCode::E001,
                            "unterminated quoted string",
                            self.span_from(start),
                            "string starts here",
                            position,
                        )
                        .with_help("add a closing `\"`"));
                }
                Some('"') => return Ok(text),
                Some('\\') => {
                    let escape_start = self.pos - 1;
                    let escape_position = Position::new(self.line, self.column - 1);
                    match self.bump() {
                        Some(ch @ ('"' | '\\')) => text.push(ch),
                        _ => {
                            return Err(self
                                .error(
                                    ErrorCode::E003,
                                    "invalid escape sequence",
                                    self.span_from(escape_start),
                                    "unknown escape",
                                    escape_position,
                                )
                                .with_help("only `\\\"` and `\\\\` are escapes"));
                        }
                    }
                }
                Some(ch) => text.push(ch),
            }
        }
    }

    /// Reads attributes until the closing character of a header.
    fn attributes_until(
        &mut self,
        closer: char,
        header_start: usize,
        header_position: Position,
    ) -> Result<Vec<RawAttribute>> {
        let mut attributes = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                None => {
                    return Err(self
                        .error(
                            ErrorCode::E004,
                            "unterminated header",
                            self.span_from(header_start),
                            "header starts here",
                            header_position,
                        )
                        .with_help(format!("close the header with `{closer}`")));
                }
                Some(c) if c == closer => return Ok(attributes),
                Some(c) if is_word_char(c) => attributes.push(self.attribute()?),
                Some(_) => return Err(self.unexpected_here("inside a header")),
            }
        }
    }

    // ---------------------------------------------------------------------
    // Access expressions
    // ---------------------------------------------------------------------

    fn starts_access(&self) -> bool {
        self.peek()
            .is_some_and(|c| c == '.' || c == '"' || is_word_char(c))
    }

    /// Reads a path, honouring a leading `.` for relative paths.
    fn header_path(&mut self) -> Result<HeaderPath> {
        let start = self.pos;
        let position = self.position();
        let relative = self.peek() == Some('.');
        if relative {
            self.bump();
        }

        match access::path_prefix(self.rest()) {
            Ok((segments, consumed)) => {
                self.advance(consumed);
                Ok(HeaderPath {
                    relative,
                    segments,
                    span: self.span_from(start),
                })
            }
            Err(failure) => {
                let end = self.rest().find(char::is_whitespace).unwrap_or(self.rest().len());
                Err(self.error(
                    failure.code(),
                    failure.message(),
                    Span::new(start..self.pos + end),
                    "in this path",
                    position,
                ))
            }
        }
    }

    fn selector_segment(&mut self, start: usize, position: Position) -> Result<String> {
        match access::segment_prefix(self.rest()) {
            Ok((segment, consumed)) => {
                self.advance(consumed);
                Ok(segment)
            }
            Err(failure) => Err(self.error(
                failure.code(),
                failure.message(),
                self.span_from(start),
                "after this selector",
                position,
            )),
        }
    }

    /// Reads a link endpoint: a path, `&name` or `$tag`.
    fn access_expr(&mut self) -> Result<RawEndpoint> {
        let start = self.pos;
        let position = self.position();

        let access = match self.peek() {
            Some('&') => {
                self.bump();
                RawAccess::Name(self.selector_segment(start, position)?)
            }
            Some('$') => {
                self.bump();
                RawAccess::Tag(self.selector_segment(start, position)?)
            }
            _ if self.starts_access() => {
                let path = self.header_path()?;
                let mut base = Vec::new();
                if path.relative {
                    base.clone_from(&self.open);
                }
                RawAccess::Path {
                    base,
                    segments: path.segments,
                }
            }
            _ => return Err(self.unexpected_here("where a link endpoint was expected")),
        };

        Ok(RawEndpoint {
            access,
            span: self.span_from(start),
            position,
        })
    }

    // ---------------------------------------------------------------------
    // Link-type tokens and links
    // ---------------------------------------------------------------------

    fn starts_link_token(&self) -> bool {
        match self.peek() {
            Some(c) if is_link_char(c) => true,
            Some(c) if c.is_ascii_digit() => self.peek_nth(1).is_some_and(is_link_char),
            _ => false,
        }
    }

    fn edge_digit(&mut self, token_start: usize, position: Position) -> Result<Direct> {
        let digit_start = self.pos;
        let digit = self.bump().and_then(|c| c.to_digit(10)).unwrap_or(u32::MAX);
        u8::try_from(digit)
            .ok()
            .and_then(Direct::from_index)
            .ok_or_else(|| {
                self.error(
                    ErrorCode::E005,
                    "link edge must be 0, 1, 2 or 3",
                    Span::new(digit_start..self.pos),
                    "invalid edge",
                    position,
                )
                .with_secondary_label(self.span_from(token_start), "in this link-type token")
            })
    }

    /// Link-type token state: `EDGE? [-=.~<>]+ EDGE?`.
    fn link_token(&mut self) -> Result<(LinkToken, Span, Position)> {
        let start = self.pos;
        let position = self.position();

        let from_edge = if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            Some(self.edge_digit(start, position)?)
        } else {
            None
        };

        let body = self.eat_while(is_link_char);
        if body.is_empty() {
            return Err(self.error(
                ErrorCode::E005,
                "link-type token needs a body such as `->`",
                self.span_from(start),
                "missing body",
                position,
            ));
        }

        let to_edge = match (self.peek(), self.peek_nth(1)) {
            (Some(c), next) if c.is_ascii_digit() && !next.is_some_and(is_word_char) => {
                Some(self.edge_digit(start, position)?)
            }
            _ => None,
        };

        let start_marker = body.starts_with('<');
        let end_marker = body.ends_with('>');
        let kind = body.trim_start_matches('<').trim_end_matches('>');
        let kind = if kind.is_empty() { "-" } else { kind };

        let token = LinkToken {
            kind: kind.to_string(),
            start_marker,
            end_marker,
            from_edge,
            to_edge,
        };
        Ok((token, self.span_from(start), position))
    }

    /// Link header state: `{ access LINKTYPE access attribute* }`.
    fn link_header(&mut self) -> Result<()> {
        self.ensure_no_pending()?;
        self.last_box = None;
        self.header_open = false;

        let start = self.pos;
        let position = self.position();
        self.bump();

        self.skip_trivia();
        let from = self.access_expr()?;

        self.skip_trivia();
        if !self.starts_link_token() {
            return Err(self.error(
                ErrorCode::E100,
                "expected a link-type token such as `->`",
                self.span_from(start),
                "incomplete link",
                position,
            ));
        }
        let (token, _, _) = self.link_token()?;

        self.skip_trivia();
        if self.peek() == Some('}') || self.peek().is_none() {
            return Err(self.error(
                ErrorCode::E100,
                "link is missing its target",
                self.span_from(start),
                "incomplete link",
                position,
            ));
        }
        let to = self.access_expr()?;

        let attributes = self.attributes_until('}', start, position)?;
        self.bump();

        self.doc.links.push(RawLink {
            from,
            to,
            token,
            attributes,
            span: self.span_from(start),
            position,
        });
        Ok(())
    }

    /// A link-type token between two boxes.
    fn short_link_token(&mut self) -> Result<()> {
        let Some(from) = self.last_box.take() else {
            let start = self.pos;
            let position = self.position();
            self.eat_while(|c| is_link_char(c) || c.is_ascii_digit());
            return Err(self
                .error(
                    ErrorCode::E102,
                    "link-type token has no box before it",
                    self.span_from(start),
                    "dangling link",
                    position,
                )
                .with_help("short links join the box right before and right after the token"));
        };

        let (token, span, position) = self.link_token()?;
        self.pending = Some(PendingLink {
            from,
            token,
            span,
            position,
        });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Box headers
    // ---------------------------------------------------------------------

    /// Unit, group and cell header states.
    fn box_header(&mut self, kind: NodeKind) -> Result<()> {
        let start = self.pos;
        let position = self.position();
        let (opener_len, closer) = match kind {
            NodeKind::Group => (2, "]]"),
            NodeKind::Unit => (1, "]"),
            NodeKind::Cell => (1, ")"),
        };
        self.advance(opener_len);
        self.skip_trivia();

        let mut path = None;
        if self.starts_access() {
            let mark = self.mark();
            let candidate = self.header_path()?;
            self.skip_blanks();
            if self.peek() == Some('=') {
                // `[label="x"]`: an anonymous box whose first attribute
                // looked like a path.
                self.reset(mark);
            } else {
                path = Some(candidate);
            }
        }

        let closer_char = closer.chars().next().unwrap_or(']');
        let attributes = self.attributes_until(closer_char, start, position)?;
        if !self.rest().starts_with(closer) {
            return Err(self.unexpected_here(&format!("where `{closer}` was expected")));
        }
        self.advance(closer.len());
        let span = self.span_from(start);

        let address = match path {
            Some(path) => self.declare_path(kind, path, attributes, span, position)?,
            None => self.declare_anonymous(kind, attributes, span, position)?,
        };

        if kind.is_container() {
            self.open.clone_from(&address);
        }
        self.header_open = false;

        let declared = BoxRef {
            address,
            span,
            position,
        };
        if let Some(pending) = self.pending.take() {
            self.doc.links.push(RawLink {
                from: RawEndpoint {
                    access: RawAccess::Address(pending.from.address.clone()),
                    span: pending.from.span,
                    position: pending.from.position,
                },
                to: RawEndpoint {
                    access: RawAccess::Address(declared.address.clone()),
                    span: declared.span,
                    position: declared.position,
                },
                token: pending.token,
                attributes: Vec::new(),
                span: pending.from.span.union(declared.span),
                position: pending.from.position,
            });
        }
        self.last_box = Some(declared);
        Ok(())
    }

    fn node_at(&mut self, address: &[usize]) -> Result<&mut RawNode> {
        self.doc.root.at_mut(address).ok_or_else(|| {
            Diagnostic::error("internal reader error: open container vanished")
                .with_code(ErrorCode::E100)
        })
    }

    fn declare_anonymous(
        &mut self,
        kind: NodeKind,
        attributes: Vec<RawAttribute>,
        span: Span,
        position: Position,
    ) -> Result<Vec<usize>> {
        let open = self.open.clone();
        let parent = self.node_at(&open)?;
        let mut node = RawNode::new(kind, None, span, position);
        node.attributes = attributes;
        parent.children.push(node);

        let mut address = open;
        address.push(parent.children.len() - 1);
        Ok(address)
    }

    fn declare_path(
        &mut self,
        kind: NodeKind,
        path: HeaderPath,
        attributes: Vec<RawAttribute>,
        span: Span,
        position: Position,
    ) -> Result<Vec<usize>> {
        let mut address = if path.relative {
            self.open.clone()
        } else {
            Vec::new()
        };

        let last = path.segments.len().saturating_sub(1);
        let mut created = false;
        for (i, segment) in path.segments.iter().enumerate() {
            let parent = self.node_at(&address)?;
            if parent.kind == NodeKind::Cell {
                let cell_name = parent.name.clone().unwrap_or_default();
                let cell_span = parent.span;
                return Err(self
                    .error(
                        ErrorCode::E206,
                        format!("cell `{cell_name}` cannot contain other boxes"),
                        path.span,
                        "used as a container here",
                        position,
                    )
                    .with_secondary_label(cell_span, "declared as a cell here"));
            }

            match parent.child_index(segment) {
                Some(index) => {
                    address.push(index);
                    created = false;
                }
                None => {
                    let is_last = i == last;
                    let mut child = RawNode::new(
                        if is_last { kind } else { NodeKind::Unit },
                        Some(segment.clone()),
                        span,
                        position,
                    );
                    child.implicit = !is_last;
                    parent.children.push(child);
                    address.push(parent.children.len() - 1);
                    created = true;
                }
            }
        }

        let mut node_attributes = attributes;
        let header_span = path.span;
        let node = self.node_at(&address)?;
        if created {
            node.attributes = node_attributes;
            return Ok(address);
        }

        // A reference to a node that already exists.
        let conflict = if node.implicit {
            if kind == NodeKind::Cell {
                Some((node.kind, node.span))
            } else {
                node.kind = kind;
                node.implicit = false;
                node.span = span;
                node.position = position;
                None
            }
        } else if node.kind != kind {
            Some((node.kind, node.span))
        } else {
            None
        };

        if let Some((existing, existing_span)) = conflict {
            return Err(self
                .error(
                    ErrorCode::E206,
                    format!("box is declared as a {kind} but already is a {existing}"),
                    header_span,
                    "conflicting declaration",
                    position,
                )
                .with_secondary_label(existing_span, "first declared here"));
        }

        if !node_attributes.is_empty() {
            if !node.attributes.is_empty() {
                let first = node.span;
                return Err(self
                    .error(
                        ErrorCode::E204,
                        "box already received attributes",
                        span,
                        "attributes given again",
                        position,
                    )
                    .with_secondary_label(first, "attributes first given here")
                    .with_help("give all attributes in one header"));
            }
            node.attributes = std::mem::take(&mut node_attributes);
            node.span = span;
            node.position = position;
        }

        Ok(address)
    }
}
