use std::collections::VecDeque;

use crate::diagnostic::DiagnosticList;
use crate::token::{lookup_keyword, Token, TokenKind};

/// Streaming tokenizer over raw source bytes.
///
/// The characters `<`, `>`, `{`, `}` and `/` mean different things in plain
/// code, inside an opening tag, and between an element's tags. A handful of
/// counters carried across `next_token` calls decides which reading applies;
/// the parser never has to reach in.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,

    // Open elements whose closing tag has not been seen yet.
    element_depth: usize,
    // Braces opened and not yet closed, across all modes.
    brace_depth: usize,
    // Value of brace_depth when the innermost open tag started.
    tag_brace_depth: usize,
    // Between `<name` and the matching `>` or `/>` of an opening tag.
    inside_open_tag: bool,

    // Tag starts and ends produce two or three tokens in one step; the
    // overflow waits here and is drained before new input is read.
    pending: VecDeque<Token>,
    // Kind of the most recently returned token, consulted when `<` could
    // open either a generic parameter list or an element.
    prev_kind: TokenKind,

    diagnostics: DiagnosticList,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            line: 0,
            col: 0,
            element_depth: 0,
            brace_depth: 0,
            tag_brace_depth: 0,
            inside_open_tag: false,
            pending: VecDeque::new(),
            prev_kind: TokenKind::Eof,
            diagnostics: DiagnosticList::new(),
        }
    }

    /// Diagnostics recorded since the last call, in encounter order.
    pub fn take_diagnostics(&mut self) -> DiagnosticList {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn next_token(&mut self) -> Token {
        let token = match self.pending.pop_front() {
            Some(token) => token,
            None => {
                if self.inside_open_tag && self.brace_depth == self.tag_brace_depth {
                    self.tag_interior_token()
                } else if self.element_depth > 0
                    && self.brace_depth == self.tag_brace_depth
                    && !self.inside_open_tag
                {
                    self.element_content_token()
                } else {
                    self.code_token()
                }
            }
        };
        self.prev_kind = token.kind;
        token
    }

    /// Collects every token through the first `Eof`.
    pub fn tokenize(mut self) -> (Vec<Token>, DiagnosticList) {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        (tokens, self.diagnostics)
    }

    fn peek_char(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.input.get(self.pos + 1).copied()
    }

    fn advance(&mut self) {
        if let Some(&byte) = self.input.get(self.pos) {
            self.pos += 1;
            if byte == b'\n' {
                self.line += 1;
                self.col = 0;
            } else {
                self.col += 1;
            }
        }
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(|b| b.is_ascii_whitespace()) {
            self.advance();
        }
    }

    fn make_token(&self, kind: TokenKind, start: usize, line: usize, col: usize) -> Token {
        Token {
            kind,
            literal: String::from_utf8_lossy(&self.input[start..self.pos]).into_owned(),
            offset: start,
            line,
            column: col,
        }
    }

    fn eof_token(&self) -> Token {
        Token {
            kind: TokenKind::Eof,
            literal: String::new(),
            offset: self.pos,
            line: self.line,
            column: self.col,
        }
    }

    // Plain code: the default mode, also active inside `{ ... }` expression
    // holes of tags and element bodies.
    fn code_token(&mut self) -> Token {
        self.skip_whitespace();

        let (start, line, col) = (self.pos, self.line, self.col);
        let Some(ch) = self.peek_char() else {
            return self.eof_token();
        };

        if ch.is_ascii_alphabetic() || ch == b'_' {
            return self.ident_or_keyword();
        }
        if ch.is_ascii_digit() {
            return self.integer();
        }
        if ch == b'"' {
            return self.string_literal();
        }
        if ch == b'<' {
            return self.angle_or_element();
        }

        self.advance();
        let kind = match ch {
            b'=' => {
                if self.eat(b'=') {
                    TokenKind::Eq
                } else {
                    TokenKind::Assign
                }
            }
            b'!' => {
                if self.eat(b'=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            b'>' => {
                if self.eat(b'=') {
                    TokenKind::GtEq
                } else if self.eat(b'>') {
                    TokenKind::ShiftR
                } else {
                    TokenKind::RAngle
                }
            }
            b'&' => {
                if self.eat(b'&') {
                    TokenKind::And
                } else {
                    TokenKind::BitAnd
                }
            }
            b'|' => {
                if self.eat(b'|') {
                    TokenKind::Or
                } else {
                    TokenKind::BitOr
                }
            }
            b'^' => TokenKind::BitXor,
            b'~' => TokenKind::BitNot,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Mul,
            b'/' => TokenKind::Div,
            b'%' => TokenKind::Mod,
            b'.' => TokenKind::Period,
            b',' => TokenKind::Comma,
            b':' => TokenKind::Colon,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b'{' => {
                self.brace_depth += 1;
                TokenKind::LBrace
            }
            b'}' => {
                self.brace_depth = self.brace_depth.saturating_sub(1);
                TokenKind::RBrace
            }
            b'\'' => TokenKind::Tick,
            b'`' => TokenKind::Backtick,
            _ => TokenKind::Illegal,
        };
        self.make_token(kind, start, line, col)
    }

    // Attribute region between `<name` and the closing `>` or `/>`.
    fn tag_interior_token(&mut self) -> Token {
        self.skip_whitespace();

        let (start, line, col) = (self.pos, self.line, self.col);
        let Some(ch) = self.peek_char() else {
            return self.eof_token();
        };

        if ch.is_ascii_alphabetic() {
            while self.peek_char().is_some_and(|b| b.is_ascii_alphabetic()) {
                self.advance();
            }
            return self.make_token(TokenKind::ElemAttr, start, line, col);
        }

        match ch {
            b'=' => {
                self.advance();
                self.make_token(TokenKind::Assign, start, line, col)
            }
            b'"' => self.string_literal(),
            b'{' => {
                self.advance();
                self.brace_depth += 1;
                self.make_token(TokenKind::LBrace, start, line, col)
            }
            b'>' => {
                self.advance();
                self.inside_open_tag = false;
                self.make_token(TokenKind::ElemOpenEnd, start, line, col)
            }
            b'/' if self.peek_next() == Some(b'>') => {
                self.advance();
                self.advance();
                self.inside_open_tag = false;
                self.element_depth = self.element_depth.saturating_sub(1);
                self.make_token(TokenKind::ElemVoidEnd, start, line, col)
            }
            _ => {
                self.advance();
                self.make_token(TokenKind::Illegal, start, line, col)
            }
        }
    }

    // Raw text between an element's tags, up to the next `<` or `{`.
    fn element_content_token(&mut self) -> Token {
        let (start, line, col) = (self.pos, self.line, self.col);
        while let Some(ch) = self.peek_char() {
            if ch == b'<' || ch == b'{' {
                break;
            }
            self.advance();
        }
        if self.pos > start {
            return self.make_token(TokenKind::ElemText, start, line, col);
        }

        match self.peek_char() {
            None => self.eof_token(),
            Some(b'{') => {
                self.advance();
                self.brace_depth += 1;
                self.make_token(TokenKind::LBrace, start, line, col)
            }
            Some(_) => self.angle_or_element(),
        }
    }

    // Decides what a `<` means. The previous token settles the generics
    // case: `name<` followed by a letter is a parameter list, not a tag.
    fn angle_or_element(&mut self) -> Token {
        let (start, line, col) = (self.pos, self.line, self.col);
        let next = self.peek_next();

        if self.prev_kind == TokenKind::Ident && next.is_some_and(|b| b.is_ascii_alphabetic()) {
            self.advance();
            return self.make_token(TokenKind::LAngle, start, line, col);
        }
        if next == Some(b'/') {
            return self.closing_tag();
        }
        if next.is_some_and(|b| b.is_ascii_alphabetic()) {
            return self.opening_tag();
        }

        self.advance();
        let kind = if self.eat(b'=') {
            TokenKind::LtEq
        } else if self.eat(b'<') {
            TokenKind::ShiftL
        } else {
            TokenKind::LAngle
        };
        self.make_token(kind, start, line, col)
    }

    fn opening_tag(&mut self) -> Token {
        let (start, line, col) = (self.pos, self.line, self.col);
        self.advance(); // eat <
        let open = self.make_token(TokenKind::ElemOpenStart, start, line, col);

        let (istart, iline, icol) = (self.pos, self.line, self.col);
        self.consume_element_ident();
        let ident = self.make_token(TokenKind::ElemIdent, istart, iline, icol);
        self.pending.push_back(ident);

        self.inside_open_tag = true;
        self.tag_brace_depth = self.brace_depth;
        self.element_depth += 1;
        open
    }

    // Attempts `</name>`. A partial match still surfaces the tokens read so
    // far; the caller keeps lexing from wherever the attempt stopped.
    fn closing_tag(&mut self) -> Token {
        let (start, line, col) = (self.pos, self.line, self.col);
        self.advance(); // eat <
        self.advance(); // eat /
        let close = self.make_token(TokenKind::ElemCloseStart, start, line, col);

        if !self.peek_char().is_some_and(|b| b.is_ascii_alphabetic()) {
            return close;
        }

        let (istart, iline, icol) = (self.pos, self.line, self.col);
        self.consume_element_ident();
        let ident = self.make_token(TokenKind::ElemIdent, istart, iline, icol);
        self.pending.push_back(ident);

        if self.peek_char() == Some(b'>') {
            let (estart, eline, ecol) = (self.pos, self.line, self.col);
            self.advance();
            let end = self.make_token(TokenKind::ElemCloseEnd, estart, eline, ecol);
            self.pending.push_back(end);
            self.element_depth = self.element_depth.saturating_sub(1);
        }
        close
    }

    // Element names allow dots for namespacing.
    fn consume_element_ident(&mut self) {
        while self
            .peek_char()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'.')
        {
            self.advance();
        }
    }

    fn ident_or_keyword(&mut self) -> Token {
        let (start, line, col) = (self.pos, self.line, self.col);
        while self
            .peek_char()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.advance();
        }
        let literal = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        let kind = lookup_keyword(&literal).unwrap_or(TokenKind::Ident);
        Token {
            kind,
            literal,
            offset: start,
            line,
            column: col,
        }
    }

    // Underscores are consumed here even in malformed runs like `1_`; the
    // parser rejects those when it converts the literal.
    fn integer(&mut self) -> Token {
        let (start, line, col) = (self.pos, self.line, self.col);
        while self
            .peek_char()
            .is_some_and(|b| b.is_ascii_digit() || b == b'_')
        {
            self.advance();
        }
        self.make_token(TokenKind::Int, start, line, col)
    }

    fn string_literal(&mut self) -> Token {
        let (start, line, col) = (self.pos, self.line, self.col);
        self.advance(); // eat the opening quote
        loop {
            match self.peek_char() {
                None => {
                    self.diagnostics
                        .error(line, col, "Unterminated string literal");
                    break;
                }
                Some(b'\\') => {
                    self.advance();
                    if self.peek_char().is_some() {
                        self.advance();
                    }
                }
                Some(b'"') => {
                    self.advance();
                    break;
                }
                Some(_) => self.advance(),
            }
        }
        self.make_token(TokenKind::String, start, line, col)
    }
}
