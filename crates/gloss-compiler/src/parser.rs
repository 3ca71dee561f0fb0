use crate::ast::*;
use crate::diagnostic::DiagnosticList;
use crate::lexer::Lexer;
use crate::precedence::{self, Precedence};
use crate::token::{Token, TokenKind};

/// Parses raw source bytes into a source file plus every diagnostic the
/// lexer and parser recorded along the way. Always returns a traversable
/// tree; malformed input shows up as diagnostics and unfilled slots, never
/// as a panic.
pub fn parse(source: &[u8]) -> (SourceFile, DiagnosticList) {
    let mut parser = Parser::new(Lexer::new(source));
    let file = parser.parse_source_file();
    (file, parser.into_diagnostics())
}

/// Recursive-descent parser with two tokens of lookahead; expressions use
/// precedence climbing over the table in `precedence`.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peek: Token,
    // Byte end of the most recently consumed token, for nodes whose last
    // token has already been stepped past.
    prev_end: usize,
    diagnostics: DiagnosticList,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let mut diagnostics = DiagnosticList::new();
        let current = lexer.next_token();
        diagnostics.append(lexer.take_diagnostics());
        let peek = lexer.next_token();
        diagnostics.append(lexer.take_diagnostics());
        Self {
            lexer,
            current,
            peek,
            prev_end: 0,
            diagnostics,
        }
    }

    pub fn diagnostics(&self) -> &DiagnosticList {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> DiagnosticList {
        self.diagnostics
    }

    pub fn parse_source_file(&mut self) -> SourceFile {
        let mut file = SourceFile::default();
        while self.current.kind != TokenKind::Eof {
            match self.current.kind {
                TokenKind::Enum
                | TokenKind::Union
                | TokenKind::Struct
                | TokenKind::Let
                | TokenKind::Func => {
                    if let Some(decl) = self.parse_declaration() {
                        file.declarations.push(decl);
                    }
                    self.advance();
                }
                _ => {
                    self.error_at_current("Expected declaration");
                    self.synchronize();
                }
            }
        }
        file
    }

    // Helpers

    fn advance(&mut self) {
        self.prev_end = self.current.end_offset();
        self.current = std::mem::replace(&mut self.peek, self.lexer.next_token());
        self.diagnostics.append(self.lexer.take_diagnostics());
    }

    /// Reports at the current token unless it already matches.
    fn expect(&mut self, kind: TokenKind, msg: &str) -> bool {
        if self.current.kind == kind {
            true
        } else {
            self.error_at_current(msg);
            false
        }
    }

    /// Advances onto the peek token when it matches, otherwise reports at it.
    fn expect_next(&mut self, kind: TokenKind, msg: &str) -> bool {
        if self.peek.kind == kind {
            self.advance();
            true
        } else {
            self.diagnostics
                .error(self.peek.line, self.peek.column, msg);
            false
        }
    }

    fn error_at_current(&mut self, msg: &str) {
        self.diagnostics
            .error(self.current.line, self.current.column, msg);
    }

    fn current_range(&self) -> Range {
        Range::new(self.current.offset, self.current.end_offset())
    }

    fn empty_block_here(&self) -> BlockStatement {
        BlockStatement {
            range: Range::new(self.current.offset, self.current.offset),
            statements: Vec::new(),
        }
    }

    // Skips ahead to the next plausible declaration start.
    fn synchronize(&mut self) {
        loop {
            match self.current.kind {
                TokenKind::Eof
                | TokenKind::Enum
                | TokenKind::Union
                | TokenKind::Struct
                | TokenKind::Let
                | TokenKind::Func => break,
                _ => self.advance(),
            }
        }
    }

    // Declarations

    fn parse_declaration(&mut self) -> Option<Node> {
        match self.current.kind {
            TokenKind::Enum => self.parse_enum().map(Node::Enum),
            TokenKind::Union => self.parse_union().map(Node::Union),
            TokenKind::Struct => self.parse_struct().map(Node::Struct),
            TokenKind::Let => self.parse_let().map(Node::Let),
            TokenKind::Func => self.parse_func().map(Node::Func),
            _ => None,
        }
    }

    fn parse_let(&mut self) -> Option<LetStatement> {
        let start = self.current.offset;
        if !self.expect_next(TokenKind::Ident, "Expected variable name") {
            return None;
        }
        let name = Identifier {
            range: self.current_range(),
            name: self.current.literal.clone(),
        };
        if !self.expect_next(TokenKind::Assign, "Expected '='") {
            return None;
        }
        self.advance(); // onto the first value token
        let value = self.parse_expression(Precedence::Lowest);
        if value.is_none() {
            self.error_at_current("Expected expression");
        }
        Some(LetStatement {
            range: Range::new(start, self.current.end_offset()),
            name,
            value,
        })
    }

    fn parse_func(&mut self) -> Option<Func> {
        let start = self.current.offset;
        if !self.expect_next(TokenKind::Ident, "Expected function name") {
            return None;
        }
        let name = self.current.literal.clone();
        self.advance(); // past the name

        let type_params = if self.current.kind == TokenKind::LAngle {
            self.parse_type_parameters()
        } else {
            Vec::new()
        };

        if !self.expect(TokenKind::LParen, "Expected function parameters") {
            return None;
        }
        let params = self.parse_func_params();

        // A return type is optional, but anything that is not the body must
        // be a type.
        let mut return_type = None;
        if self.current.kind != TokenKind::LBrace && self.current.kind != TokenKind::Eof {
            return_type = self.parse_type();
            if return_type.is_none() {
                self.error_at_current("Expected type");
                self.advance();
            }
        }

        let mut body = None;
        if self.expect(TokenKind::LBrace, "Expected '{'") {
            body = Some(self.parse_block_statement());
        }

        let end = if body.is_some() {
            self.current.end_offset()
        } else {
            self.prev_end
        };
        Some(Func {
            range: Range::new(start, end),
            name,
            type_params,
            params,
            return_type,
            body,
        })
    }

    // Current token is the opening `(`. Leaves the cursor on the token after
    // the closing `)`.
    fn parse_func_params(&mut self) -> Vec<Parameter> {
        let mut params = Vec::new();

        if self.peek.kind == TokenKind::RParen {
            self.advance(); // eat (
            self.advance(); // eat )
            return params;
        }

        self.advance(); // eat (
        while self.current.kind != TokenKind::Eof && self.current.kind != TokenKind::RParen {
            if self.current.kind != TokenKind::Ident {
                self.error_at_current("Expected parameter name");
                self.advance();
                continue;
            }

            let start = self.current.offset;
            let name = self.current.literal.clone();
            self.advance();

            let ty = self.parse_type();
            if ty.is_none() {
                self.error_at_current("Expected parameter type");
            }

            params.push(Parameter {
                range: Range::new(start, self.prev_end),
                name,
                ty,
                default: None,
            });

            if self.current.kind != TokenKind::Comma && self.current.kind != TokenKind::RParen {
                self.error_at_current("Expected ',' or ')'");
                self.advance();
            }
            if self.current.kind == TokenKind::Comma {
                self.advance();
            }
            if self.current.kind == TokenKind::RParen {
                break;
            }
        }
        self.advance(); // eat )

        params
    }

    // Current token is the opening `<`. Leaves the cursor on the token after
    // the closing `>`.
    fn parse_type_parameters(&mut self) -> Vec<TypeParameter> {
        self.advance(); // eat <
        let mut params = Vec::new();

        while self.current.kind != TokenKind::Eof && self.current.kind != TokenKind::RAngle {
            if self.current.kind != TokenKind::Ident {
                self.error_at_current("Expected type parameter");
                self.advance();
                continue;
            }

            params.push(TypeParameter {
                range: self.current_range(),
                name: self.current.literal.clone(),
            });
            self.advance();

            if self.current.kind == TokenKind::RAngle {
                break;
            }
            if self.current.kind != TokenKind::Comma {
                self.error_at_current("Expected ','");
            }
            self.advance();
        }
        self.advance(); // eat >

        params
    }

    fn parse_enum(&mut self) -> Option<Enum> {
        let start = self.current.offset;
        if !self.expect_next(TokenKind::Ident, "Expected name") {
            return None;
        }
        let name = self.current.literal.clone();

        if !self.expect_next(TokenKind::LBrace, "Expected '{'") {
            self.advance();
        }

        let mut members = Vec::new();
        let mut next_value: i64 = 0;
        while self.current.kind != TokenKind::Eof && self.current.kind != TokenKind::RBrace {
            if let Some(mut member) = self.parse_enum_member() {
                match &member.value {
                    Some(Expression::Integer(lit)) => {
                        member.int_value = lit.value;
                        next_value = lit.value + 1;
                    }
                    _ => {
                        member.int_value = next_value;
                        next_value += 1;
                    }
                }
                members.push(member);
            }
            self.advance();
        }

        Some(Enum {
            range: Range::new(start, self.current.end_offset()),
            name,
            members,
        })
    }

    // Members end on their comma; a missing comma is reported but the member
    // is kept.
    fn parse_enum_member(&mut self) -> Option<EnumMember> {
        if self.current.kind != TokenKind::Ident {
            return None;
        }

        let start = self.current.offset;
        let name = self.current.literal.clone();

        let mut value = None;
        if self.peek.kind == TokenKind::Assign {
            self.advance(); // onto =
            self.advance(); // onto the value
            match self.current.kind {
                TokenKind::String => value = self.parse_string_literal(),
                TokenKind::Int => value = self.parse_integer_literal(),
                _ => {
                    self.error_at_current("Expected an int or string value");
                    self.advance();
                }
            }
        }

        let end = self.current.end_offset();
        if !self.expect_next(TokenKind::Comma, "Missing comma") {
            self.advance();
        }

        Some(EnumMember {
            range: Range::new(start, end),
            name,
            int_value: 0,
            value,
        })
    }

    fn parse_union(&mut self) -> Option<Union> {
        let start = self.current.offset;
        if !self.expect_next(TokenKind::Ident, "Expected name") {
            return None;
        }
        let name = self.current.literal.clone();
        self.advance(); // past the name

        let parameters = if self.current.kind == TokenKind::LAngle {
            self.parse_type_parameters()
        } else {
            Vec::new()
        };

        if self.expect(TokenKind::LBrace, "Expected '{'") {
            self.advance(); // eat {
        }

        let mut fields = Vec::new();
        while self.current.kind != TokenKind::Eof && self.current.kind != TokenKind::RBrace {
            if let Some(field) = self.parse_union_field() {
                fields.push(field);
            }
            if self.current.kind == TokenKind::RBrace {
                break;
            }
            if self.current.kind != TokenKind::Comma {
                self.error_at_current("Expected ','");
            }
            self.advance();
        }

        Some(Union {
            range: Range::new(start, self.current.end_offset()),
            name,
            parameters,
            fields,
        })
    }

    fn parse_union_field(&mut self) -> Option<UnionField> {
        if self.current.kind != TokenKind::Ident {
            return None;
        }

        let start = self.current.offset;
        let name = self.current.literal.clone();
        self.advance();

        let mut payload = None;
        if self.current.kind == TokenKind::LParen {
            self.advance(); // eat (
            payload = self.parse_type();
            if payload.is_none() {
                self.error_at_current("Expected type");
            }
            if self.expect(TokenKind::RParen, "Expected ')'") {
                self.advance(); // eat )
            }
        }

        Some(UnionField {
            range: Range::new(start, self.prev_end),
            name,
            payload,
        })
    }

    fn parse_struct(&mut self) -> Option<Struct> {
        let start = self.current.offset;
        if !self.expect_next(TokenKind::Ident, "Expected name") {
            return None;
        }
        let name = self.current.literal.clone();
        self.advance(); // past the name

        let parameters = if self.current.kind == TokenKind::LAngle {
            self.parse_type_parameters()
        } else {
            Vec::new()
        };

        if self.expect(TokenKind::LBrace, "Expected '{'") {
            self.advance(); // eat {
        }

        let mut fields = Vec::new();
        while self.current.kind != TokenKind::Eof && self.current.kind != TokenKind::RBrace {
            if let Some(field) = self.parse_struct_field() {
                fields.push(field);
            }
            if self.current.kind == TokenKind::RBrace {
                break;
            }
            if self.current.kind == TokenKind::Comma {
                self.advance();
                continue;
            }
            self.error_at_current("Expected ',' or '}'");
            self.advance();
        }

        Some(Struct {
            range: Range::new(start, self.current.end_offset()),
            name,
            parameters,
            fields,
        })
    }

    fn parse_struct_field(&mut self) -> Option<StructField> {
        if self.current.kind != TokenKind::Ident {
            return None;
        }

        let start = self.current.offset;
        let name = self.current.literal.clone();
        self.advance(); // eat the name

        if !self.expect(TokenKind::Colon, "Expected ':'") {
            return None;
        }
        self.advance(); // eat :

        let Some(ty) = self.parse_type() else {
            self.error_at_current("Expected type");
            return None;
        };

        Some(StructField {
            range: Range::new(start, self.prev_end),
            name,
            ty,
        })
    }

    // Statements

    fn parse_statement(&mut self) -> Option<Node> {
        match self.current.kind {
            TokenKind::Return => Some(Node::Return(self.parse_return_statement())),
            TokenKind::Let => self.parse_let().map(Node::Let),
            TokenKind::If => Some(Node::If(self.parse_if_statement())),
            TokenKind::Loop => Some(Node::Loop(self.parse_loop_statement())),
            TokenKind::For => Some(Node::For(self.parse_for_statement())),
            TokenKind::Break => Some(Node::Break(BreakStatement {
                range: self.current_range(),
            })),
            TokenKind::Continue => Some(Node::Continue(ContinueStatement {
                range: self.current_range(),
            })),
            TokenKind::LBrace => Some(Node::Block(self.parse_block_statement())),
            _ => None,
        }
    }

    // Current token is `{`. Leaves the cursor on the closing `}`.
    fn parse_block_statement(&mut self) -> BlockStatement {
        let start = self.current.offset;
        self.advance(); // eat {

        let mut statements = Vec::new();
        while self.current.kind != TokenKind::Eof && self.current.kind != TokenKind::RBrace {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.advance();
        }

        BlockStatement {
            range: Range::new(start, self.current.end_offset()),
            statements,
        }
    }

    fn parse_return_statement(&mut self) -> ReturnStatement {
        let start = self.current.offset;
        let mut value = None;
        if !matches!(
            self.peek.kind,
            TokenKind::RBrace | TokenKind::Semicolon | TokenKind::Eof
        ) {
            self.advance();
            value = self.parse_expression(Precedence::Lowest);
        }
        ReturnStatement {
            range: Range::new(start, self.current.end_offset()),
            value,
        }
    }

    fn parse_if_statement(&mut self) -> If {
        let start = self.current.offset;
        self.advance(); // past 'if'

        let condition = self.parse_expression(Precedence::Lowest);
        if condition.is_none() {
            self.error_at_current("Expected condition");
        }

        let then = self.parse_attached_block();

        let mut otherwise = None;
        if self.peek.kind == TokenKind::Else {
            self.advance(); // onto 'else'
            if self.peek.kind == TokenKind::If {
                self.advance(); // onto 'if'
                otherwise = Some(Else::If(Box::new(self.parse_if_statement())));
            } else if self.expect_next(TokenKind::LBrace, "Expected '{'") {
                otherwise = Some(Else::Block(self.parse_block_statement()));
            }
        }

        If {
            range: Range::new(start, self.current.end_offset()),
            condition,
            then,
            otherwise,
        }
    }

    fn parse_loop_statement(&mut self) -> Loop {
        let start = self.current.offset;
        let body = if self.expect_next(TokenKind::LBrace, "Expected '{'") {
            self.parse_block_statement()
        } else {
            self.empty_block_here()
        };
        Loop {
            range: Range::new(start, self.current.end_offset()),
            body,
        }
    }

    fn parse_for_statement(&mut self) -> For {
        let start = self.current.offset;
        self.advance(); // past 'for'

        let condition = self.parse_expression(Precedence::Lowest);
        if condition.is_none() {
            self.error_at_current("Expected condition");
        }

        let body = self.parse_attached_block();

        For {
            range: Range::new(start, self.current.end_offset()),
            condition,
            body,
        }
    }

    // The block following a condition: usually at peek, but already at the
    // current token when the condition failed to parse.
    fn parse_attached_block(&mut self) -> BlockStatement {
        if self.current.kind == TokenKind::LBrace {
            self.parse_block_statement()
        } else if self.expect_next(TokenKind::LBrace, "Expected '{'") {
            self.parse_block_statement()
        } else {
            self.empty_block_here()
        }
    }

    // Types

    /// Parses a type starting at the current token; on success the cursor is
    /// left on the first token after it. Callers report their own message
    /// when `None` comes back.
    fn parse_type(&mut self) -> Option<Type> {
        match self.current.kind {
            TokenKind::LBrace => self.parse_struct_body().map(Type::StructBody),
            TokenKind::TypeInt | TokenKind::TypeString | TokenKind::TypeBool => {
                let literal = TypeLiteral {
                    range: self.current_range(),
                    name: self.current.literal.clone(),
                };
                self.advance();
                Some(Type::Literal(literal))
            }
            TokenKind::Ident => {
                let start = self.current.offset;
                let name = self.current.literal.clone();
                self.advance(); // eat the name

                let parameters = if self.current.kind == TokenKind::LAngle {
                    self.parse_type_parameters()
                } else {
                    Vec::new()
                };

                Some(Type::Identifier(TypeIdentifier {
                    range: Range::new(start, self.prev_end),
                    name,
                    parameters,
                }))
            }
            _ => None,
        }
    }

    // Current token is `{`. Leaves the cursor on the token after the closing
    // `}` — this is the inline-type form, not the block statement.
    fn parse_struct_body(&mut self) -> Option<StructBody> {
        let start = self.current.offset;
        self.advance(); // eat {

        let mut fields = Vec::new();
        while self.current.kind != TokenKind::Eof && self.current.kind != TokenKind::RBrace {
            if let Some(field) = self.parse_struct_field() {
                fields.push(field);
            }
            if self.current.kind == TokenKind::RBrace {
                break;
            }
            if self.current.kind == TokenKind::Comma {
                self.advance();
                continue;
            }
            self.error_at_current("Expected ',' or '}'");
            self.advance();
        }

        let end = self.current.end_offset();
        self.advance(); // eat }

        Some(StructBody {
            range: Range::new(start, end),
            fields,
        })
    }

    // Expressions

    fn parse_expression(&mut self, min: Precedence) -> Option<Expression> {
        if self.current.kind == TokenKind::Eof {
            self.error_at_current("Unexpected EOF, expected expression");
            return None;
        }

        let mut left = self.parse_prefix()?;

        // Climb while the next operator binds tighter than the caller.
        while self.peek.kind != TokenKind::Semicolon
            && self.peek.kind != TokenKind::RBrace
            && min < precedence::of(self.peek.kind)
        {
            self.advance(); // onto the operator
            left = if self.current.kind == TokenKind::LParen {
                self.parse_call_expression(left)
            } else {
                self.parse_binary_expression(left)
            };
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.current.kind {
            TokenKind::Int => self.parse_integer_literal(),
            TokenKind::String => self.parse_string_literal(),
            TokenKind::Bool => Some(Expression::Boolean(Boolean {
                range: self.current_range(),
                value: self.current.literal == "true",
            })),
            TokenKind::Ident => Some(Expression::Identifier(Identifier {
                range: self.current_range(),
                name: self.current.literal.clone(),
            })),
            TokenKind::Minus | TokenKind::Bang => self.parse_unary_expression(),
            TokenKind::LParen => self.parse_paren_expression(),
            _ => None,
        }
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match convert_int_literal(&self.current.literal) {
            Some(value) => Some(Expression::Integer(IntegerLiteral {
                range: self.current_range(),
                value,
            })),
            None => {
                self.error_at_current("Invalid integer literal");
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        // Drop the surrounding quotes; escapes stay as written.
        let literal = self.current.literal.as_str();
        let inner = literal.strip_prefix('"').unwrap_or(literal);
        let inner = inner.strip_suffix('"').unwrap_or(inner);
        Some(Expression::String(StringLiteral {
            range: self.current_range(),
            value: inner.to_string(),
        }))
    }

    fn parse_unary_expression(&mut self) -> Option<Expression> {
        let start = self.current.offset;
        let operator = self.current.literal.clone();
        self.advance();

        let right = self.parse_expression(Precedence::Prefix);
        if right.is_none() {
            self.error_at_current("Expected expression");
        }

        Some(Expression::Unary(UnaryExpression {
            range: Range::new(start, self.current.end_offset()),
            operator,
            right: right.map(Box::new),
        }))
    }

    // Current token is the operator; the right side binds at the operator's
    // own precedence, which keeps chains left-associative.
    fn parse_binary_expression(&mut self, left: Expression) -> Expression {
        let start = left.range().start_byte;
        let operator = self.current.literal.clone();
        let prec = precedence::of(self.current.kind);
        self.advance();

        let right = self.parse_expression(prec);
        if right.is_none() {
            self.error_at_current("Expected expression");
        }

        Expression::Binary(BinaryExpression {
            range: Range::new(start, self.current.end_offset()),
            operator,
            left: Box::new(left),
            right: right.map(Box::new),
        })
    }

    fn parse_paren_expression(&mut self) -> Option<Expression> {
        let start = self.current.offset;
        self.advance(); // eat (

        let inner = self.parse_expression(Precedence::Lowest);

        if !self.expect_next(TokenKind::RParen, "Expected ')'") {
            return None;
        }

        Some(Expression::Paren(ParenExpression {
            range: Range::new(start, self.current.end_offset()),
            expression: inner.map(Box::new),
        }))
    }

    fn parse_call_expression(&mut self, callee: Expression) -> Expression {
        let start = callee.range().start_byte;
        let arguments = self.parse_call_arguments();
        Expression::Call(CallExpression {
            range: Range::new(start, self.current.end_offset()),
            callee: Box::new(callee),
            arguments,
        })
    }

    // Current token is `(`. Leaves the cursor on `)`.
    fn parse_call_arguments(&mut self) -> Vec<Expression> {
        let mut args = Vec::new();

        if self.peek.kind == TokenKind::RParen {
            self.advance(); // onto )
            return args;
        }

        self.advance(); // onto the first argument
        if let Some(arg) = self.parse_expression(Precedence::Lowest) {
            args.push(arg);
        }

        while self.peek.kind == TokenKind::Comma {
            self.advance(); // onto ,
            self.advance(); // onto the next argument
            if let Some(arg) = self.parse_expression(Precedence::Lowest) {
                args.push(arg);
            }
        }

        self.expect_next(TokenKind::RParen, "Expected ')'");

        args
    }
}

// Decimal i64 with underscores allowed only between digits, so `1_000`
// converts while `1_` and `1__0` are rejected.
fn convert_int_literal(literal: &str) -> Option<i64> {
    let bytes = literal.as_bytes();
    if bytes.is_empty() {
        return None;
    }

    let mut value: i64 = 0;
    let mut prev_digit = false;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'0'..=b'9' => {
                value = value
                    .checked_mul(10)?
                    .checked_add(i64::from(b - b'0'))?;
                prev_digit = true;
            }
            b'_' => {
                if !prev_digit || !bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit()) {
                    return None;
                }
                prev_digit = false;
            }
            _ => return None,
        }
    }
    Some(value)
}
