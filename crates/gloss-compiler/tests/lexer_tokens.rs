use gloss_compiler::{Lexer, Token, TokenKind};

fn lex(input: &str) -> Vec<Token> {
    let (tokens, _) = Lexer::new(input.as_bytes()).tokenize();
    tokens
}

fn kinds(tokens: &[Token]) -> Vec<(TokenKind, String)> {
    tokens
        .iter()
        .map(|t| (t.kind, t.literal.clone()))
        .collect()
}

fn tok(kind: TokenKind, literal: &str) -> (TokenKind, String) {
    (kind, literal.to_string())
}

#[test]
fn math_tokens() {
    use TokenKind::*;
    assert_eq!(
        kinds(&lex("+=-*/%.")),
        vec![
            tok(Plus, "+"),
            tok(Assign, "="),
            tok(Minus, "-"),
            tok(Mul, "*"),
            tok(Div, "/"),
            tok(Mod, "%"),
            tok(Period, "."),
            tok(Eof, ""),
        ]
    );
}

#[test]
fn bracket_tokens() {
    use TokenKind::*;
    assert_eq!(
        kinds(&lex("(){}<>[]")),
        vec![
            tok(LParen, "("),
            tok(RParen, ")"),
            tok(LBrace, "{"),
            tok(RBrace, "}"),
            tok(LAngle, "<"),
            tok(RAngle, ">"),
            tok(LBracket, "["),
            tok(RBracket, "]"),
            tok(Eof, ""),
        ]
    );
}

#[test]
fn compound_operators() {
    use TokenKind::*;
    assert_eq!(
        kinds(&lex("== != <= >= && || << >> ! & | ^ ~")),
        vec![
            tok(Eq, "=="),
            tok(NotEq, "!="),
            tok(LtEq, "<="),
            tok(GtEq, ">="),
            tok(And, "&&"),
            tok(Or, "||"),
            tok(ShiftL, "<<"),
            tok(ShiftR, ">>"),
            tok(Bang, "!"),
            tok(BitAnd, "&"),
            tok(BitOr, "|"),
            tok(BitXor, "^"),
            tok(BitNot, "~"),
            tok(Eof, ""),
        ]
    );
}

#[test]
fn keyword_tokens() {
    use TokenKind::*;
    let input =
        "use enum union struct extern if else switch case default for loop continue break return let fn foo #";
    assert_eq!(
        kinds(&lex(input)),
        vec![
            tok(Import, "use"),
            tok(Enum, "enum"),
            tok(Union, "union"),
            tok(Struct, "struct"),
            tok(Extern, "extern"),
            tok(If, "if"),
            tok(Else, "else"),
            tok(Switch, "switch"),
            tok(Case, "case"),
            tok(Default, "default"),
            tok(For, "for"),
            tok(Loop, "loop"),
            tok(Continue, "continue"),
            tok(Break, "break"),
            tok(Return, "return"),
            tok(Let, "let"),
            tok(Func, "fn"),
            tok(Ident, "foo"),
            tok(Illegal, "#"),
            tok(Eof, ""),
        ]
    );
}

#[test]
fn type_and_bool_keywords() {
    use TokenKind::*;
    assert_eq!(
        kinds(&lex("int string bool true false")),
        vec![
            tok(TypeInt, "int"),
            tok(TypeString, "string"),
            tok(TypeBool, "bool"),
            tok(Bool, "true"),
            tok(Bool, "false"),
            tok(Eof, ""),
        ]
    );
}

#[test]
fn integer_literal_tokens() {
    use TokenKind::*;
    let input = "
    0
    100
    1_000
    1_000_000
    1_
    1__0
    ";
    assert_eq!(
        kinds(&lex(input)),
        vec![
            tok(Int, "0"),
            tok(Int, "100"),
            tok(Int, "1_000"),
            tok(Int, "1_000_000"),
            // Malformed runs still tokenize; a later stage rejects them.
            tok(Int, "1_"),
            tok(Int, "1__0"),
            tok(Eof, ""),
        ]
    );
}

#[test]
fn string_literal_tokens() {
    use TokenKind::*;
    let input = r#""hello world" "with \"quoted\"""#;
    assert_eq!(
        kinds(&lex(input)),
        vec![
            tok(String, r#""hello world""#),
            tok(String, r#""with \"quoted\"""#),
            tok(Eof, ""),
        ]
    );
}

#[test]
fn unterminated_string_reports_at_opening_quote() {
    let (tokens, diagnostics) = Lexer::new(b"  \"abc").tokenize();
    assert_eq!(
        kinds(&tokens),
        vec![tok(TokenKind::String, "\"abc"), tok(TokenKind::Eof, "")]
    );
    assert!(diagnostics.has_errors());
    let diag = &diagnostics.messages()[0];
    assert_eq!(diag.text, "Unterminated string literal");
    assert_eq!((diag.line, diag.column), (0, 2));
}

#[test]
fn basic_elements() {
    use TokenKind::*;
    assert_eq!(
        kinds(&lex("<div><hr/><custom /></div>")),
        vec![
            tok(ElemOpenStart, "<"),
            tok(ElemIdent, "div"),
            tok(ElemOpenEnd, ">"),
            tok(ElemOpenStart, "<"),
            tok(ElemIdent, "hr"),
            tok(ElemVoidEnd, "/>"),
            tok(ElemOpenStart, "<"),
            tok(ElemIdent, "custom"),
            tok(ElemVoidEnd, "/>"),
            tok(ElemCloseStart, "</"),
            tok(ElemIdent, "div"),
            tok(ElemCloseEnd, ">"),
            tok(Eof, ""),
        ]
    );
}

#[test]
fn element_with_bare_attribute() {
    use TokenKind::*;
    assert_eq!(
        kinds(&lex("<input disabled />")),
        vec![
            tok(ElemOpenStart, "<"),
            tok(ElemIdent, "input"),
            tok(ElemAttr, "disabled"),
            tok(ElemVoidEnd, "/>"),
            tok(Eof, ""),
        ]
    );
}

#[test]
fn elements_with_attribute_values() {
    use TokenKind::*;
    let input = r#"<button type="submit"></button><button type="reset" disabled></button>"#;
    assert_eq!(
        kinds(&lex(input)),
        vec![
            tok(ElemOpenStart, "<"),
            tok(ElemIdent, "button"),
            tok(ElemAttr, "type"),
            tok(Assign, "="),
            tok(String, "\"submit\""),
            tok(ElemOpenEnd, ">"),
            tok(ElemCloseStart, "</"),
            tok(ElemIdent, "button"),
            tok(ElemCloseEnd, ">"),
            tok(ElemOpenStart, "<"),
            tok(ElemIdent, "button"),
            tok(ElemAttr, "type"),
            tok(Assign, "="),
            tok(String, "\"reset\""),
            tok(ElemAttr, "disabled"),
            tok(ElemOpenEnd, ">"),
            tok(ElemCloseStart, "</"),
            tok(ElemIdent, "button"),
            tok(ElemCloseEnd, ">"),
            tok(Eof, ""),
        ]
    );
}

#[test]
fn elements_with_inner_content() {
    use TokenKind::*;
    assert_eq!(
        kinds(&lex("<h1>Hello, <b>World</b>!</h1>")),
        vec![
            tok(ElemOpenStart, "<"),
            tok(ElemIdent, "h1"),
            tok(ElemOpenEnd, ">"),
            tok(ElemText, "Hello, "),
            tok(ElemOpenStart, "<"),
            tok(ElemIdent, "b"),
            tok(ElemOpenEnd, ">"),
            tok(ElemText, "World"),
            tok(ElemCloseStart, "</"),
            tok(ElemIdent, "b"),
            tok(ElemCloseEnd, ">"),
            tok(ElemText, "!"),
            tok(ElemCloseStart, "</"),
            tok(ElemIdent, "h1"),
            tok(ElemCloseEnd, ">"),
            tok(Eof, ""),
        ]
    );
}

#[test]
fn elements_with_inner_expressions() {
    use TokenKind::*;
    let input = r#"<h1>{message}</h1><button type="button" disabled={true}>Hello, {name}!</button>"#;
    assert_eq!(
        kinds(&lex(input)),
        vec![
            tok(ElemOpenStart, "<"),
            tok(ElemIdent, "h1"),
            tok(ElemOpenEnd, ">"),
            tok(LBrace, "{"),
            tok(Ident, "message"),
            tok(RBrace, "}"),
            tok(ElemCloseStart, "</"),
            tok(ElemIdent, "h1"),
            tok(ElemCloseEnd, ">"),
            tok(ElemOpenStart, "<"),
            tok(ElemIdent, "button"),
            tok(ElemAttr, "type"),
            tok(Assign, "="),
            tok(String, "\"button\""),
            tok(ElemAttr, "disabled"),
            tok(Assign, "="),
            tok(LBrace, "{"),
            tok(Bool, "true"),
            tok(RBrace, "}"),
            tok(ElemOpenEnd, ">"),
            tok(ElemText, "Hello, "),
            tok(LBrace, "{"),
            tok(Ident, "name"),
            tok(RBrace, "}"),
            tok(ElemText, "!"),
            tok(ElemCloseStart, "</"),
            tok(ElemIdent, "button"),
            tok(ElemCloseEnd, ">"),
            tok(Eof, ""),
        ]
    );
}

#[test]
fn element_hole_returns_to_code_lexing() {
    use TokenKind::*;
    assert_eq!(
        kinds(&lex("<div>{ total + 1 }</div>")),
        vec![
            tok(ElemOpenStart, "<"),
            tok(ElemIdent, "div"),
            tok(ElemOpenEnd, ">"),
            tok(LBrace, "{"),
            tok(Ident, "total"),
            tok(Plus, "+"),
            tok(Int, "1"),
            tok(RBrace, "}"),
            tok(ElemCloseStart, "</"),
            tok(ElemIdent, "div"),
            tok(ElemCloseEnd, ">"),
            tok(Eof, ""),
        ]
    );
}

#[test]
fn namespaced_element_ident() {
    use TokenKind::*;
    assert_eq!(
        kinds(&lex("<ui.button />")),
        vec![
            tok(ElemOpenStart, "<"),
            tok(ElemIdent, "ui.button"),
            tok(ElemVoidEnd, "/>"),
            tok(Eof, ""),
        ]
    );
}

#[test]
fn generic_parameter_list_is_not_a_tag() {
    use TokenKind::*;
    assert_eq!(
        kinds(&lex("fn join<T>(a T, b T) T { }")),
        vec![
            tok(Func, "fn"),
            tok(Ident, "join"),
            tok(LAngle, "<"),
            tok(Ident, "T"),
            tok(RAngle, ">"),
            tok(LParen, "("),
            tok(Ident, "a"),
            tok(Ident, "T"),
            tok(Comma, ","),
            tok(Ident, "b"),
            tok(Ident, "T"),
            tok(RParen, ")"),
            tok(Ident, "T"),
            tok(LBrace, "{"),
            tok(RBrace, "}"),
            tok(Eof, ""),
        ]
    );
}

#[test]
fn element_after_assignment_is_a_tag() {
    use TokenKind::*;
    assert_eq!(
        kinds(&lex("let view = <div></div>")),
        vec![
            tok(Let, "let"),
            tok(Ident, "view"),
            tok(Assign, "="),
            tok(ElemOpenStart, "<"),
            tok(ElemIdent, "div"),
            tok(ElemOpenEnd, ">"),
            tok(ElemCloseStart, "</"),
            tok(ElemIdent, "div"),
            tok(ElemCloseEnd, ">"),
            tok(Eof, ""),
        ]
    );
}

#[test]
fn comparison_between_identifiers_stays_code() {
    use TokenKind::*;
    assert_eq!(
        kinds(&lex("a < b")),
        vec![
            tok(Ident, "a"),
            tok(LAngle, "<"),
            tok(Ident, "b"),
            tok(Eof, ""),
        ]
    );
}

#[test]
fn tokenize_is_total_over_arbitrary_bytes() {
    let (tokens, _) = Lexer::new(b"@ $ ; ?").tokenize();
    let eofs = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Eof)
        .count();
    assert_eq!(eofs, 1);
    assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    for tok in &tokens[..tokens.len() - 1] {
        assert_eq!(tok.kind, TokenKind::Illegal);
    }
}

fn assert_positions(input: &str) {
    let source = input.as_bytes();
    let (tokens, _) = Lexer::new(source).tokenize();
    for tok in &tokens {
        if tok.kind == TokenKind::Eof {
            continue;
        }
        let end = tok.offset + tok.literal.len();
        assert_eq!(
            &source[tok.offset..end],
            tok.literal.as_bytes(),
            "literal slice mismatch for {tok:?}"
        );
        let line = source[..tok.offset].iter().filter(|&&b| b == b'\n').count();
        let line_start = source[..tok.offset]
            .iter()
            .rposition(|&b| b == b'\n')
            .map(|p| p + 1)
            .unwrap_or(0);
        assert_eq!(
            (tok.line, tok.column),
            (line, tok.offset - line_start),
            "position mismatch for {tok:?}"
        );
    }
}

#[test]
fn token_positions_match_source() {
    assert_positions("let one = 1\nfn add(a int) int {\n    return a + 1\n}\n");
}

#[test]
fn token_positions_in_elements() {
    assert_positions("let view = <div>\n  Hello, {name}\n  <hr/>\n</div>");
}
