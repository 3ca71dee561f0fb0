use gloss_compiler::{parse, GoEmitter};

fn compile(input: &str) -> String {
    let (file, diagnostics) = parse(input.as_bytes());
    assert!(
        !diagnostics.any(),
        "unexpected diagnostics for {input:?}: {:?}",
        diagnostics.messages()
    );
    let mut out = Vec::new();
    GoEmitter::new(&mut out).emit(&file).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn emit_main_func() {
    assert_eq!(compile("fn main() {}"), "package main\n\nfunc main() {}");
}

#[test]
fn emit_sum_func() {
    let input = "fn sum(a int, b int) int {\n\treturn a + b\n}";
    let want = "package main\n\nfunc sum(a int, b int) int {\n    return a + b\n}";
    assert_eq!(compile(input), want);
}

#[test]
fn emit_return_without_value() {
    let input = "fn stop() {\n\treturn\n}";
    let want = "package main\n\nfunc stop() {\n    return\n}";
    assert_eq!(compile(input), want);
}

#[test]
fn emit_unary_expression() {
    let input = "fn negate(a int) int { return -a }";
    let want = "package main\n\nfunc negate(a int) int {\n    return -a\n}";
    assert_eq!(compile(input), want);
}
