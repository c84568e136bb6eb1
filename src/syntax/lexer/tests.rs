use super::*;

fn lex(source: &str) -> Vec<Lexeme> {
    let (tokens, diags) = Lexer::new(source).tokenize();
    assert!(diags.is_empty(), "lex errors: {:?}", diags);
    tokens.into_iter().map(|t| t.node).collect()
}

fn ident(s: &str) -> Lexeme {
    Lexeme::Ident(s.to_string())
}

#[test]
fn test_term_declarations() {
    assert_eq!(
        lex("%term leaf = 1 plus=2"),
        vec![
            Lexeme::Term,
            ident("leaf"),
            Lexeme::Eq,
            Lexeme::Integer(1),
            ident("plus"),
            Lexeme::Eq,
            Lexeme::Integer(2),
            Lexeme::Eof,
        ]
    );
}

#[test]
fn test_rule_tokens() {
    assert_eq!(
        lex("%%\nreg: plus(reg, reg) \"add %0, %1\\n\" 2;"),
        vec![
            Lexeme::Separator,
            ident("reg"),
            Lexeme::Colon,
            ident("plus"),
            Lexeme::LParen,
            ident("reg"),
            Lexeme::Comma,
            ident("reg"),
            Lexeme::RParen,
            Lexeme::Str("add %0, %1\\n".to_string()),
            Lexeme::Integer(2),
            Lexeme::Semicolon,
            Lexeme::Eof,
        ]
    );
}

#[test]
fn test_string_keeps_escaped_quote() {
    assert_eq!(
        lex(r#""say \"hi\"""#),
        vec![Lexeme::Str(r#"say \"hi\""#.to_string()), Lexeme::Eof]
    );
}

#[test]
fn test_prologue_block_verbatim() {
    let toks = lex("%{\n#include \"tree.h\"\n%%\n%}\n%term x = 1");
    assert_eq!(toks[0], Lexeme::Prologue("#include \"tree.h\"\n%%\n".to_string()));
    assert_eq!(toks[1], Lexeme::Term);
}

#[test]
fn test_second_separator_captures_epilogue() {
    let toks = lex("%%\nstmt: x;\n%%\nint main(void) { return 0; }\n");
    assert_eq!(
        toks[toks.len() - 2],
        Lexeme::Epilogue("int main(void) { return 0; }\n".to_string())
    );
    assert_eq!(toks[toks.len() - 1], Lexeme::Eof);
}

#[test]
fn test_empty_epilogue() {
    let toks = lex("%%\n%%");
    assert_eq!(toks, vec![Lexeme::Separator, Lexeme::Epilogue(String::new()), Lexeme::Eof]);
}

#[test]
fn test_comments_skipped() {
    assert_eq!(
        lex("// line\nreg /* block\nspanning */ : x"),
        vec![ident("reg"), Lexeme::Colon, ident("x"), Lexeme::Eof]
    );
}

#[test]
fn test_punctuation_inside_cost() {
    assert_eq!(
        lex("(p->x)"),
        vec![
            Lexeme::LParen,
            ident("p"),
            Lexeme::Punct('-'),
            Lexeme::Punct('>'),
            ident("x"),
            Lexeme::RParen,
            Lexeme::Eof,
        ]
    );
}

#[test]
fn test_spans() {
    let (tokens, _) = Lexer::new("reg : leaf").tokenize();
    assert_eq!(tokens[0].span, Span::new(0, 3));
    assert_eq!(tokens[1].span, Span::new(4, 5));
    assert_eq!(tokens[2].span, Span::new(6, 10));
}

#[test]
fn test_unknown_directive() {
    let (tokens, diags) = Lexer::new("%start stmt").tokenize();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "unknown directive '%start'");
    assert_eq!(tokens[0].node, ident("stmt"));
}

#[test]
fn test_unterminated_string() {
    let (_, diags) = Lexer::new("\"mov %0\n;").tokenize();
    assert_eq!(diags[0].message, "unterminated string literal");
}

#[test]
fn test_unterminated_prologue_and_comment() {
    let (_, diags) = Lexer::new("%{ int x;").tokenize();
    assert!(diags[0].message.contains("missing '%}'"));
    let (_, diags) = Lexer::new("/* open").tokenize();
    assert_eq!(diags[0].message, "unterminated block comment");
}

#[test]
fn test_integer_too_large() {
    let (_, diags) = Lexer::new("99999999999999999999999").tokenize();
    assert!(diags[0].message.contains("too large"));
}
