//! Grammar description front end: lexer and parser.

pub mod lexeme;
pub(crate) mod lexer;
pub(crate) mod parser;

use crate::diagnostic::Diagnostic;
use crate::grammar::Grammar;

use lexer::Lexer;
use parser::Parser;

/// A parsed grammar file: the frozen grammar plus the text copied around the
/// generated matcher.
#[derive(Debug)]
pub struct ParsedGrammar {
    pub grammar: Grammar,
    pub prologue: String,
    pub epilogue: String,
}

/// Lex and parse `source` into a frozen grammar.
pub fn parse(source: &str) -> Result<ParsedGrammar, Vec<Diagnostic>> {
    let (tokens, lex_diags) = Lexer::new(source).tokenize();
    if !lex_diags.is_empty() {
        return Err(lex_diags);
    }
    Parser::new(source, tokens).parse_file()
}
