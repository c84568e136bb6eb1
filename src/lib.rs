//! treeburg: a bottom-up rewrite system (BURS) tree-pattern-matcher
//! generator.
//!
//! A grammar of tree patterns over operator terminals, each rule carrying a
//! cost, is compiled into C that labels every node of an expression tree
//! with the cheapest rule deriving each nonterminal, then lets the host walk
//! that labeling to emit instructions.

pub mod api;
pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod grammar;
pub mod span;
pub mod syntax;

pub use api::*;
pub use config::GenOptions;
pub use syntax::ParsedGrammar;

use diagnostic::{render_diagnostics, Diagnostic};

/// Parse grammar source, rendering any errors to stderr.
pub fn parse_grammar(source: &str, filename: &str) -> Result<ParsedGrammar, Vec<Diagnostic>> {
    match syntax::parse(source) {
        Ok(parsed) => Ok(parsed),
        Err(errors) => {
            render_diagnostics(&errors, filename, source);
            Err(errors)
        }
    }
}

pub fn parse_grammar_silent(source: &str) -> Result<ParsedGrammar, Vec<Diagnostic>> {
    syntax::parse(source)
}
