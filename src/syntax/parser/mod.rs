//! Recursive-descent parser for grammar descriptions.
//!
//! Syntax errors are collected and the parser resynchronises at the next
//! `;`. Errors from the grammar builder (redefinitions, arity clashes,
//! undefined terminals) stop parsing at the first one, since later rules
//! would only repeat them.

mod items;


use crate::diagnostic::Diagnostic;
use crate::grammar::GrammarBuilder;
use crate::span::{Span, Spanned};
use crate::syntax::lexeme::Lexeme;
use crate::syntax::ParsedGrammar;

const MAX_NESTING_DEPTH: u32 = 256;

pub(crate) struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Spanned<Lexeme>>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    depth: u32,
    builder: GrammarBuilder,
    prologue: String,
    epilogue: String,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(source: &'src str, tokens: Vec<Spanned<Lexeme>>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            diagnostics: Vec::new(),
            depth: 0,
            builder: GrammarBuilder::new(),
            prologue: String::new(),
            epilogue: String::new(),
        }
    }

    pub(crate) fn parse_file(mut self) -> Result<ParsedGrammar, Vec<Diagnostic>> {
        if let Err(diag) = self.parse_declarations() {
            self.diagnostics.push(diag);
            return Err(self.diagnostics);
        }

        if self.expect(&Lexeme::Separator).is_none() {
            if let Some(diag) = self.diagnostics.last_mut() {
                diag.help = Some("rules start after a `%%` line".to_string());
            }
            return Err(self.diagnostics);
        }

        if let Err(diag) = self.parse_rules() {
            self.diagnostics.push(diag);
            return Err(self.diagnostics);
        }

        if let Lexeme::Epilogue(text) = self.peek().clone() {
            self.epilogue = text;
            self.advance();
        }
        if !self.at(&Lexeme::Eof) {
            self.error_at_current(&format!("expected end of file, found {}", self.peek().description()));
        }

        if !self.diagnostics.is_empty() {
            return Err(self.diagnostics);
        }
        let grammar = self.builder.finish()?;
        Ok(ParsedGrammar {
            grammar,
            prologue: self.prologue,
            epilogue: self.epilogue,
        })
    }

    fn enter_nesting(&mut self) -> bool {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            self.error_with_help(
                "pattern nesting depth exceeded (maximum 256 levels)",
                "split the pattern into several rules joined by a nonterminal",
            );
            return false;
        }
        true
    }

    fn exit_nesting(&mut self) {
        self.depth -= 1;
    }

    /// Skip past the next `;`, or up to the end of the rules section.
    fn recover(&mut self) {
        loop {
            match self.peek() {
                Lexeme::Semicolon => {
                    self.advance();
                    return;
                }
                Lexeme::Epilogue(_) | Lexeme::Eof => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // --- Utility methods ---

    fn peek(&self) -> &Lexeme {
        &self.tokens[self.pos].node
    }

    fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    fn advance(&mut self) -> &Spanned<Lexeme> {
        let tok = &self.tokens[self.pos];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, token: &Lexeme) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    fn eat(&mut self, token: &Lexeme) -> bool {
        if self.at(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Lexeme) -> Option<Span> {
        if self.at(token) {
            let span = self.current_span();
            self.advance();
            Some(span)
        } else {
            self.error_at_current(&format!(
                "expected {}, found {}",
                token.description(),
                self.peek().description()
            ));
            None
        }
    }

    fn try_ident(&mut self) -> Option<Spanned<String>> {
        if let Lexeme::Ident(name) = self.peek().clone() {
            let span = self.current_span();
            self.advance();
            Some(Spanned::new(name, span))
        } else {
            None
        }
    }

    fn error_at_current(&mut self, msg: &str) {
        self.diagnostics
            .push(Diagnostic::error(msg.to_string(), self.current_span()));
    }

    fn error_with_help(&mut self, msg: &str, help: &str) {
        self.diagnostics.push(
            Diagnostic::error(msg.to_string(), self.current_span()).with_help(help.to_string()),
        );
    }
}
