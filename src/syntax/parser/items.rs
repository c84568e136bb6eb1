use super::Parser;
use crate::diagnostic::Diagnostic;
use crate::grammar::PatternId;
use crate::span::Spanned;
use crate::syntax::lexeme::Lexeme;

impl Parser<'_> {
    /// `%{ ... %}` blocks and `%term` lists, up to the first `%%`.
    pub(super) fn parse_declarations(&mut self) -> Result<(), Diagnostic> {
        loop {
            match self.peek().clone() {
                Lexeme::Prologue(text) => {
                    self.prologue.push_str(&text);
                    self.advance();
                }
                Lexeme::Term => {
                    self.advance();
                    self.parse_term_list()?;
                }
                _ => return Ok(()),
            }
        }
    }

    /// `name = id` pairs following `%term`.
    fn parse_term_list(&mut self) -> Result<(), Diagnostic> {
        while let Some(name) = self.try_ident() {
            if self.expect(&Lexeme::Eq).is_none() {
                continue;
            }
            let id_span = self.current_span();
            let Lexeme::Integer(n) = *self.peek() else {
                self.error_at_current(&format!(
                    "expected terminal id, found {}",
                    self.peek().description()
                ));
                continue;
            };
            self.advance();
            let Ok(id) = u32::try_from(n) else {
                self.diagnostics.push(Diagnostic::error(
                    format!("terminal id {} is out of range", n),
                    id_span,
                ));
                continue;
            };
            self.builder
                .declare_terminal(&name.node, id, name.span.merge(id_span))?;
        }
        Ok(())
    }

    /// Rules up to the epilogue or end of file.
    pub(super) fn parse_rules(&mut self) -> Result<(), Diagnostic> {
        while !self.at(&Lexeme::Epilogue(String::new())) && !self.at(&Lexeme::Eof) {
            self.parse_rule()?;
        }
        Ok(())
    }

    /// `lhs : pattern ["template"] [cost] ;`
    fn parse_rule(&mut self) -> Result<(), Diagnostic> {
        let start = self.current_span();
        let Some(lhs) = self.try_ident() else {
            self.error_at_current(&format!(
                "expected nonterminal at start of rule, found {}",
                self.peek().description()
            ));
            self.recover();
            return Ok(());
        };
        // The lhs is numbered before anything in its pattern.
        self.builder.intern_nonterminal(&lhs.node, lhs.span)?;

        if self.expect(&Lexeme::Colon).is_none() {
            self.recover();
            return Ok(());
        }
        let Some(pattern) = self.parse_pattern()? else {
            self.recover();
            return Ok(());
        };
        let template = match self.peek().clone() {
            Lexeme::Str(text) => {
                self.advance();
                Some(text)
            }
            _ => None,
        };
        let Some(cost) = self.parse_cost() else {
            self.recover();
            return Ok(());
        };
        if self.expect(&Lexeme::Semicolon).is_none() {
            self.recover();
            return Ok(());
        }

        let span = start.merge(self.prev_span());
        self.builder
            .build_rule(&lhs.node, pattern, template.as_deref(), &cost.node, span)?;
        Ok(())
    }

    /// `op`, `op(pattern)` or `op(pattern, pattern)`. `Ok(None)` after a
    /// recorded syntax error.
    fn parse_pattern(&mut self) -> Result<Option<PatternId>, Diagnostic> {
        if !self.enter_nesting() {
            return Ok(None);
        }
        let result = self.parse_pattern_inner();
        self.exit_nesting();
        result
    }

    fn parse_pattern_inner(&mut self) -> Result<Option<PatternId>, Diagnostic> {
        let Some(op) = self.try_ident() else {
            self.error_at_current(&format!(
                "expected operator or nonterminal in pattern, found {}",
                self.peek().description()
            ));
            return Ok(None);
        };

        let mut left = None;
        let mut right = None;
        if self.eat(&Lexeme::LParen) {
            let Some(l) = self.parse_pattern()? else {
                return Ok(None);
            };
            left = Some(l);
            if self.eat(&Lexeme::Comma) {
                let Some(r) = self.parse_pattern()? else {
                    return Ok(None);
                };
                right = Some(r);
            }
            if self.expect(&Lexeme::RParen).is_none() {
                return Ok(None);
            }
        }

        let span = op.span.merge(self.prev_span());
        self.builder
            .build_pattern(&op.node, left, right, span)
            .map(Some)
    }

    /// An integer, an identifier, or a parenthesised expression taken as raw
    /// source text. A missing cost is `0`.
    fn parse_cost(&mut self) -> Option<Spanned<String>> {
        let span = self.current_span();
        match self.peek().clone() {
            Lexeme::Integer(n) => {
                self.advance();
                Some(Spanned::new(n.to_string(), span))
            }
            Lexeme::Ident(name) => {
                self.advance();
                Some(Spanned::new(name, span))
            }
            Lexeme::Semicolon => Some(Spanned::new("0".to_string(), span)),
            Lexeme::LParen => self.parse_raw_cost(),
            other => {
                self.error_at_current(&format!("expected cost, found {}", other.description()));
                None
            }
        }
    }

    fn parse_raw_cost(&mut self) -> Option<Spanned<String>> {
        let open = self.current_span();
        self.advance();
        let mut depth = 1u32;
        loop {
            match self.peek() {
                Lexeme::LParen => depth += 1,
                Lexeme::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Lexeme::Semicolon | Lexeme::Epilogue(_) | Lexeme::Eof => {
                    self.diagnostics.push(
                        Diagnostic::error("unclosed '(' in cost expression".to_string(), open)
                            .with_help("cost expressions end with a matching ')'".to_string()),
                    );
                    return None;
                }
                _ => {}
            }
            self.advance();
        }
        let close = self.current_span();
        self.advance();
        let text = self.source[open.end as usize..close.start as usize].trim();
        Some(Spanned::new(text.to_string(), open.merge(close)))
    }
}
