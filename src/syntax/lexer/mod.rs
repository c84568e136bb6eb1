use crate::diagnostic::Diagnostic;
use crate::span::{Span, Spanned};
use crate::syntax::lexeme::Lexeme;

pub(crate) struct Lexer<'src> {
    source: &'src str,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    /// `%%` separators seen so far; the second one ends tokenizing.
    separators: u32,
}

impl<'src> Lexer<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            diagnostics: Vec::new(),
            separators: 0,
        }
    }

    pub(crate) fn tokenize(mut self) -> (Vec<Spanned<Lexeme>>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.node == Lexeme::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        (tokens, self.diagnostics)
    }

    fn next_token(&mut self) -> Spanned<Lexeme> {
        loop {
            self.skip_whitespace_and_comments();

            if self.pos >= self.source.len() {
                return self.make_token(Lexeme::Eof, self.pos, self.pos);
            }

            let start = self.pos;
            let ch = self.bytes()[self.pos];

            if is_ident_start(ch) {
                return self.scan_ident();
            }

            if ch.is_ascii_digit() {
                return self.scan_number();
            }

            if ch == b'"' {
                return self.scan_string();
            }

            if ch == b'%' {
                if let Some(tok) = self.scan_directive(start) {
                    return tok;
                }
                // scan_directive returned None: error was recorded, try again
                continue;
            }

            return self.scan_symbol(start);
        }
    }

    fn bytes(&self) -> &'src [u8] {
        self.source.as_bytes()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.bytes().get(self.pos + 1).copied()
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
                self.pos += 1;
            }

            match (self.peek(), self.peek_next()) {
                (Some(b'/'), Some(b'/')) => {
                    while self.peek().is_some_and(|c| c != b'\n') {
                        self.pos += 1;
                    }
                }
                (Some(b'/'), Some(b'*')) => {
                    let start = self.pos;
                    match self.source[self.pos + 2..].find("*/") {
                        Some(offset) => self.pos += 2 + offset + 2,
                        None => {
                            self.pos = self.source.len();
                            self.diagnostics.push(Diagnostic::error(
                                "unterminated block comment".to_string(),
                                Span::new(start as u32, self.pos as u32),
                            ));
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_ident(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.pos += 1;
        }
        let text = &self.source[start..self.pos];
        self.make_token(Lexeme::Ident(text.to_string()), start, self.pos)
    }

    fn scan_number(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let text = &self.source[start..self.pos];
        match text.parse::<u64>() {
            Ok(n) => self.make_token(Lexeme::Integer(n), start, self.pos),
            Err(_) => {
                self.diagnostics.push(
                    Diagnostic::error(
                        format!("integer literal '{}' is too large", text),
                        Span::new(start as u32, self.pos as u32),
                    )
                    .with_help(format!("maximum integer value is {}", u64::MAX)),
                );
                self.make_token(Lexeme::Integer(0), start, self.pos)
            }
        }
    }

    /// A `"..."` template. Escapes are skipped over but not decoded.
    fn scan_string(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        self.pos += 1; // skip opening quote
        let body_start = self.pos;
        loop {
            match self.peek() {
                Some(b'"') => {
                    let body = self.source[body_start..self.pos].to_string();
                    self.pos += 1;
                    return self.make_token(Lexeme::Str(body), start, self.pos);
                }
                Some(b'\\') if self.peek_next().is_some_and(|c| c != b'\n') => self.pos += 2,
                Some(b'\n') | None => break,
                Some(_) => self.pos += 1,
            }
        }
        self.diagnostics.push(
            Diagnostic::error(
                "unterminated string literal".to_string(),
                Span::new(start as u32, self.pos as u32),
            )
            .with_help("templates must close their quote on the same line".to_string()),
        );
        let body = self.source[body_start..self.pos].to_string();
        self.make_token(Lexeme::Str(body), start, self.pos)
    }

    fn scan_directive(&mut self, start: usize) -> Option<Spanned<Lexeme>> {
        match self.peek_next() {
            Some(b'%') => {
                self.pos += 2;
                self.separators += 1;
                if self.separators == 2 {
                    return Some(self.scan_epilogue(start));
                }
                Some(self.make_token(Lexeme::Separator, start, self.pos))
            }
            Some(b'{') => Some(self.scan_prologue(start)),
            _ => {
                self.pos += 1;
                while self.peek().is_some_and(is_ident_continue) {
                    self.pos += 1;
                }
                let word = &self.source[start..self.pos];
                if word == "%term" {
                    return Some(self.make_token(Lexeme::Term, start, self.pos));
                }
                self.diagnostics.push(
                    Diagnostic::error(
                        format!("unknown directive '{}'", word),
                        Span::new(start as u32, self.pos as u32),
                    )
                    .with_help("directives are `%term`, `%{ ... %}` and `%%`".to_string()),
                );
                None
            }
        }
    }

    fn scan_prologue(&mut self, start: usize) -> Spanned<Lexeme> {
        self.pos += 2; // skip "%{"
        let body_start = self.pos;
        match self.source[body_start..].find("%}") {
            Some(offset) => {
                self.pos = body_start + offset + 2;
                let body = &self.source[body_start..body_start + offset];
                let body = body.strip_prefix('\n').unwrap_or(body);
                self.make_token(Lexeme::Prologue(body.to_string()), start, self.pos)
            }
            None => {
                self.pos = self.source.len();
                self.diagnostics.push(
                    Diagnostic::error(
                        "unterminated prologue block: missing '%}'".to_string(),
                        Span::new(start as u32, self.pos as u32),
                    )
                    .with_help("every `%{` must have a matching `%}`".to_string()),
                );
                self.make_token(Lexeme::Prologue(String::new()), start, self.pos)
            }
        }
    }

    /// The rest of the file after the second `%%`, minus the separator's own
    /// line break.
    fn scan_epilogue(&mut self, start: usize) -> Spanned<Lexeme> {
        let rest = &self.source[self.pos..];
        let rest = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .unwrap_or(rest);
        self.pos = self.source.len();
        self.make_token(Lexeme::Epilogue(rest.to_string()), start, self.pos)
    }

    fn scan_symbol(&mut self, start: usize) -> Spanned<Lexeme> {
        let ch = self.source[self.pos..].chars().next().unwrap_or('\0');
        self.pos += ch.len_utf8();
        let token = match ch {
            '(' => Lexeme::LParen,
            ')' => Lexeme::RParen,
            ',' => Lexeme::Comma,
            ':' => Lexeme::Colon,
            ';' => Lexeme::Semicolon,
            '=' => Lexeme::Eq,
            other => Lexeme::Punct(other),
        };
        self.make_token(token, start, self.pos)
    }

    fn make_token(&self, token: Lexeme, start: usize, end: usize) -> Spanned<Lexeme> {
        Spanned::new(token, Span::new(start as u32, end as u32))
    }
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_ident_continue(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}

#[cfg(test)]
mod tests;
