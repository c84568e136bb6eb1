/// All lexemes of the grammar description language.
#[derive(Clone, Debug, PartialEq)]
pub enum Lexeme {
    // Directives
    Term,      // %term
    Separator, // %%
    /// `%{ ... %}` block, contents verbatim.
    Prologue(String),
    /// Everything after the second `%%`.
    Epilogue(String),

    // Symbols
    LParen,    // (
    RParen,    // )
    Comma,     // ,
    Colon,     // :
    Semicolon, // ;
    Eq,        // =
    /// Any other character. Only meaningful inside a parenthesised cost,
    /// where the parser takes the source text rather than the tokens.
    Punct(char),

    // Literals
    Integer(u64),
    Ident(String),
    /// A quoted template with its escapes left as written.
    Str(String),

    // End of file
    Eof,
}

impl Lexeme {
    pub fn description(&self) -> &'static str {
        match self {
            Lexeme::Term => "'%term'",
            Lexeme::Separator => "'%%'",
            Lexeme::Prologue(_) => "'%{' block",
            Lexeme::Epilogue(_) => "epilogue",
            Lexeme::LParen => "'('",
            Lexeme::RParen => "')'",
            Lexeme::Comma => "','",
            Lexeme::Colon => "':'",
            Lexeme::Semicolon => "';'",
            Lexeme::Eq => "'='",
            Lexeme::Punct(_) => "punctuation",
            Lexeme::Integer(_) => "integer literal",
            Lexeme::Ident(_) => "identifier",
            Lexeme::Str(_) => "string literal",
            Lexeme::Eof => "end of file",
        }
    }
}
