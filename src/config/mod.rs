//! Generation options and the optional `treeburg.toml` file that seeds them.

pub mod project;

use crate::diagnostic::Diagnostic;
use crate::span::Span;

/// Options controlling emitted code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenOptions {
    /// Prepended to every generated C identifier.
    pub prefix: String,
    /// Emit a `<prefix>trace(t, rule, cost, best)` call before every cost
    /// comparison. The host supplies the function.
    pub trace: bool,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            prefix: "_".to_string(),
            trace: false,
        }
    }
}

impl GenOptions {
    pub fn validate(&self) -> Result<(), Diagnostic> {
        validate_prefix(&self.prefix)
    }
}

/// A prefix must itself be a C identifier: a letter or `_`, then letters,
/// digits or `_`.
pub fn validate_prefix(prefix: &str) -> Result<(), Diagnostic> {
    let mut chars = prefix.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Diagnostic::error(
            format!("invalid prefix '{}'", prefix),
            Span::dummy(),
        )
        .with_help("a prefix must start with a letter or '_' and contain only letters, digits and '_'".to_string()))
    }
}
