use std::path::Path;

use crate::codegen::{self, Tables};
use crate::config::project::ProjectConfig;
use crate::config::GenOptions;
use crate::diagnostic::{render_diagnostics, Diagnostic};
use crate::grammar::Grammar;
use crate::span::Span;


/// Generate a matcher from grammar source with default options.
pub fn generate(source: &str, filename: &str) -> Result<String, Vec<Diagnostic>> {
    generate_with_options(source, filename, &GenOptions::default())
}

/// Generate a matcher from grammar source. Diagnostics, warnings included,
/// are rendered to stderr.
pub fn generate_with_options(
    source: &str,
    filename: &str,
    options: &GenOptions,
) -> Result<String, Vec<Diagnostic>> {
    if let Err(err) = options.validate() {
        let errors = vec![err];
        render_diagnostics(&errors, filename, source);
        return Err(errors);
    }

    let parsed = crate::parse_grammar(source, filename)?;
    render_diagnostics(parsed.grammar.warnings(), filename, source);

    Ok(codegen::generate(
        &parsed.grammar,
        options,
        &parsed.prologue,
        &parsed.epilogue,
    ))
}

/// Resolve options for a grammar file: defaults, then the treeburg.toml at
/// `config` or the nearest one above `input`.
pub fn resolve_options(input: Option<&Path>, config: Option<&Path>) -> Result<GenOptions, Diagnostic> {
    let mut options = GenOptions::default();
    let found = match config {
        Some(path) => Some(path.to_path_buf()),
        None => input
            .and_then(|p| p.parent())
            .map(|dir| if dir.as_os_str().is_empty() { Path::new(".") } else { dir })
            .and_then(ProjectConfig::find),
    };
    if let Some(path) = found {
        ProjectConfig::load(&path)?.apply(&mut options);
    }
    Ok(options)
}

/// Counts reported by `check`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrammarSummary {
    pub terminals: usize,
    pub nonterminals: usize,
    pub rules: usize,
    pub chain_rules: usize,
    pub state_bits: u32,
    pub warnings: usize,
}

impl GrammarSummary {
    pub fn of(grammar: &Grammar) -> Self {
        let tables = Tables::build(grammar);
        Self {
            terminals: grammar.symbols().terminal_count(),
            nonterminals: grammar.symbols().nonterminal_count(),
            rules: grammar.rule_count(),
            chain_rules: grammar.rule_ids().filter(|r| grammar.is_chain_rule(*r)).count(),
            state_bits: tables.layout.total_bits(),
            warnings: grammar.warnings().len(),
        }
    }
}

/// Parse and validate only.
pub fn check(source: &str, filename: &str) -> Result<GrammarSummary, Vec<Diagnostic>> {
    let parsed = crate::parse_grammar(source, filename)?;
    render_diagnostics(parsed.grammar.warnings(), filename, source);
    Ok(GrammarSummary::of(&parsed.grammar))
}

/// Read a grammar file, or stdin for `-`.
pub fn read_source(path: &Path) -> Result<String, Diagnostic> {
    if path == Path::new("-") {
        let mut source = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut source).map_err(|e| {
            Diagnostic::error(format!("cannot read stdin: {}", e), Span::dummy())
        })?;
        return Ok(source);
    }
    std::fs::read_to_string(path).map_err(|e| {
        Diagnostic::error(
            format!("cannot read '{}': {}", path.display(), e),
            Span::dummy(),
        )
    })
}
