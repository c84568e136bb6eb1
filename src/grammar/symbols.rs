use std::collections::{BTreeMap, HashMap};

use crate::diagnostic::Diagnostic;
use crate::span::Span;

/// Index of a terminal in the symbol table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(pub(crate) usize);

/// Index of a nonterminal in the symbol table. The ordinal exposed to
/// generated code is `index + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NontermId(pub(crate) usize);

/// What a name resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    Terminal(TermId),
    Nonterminal(NontermId),
}

/// A tree-node operator with a fixed number of children.
#[derive(Clone, Debug)]
pub struct Terminal {
    pub name: String,
    /// Discriminant carried by tree nodes at runtime.
    pub id: u32,
    /// Unset until the terminal first appears in a pattern.
    pub arity: Option<u8>,
    pub span: Span,
}

/// An abstract match category.
#[derive(Clone, Debug)]
pub struct Nonterminal {
    pub name: String,
    /// 1-based, first-reference order.
    pub number: u32,
    /// Number of rules with this nonterminal on the left-hand side.
    pub rule_count: u32,
    pub span: Span,
}

/// Interned terminal and nonterminal names.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    names: HashMap<String, Symbol>,
    terminals: Vec<Terminal>,
    nonterminals: Vec<Nonterminal>,
    /// Terminal ids in ascending order.
    by_id: BTreeMap<u32, TermId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        self.names.get(name).copied()
    }

    pub fn intern_nonterminal(&mut self, name: &str, span: Span) -> Result<NontermId, Diagnostic> {
        match self.lookup(name) {
            Some(Symbol::Nonterminal(nt)) => Ok(nt),
            Some(Symbol::Terminal(t)) => Err(Diagnostic::error(
                format!("'{}' is a terminal, not a nonterminal", name),
                span,
            )
            .with_note(format!(
                "'{}' was declared as terminal {}",
                name, self.terminals[t.0].id
            ))),
            None => {
                let nt = NontermId(self.nonterminals.len());
                self.nonterminals.push(Nonterminal {
                    name: name.to_string(),
                    number: nt.0 as u32 + 1,
                    rule_count: 0,
                    span,
                });
                self.names.insert(name.to_string(), Symbol::Nonterminal(nt));
                Ok(nt)
            }
        }
    }

    pub fn declare_terminal(&mut self, name: &str, id: u32, span: Span) -> Result<TermId, Diagnostic> {
        if let Some(existing) = self.lookup(name) {
            let kind = match existing {
                Symbol::Terminal(_) => "terminal",
                Symbol::Nonterminal(_) => "nonterminal",
            };
            return Err(Diagnostic::error(format!("redefinition of '{}'", name), span)
                .with_note(format!("'{}' is already a {}", name, kind)));
        }
        if let Some(&other) = self.by_id.get(&id) {
            return Err(Diagnostic::error(
                format!("terminal id {} is already used by '{}'", id, self.terminals[other.0].name),
                span,
            )
            .with_help("each terminal needs a distinct operator id".to_string()));
        }

        let t = TermId(self.terminals.len());
        self.terminals.push(Terminal {
            name: name.to_string(),
            id,
            arity: None,
            span,
        });
        self.names.insert(name.to_string(), Symbol::Terminal(t));
        self.by_id.insert(id, t);
        Ok(t)
    }

    /// The first nonterminal ever referenced.
    pub fn start(&self) -> Option<NontermId> {
        if self.nonterminals.is_empty() {
            None
        } else {
            Some(NontermId(0))
        }
    }

    pub fn terminal(&self, t: TermId) -> &Terminal {
        &self.terminals[t.0]
    }

    pub(crate) fn terminal_mut(&mut self, t: TermId) -> &mut Terminal {
        &mut self.terminals[t.0]
    }

    pub fn nonterminal(&self, nt: NontermId) -> &Nonterminal {
        &self.nonterminals[nt.0]
    }

    pub(crate) fn nonterminal_mut(&mut self, nt: NontermId) -> &mut Nonterminal {
        &mut self.nonterminals[nt.0]
    }

    /// Terminals sorted by operator id.
    pub fn terminals_by_id(&self) -> impl Iterator<Item = TermId> + '_ {
        self.by_id.values().copied()
    }

    /// Nonterminals in ordinal order.
    pub fn nonterminal_ids(&self) -> impl Iterator<Item = NontermId> {
        (0..self.nonterminals.len()).map(NontermId)
    }

    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    pub fn nonterminal_count(&self) -> usize {
        self.nonterminals.len()
    }
}
