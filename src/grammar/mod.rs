//! Grammar model: terminals, nonterminals, patterns and cost-annotated rules.
//!
//! A grammar is assembled through [`GrammarBuilder`], whose methods mirror
//! the declarations of a grammar file. [`GrammarBuilder::finish`] validates
//! the result and freezes it into a [`Grammar`], which owns every entity in
//! index-addressed arenas and exposes the orderings the code generator walks:
//! global rule order, rules per left-hand side, rules per root terminal and
//! chain rules per right-hand side.

pub mod chain;
pub mod pattern;
pub mod symbols;

#[cfg(test)]
mod tests;

use std::fmt;

use crate::diagnostic::Diagnostic;
use crate::span::Span;

pub use pattern::{Op, Path, Pattern, PatternId, Step};
pub use symbols::{NontermId, Nonterminal, Symbol, SymbolTable, TermId, Terminal};

/// Cost value meaning "not derivable". Fixed costs must stay below it.
pub const MAX_COST: u32 = 0x7fff;

/// Index of a rule in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub(crate) usize);

/// The cost of applying a rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cost {
    Fixed(u32),
    /// Host-language expression evaluated at label time, already wrapped in
    /// parentheses.
    Dynamic(String),
}

impl Cost {
    /// Parse a cost token: base-10 digits give a fixed cost, anything else is
    /// spliced into the matcher as an expression.
    pub fn parse(token: &str, span: Span) -> Result<Cost, Diagnostic> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Diagnostic::error("empty cost expression".to_string(), span));
        }
        if token.bytes().all(|b| b.is_ascii_digit()) {
            return match token.parse::<u32>() {
                Ok(n) if n < MAX_COST => Ok(Cost::Fixed(n)),
                _ => Err(Diagnostic::error(
                    format!("cost {} is out of range", token),
                    span,
                )
                .with_note(format!("fixed costs must be below {}", MAX_COST))),
            };
        }
        Ok(Cost::Dynamic(format!("({})", token)))
    }

    pub fn fixed(&self) -> Option<u32> {
        match self {
            Cost::Fixed(n) => Some(*n),
            Cost::Dynamic(_) => None,
        }
    }

    /// The cost as an expression of the generated code.
    pub fn expr(&self) -> String {
        match self {
            Cost::Fixed(n) => n.to_string(),
            Cost::Dynamic(code) => code.clone(),
        }
    }
}

/// A production `lhs ::= pattern`.
#[derive(Clone, Debug)]
pub struct Rule {
    pub lhs: NontermId,
    pub pattern: PatternId,
    /// Instruction text the caller emits when this rule is selected.
    pub template: Option<String>,
    pub cost: Cost,
    /// 1-based position among all rules.
    pub global_rank: u32,
    /// 1-based position among the rules of `lhs`.
    pub local_rank: u32,
    pub span: Span,
}

impl Rule {
    /// `None` when the cost is only known at label time.
    pub fn fixed_cost(&self) -> Option<u32> {
        self.cost.fixed()
    }
}

/// Mutable grammar under construction.
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    symbols: SymbolTable,
    patterns: Vec<Pattern>,
    rules: Vec<Rule>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        self.symbols.lookup(name)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn declare_terminal(&mut self, name: &str, id: u32, span: Span) -> Result<TermId, Diagnostic> {
        self.symbols.declare_terminal(name, id, span)
    }

    pub fn intern_nonterminal(&mut self, name: &str, span: Span) -> Result<NontermId, Diagnostic> {
        self.symbols.intern_nonterminal(name, span)
    }

    pub fn build_pattern(
        &mut self,
        op: &str,
        left: Option<PatternId>,
        right: Option<PatternId>,
        span: Span,
    ) -> Result<PatternId, Diagnostic> {
        let arity: u8 = match (left, right) {
            (Some(_), Some(_)) => 2,
            (Some(_), None) => 1,
            (None, None) => 0,
            (None, Some(_)) => {
                return Err(Diagnostic::error(
                    format!("'{}' has a right child but no left child", op),
                    span,
                ))
            }
        };

        let root = match self.symbols.lookup(op) {
            None if arity == 0 => Op::Nonterm(self.symbols.intern_nonterminal(op, span)?),
            None => {
                return Err(Diagnostic::error(format!("undefined terminal '{}'", op), span)
                    .with_help(format!("declare it with `%term {} = <id>`", op)))
            }
            Some(Symbol::Nonterminal(_)) if arity > 0 => {
                return Err(Diagnostic::error(
                    format!("nonterminal '{}' cannot have children", op),
                    span,
                ))
            }
            Some(Symbol::Nonterminal(nt)) => Op::Nonterm(nt),
            Some(Symbol::Terminal(t)) => {
                let terminal = self.symbols.terminal_mut(t);
                match terminal.arity {
                    None => terminal.arity = Some(arity),
                    Some(fixed) if fixed != arity => {
                        return Err(Diagnostic::error(
                            format!(
                                "inconsistent arity for terminal '{}' ({} != {})",
                                op, fixed, arity
                            ),
                            span,
                        )
                        .with_note(format!("'{}' was first used with {} children", op, fixed)))
                    }
                    Some(_) => {}
                }
                Op::Term(t)
            }
        };

        let mut terminal_count = matches!(root, Op::Term(_)) as u32;
        for child in [left, right].into_iter().flatten() {
            terminal_count += self.patterns[child.0].terminal_count;
        }

        let id = PatternId(self.patterns.len());
        self.patterns.push(Pattern {
            op: root,
            left,
            right,
            terminal_count,
            span,
        });
        Ok(id)
    }

    pub fn build_rule(
        &mut self,
        lhs: &str,
        pattern: PatternId,
        template: Option<&str>,
        cost: &str,
        span: Span,
    ) -> Result<RuleId, Diagnostic> {
        let nt = self.symbols.intern_nonterminal(lhs, span)?;
        let cost = Cost::parse(cost, span)?;

        let nonterminal = self.symbols.nonterminal_mut(nt);
        nonterminal.rule_count += 1;
        let local_rank = nonterminal.rule_count;

        let id = RuleId(self.rules.len());
        self.rules.push(Rule {
            lhs: nt,
            pattern,
            template: template.map(str::to_string),
            cost,
            global_rank: id.0 as u32 + 1,
            local_rank,
            span,
        });
        Ok(id)
    }

    /// Validate the grammar and freeze it.
    pub fn finish(self) -> Result<Grammar, Vec<Diagnostic>> {
        let start = match self.symbols.start() {
            Some(start) => start,
            None => {
                return Err(vec![Diagnostic::error(
                    "grammar has no rules".to_string(),
                    Span::dummy(),
                )])
            }
        };
        let start_nt = self.symbols.nonterminal(start);
        if start_nt.rule_count == 0 {
            return Err(vec![Diagnostic::error(
                format!("missing rule for start symbol '{}'", start_nt.name),
                start_nt.span,
            )
            .with_note("the first nonterminal referenced is the start symbol".to_string())]);
        }

        let nt_count = self.symbols.nonterminal_count();
        let mut by_lhs = vec![Vec::new(); nt_count];
        let mut by_root = vec![Vec::new(); self.symbols.terminal_count()];
        let mut chains = vec![Vec::new(); nt_count];
        for (i, rule) in self.rules.iter().enumerate() {
            let id = RuleId(i);
            by_lhs[rule.lhs.0].push(id);
            let pattern = &self.patterns[rule.pattern.0];
            match pattern.op {
                Op::Term(t) => by_root[t.0].push(id),
                Op::Nonterm(rhs) => chains[rhs.0].push(id),
            }
        }
        // Later declarations are tried first, so they win ties.
        for list in by_root.iter_mut().chain(chains.iter_mut()) {
            list.reverse();
        }

        let grammar = Grammar {
            symbols: self.symbols,
            patterns: self.patterns,
            rules: self.rules,
            start,
            by_lhs,
            by_root,
            chains,
            warnings: Vec::new(),
        };

        let (errors, mut warnings) = chain::check_cycles(&grammar);
        if !errors.is_empty() {
            return Err(errors);
        }
        warnings.extend(grammar.unused_symbol_warnings());
        Ok(Grammar { warnings, ..grammar })
    }
}

/// A validated, immutable grammar.
#[derive(Debug)]
pub struct Grammar {
    symbols: SymbolTable,
    patterns: Vec<Pattern>,
    rules: Vec<Rule>,
    start: NontermId,
    by_lhs: Vec<Vec<RuleId>>,
    by_root: Vec<Vec<RuleId>>,
    chains: Vec<Vec<RuleId>>,
    warnings: Vec<Diagnostic>,
}

impl Grammar {
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn start(&self) -> NontermId {
        self.start
    }

    pub fn terminal(&self, t: TermId) -> &Terminal {
        self.symbols.terminal(t)
    }

    pub fn nonterminal(&self, nt: NontermId) -> &Nonterminal {
        self.symbols.nonterminal(nt)
    }

    pub fn pattern(&self, p: PatternId) -> &Pattern {
        &self.patterns[p.0]
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn rule(&self, r: RuleId) -> &Rule {
        &self.rules[r.0]
    }

    /// Rules in declaration order.
    pub fn rule_ids(&self) -> impl Iterator<Item = RuleId> {
        (0..self.rules.len()).map(RuleId)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Terminals in ascending operator id.
    pub fn terminal_ids(&self) -> impl Iterator<Item = TermId> + '_ {
        self.symbols.terminals_by_id()
    }

    /// Nonterminals in ordinal order.
    pub fn nonterminal_ids(&self) -> impl Iterator<Item = NontermId> {
        self.symbols.nonterminal_ids()
    }

    /// Rules with `nt` on the left-hand side, by local rank.
    pub fn rules_of(&self, nt: NontermId) -> &[RuleId] {
        &self.by_lhs[nt.0]
    }

    /// Rules whose pattern is rooted at `t`, in dispatch order.
    pub fn rules_rooted_at(&self, t: TermId) -> &[RuleId] {
        &self.by_root[t.0]
    }

    /// Chain rules `M ::= nt`, in closure order.
    pub fn chain_rules_from(&self, nt: NontermId) -> &[RuleId] {
        &self.chains[nt.0]
    }

    pub fn is_chain_rule(&self, r: RuleId) -> bool {
        self.pattern(self.rule(r).pattern).is_nonterminal_leaf()
    }

    /// Non-fatal findings from validation.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn describe_pattern(&self, p: PatternId) -> String {
        PatternDisplay { grammar: self, id: p }.to_string()
    }

    /// `lhs: pattern`, as used in comments and the rule name table.
    pub fn describe_rule(&self, r: RuleId) -> String {
        let rule = self.rule(r);
        format!(
            "{}: {}",
            self.nonterminal(rule.lhs).name,
            self.describe_pattern(rule.pattern)
        )
    }

    fn unused_symbol_warnings(&self) -> Vec<Diagnostic> {
        let mut warnings = Vec::new();
        for nt in self.nonterminal_ids() {
            let nonterminal = self.nonterminal(nt);
            if nonterminal.rule_count == 0 {
                warnings.push(
                    Diagnostic::warning(
                        format!("nonterminal '{}' has no rules", nonterminal.name),
                        nonterminal.span,
                    )
                    .with_note("patterns referring to it can never match".to_string()),
                );
            }
        }
        for t in self.terminal_ids() {
            let terminal = self.terminal(t);
            if terminal.arity.is_none() {
                warnings.push(Diagnostic::warning(
                    format!("terminal '{}' is never used in a pattern", terminal.name),
                    terminal.span,
                ));
            }
        }
        warnings
    }
}

struct PatternDisplay<'g> {
    grammar: &'g Grammar,
    id: PatternId,
}

impl fmt::Display for PatternDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pattern = self.grammar.pattern(self.id);
        match pattern.op {
            Op::Term(t) => write!(f, "{}", self.grammar.terminal(t).name)?,
            Op::Nonterm(nt) => write!(f, "{}", self.grammar.nonterminal(nt).name)?,
        }
        let sub = |id: PatternId| PatternDisplay {
            grammar: self.grammar,
            id,
        };
        match (pattern.left, pattern.right) {
            (Some(l), Some(r)) => write!(f, "({}, {})", sub(l), sub(r)),
            (Some(l), None) => write!(f, "({})", sub(l)),
            _ => Ok(()),
        }
    }
}
