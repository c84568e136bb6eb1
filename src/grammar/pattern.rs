use std::fmt;

use super::symbols::{NontermId, TermId};
use crate::span::Span;

/// Index of a pattern in the grammar's pattern arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PatternId(pub(crate) usize);

/// Root operator of a pattern node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Term(TermId),
    /// Placeholder for any subtree already reduced to this nonterminal.
    Nonterm(NontermId),
}

/// A tree shape: an operator plus up to two child patterns.
#[derive(Clone, Debug)]
pub struct Pattern {
    pub op: Op,
    pub left: Option<PatternId>,
    pub right: Option<PatternId>,
    /// Number of terminal nodes in this pattern, root included.
    pub terminal_count: u32,
    pub span: Span,
}

impl Pattern {
    pub fn arity(&self) -> u8 {
        match (self.left, self.right) {
            (Some(_), Some(_)) => 2,
            (Some(_), None) => 1,
            _ => 0,
        }
    }

    pub fn children(&self) -> impl Iterator<Item = (Step, PatternId)> {
        let left = self.left.map(|p| (Step::Left, p));
        let right = self.right.map(|p| (Step::Right, p));
        left.into_iter().chain(right)
    }

    /// A bare nonterminal reference (the right-hand side of a chain rule).
    pub fn is_nonterminal_leaf(&self) -> bool {
        matches!(self.op, Op::Nonterm(_))
    }
}

/// One navigation step from a node to one of its children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    Left,
    Right,
}

impl Step {
    pub fn as_char(self) -> char {
        match self {
            Step::Left => 'L',
            Step::Right => 'R',
        }
    }
}

/// A sequence of steps from a pattern root to one of its nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<Step>);

impl Path {
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn child(&self, step: Step) -> Path {
        let mut steps = self.0.clone();
        steps.push(step);
        Path(steps)
    }

    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Render the path as a nested accessor expression over `base`, e.g.
    /// `LEFT_KID(RIGHT_KID(p))` for the path `RL`.
    pub fn accessor(&self, base: &str, left: &str, right: &str) -> String {
        self.0.iter().fold(base.to_string(), |expr, step| match step {
            Step::Left => format!("{}({})", left, expr),
            Step::Right => format!("{}({})", right, expr),
        })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.0 {
            write!(f, "{}", step.as_char())?;
        }
        Ok(())
    }
}

impl From<Vec<Step>> for Path {
    fn from(steps: Vec<Step>) -> Self {
        Path(steps)
    }
}

/// Nonterminal leaves of a pattern, depth-first and left before right, with
/// the path that reaches each one from `base`.
pub fn nonterminal_leaves(patterns: &[Pattern], id: PatternId, base: &Path) -> Vec<(Path, NontermId)> {
    let mut out = Vec::new();
    collect_leaves(patterns, id, base.clone(), &mut out);
    out
}

fn collect_leaves(patterns: &[Pattern], id: PatternId, path: Path, out: &mut Vec<(Path, NontermId)>) {
    let pattern = &patterns[id.0];
    match pattern.op {
        Op::Nonterm(nt) => out.push((path, nt)),
        Op::Term(_) => {
            for (step, child) in pattern.children() {
                collect_leaves(patterns, child, path.child(step), out);
            }
        }
    }
}

/// Terminal nodes of a pattern in pre-order with the operator each must
/// carry. Together they describe the shape a concrete tree must have.
pub fn terminal_nodes(patterns: &[Pattern], id: PatternId, base: &Path) -> Vec<(Path, TermId)> {
    let mut out = Vec::new();
    collect_terminals(patterns, id, base.clone(), &mut out);
    out
}

fn collect_terminals(patterns: &[Pattern], id: PatternId, path: Path, out: &mut Vec<(Path, TermId)>) {
    let pattern = &patterns[id.0];
    if let Op::Term(t) = pattern.op {
        out.push((path.clone(), t));
        for (step, child) in pattern.children() {
            collect_terminals(patterns, child, path.child(step), out);
        }
    }
}
