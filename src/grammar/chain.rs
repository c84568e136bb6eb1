//! Chain-rule graph checks.
//!
//! Chain rule `M ::= N` is an edge `N -> M`. Closure follows these edges at
//! label time and only continues on a strict cost improvement. A cycle made
//! of fixed zero-cost edges derives nothing new and is rejected; a cycle
//! through a dynamic cost may or may not be harmless, so it is only reported.

use std::collections::HashSet;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use super::{Cost, Grammar, NontermId, Op};
use crate::diagnostic::Diagnostic;

/// Build the chain graph, keeping only the edges accepted by `keep`.
fn chain_graph(grammar: &Grammar, keep: impl Fn(&Cost) -> bool) -> DiGraph<NontermId, ()> {
    let mut graph = DiGraph::new();
    let nodes: Vec<NodeIndex> = grammar.nonterminal_ids().map(|nt| graph.add_node(nt)).collect();
    for r in grammar.rule_ids() {
        let rule = grammar.rule(r);
        if let Op::Nonterm(rhs) = grammar.pattern(rule.pattern).op {
            if keep(&rule.cost) {
                graph.add_edge(nodes[rhs.0], nodes[rule.lhs.0], ());
            }
        }
    }
    graph
}

/// Strongly connected components that contain a cycle.
fn cycles(graph: &DiGraph<NontermId, ()>) -> Vec<Vec<NontermId>> {
    tarjan_scc(graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.find_edge(scc[0], scc[0]).is_some())
        .map(|scc| {
            let mut members: Vec<NontermId> = scc.into_iter().map(|n| graph[n]).collect();
            members.sort();
            members
        })
        .collect()
}

fn cycle_names(grammar: &Grammar, members: &[NontermId]) -> String {
    members
        .iter()
        .map(|nt| format!("'{}'", grammar.nonterminal(*nt).name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Returns `(errors, warnings)` for the chain rules of `grammar`.
pub(crate) fn check_cycles(grammar: &Grammar) -> (Vec<Diagnostic>, Vec<Diagnostic>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let zero = chain_graph(grammar, |cost| *cost == Cost::Fixed(0));
    let mut flagged: HashSet<NontermId> = HashSet::new();
    for members in cycles(&zero) {
        let first = grammar.nonterminal(members[0]);
        errors.push(
            Diagnostic::error(
                format!(
                    "zero-cost chain-rule cycle through {}",
                    cycle_names(grammar, &members)
                ),
                first.span,
            )
            .with_help("give at least one chain rule in the cycle a positive cost".to_string()),
        );
        flagged.extend(members);
    }

    let maybe_zero = chain_graph(grammar, |cost| matches!(cost, Cost::Fixed(0) | Cost::Dynamic(_)));
    for members in cycles(&maybe_zero) {
        if members.iter().any(|nt| flagged.contains(nt)) {
            continue;
        }
        let first = grammar.nonterminal(members[0]);
        warnings.push(
            Diagnostic::warning(
                format!(
                    "chain-rule cycle with dynamic costs through {}",
                    cycle_names(grammar, &members)
                ),
                first.span,
            )
            .with_note("closure terminates only if these costs are positive".to_string()),
        );
    }

    (errors, warnings)
}
