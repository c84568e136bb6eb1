//! Lookup tables derived from a frozen grammar.

use std::collections::HashMap;
use std::hash::Hash;

use crate::grammar::{pattern, Grammar, NontermId, Path, RuleId};

/// Per-rule values where rules with equal values share one entry.
#[derive(Clone, Debug)]
pub struct SharedTable<T> {
    /// Distinct values in first-seen order.
    pub entries: Vec<T>,
    /// Entry index for each rule, in global rule order.
    pub index: Vec<usize>,
}

impl<T: Clone + Eq + Hash> SharedTable<T> {
    fn build(values: impl Iterator<Item = T>) -> Self {
        let mut entries = Vec::new();
        let mut index = Vec::new();
        let mut seen: HashMap<T, usize> = HashMap::new();
        for value in values {
            let slot = *seen.entry(value.clone()).or_insert_with(|| {
                entries.push(value);
                entries.len() - 1
            });
            index.push(slot);
        }
        Self { entries, index }
    }

    pub fn entry_for(&self, r: RuleId) -> &T {
        &self.entries[self.index[r.0]]
    }
}

/// One rule-selection bit-field of the per-node state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleField {
    pub name: String,
    pub bits: u32,
}

/// Per-node state: one cost slot per nonterminal (slot 0 unused) and a
/// bit-field per nonterminal holding its best local rule rank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateLayout {
    pub cost_slots: usize,
    pub fields: Vec<RuleField>,
}

impl StateLayout {
    pub fn total_bits(&self) -> u32 {
        self.fields.iter().map(|f| f.bits).sum()
    }
}

/// Bits needed to store local ranks `0..=rule_count`; at least one.
pub fn field_bits(rule_count: u32) -> u32 {
    (u32::BITS - rule_count.leading_zeros()).max(1)
}

#[derive(Clone, Debug)]
pub struct Tables {
    /// Nonterminals required at the leaves of each rule's pattern.
    pub nonterminal_seqs: SharedTable<Vec<NontermId>>,
    /// Where each of those leaves sits relative to the matched node.
    pub operand_paths: SharedTable<Vec<Path>>,
    pub max_operands: usize,
    /// Indexed by nonterminal ordinal - 1.
    pub nonterminal_names: Vec<String>,
    /// Indexed by global rank - 1.
    pub rule_names: Vec<String>,
    pub templates: Vec<String>,
    pub is_instruction: Vec<bool>,
    /// Global ranks by local rank, per nonterminal in ordinal order.
    pub rank_tables: Vec<(NontermId, Vec<u32>)>,
    pub layout: StateLayout,
}

impl Tables {
    pub fn build(grammar: &Grammar) -> Self {
        let leaves: Vec<Vec<(Path, NontermId)>> = grammar
            .rule_ids()
            .map(|r| pattern::nonterminal_leaves(grammar.patterns(), grammar.rule(r).pattern, &Path::root()))
            .collect();

        let nonterminal_seqs =
            SharedTable::build(leaves.iter().map(|l| l.iter().map(|(_, nt)| *nt).collect::<Vec<_>>()));
        let operand_paths =
            SharedTable::build(leaves.iter().map(|l| l.iter().map(|(p, _)| p.clone()).collect::<Vec<_>>()));
        let max_operands = leaves.iter().map(Vec::len).max().unwrap_or(0);

        let nonterminal_names = grammar
            .nonterminal_ids()
            .map(|nt| grammar.nonterminal(nt).name.clone())
            .collect();

        let rule_names = grammar.rule_ids().map(|r| grammar.describe_rule(r)).collect();
        let templates: Vec<String> = grammar
            .rule_ids()
            .map(|r| grammar.rule(r).template.clone().unwrap_or_default())
            .collect();
        let is_instruction = templates.iter().map(|t| is_instruction(t)).collect();

        let rank_tables = grammar
            .nonterminal_ids()
            .map(|nt| {
                let ranks = grammar
                    .rules_of(nt)
                    .iter()
                    .map(|r| grammar.rule(*r).global_rank)
                    .collect();
                (nt, ranks)
            })
            .collect();

        let layout = StateLayout {
            cost_slots: grammar.symbols().nonterminal_count() + 1,
            fields: grammar
                .nonterminal_ids()
                .map(|nt| {
                    let n = grammar.nonterminal(nt);
                    RuleField {
                        name: n.name.clone(),
                        bits: field_bits(n.rule_count),
                    }
                })
                .collect(),
        };

        Self {
            nonterminal_seqs,
            operand_paths,
            max_operands,
            nonterminal_names,
            rule_names,
            templates,
            is_instruction,
            rank_tables,
            layout,
        }
    }
}

/// Templates ending in an escaped newline produce an instruction; the rest
/// only reduce.
pub fn is_instruction(template: &str) -> bool {
    template.ends_with("\\n")
}
