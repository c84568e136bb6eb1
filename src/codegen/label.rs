//! The labeling plan: what the generated `label` and `closure_*` routines
//! compute for each operator, independent of how it is printed.

use crate::grammar::{pattern, Cost, Grammar, NontermId, Path, RuleId, Step, TermId};

use super::writer::CodeWriter;

/// One rule tried at a node whose operator matches the rule's root.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub rule: RuleId,
    pub lhs: NontermId,
    pub local_rank: u32,
    /// Operator checks below the root, in pre-order. Empty when the pattern
    /// has a single terminal.
    pub shape: Vec<(Path, TermId)>,
    /// Best costs summed into the candidate cost.
    pub operands: Vec<(Path, NontermId)>,
    pub cost: Cost,
}

/// Handler for one operator id.
#[derive(Clone, Debug)]
pub struct DispatchCase {
    pub terminal: TermId,
    pub arity: u8,
    pub candidates: Vec<Candidate>,
}

/// Chain rule `lhs ::= N` applied when N improves.
#[derive(Clone, Debug)]
pub struct ClosureStep {
    pub rule: RuleId,
    pub lhs: NontermId,
    pub local_rank: u32,
    pub cost: Cost,
}

#[derive(Clone, Debug)]
pub struct LabelPlan {
    /// In ascending operator id.
    pub cases: Vec<DispatchCase>,
    /// Indexed by nonterminal; empty when it has no outgoing chain rules.
    pub closures: Vec<Vec<ClosureStep>>,
}

impl LabelPlan {
    pub fn build(grammar: &Grammar) -> Self {
        let cases = grammar
            .terminal_ids()
            .map(|t| DispatchCase {
                terminal: t,
                arity: grammar.terminal(t).arity.unwrap_or(0),
                candidates: grammar
                    .rules_rooted_at(t)
                    .iter()
                    .map(|r| candidate(grammar, *r))
                    .collect(),
            })
            .collect();

        let closures = grammar
            .nonterminal_ids()
            .map(|nt| {
                grammar
                    .chain_rules_from(nt)
                    .iter()
                    .map(|r| {
                        let rule = grammar.rule(*r);
                        ClosureStep {
                            rule: *r,
                            lhs: rule.lhs,
                            local_rank: rule.local_rank,
                            cost: rule.cost.clone(),
                        }
                    })
                    .collect()
            })
            .collect();

        Self { cases, closures }
    }

    pub fn closure_of(&self, nt: NontermId) -> &[ClosureStep] {
        &self.closures[nt.0]
    }

    pub fn has_closure(&self, nt: NontermId) -> bool {
        !self.closures[nt.0].is_empty()
    }
}

fn candidate(grammar: &Grammar, r: RuleId) -> Candidate {
    let rule = grammar.rule(r);
    let root = grammar.pattern(rule.pattern);
    let mut shape = Vec::new();
    if root.terminal_count > 1 {
        for (step, child) in root.children() {
            shape.extend(pattern::terminal_nodes(
                grammar.patterns(),
                child,
                &Path::root().child(step),
            ));
        }
    }
    Candidate {
        rule: r,
        lhs: rule.lhs,
        local_rank: rule.local_rank,
        shape,
        operands: pattern::nonterminal_leaves(grammar.patterns(), rule.pattern, &Path::root()),
        cost: rule.cost.clone(),
    }
}

/// Host macro names the generated code navigates trees with.
pub(crate) const NODE_TYPE: &str = "NODE_TYPE";
pub(crate) const NODE_OP: &str = "NODE_OP";
pub(crate) const LEFT_KID: &str = "LEFT_KID";
pub(crate) const RIGHT_KID: &str = "RIGHT_KID";
pub(crate) const NODE_STATE: &str = "NODE_STATE";

/// Expression for the node at `path` below `t`, using the `l`/`r` locals for
/// the first step.
fn node_expr(path: &Path) -> String {
    match path.steps().split_first() {
        None => "t".to_string(),
        Some((first, rest)) => {
            let base = match first {
                Step::Left => "l",
                Step::Right => "r",
            };
            Path::from(rest.to_vec()).accessor(base, LEFT_KID, RIGHT_KID)
        }
    }
}

/// Renders the plan as C.
pub(crate) struct LabelEmitter<'a> {
    pub(crate) grammar: &'a Grammar,
    pub(crate) plan: &'a LabelPlan,
    pub(crate) prefix: &'a str,
    pub(crate) trace: bool,
}

impl LabelEmitter<'_> {
    fn name(&self, base: &str) -> String {
        format!("{}{}", self.prefix, base)
    }

    fn nt_const(&self, nt: NontermId) -> String {
        self.name(&format!("{}_NT", self.grammar.nonterminal(nt).name))
    }

    /// Compare `c_var` with the best cost of `lhs` at `p` and record it on a
    /// strict improvement.
    fn emit_record(&self, w: &mut CodeWriter, depth: usize, rule: RuleId, lhs: NontermId, local_rank: u32, c_var: &str) {
        let nt_const = self.nt_const(lhs);
        let name = &self.grammar.nonterminal(lhs).name;
        if self.trace {
            let trace = self.name("trace");
            w.line(
                depth,
                &format!(
                    "{}(t, {}, {}, p->costs[{}]);",
                    trace,
                    self.grammar.rule(rule).global_rank,
                    c_var,
                    nt_const
                ),
            );
        }
        w.line(depth, &format!("if ({} < p->costs[{}]) {{", c_var, nt_const));
        w.line(depth + 1, &format!("p->costs[{}] = {};", nt_const, c_var));
        w.line(depth + 1, &format!("p->rule.{} = {};", name, local_rank));
        if self.plan.has_closure(lhs) {
            let closure = self.name(&format!("closure_{}", name));
            w.line(depth + 1, &format!("{}(t, {});", closure, c_var));
        }
        w.line(depth, "}");
    }

    pub(crate) fn emit_closure_forwards(&self, w: &mut CodeWriter) {
        for nt in self.grammar.nonterminal_ids() {
            if self.plan.has_closure(nt) {
                let closure = self.name(&format!("closure_{}", self.grammar.nonterminal(nt).name));
                w.line(0, &format!("static void {}({} *t, int c);", closure, NODE_TYPE));
            }
        }
        w.blank();
    }

    pub(crate) fn emit_closures(&self, w: &mut CodeWriter) {
        for nt in self.grammar.nonterminal_ids() {
            if self.plan.has_closure(nt) {
                self.emit_closure(w, nt);
            }
        }
    }

    fn emit_closure(&self, w: &mut CodeWriter, nt: NontermId) {
        let closure = self.name(&format!("closure_{}", self.grammar.nonterminal(nt).name));
        let state = self.name("state");
        let state_of = self.name("STATE");
        w.open_function(&format!("static void {}({} *t, int c)", closure, NODE_TYPE));
        w.line(1, &format!("struct {} *p = {}(t);", state, state_of));
        w.line(1, "int cc;");
        for step in self.plan.closure_of(nt) {
            w.blank();
            w.comment(
                1,
                &format!(
                    "{}. {}",
                    self.grammar.rule(step.rule).global_rank,
                    self.grammar.describe_rule(step.rule)
                ),
            );
            w.line(1, &format!("cc = c + {};", step.cost.expr()));
            self.emit_record(w, 1, step.rule, step.lhs, step.local_rank, "cc");
        }
        w.close_function();
    }

    pub(crate) fn emit_label(&self, w: &mut CodeWriter) {
        let label = self.name("label");
        let state = self.name("state");
        let znew = self.name("ZNEW");
        let max_cost = self.name("MAX_COST");

        w.open_function(&format!("static void {}({} *t)", label, NODE_TYPE));
        w.line(1, "int c;");
        w.line(1, &format!("{} *l, *r;", NODE_TYPE));
        w.line(1, &format!("struct {} *p;", state));
        w.blank();
        w.line(1, "assert(t && \"null tree\");");
        w.blank();
        w.line(1, &format!("l = {}(t);", LEFT_KID));
        w.line(1, &format!("r = {}(t);", RIGHT_KID));
        w.line(
            1,
            &format!("{}(t) = p = {}(sizeof(struct {}));", NODE_STATE, znew, state),
        );
        w.blank();
        for nt in self.grammar.nonterminal_ids() {
            w.line(1, &format!("p->costs[{}] =", self.grammar.nonterminal(nt).number));
        }
        w.line(2, &format!("{};", max_cost));
        w.blank();
        w.line(1, &format!("switch ({}(t)) {{", NODE_OP));
        for case in &self.plan.cases {
            self.emit_case(w, case);
        }
        w.line(1, "default:");
        w.line(2, "abort();");
        w.line(1, "}");
        w.close_function();
    }

    fn emit_case(&self, w: &mut CodeWriter, case: &DispatchCase) {
        let terminal = self.grammar.terminal(case.terminal);
        let label = self.name("label");
        w.line(1, &format!("case {}: /* {} */", terminal.id, terminal.name));
        match case.arity {
            1 => {
                w.line(2, "assert(l);");
                w.line(2, &format!("{}(l);", label));
            }
            2 => {
                w.line(2, "assert(l && r);");
                w.line(2, &format!("{}(l);", label));
                w.line(2, &format!("{}(r);", label));
            }
            _ => {}
        }

        let state_of = self.name("STATE");
        for cand in &case.candidates {
            w.comment(
                2,
                &format!(
                    "{}. {}",
                    self.grammar.rule(cand.rule).global_rank,
                    self.grammar.describe_rule(cand.rule)
                ),
            );

            let mut terms: Vec<String> = cand
                .operands
                .iter()
                .map(|(path, nt)| {
                    format!("{}({})->costs[{}]", state_of, node_expr(path), self.nt_const(*nt))
                })
                .collect();
            terms.push(cand.cost.expr());
            let cost = format!("c = {};", terms.join(" + "));

            if cand.shape.is_empty() {
                w.line(2, &cost);
                self.emit_record(w, 2, cand.rule, cand.lhs, cand.local_rank, "c");
            } else {
                let checks: Vec<String> = cand
                    .shape
                    .iter()
                    .map(|(path, t)| {
                        let terminal = self.grammar.terminal(*t);
                        format!(
                            "{}({}) == {} /* {} */",
                            NODE_OP,
                            node_expr(path),
                            terminal.id,
                            terminal.name
                        )
                    })
                    .collect();
                w.line(2, "if (");
                let last = checks.len() - 1;
                for (i, check) in checks.iter().enumerate() {
                    let sep = if i < last { " &&" } else { "" };
                    w.line(3, &format!("{}{}", check, sep));
                }
                w.line(2, ") {");
                w.line(3, &cost);
                self.emit_record(w, 3, cand.rule, cand.lhs, cand.local_rank, "c");
                w.line(2, "}");
            }
        }
        w.line(2, "break;");
    }
}
