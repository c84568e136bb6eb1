//! C matcher generation.
//!
//! The generator makes one pass over a frozen [`Grammar`] to derive
//! [`Tables`] and a [`LabelPlan`], then prints them in a fixed order:
//! includes and macros, the state record, tables, closure forward
//! declarations, and the `rule`, `closure_*`, `label` and `kids` routines.
//! Output depends only on the grammar and the options, so regenerating an
//! unchanged grammar gives byte-identical text.

pub mod label;
pub mod tables;
mod writer;


use crate::config::GenOptions;
use crate::grammar::{Grammar, MAX_COST};

pub use label::LabelPlan;
pub use tables::Tables;

use label::{LabelEmitter, LEFT_KID, NODE_STATE, NODE_TYPE, RIGHT_KID};
use writer::{c_string, CodeWriter};

pub struct Generator<'g> {
    grammar: &'g Grammar,
    options: &'g GenOptions,
    tables: Tables,
    plan: LabelPlan,
}

impl<'g> Generator<'g> {
    pub fn new(grammar: &'g Grammar, options: &'g GenOptions) -> Self {
        Self {
            grammar,
            options,
            tables: Tables::build(grammar),
            plan: LabelPlan::build(grammar),
        }
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn plan(&self) -> &LabelPlan {
        &self.plan
    }

    /// The complete output: prologue, generated matcher, epilogue.
    pub fn emit(&self, prologue: &str, epilogue: &str) -> String {
        let mut w = CodeWriter::new(&self.options.prefix);
        w.raw(prologue);
        w.blank();
        w.comment(0, "[BEGIN] Code generated automatically.");
        w.comment(0, &format!("grammar fingerprint: {}", fingerprint(self.grammar)));
        w.blank();
        self.emit_matcher(&mut w);
        w.blank();
        w.comment(0, "[END] Code generated automatically.");
        w.blank();
        w.raw(epilogue);
        w.finish()
    }

    fn emit_matcher(&self, w: &mut CodeWriter) {
        let labels = LabelEmitter {
            grammar: self.grammar,
            plan: &self.plan,
            prefix: &self.options.prefix,
            trace: self.options.trace,
        };
        self.emit_includes(w);
        self.emit_macros(w);
        self.emit_types(w);
        self.emit_tables(w);
        labels.emit_closure_forwards(w);
        self.emit_func_rule(w);
        labels.emit_closures(w);
        labels.emit_label(w);
        self.emit_func_kids(w);
    }

    fn emit_includes(&self, w: &mut CodeWriter) {
        w.include("assert.h");
        w.include("stdlib.h");
        w.include("string.h");
        w.blank();
    }

    fn emit_macros(&self, w: &mut CodeWriter) {
        let znew = w.name("ZNEW");
        w.line(0, &format!("#ifndef {}", znew));
        w.define("ZNEW(size)", "memset(malloc(size), 0, (size))");
        w.line(0, "#endif");
        w.blank();
        let state = w.name("state");
        w.define(
            "STATE(p)",
            &format!("((struct {} *){}(p))", state, NODE_STATE),
        );
        w.define("MAX_COST", &format!("0x{:x}", MAX_COST));
        w.blank();
        for nt in self.grammar.nonterminal_ids() {
            let n = self.grammar.nonterminal(nt);
            w.define(&format!("{}_NT", n.name), &n.number.to_string());
        }
        w.define("NUM_NTS", &self.tables.nonterminal_names.len().to_string());
        w.define("NUM_RULES", &self.grammar.rule_count().to_string());
        w.blank();
    }

    fn emit_types(&self, w: &mut CodeWriter) {
        let layout = &self.tables.layout;
        let state = w.name("state");
        w.line(0, &format!("struct {} {{", state));
        w.line(1, &format!("short costs[{}];", layout.cost_slots));
        w.comment(1, "indexed by local rule number");
        w.line(1, "struct {");
        for field in &layout.fields {
            w.line(2, &format!("unsigned int {}: {};", field.name, field.bits));
        }
        w.line(1, "} rule;");
        w.line(0, "};");
        w.blank();
    }

    fn emit_tables(&self, w: &mut CodeWriter) {
        let g = self.grammar;
        let t = &self.tables;
        let describe = |i: usize| t.rule_names[i].clone();

        // nonterminals per rule
        for (j, seq) in t.nonterminal_seqs.entries.iter().enumerate() {
            let items: Vec<String> = seq
                .iter()
                .map(|nt| w.name(&format!("{}_NT", g.nonterminal(*nt).name)))
                .collect();
            w.inline_array("short", &format!("nts_{}", j), &items, "0");
        }
        w.blank();
        let entries: Vec<(String, Option<String>)> = t
            .nonterminal_seqs
            .index
            .iter()
            .enumerate()
            .map(|(i, j)| (w.name(&format!("nts_{}", j)), Some(format!("{}. {}", i + 1, describe(i)))))
            .collect();
        w.table("short *", "nts", "0", &entries);
        w.define("MAX_NTS", &t.max_operands.to_string());
        w.blank();

        // operand paths per rule
        for (j, paths) in t.operand_paths.entries.iter().enumerate() {
            let items: Vec<String> = paths.iter().map(|p| format!("\"{}\"", p)).collect();
            w.inline_array("const char *", &format!("kid_paths_{}", j), &items, "0");
        }
        w.blank();
        let entries: Vec<(String, Option<String>)> = t
            .operand_paths
            .index
            .iter()
            .enumerate()
            .map(|(i, j)| (w.name(&format!("kid_paths_{}", j)), Some(format!("{}", i + 1))))
            .collect();
        w.table("const char **", "kid_paths", "0", &entries);

        let mut entries: Vec<(String, Option<String>)> = t
            .nonterminal_names
            .iter()
            .map(|name| (c_string(name), None))
            .collect();
        entries.push(("0".to_string(), None));
        w.table("const char *", "nt_names", "0", &entries);

        let entries: Vec<(String, Option<String>)> = t
            .rule_names
            .iter()
            .enumerate()
            .map(|(i, name)| (c_string(name), Some((i + 1).to_string())))
            .collect();
        w.table("const char *", "rule_names", "0", &entries);

        let entries: Vec<(String, Option<String>)> = t
            .templates
            .iter()
            .enumerate()
            .map(|(i, text)| (format!("\"{}\"", text), Some((i + 1).to_string())))
            .collect();
        w.table("const char *", "templates", "\"\"", &entries);

        let entries: Vec<(String, Option<String>)> = t
            .is_instruction
            .iter()
            .enumerate()
            .map(|(i, flag)| ((*flag as u8).to_string(), Some((i + 1).to_string())))
            .collect();
        w.table("char", "is_instruction", "0", &entries);

        // local rule number -> global rule number
        for (nt, ranks) in &t.rank_tables {
            let entries: Vec<(String, Option<String>)> = ranks
                .iter()
                .zip(g.rules_of(*nt))
                .map(|(rank, r)| (rank.to_string(), Some(g.describe_rule(*r))))
                .collect();
            w.table(
                "short",
                &format!("{}_rules", g.nonterminal(*nt).name),
                "0",
                &entries,
            );
        }
    }

    fn emit_func_rule(&self, w: &mut CodeWriter) {
        let rule = w.name("rule");
        let state = w.name("state");
        w.open_function(&format!("static int {}(void *state, int nt)", rule));
        w.line(1, "if (!state)");
        w.line(2, "return 0;");
        w.line(1, "switch (nt) {");
        for nt in self.grammar.nonterminal_ids() {
            let n = self.grammar.nonterminal(nt);
            let nt_const = w.name(&format!("{}_NT", n.name));
            let rules = w.name(&format!("{}_rules", n.name));
            w.line(1, &format!("case {}: /* {} */", nt_const, n.number));
            w.line(
                2,
                &format!("return {}[((struct {} *)state)->rule.{}];", rules, state, n.name),
            );
        }
        w.line(1, "default:");
        w.line(2, "abort();");
        w.line(1, "}");
        w.close_function();
    }

    fn emit_func_kids(&self, w: &mut CodeWriter) {
        let kids = w.name("kids");
        let kid_paths = w.name("kid_paths");
        let num_rules = w.name("NUM_RULES");
        w.open_function(&format!(
            "static void {}({} *p, int ruleno, {} *kids[])",
            kids, NODE_TYPE, NODE_TYPE
        ));
        w.line(1, "const char **paths;");
        w.line(1, "int i;");
        w.blank();
        w.line(1, "assert(p && \"null tree\");");
        w.line(1, "assert(kids && \"null kids for writing\");");
        w.blank();
        w.line(1, &format!("if (ruleno < 1 || ruleno > {})", num_rules));
        w.line(2, "abort();");
        w.line(1, &format!("paths = {}[ruleno];", kid_paths));
        w.line(1, "for (i = 0; paths[i]; i++) {");
        w.line(2, &format!("{} *q = p;", NODE_TYPE));
        w.line(2, "const char *s;");
        w.blank();
        w.line(2, "for (s = paths[i]; *s; s++)");
        w.line(3, &format!("q = *s == 'L' ? {}(q) : {}(q);", LEFT_KID, RIGHT_KID));
        w.line(2, "kids[i] = q;");
        w.line(1, "}");
        w.close_function();
    }
}

/// Short BLAKE3 digest of everything that affects the generated matcher.
pub fn fingerprint(grammar: &Grammar) -> String {
    let mut hasher = blake3::Hasher::new();
    for t in grammar.terminal_ids() {
        let terminal = grammar.terminal(t);
        hasher.update(format!("term {} {} {:?}\n", terminal.name, terminal.id, terminal.arity).as_bytes());
    }
    for r in grammar.rule_ids() {
        let rule = grammar.rule(r);
        hasher.update(
            format!(
                "rule {} {} {:?}\n",
                grammar.describe_rule(r),
                rule.cost.expr(),
                rule.template
            )
            .as_bytes(),
        );
    }
    hasher.finalize().to_hex()[..16].to_string()
}

/// Generate the full C output for `grammar`.
pub fn generate(grammar: &Grammar, options: &GenOptions, prologue: &str, epilogue: &str) -> String {
    Generator::new(grammar, options).emit(prologue, epilogue)
}
