use super::*;

fn sp() -> Span {
    Span::dummy()
}

/// leaf=1 (0-ary), neg=2 (1-ary), plus=3 (2-ary).
fn declare_ops(b: &mut GrammarBuilder) {
    b.declare_terminal("leaf", 1, sp()).unwrap();
    b.declare_terminal("neg", 2, sp()).unwrap();
    b.declare_terminal("plus", 3, sp()).unwrap();
}

fn nt_leaf(b: &mut GrammarBuilder, name: &str) -> PatternId {
    b.build_pattern(name, None, None, sp()).unwrap()
}

#[test]
fn test_arity_fixed_by_first_occurrence() {
    let mut b = GrammarBuilder::new();
    declare_ops(&mut b);
    let reg = nt_leaf(&mut b, "reg");
    b.build_pattern("neg", Some(reg), None, sp()).unwrap();

    let t = match b.lookup("neg") {
        Some(Symbol::Terminal(t)) => t,
        other => panic!("expected terminal, got {:?}", other),
    };
    assert_eq!(b.symbols().terminal(t).arity, Some(1));

    let reg2 = nt_leaf(&mut b, "reg");
    let err = b.build_pattern("neg", Some(reg), Some(reg2), sp()).unwrap_err();
    assert_eq!(err.message, "inconsistent arity for terminal 'neg' (1 != 2)");
    assert_eq!(b.symbols().terminal(t).arity, Some(1));
}

#[test]
fn test_arity_mismatch_rejected_in_either_order() {
    let mut b = GrammarBuilder::new();
    declare_ops(&mut b);
    b.build_pattern("leaf", None, None, sp()).unwrap();
    let reg = nt_leaf(&mut b, "reg");
    assert!(b.build_pattern("leaf", Some(reg), None, sp()).is_err());

    let mut b = GrammarBuilder::new();
    declare_ops(&mut b);
    let reg = nt_leaf(&mut b, "reg");
    b.build_pattern("leaf", Some(reg), None, sp()).unwrap();
    assert!(b.build_pattern("leaf", None, None, sp()).is_err());
}

#[test]
fn test_undefined_terminal_with_children() {
    let mut b = GrammarBuilder::new();
    let reg = nt_leaf(&mut b, "reg");
    let err = b.build_pattern("mul", Some(reg), None, sp()).unwrap_err();
    assert_eq!(err.message, "undefined terminal 'mul'");
    assert!(b.lookup("mul").is_none());
}

#[test]
fn test_nonterminal_with_children() {
    let mut b = GrammarBuilder::new();
    let reg = nt_leaf(&mut b, "reg");
    let err = b.build_pattern("reg", Some(reg), None, sp()).unwrap_err();
    assert_eq!(err.message, "nonterminal 'reg' cannot have children");
}

#[test]
fn test_right_child_alone_rejected() {
    let mut b = GrammarBuilder::new();
    declare_ops(&mut b);
    let reg = nt_leaf(&mut b, "reg");
    assert!(b.build_pattern("plus", None, Some(reg), sp()).is_err());
}

#[test]
fn test_forward_reference_interns_nonterminal() {
    let mut b = GrammarBuilder::new();
    nt_leaf(&mut b, "addr");
    assert!(matches!(b.lookup("addr"), Some(Symbol::Nonterminal(_))));
}

#[test]
fn test_lhs_cannot_be_terminal() {
    let mut b = GrammarBuilder::new();
    declare_ops(&mut b);
    let p = b.build_pattern("leaf", None, None, sp()).unwrap();
    let err = b.build_rule("leaf", p, None, "1", sp()).unwrap_err();
    assert!(err.message.contains("is a terminal"));
}

#[test]
fn test_terminal_count() {
    let mut b = GrammarBuilder::new();
    declare_ops(&mut b);
    let reg = nt_leaf(&mut b, "reg");
    let leaf = b.build_pattern("leaf", None, None, sp()).unwrap();
    let neg = b.build_pattern("neg", Some(leaf), None, sp()).unwrap();
    let plus = b.build_pattern("plus", Some(reg), Some(neg), sp()).unwrap();
    assert_eq!(b.patterns[reg.0].terminal_count, 0);
    assert_eq!(b.patterns[leaf.0].terminal_count, 1);
    assert_eq!(b.patterns[neg.0].terminal_count, 2);
    assert_eq!(b.patterns[plus.0].terminal_count, 3);
}

#[test]
fn test_cost_parsing() {
    assert_eq!(Cost::parse("12", sp()).unwrap(), Cost::Fixed(12));
    assert_eq!(Cost::parse(" 0 ", sp()).unwrap(), Cost::Fixed(0));
    assert_eq!(
        Cost::parse("range(p, 0, 255)", sp()).unwrap(),
        Cost::Dynamic("(range(p, 0, 255))".to_string())
    );
    assert_eq!(Cost::parse("-1", sp()).unwrap(), Cost::Dynamic("(-1)".to_string()));
    assert!(Cost::parse("", sp()).is_err());
    assert!(Cost::parse("99999999999", sp()).is_err());
    assert!(Cost::parse("32767", sp()).is_err());
    assert_eq!(Cost::Fixed(3).fixed(), Some(3));
    assert_eq!(Cost::Dynamic("(x)".to_string()).fixed(), None);
}

/// stmt: reg; reg: leaf; reg: plus(reg, reg); addr: reg; reg: neg(reg).
fn sample_grammar() -> Grammar {
    let mut b = GrammarBuilder::new();
    declare_ops(&mut b);
    b.intern_nonterminal("stmt", sp()).unwrap();

    let reg = nt_leaf(&mut b, "reg");
    b.build_rule("stmt", reg, None, "0", sp()).unwrap();

    let leaf = b.build_pattern("leaf", None, None, sp()).unwrap();
    b.build_rule("reg", leaf, Some("mov %0\\n"), "1", sp()).unwrap();

    let l = nt_leaf(&mut b, "reg");
    let r = nt_leaf(&mut b, "reg");
    let plus = b.build_pattern("plus", Some(l), Some(r), sp()).unwrap();
    b.build_rule("reg", plus, Some("add %0, %1\\n"), "2", sp()).unwrap();

    let reg = nt_leaf(&mut b, "reg");
    b.build_rule("addr", reg, None, "0", sp()).unwrap();

    let reg = nt_leaf(&mut b, "reg");
    let neg = b.build_pattern("neg", Some(reg), None, sp()).unwrap();
    b.build_rule("reg", neg, Some("neg %0\\n"), "(p->flags)", sp()).unwrap();

    b.finish().unwrap()
}

#[test]
fn test_global_ranks_gapless() {
    let g = sample_grammar();
    let ranks: Vec<u32> = g.rule_ids().map(|r| g.rule(r).global_rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_local_ranks_gapless_per_lhs() {
    let g = sample_grammar();
    for nt in g.nonterminal_ids() {
        let ranks: Vec<u32> = g.rules_of(nt).iter().map(|r| g.rule(*r).local_rank).collect();
        let expected: Vec<u32> = (1..=ranks.len() as u32).collect();
        assert_eq!(ranks, expected, "nonterminal {}", g.nonterminal(nt).name);
        assert_eq!(ranks.len() as u32, g.nonterminal(nt).rule_count);
    }
    let reg = match g.symbols().lookup("reg") {
        Some(Symbol::Nonterminal(nt)) => nt,
        _ => unreachable!(),
    };
    let globals: Vec<u32> = g.rules_of(reg).iter().map(|r| g.rule(*r).global_rank).collect();
    assert_eq!(globals, vec![2, 3, 5]);
}

#[test]
fn test_start_symbol_is_first_referenced() {
    let g = sample_grammar();
    assert_eq!(g.nonterminal(g.start()).name, "stmt");
    assert_eq!(g.nonterminal(g.start()).number, 1);
}

#[test]
fn test_missing_start_rule_rejected() {
    let mut b = GrammarBuilder::new();
    declare_ops(&mut b);
    b.intern_nonterminal("stmt", sp()).unwrap();
    let leaf = b.build_pattern("leaf", None, None, sp()).unwrap();
    b.build_rule("reg", leaf, None, "1", sp()).unwrap();
    let errors = b.finish().unwrap_err();
    assert_eq!(errors[0].message, "missing rule for start symbol 'stmt'");
}

#[test]
fn test_empty_grammar_rejected() {
    let errors = GrammarBuilder::new().finish().unwrap_err();
    assert_eq!(errors[0].message, "grammar has no rules");
}

#[test]
fn test_dispatch_and_chain_orderings() {
    let g = sample_grammar();
    let term = |name: &str| match g.symbols().lookup(name) {
        Some(Symbol::Terminal(t)) => t,
        _ => unreachable!(),
    };
    let nonterm = |name: &str| match g.symbols().lookup(name) {
        Some(Symbol::Nonterminal(nt)) => nt,
        _ => unreachable!(),
    };
    let ranks = |rules: &[RuleId]| rules.iter().map(|r| g.rule(*r).global_rank).collect::<Vec<_>>();

    assert_eq!(ranks(g.rules_rooted_at(term("leaf"))), vec![2]);
    assert_eq!(ranks(g.rules_rooted_at(term("plus"))), vec![3]);
    assert_eq!(ranks(g.rules_rooted_at(term("neg"))), vec![5]);
    // Most recent first.
    assert_eq!(ranks(g.chain_rules_from(nonterm("reg"))), vec![4, 1]);
    assert!(g.chain_rules_from(nonterm("stmt")).is_empty());

    assert!(g.is_chain_rule(RuleId(0)));
    assert!(!g.is_chain_rule(RuleId(1)));
}

#[test]
fn test_describe_rules() {
    let g = sample_grammar();
    let described: Vec<String> = g.rule_ids().map(|r| g.describe_rule(r)).collect();
    assert_eq!(
        described,
        vec![
            "stmt: reg",
            "reg: leaf",
            "reg: plus(reg, reg)",
            "addr: reg",
            "reg: neg(reg)",
        ]
    );
}

#[test]
fn test_dynamic_cost_kept() {
    let g = sample_grammar();
    let rule = g.rule(RuleId(4));
    assert_eq!(rule.cost, Cost::Dynamic("((p->flags))".to_string()));
    assert_eq!(rule.cost.expr(), "((p->flags))");
    assert_eq!(rule.fixed_cost(), None);
    assert_eq!(g.rule(RuleId(1)).fixed_cost(), Some(1));
}

#[test]
fn test_unused_symbol_warnings() {
    let mut b = GrammarBuilder::new();
    declare_ops(&mut b);
    let leaf = b.build_pattern("leaf", None, None, sp()).unwrap();
    b.build_rule("stmt", leaf, None, "1", sp()).unwrap();
    let mem = nt_leaf(&mut b, "mem");
    b.build_rule("stmt", mem, None, "1", sp()).unwrap();
    let g = b.finish().unwrap();

    let messages: Vec<&str> = g.warnings().iter().map(|w| w.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "nonterminal 'mem' has no rules",
            "terminal 'neg' is never used in a pattern",
            "terminal 'plus' is never used in a pattern",
        ]
    );
}
