//! Conflict detection at build time, and unrecoverable parse errors (no
//! error production installed) reporting the expected-symbol set.

use lrauto::{ActionRegistry, Arity, BuildError, ConflictError, Generator, RuleSpec, RuntimeError, Symbol, SymbolTable, Token};

fn arithmetic_specs() -> Vec<RuleSpec> {
    vec![
        RuleSpec::new(None, "entry", "expr1"),
        RuleSpec::new(Some("add"), "expr1", "expr1 _+ expr2"),
        RuleSpec::new(None, "expr1", "expr2"),
        RuleSpec::new(None, "expr2", "INT"),
    ]
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn tokenize(table: &SymbolTable, src: &str) -> Vec<Token<i64>> {
    let mut tokens = Vec::new();
    let mut pos = 0usize;
    for word in src.split_whitespace() {
        let (name, value) = match word {
            "+" => (word, 0),
            n => ("INT", n.parse::<i64>().unwrap()),
        };
        let sym: Symbol = table.get(name).unwrap();
        tokens.push(Token::new(sym, value, pos, pos + word.len()));
        pos += word.len() + 1;
    }
    tokens
}

#[test]
fn unrecoverable_parse_error_reports_expected_symbols() {
    init_logging();
    let mut actions: ActionRegistry<i64> = ActionRegistry::new();
    actions.register_action("add", Arity::exact(2), |a| a[0] + a[1]);
    let gen = Generator::build(&arithmetic_specs(), actions, true).unwrap();

    // `+ +` can never start an expression: unrecoverable, no error
    // production is declared in this grammar at all.
    let tokens = tokenize(gen.symbols(), "+ +");
    let err = gen.parse(tokens.into_iter()).unwrap_err();

    match err {
        RuntimeError::Parse(parse_err) => {
            let int = gen.symbols().get("INT").unwrap();
            assert!(parse_err.expected.contains(&int));
            assert_eq!(parse_err.pos, 0);
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn shift_reduce_conflict_is_named_with_the_colliding_rule() {
    init_logging();
    // The textbook ambiguous sum grammar: with no precedence declared,
    // `expr + expr` with lookahead `+` can either reduce the just-built
    // `expr + expr` or shift into another one. This is a genuine LR(1)
    // conflict, not merely an LALR/SLR artifact.
    let specs = vec![
        RuleSpec::new(None, "entry", "expr"),
        RuleSpec::new(Some("add"), "expr", "expr _+ expr"),
        RuleSpec::new(None, "expr", "INT"),
    ];
    let actions: ActionRegistry<i64> = ActionRegistry::new();
    let err = Generator::build(&specs, actions, false).unwrap_err();
    match err {
        BuildError::Conflict(ConflictError::ShiftReduce { rule, .. }) => {
            assert!(rule != 0);
        }
        other => panic!("expected a shift/reduce conflict, got {other:?}"),
    }
}

#[test]
fn reduce_reduce_conflict_names_both_colliding_rules() {
    init_logging();
    // Two distinct nonterminals both derive `INT` and are never
    // distinguished by any lookahead, so the table cannot pick a rule to
    // reduce by once `INT` is on top of the stack.
    let specs = vec![
        RuleSpec::new(Some("as_a"), "entry", "a"),
        RuleSpec::new(Some("as_b"), "entry", "b"),
        RuleSpec::new(Some("mk_a"), "a", "INT"),
        RuleSpec::new(Some("mk_b"), "b", "INT"),
    ];
    let actions: ActionRegistry<i64> = ActionRegistry::new();
    let err = Generator::build(&specs, actions, false).unwrap_err();
    match err {
        BuildError::Conflict(ConflictError::ReduceReduce { rule_a, rule_b, .. }) => {
            assert_ne!(rule_a, rule_b);
        }
        other => panic!("expected a reduce/reduce conflict, got {other:?}"),
    }
}

#[test]
fn duplicate_error_production_is_rejected_before_automaton_construction() {
    init_logging();
    let specs = vec![
        RuleSpec::new(Some("id"), "entry", "INT"),
        RuleSpec::new(Some("recover_a"), "stmt", "$ERROR"),
        RuleSpec::new(Some("recover_b"), "stmt", "$ERROR"),
    ];
    let actions: ActionRegistry<i64> = ActionRegistry::new();
    let err = Generator::build(&specs, actions, false).unwrap_err();
    assert!(matches!(err, BuildError::Grammar(_)));
}
