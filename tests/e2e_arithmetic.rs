//! Arithmetic expression evaluation over the classic four-level precedence
//! cascade (`expr1` add/sub, `expr2` mul/div, `expr3` unary minus, `expr4`
//! parens/literal).

use lrauto::{ActionRegistry, Arity, Generator, RuleSpec, Symbol, SymbolTable, Token};

fn grammar_specs() -> Vec<RuleSpec> {
    vec![
        RuleSpec::new(None, "entry", "expr1"),
        RuleSpec::new(Some("add"), "expr1", "expr1 _+ expr2"),
        RuleSpec::new(Some("sub"), "expr1", "expr1 _- expr2"),
        RuleSpec::new(None, "expr1", "expr2"),
        RuleSpec::new(Some("mul"), "expr2", "expr2 _* expr3"),
        RuleSpec::new(Some("div"), "expr2", "expr2 _/ expr3"),
        RuleSpec::new(None, "expr2", "expr3"),
        RuleSpec::new(Some("neg"), "expr3", "_- expr3"),
        RuleSpec::new(None, "expr3", "expr4"),
        RuleSpec::new(None, "expr4", "_( expr1 _)"),
        RuleSpec::new(None, "expr4", "INT"),
    ]
}

fn build() -> Generator<i64> {
    let mut actions: ActionRegistry<i64> = ActionRegistry::new();
    actions.register_action("add", Arity::exact(2), |a| a[0] + a[1]);
    actions.register_action("sub", Arity::exact(2), |a| a[0] - a[1]);
    actions.register_action("mul", Arity::exact(2), |a| a[0] * a[1]);
    actions.register_action("div", Arity::exact(2), |a| a[0] / a[1]);
    actions.register_action("neg", Arity::exact(1), |a| -a[0]);
    Generator::build(&grammar_specs(), actions, true).expect("grammar builds without conflicts")
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Tokenizes a tiny whitespace-separated stream of `+ - * / ( )` and
/// integer literals against `table`.
fn tokenize(table: &SymbolTable, src: &str) -> Vec<Token<i64>> {
    let mut tokens = Vec::new();
    let mut pos = 0usize;
    for word in src.split_whitespace() {
        let (name, value) = match word {
            "+" | "-" | "*" | "/" | "(" | ")" => (word, 0),
            n => ("INT", n.parse::<i64>().expect("test input is a valid integer")),
        };
        let sym: Symbol = table.get(name).unwrap_or_else(|| panic!("unknown terminal `{name}`"));
        tokens.push(Token::new(sym, value, pos, pos + word.len()));
        pos += word.len() + 1;
    }
    tokens
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    init_logging();
    let gen = build();
    let tokens = tokenize(gen.symbols(), "2 + 3 * 4");
    let value = gen.parse(tokens.into_iter()).unwrap();
    assert_eq!(value, 14);
}

#[test]
fn parens_override_precedence() {
    init_logging();
    let gen = build();
    let tokens = tokenize(gen.symbols(), "( 2 + 3 ) * 4");
    let value = gen.parse(tokens.into_iter()).unwrap();
    assert_eq!(value, 20);
}

#[test]
fn unary_minus_binds_tighter_than_addition() {
    init_logging();
    let gen = build();
    let tokens = tokenize(gen.symbols(), "- 2 + 3");
    let value = gen.parse(tokens.into_iter()).unwrap();
    assert_eq!(value, 1);
}

#[test]
fn division_and_subtraction_are_left_associative() {
    init_logging();
    let gen = build();
    let tokens = tokenize(gen.symbols(), "100 / 10 / 2");
    let value = gen.parse(tokens.into_iter()).unwrap();
    assert_eq!(value, 5);
}
