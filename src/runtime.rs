//! The table-driven shift-reduce runtime, with localized error recovery.

use crate::action::ActionRegistry;
use crate::automaton::{Action, Automaton};
use crate::error::{ParseError, RuntimeError};
use crate::grammar::Grammar;
use crate::symbol::Symbol;
use std::collections::BTreeSet;

/// One token handed to the parser by the host's lexer.
#[derive(Debug, Clone)]
pub struct Token<V> {
    pub name: Symbol,
    pub value: V,
    pub start: usize,
    pub end: usize,
}

impl<V> Token<V> {
    pub fn new(name: Symbol, value: V, start: usize, end: usize) -> Self {
        Self {
            name,
            value,
            start,
            end,
        }
    }
}

/// The lexer contract. A lexer that cannot fail (e.g. a test fixture
/// driven from a `Vec<Token<V>>`) gets this for free via the blanket
/// `Iterator` impl below; a streaming host lexer implements it directly
/// and may surface its own error type through `Self::Error`.
pub trait TokenSource<V> {
    type Error: std::error::Error + 'static;

    /// Returns the next token, or `None` once input is exhausted. The
    /// runtime synthesizes the `$END` sentinel itself; a `TokenSource`
    /// never needs to produce it.
    fn next_token(&mut self) -> Result<Option<Token<V>>, Self::Error>;
}

impl<V, I: Iterator<Item = Token<V>>> TokenSource<V> for I {
    type Error = std::convert::Infallible;

    fn next_token(&mut self) -> Result<Option<Token<V>>, Self::Error> {
        Ok(Iterator::next(self))
    }
}

struct Pending<V> {
    symbol: Symbol,
    value: Option<V>,
    start: usize,
    end: usize,
}

/// A stack frame: `(value, state, span_start, span_end)`. The span is
/// `[start, end)` of whatever this frame derives — a single token's extent
/// on shift, or `[first_popped.start, last_popped.end]` on reduce — so that
/// a synthesized nonterminal carries a span just like a token does.
struct Frame<V> {
    state: u32,
    value: Option<V>,
    span_start: usize,
    span_end: usize,
}

fn pull<V, S: TokenSource<V>>(
    tokens: &mut S,
    grammar: &Grammar,
    last_pos: &mut usize,
) -> Result<Pending<V>, RuntimeError<S::Error>> {
    match tokens.next_token().map_err(RuntimeError::Lexer)? {
        Some(tok) => {
            *last_pos = tok.end;
            Ok(Pending {
                symbol: tok.name,
                value: Some(tok.value),
                start: tok.start,
                end: tok.end,
            })
        }
        None => Ok(Pending {
            symbol: grammar.end,
            value: None,
            start: *last_pos,
            end: *last_pos,
        }),
    }
}

/// Drives one parse from `tokens` to completion, returning the `entry`
/// rule's synthesized value.
///
/// Acceptance has no explicit action-table entry: the synthetic rule
/// `$ENTRY -> entry $END` is seeded with an empty lookahead and so can
/// never be reduced through the table. Once `$END` is shifted the loop
/// returns the value carried by the `entry` frame directly — the loop
/// boundary *is* the accept action.
pub fn parse<V, S: TokenSource<V>>(
    grammar: &Grammar,
    automaton: &Automaton,
    actions: &ActionRegistry<V>,
    mut tokens: S,
) -> Result<V, RuntimeError<S::Error>> {
    let mut stack: Vec<Frame<V>> = vec![Frame {
        state: 0,
        value: None,
        span_start: 0,
        span_end: 0,
    }];
    let mut last_pos = 0usize;
    let mut lookahead = pull(&mut tokens, grammar, &mut last_pos)?;

    loop {
        let state = stack.last().expect("stack never empties").state;
        let action = automaton.action_table[state as usize]
            .get(&lookahead.symbol)
            .copied();

        match action {
            Some(Action::Shift(target)) => {
                let shifted_end = lookahead.symbol == grammar.end;
                stack.push(Frame {
                    state: target,
                    value: lookahead.value.take(),
                    span_start: lookahead.start,
                    span_end: lookahead.end,
                });
                if shifted_end {
                    let entry_value = stack.into_iter().nth(1).and_then(|f| f.value);
                    return entry_value.ok_or_else(|| {
                        RuntimeError::Internal("entry frame carried no value".to_string())
                    });
                }
                lookahead = pull(&mut tokens, grammar, &mut last_pos)?;
            }
            Some(Action::Reduce(rule_id)) => {
                reduce(grammar, automaton, actions, &mut stack, rule_id)?;
            }
            None => {
                recover(grammar, automaton, actions, &mut tokens, &mut stack, &mut lookahead, &mut last_pos)?;
            }
        }
    }
}

fn reduce<V, E: std::error::Error + 'static>(
    grammar: &Grammar,
    automaton: &Automaton,
    actions: &ActionRegistry<V>,
    stack: &mut Vec<Frame<V>>,
    rule_id: u32,
) -> Result<(), RuntimeError<E>> {
    let rule = grammar.rule(rule_id);
    let n = rule.rhs.len();
    let start_idx = stack.len() - n;
    let popped: Vec<Frame<V>> = stack.split_off(start_idx);

    let span_start = popped.first().expect("rule rhs is never empty").span_start;
    let span_end = popped.last().expect("rule rhs is never empty").span_end;

    let args: Vec<V> = popped
        .into_iter()
        .zip(rule.rhs.iter())
        .filter(|(_, rhs)| rhs.attributed)
        .filter_map(|(frame, _)| frame.value)
        .collect();

    let value = if rule.is_transparent() {
        let mut it = args.into_iter();
        let value = it.next().ok_or_else(|| {
            RuntimeError::Internal(format!(
                "transparent rule #{rule_id} produced no attributed value"
            ))
        })?;
        if it.next().is_some() {
            return Err(RuntimeError::Internal(format!(
                "transparent rule #{rule_id} produced more than one attributed value"
            )));
        }
        value
    } else {
        let name = rule.action_name.as_deref().expect("non-transparent rule has a name");
        let action = actions
            .action(name)
            .ok_or_else(|| RuntimeError::Internal(format!("no action registered for `{name}`")))?;
        action.call(&args)
    };

    let back_state = stack.last().expect("stack never empties").state;
    let goto = automaton.action_table[back_state as usize]
        .get(&rule.lhs)
        .copied();
    let Some(Action::Shift(target)) = goto else {
        return Err(RuntimeError::Internal(format!(
            "no GOTO for rule #{rule_id}'s lhs from state {back_state}"
        )));
    };
    stack.push(Frame {
        state: target,
        value: Some(value),
        span_start,
        span_end,
    });
    Ok(())
}

/// Localized panic-mode recovery.
///
/// Pops frames into a scratch list until the new top's state carries a
/// nonempty error-handler map, then discards input tokens until one matches
/// a declared sync terminal there. `error_start` is the span start of the
/// last frame popped (the discarded frame immediately above the recovery
/// point) — if nothing needed popping, the top already matched and the
/// error's natural start is where that frame's own span ends. `error_pos`
/// is the start of the original offending token, captured before any
/// tokens are discarded; `error_end` is the end of the last discarded
/// token.
#[allow(clippy::too_many_arguments)]
fn recover<V, S: TokenSource<V>>(
    grammar: &Grammar,
    automaton: &Automaton,
    actions: &ActionRegistry<V>,
    tokens: &mut S,
    stack: &mut Vec<Frame<V>>,
    lookahead: &mut Pending<V>,
    last_pos: &mut usize,
) -> Result<(), RuntimeError<S::Error>> {
    let state = stack.last().expect("stack never empties").state;
    let expected: BTreeSet<Symbol> = automaton.action_table[state as usize].keys().copied().collect();
    let top_before_pop_start = stack.last().expect("stack never empties").span_start;

    let mut popped: Vec<Frame<V>> = Vec::new();
    loop {
        let top_state = stack.last().expect("stack never empties").state;
        if !automaton.error_handlers[top_state as usize].is_empty() {
            break;
        }
        popped.push(stack.pop().expect("stack never empties"));
        if stack.is_empty() {
            return Err(RuntimeError::Parse(ParseError {
                message: format!("unexpected symbol in state {state}"),
                start: top_before_pop_start,
                pos: lookahead.start,
                end: lookahead.end,
                expected,
            }));
        }
    }

    let handler_state = stack.last().expect("stack never empties").state;
    let sync_terminals: BTreeSet<Symbol> = automaton.error_handlers[handler_state as usize]
        .keys()
        .copied()
        .collect();

    let error_pos = lookahead.start;
    let mut last_end = lookahead.end;
    while !sync_terminals.contains(&lookahead.symbol) {
        if lookahead.symbol == grammar.end {
            return Err(RuntimeError::Parse(ParseError {
                message: "unrecoverable parse error: input ended before a recovery point"
                    .to_string(),
                start: stack.last().expect("stack never empties").span_start,
                pos: lookahead.start,
                end: lookahead.end,
                expected,
            }));
        }
        last_end = lookahead.end;
        *lookahead = pull(tokens, grammar, last_pos)?;
    }
    let error_end = last_end;

    let (lhs, handler_name) = automaton.error_handlers[handler_state as usize]
        .get(&lookahead.symbol)
        .cloned()
        .expect("sync_terminals was built from this same map");

    let handler = actions.error_handler(&handler_name).ok_or_else(|| {
        RuntimeError::Internal(format!("no error handler registered for `{handler_name}`"))
    })?;

    let error_start = popped
        .last()
        .map(|f| f.span_start)
        .unwrap_or_else(|| stack.last().expect("stack never empties").span_end);

    let value = handler(lhs, error_start, error_pos, error_end, expected);
    log::debug!("recovered via `{handler_name}` at state {handler_state}");

    let back_state = stack.last().expect("stack never empties").state;
    let goto = automaton.action_table[back_state as usize]
        .get(&lhs)
        .copied();
    let Some(Action::Shift(target)) = goto else {
        return Err(RuntimeError::Internal(format!(
            "no GOTO for `{}` after recovery from state {back_state}",
            grammar.symbols.resolve(lhs)
        )));
    };
    stack.push(Frame {
        state: target,
        value: Some(value),
        span_start: error_start,
        span_end: error_end,
    });
    Ok(())
}
