//! Canonical LR(1) automaton construction: state enumeration, action table,
//! error-handler map.

use crate::error::ConflictError;
use crate::first_sets::FirstSets;
use crate::grammar::Grammar;
use crate::item::{closure, Item};
use crate::symbol::Symbol;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

pub type StateId = u32;

/// A shift or reduce decision for one `(state, lookahead)` cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(StateId),
    Reduce(u32),
}

/// The built automaton: canonical states plus the tables derived from them.
#[derive(Debug, Clone)]
pub struct Automaton {
    pub states: Vec<Vec<Item>>,
    pub action_table: Vec<BTreeMap<Symbol, Action>>,
    /// Per state, per recovery terminal: the error production's lhs and
    /// its handler name.
    pub error_handlers: Vec<BTreeMap<Symbol, (Symbol, String)>>,
}

impl Automaton {
    /// Builds the canonical collection by BFS from the closure of the
    /// synthetic start item, then derives the action and error-handler
    /// tables from the finished states.
    pub fn build(grammar: &Grammar, firsts: &FirstSets) -> Result<Self, ConflictError> {
        let seed = closure(grammar, firsts, vec![Item::new(0, 0, BTreeSet::new())]);
        log::trace!("seed state: {} items", seed.len());

        let mut states: Vec<Vec<Item>> = vec![seed.clone()];
        let mut index: BTreeMap<Vec<Item>, StateId> = BTreeMap::new();
        index.insert(seed, 0);

        let mut goto: Vec<BTreeMap<Symbol, StateId>> = vec![BTreeMap::new()];
        let mut queue: VecDeque<StateId> = VecDeque::from([0u32]);

        while let Some(state_id) = queue.pop_front() {
            let mut by_symbol: BTreeMap<Symbol, Vec<Item>> = BTreeMap::new();
            for item in &states[state_id as usize] {
                if let Some(sym) = item.next_symbol(grammar) {
                    by_symbol.entry(sym).or_default().push(item.advance());
                }
            }

            for (sym, kernel) in by_symbol {
                let target = closure(grammar, firsts, kernel);
                let target_id = match index.get(&target) {
                    Some(&id) => id,
                    None => {
                        let id = states.len() as StateId;
                        index.insert(target.clone(), id);
                        states.push(target);
                        goto.push(BTreeMap::new());
                        queue.push_back(id);
                        id
                    }
                };
                goto[state_id as usize].insert(sym, target_id);
            }
        }
        log::debug!("built {} states", states.len());

        let mut action_table = vec![BTreeMap::new(); states.len()];
        for (state_id, transitions) in goto.into_iter().enumerate() {
            for (sym, target) in transitions {
                action_table[state_id].insert(sym, Action::Shift(target));
            }
        }

        for (state_id, items) in states.iter().enumerate() {
            for item in items {
                if !item.is_complete(grammar) {
                    continue;
                }
                for &la in &item.lookahead {
                    match action_table[state_id].get(&la).copied() {
                        None => {
                            action_table[state_id].insert(la, Action::Reduce(item.rule_id));
                        }
                        Some(Action::Shift(_)) => {
                            return Err(ConflictError::ShiftReduce {
                                state: state_id,
                                symbol: grammar.symbols.resolve(la).to_string(),
                                rule: item.rule_id,
                            });
                        }
                        Some(Action::Reduce(existing)) if existing != item.rule_id => {
                            return Err(ConflictError::ReduceReduce {
                                state: state_id,
                                symbol: grammar.symbols.resolve(la).to_string(),
                                rule_a: existing,
                                rule_b: item.rule_id,
                            });
                        }
                        Some(Action::Reduce(_)) => {}
                    }
                }
            }
        }

        let mut error_handlers = vec![BTreeMap::new(); states.len()];
        for (state_id, items) in states.iter().enumerate() {
            for item in items {
                let lhs = grammar.rule(item.rule_id).lhs;
                let Some(handler) = grammar.error_rules.get(&lhs) else {
                    continue;
                };
                for &la in &item.lookahead {
                    match error_handlers[state_id].get(&la) {
                        None => {
                            error_handlers[state_id].insert(la, (lhs, handler.clone()));
                        }
                        Some((existing_lhs, _)) if *existing_lhs != lhs => {
                            log::debug!(
                                "conflicting error handlers in state {state_id} on a shared lookahead"
                            );
                            return Err(ConflictError::ErrorHandler {
                                state: state_id,
                                symbol: grammar.symbols.resolve(la).to_string(),
                                lhs_a: grammar.symbols.resolve(*existing_lhs).to_string(),
                                lhs_b: grammar.symbols.resolve(lhs).to_string(),
                            });
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        Ok(Self {
            states,
            action_table,
            error_handlers,
        })
    }
}
