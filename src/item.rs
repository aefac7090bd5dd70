//! LR(1) items and closure.

use crate::first_sets::FirstSets;
use crate::grammar::Grammar;
use crate::symbol::Symbol;
use std::collections::{BTreeSet, VecDeque};

/// A dotted rule with its lookahead set.
///
/// `rule_id`/`dot` identify the position; `lookahead` is the set of
/// terminals allowed to follow a reduction of this item. Two items with the
/// same `(rule_id, dot)` are the same item for merge purposes — only their
/// lookaheads differ, and closure always takes their union.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Item {
    pub rule_id: u32,
    pub dot: usize,
    pub lookahead: BTreeSet<Symbol>,
}

impl Item {
    pub fn new(rule_id: u32, dot: usize, lookahead: BTreeSet<Symbol>) -> Self {
        Self {
            rule_id,
            dot,
            lookahead,
        }
    }

    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        self.dot == grammar.rule(self.rule_id).rhs.len()
    }

    /// The symbol immediately after the dot, if any.
    pub fn next_symbol(&self, grammar: &Grammar) -> Option<Symbol> {
        grammar.rule(self.rule_id).rhs.get(self.dot).map(|s| s.symbol)
    }

    /// Advances the dot past `next_symbol`, keeping the lookahead.
    pub fn advance(&self) -> Self {
        Self {
            rule_id: self.rule_id,
            dot: self.dot + 1,
            lookahead: self.lookahead.clone(),
        }
    }
}

/// Computes the closure of `seed` under `grammar`, merging lookaheads for
/// items sharing a `(rule_id, dot)` key.
///
/// For an item `[A -> α • B β, la]` with `B` a nonterminal, every rule
/// `B -> γ` contributes a child item `[B -> • γ, FIRST(β·la)]`, where
/// `FIRST(β·la)` is `{ first(β[0]) }` when `β` is non-empty and `la`
/// unchanged (propagated) otherwise — this grammar shape has no epsilon
/// productions, so FIRST of a one-symbol lookup is always a singleton.
pub fn closure(grammar: &Grammar, firsts: &FirstSets, seed: Vec<Item>) -> Vec<Item> {
    use std::collections::BTreeMap;

    let mut merged: BTreeMap<(u32, usize), BTreeSet<Symbol>> = BTreeMap::new();
    let mut queue: VecDeque<Item> = VecDeque::from(seed);

    while let Some(item) = queue.pop_front() {
        let key = (item.rule_id, item.dot);
        let entry = merged.entry(key).or_default();
        let mut added_any = false;
        for la in &item.lookahead {
            added_any |= entry.insert(*la);
        }
        if !added_any {
            continue;
        }

        let rule = grammar.rule(item.rule_id);
        let Some(next) = rule.rhs.get(item.dot).map(|s| s.symbol) else {
            continue;
        };
        let beta_first = rule.rhs.get(item.dot + 1).map(|s| s.symbol);
        let child_lookahead: BTreeSet<Symbol> = match beta_first {
            Some(b) => std::iter::once(firsts.first(b)).collect(),
            None => item.lookahead.clone(),
        };

        for child in grammar.rules_for(next) {
            queue.push_back(Item::new(child.id, 0, child_lookahead.clone()));
        }
    }

    let mut items: Vec<Item> = merged
        .into_iter()
        .map(|((rule_id, dot), lookahead)| Item {
            rule_id,
            dot,
            lookahead,
        })
        .collect();
    items.sort();
    items
}
