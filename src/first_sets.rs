//! FIRST-set calculation.
//!
//! Not a textbook fixed-point FIRST set. The generator this crate's runtime
//! follows computes it as a single chain per symbol: for each nonterminal,
//! remember only the first RHS symbol of the *last* rule seen for that
//! nonterminal, then follow that chain until it stops. This works because
//! grammars written for this generator put the general/fallthrough
//! alternative last, e.g. `expr1 -> expr1 + expr2 | expr2`: the chain for
//! `expr1` walks straight to `expr2`, `expr3`, ... down to a terminal.

use crate::grammar::Grammar;
use crate::symbol::Symbol;
use std::collections::{BTreeMap, BTreeSet};

/// Per-symbol FIRST chains derived from one [`Grammar`].
#[derive(Debug, Clone)]
pub struct FirstSets {
    rule_firsts: BTreeMap<Symbol, Symbol>,
}

impl FirstSets {
    /// Builds the chain map by walking rules in id order; later rules
    /// overwrite earlier ones sharing the same lhs.
    pub fn build(grammar: &Grammar) -> Self {
        let mut rule_firsts = BTreeMap::new();
        for rule in &grammar.rules {
            if let Some(first) = rule.rhs.first() {
                rule_firsts.insert(rule.lhs, first.symbol);
            }
        }
        Self { rule_firsts }
    }

    /// FIRST(sym): the chain `sym, rule_firsts[sym], ...` until a symbol
    /// repeats or has no entry (terminals always stop here, since they
    /// never appear as a lhs).
    pub fn first(&self, sym: Symbol) -> Symbol {
        let mut seen = BTreeSet::new();
        let mut cur = sym;
        seen.insert(cur);
        while let Some(&next) = self.rule_firsts.get(&cur) {
            if !seen.insert(next) {
                break;
            }
            cur = next;
        }
        cur
    }

    /// Union of `first(t)` over every symbol in `syms` — for this
    /// epsilon-free grammar shape, FIRST of a single symbol is a
    /// singleton, so this is just the per-symbol chain endpoints collected.
    pub fn first_of_set<'a>(&self, syms: impl IntoIterator<Item = &'a Symbol>) -> BTreeSet<Symbol> {
        syms.into_iter().map(|&s| self.first(s)).collect()
    }
}
