//! LR(1) parser generator and table-driven runtime with grammar-declared
//! error recovery.
//!
//! Build a [`Generator`] once from either a list of [`RuleSpec`]s (full
//! construction: grammar, FIRST sets, canonical automaton) or a
//! [`table::StaticTables`] payload (bypassing construction entirely), then
//! call [`Generator::parse`] as many times as needed — a built generator is
//! immutable and safe to share across threads.

pub mod action;
pub mod automaton;
pub mod error;
pub mod first_sets;
pub mod grammar;
pub mod item;
pub mod runtime;
pub mod selfcheck;
pub mod symbol;
pub mod table;

pub use action::{ActionRegistry, Arity};
pub use error::{
    BuildError, ConflictError, GrammarError, ParseError, RuntimeError, SelfCheckError, TableError,
};
pub use grammar::{Grammar, RuleSpec};
pub use runtime::{Token, TokenSource};
pub use symbol::{Symbol, SymbolTable};
pub use table::StaticTables;

use automaton::Automaton;
use first_sets::FirstSets;

/// A built grammar, automaton, and action registry, ready to parse.
pub struct Generator<V> {
    grammar: Grammar,
    automaton: Automaton,
    actions: ActionRegistry<V>,
}

impl<V> Generator<V> {
    /// Builds a grammar from `specs`, computes FIRST sets, builds the
    /// canonical LR(1) automaton, and optionally self-checks `actions`
    /// against the result.
    pub fn build(
        specs: &[RuleSpec],
        actions: ActionRegistry<V>,
        self_check: bool,
    ) -> Result<Self, BuildError> {
        let grammar = Grammar::build(specs)?;
        let firsts = FirstSets::build(&grammar);
        let automaton = Automaton::build(&grammar, &firsts)?;
        if self_check {
            selfcheck::check(&grammar, &actions)?;
        }
        Ok(Self {
            grammar,
            automaton,
            actions,
        })
    }

    /// Loads a pre-built grammar and automaton from `tables`, skipping
    /// closure/BFS construction entirely.
    pub fn from_static(
        tables: StaticTables,
        actions: ActionRegistry<V>,
        self_check: bool,
    ) -> Result<Self, BuildError> {
        let (grammar, automaton) = table::decode(tables)?;
        if self_check {
            selfcheck::check(&grammar, &actions)?;
        }
        Ok(Self {
            grammar,
            automaton,
            actions,
        })
    }

    /// Runs one parse over `tokens`, returning the `entry` rule's value.
    pub fn parse<S: TokenSource<V>>(&self, tokens: S) -> Result<V, RuntimeError<S::Error>> {
        runtime::parse(&self.grammar, &self.automaton, &self.actions, tokens)
    }

    /// The symbol table backing this generator's grammar, for resolving
    /// names out of a [`ParseError`]'s `expected` set.
    pub fn symbols(&self) -> &SymbolTable {
        &self.grammar.symbols
    }
}
