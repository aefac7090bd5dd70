//! Crate-wide error taxonomy.
//!
//! Grammar errors and self-check errors are both fatal to construction and
//! are folded into [`BuildError`]; parse errors and internal errors are
//! distinct, returned only from [`crate::runtime`] by way of
//! [`RuntimeError`].

use crate::symbol::Symbol;
use std::collections::BTreeSet;
use thiserror::Error;

/// Malformed or unsupported grammar input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("rule for `{lhs}` has an empty body; empty (nullable) productions are not supported")]
    EmptyProduction { lhs: String },

    #[error("error production for `{lhs}` is missing an action name")]
    ErrorProductionMissingAction { lhs: String },

    #[error("duplicate error production for `{lhs}`")]
    DuplicateErrorProduction { lhs: String },

    #[error("no rule defines the required start nonterminal `{START}`", START = crate::symbol::START)]
    MissingStartRule,
}

/// A shift/reduce, reduce/reduce, or error-handler collision.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConflictError {
    #[error("shift/reduce conflict in state {state} on `{symbol}` (reduce rule #{rule})")]
    ShiftReduce {
        state: usize,
        symbol: String,
        rule: u32,
    },

    #[error("reduce/reduce conflict in state {state} on `{symbol}` (rule #{rule_a} vs #{rule_b})")]
    ReduceReduce {
        state: usize,
        symbol: String,
        rule_a: u32,
        rule_b: u32,
    },

    #[error(
        "conflicting error handlers in state {state} on `{symbol}` (`{lhs_a}` vs `{lhs_b}`)"
    )]
    ErrorHandler {
        state: usize,
        symbol: String,
        lhs_a: String,
        lhs_b: String,
    },
}

/// Action-arity verification failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelfCheckError {
    #[error("transparent rule #{rule} must forward exactly one attributed symbol, has {count}")]
    TransparentArity { rule: u32, count: usize },

    #[error("no action registered for `{name}`")]
    MissingAction { name: String },

    #[error("no error handler registered for `{name}`")]
    MissingErrorHandler { name: String },

    #[error("action `{name}` is invoked with {required} argument(s), registered handler accepts {range}")]
    ArityMismatch {
        name: String,
        required: usize,
        range: String,
    },
}

/// A malformed static table: an unrecognized op code or a dangling
/// state/symbol reference. Distinct from a host grammar mistake — this only
/// arises from a corrupted or hand-edited wire payload.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed static table: {0}")]
pub struct TableError(pub String);

/// Everything that can make [`crate::Generator::build`]/`from_static` fail.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error(transparent)]
    SelfCheck(#[from] SelfCheckError),
    #[error(transparent)]
    Table(#[from] TableError),
}

/// An unrecoverable parse failure.
///
/// `expected` carries raw [`Symbol`] handles rather than resolved names: a
/// `ParseError` can outlive the `SymbolTable` borrow, and callers that want
/// names resolve them against the table they built the generator from.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("parse error: {message} (pos {pos})")]
pub struct ParseError {
    pub message: String,
    pub start: usize,
    pub pos: usize,
    pub end: usize,
    pub expected: BTreeSet<Symbol>,
}

/// Top-level error returned from a parse run.
///
/// Generic over the lexer's own error type so a streaming host lexer that
/// can itself fail plugs in without this crate needing to know anything
/// about it; the lexer's error is surfaced unchanged.
#[derive(Debug, Error)]
pub enum RuntimeError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// An invariant violation: an unknown table op code, a malformed static
    /// table, or a reduce whose attributed-value count does not match its
    /// rule. Never silently swallowed, never a panic.
    #[error("internal parser error: {0}")]
    Internal(String),

    #[error(transparent)]
    Lexer(E),
}
