//! The static table wire format: a pre-built grammar plus action and
//! error-handler tables that bypass grammar/first-set/item/automaton
//! construction entirely.

use crate::automaton::{Action, Automaton};
use crate::error::TableError;
use crate::grammar::{Grammar, RhsSymbol, Rule};
use crate::symbol::SymbolTable;
use std::collections::BTreeMap;

/// One rule as it appears in a static payload: already numbered, already
/// split into attributed/unattributed RHS positions.
#[derive(Debug, Clone)]
pub struct StaticRule {
    pub action_name: Option<String>,
    pub lhs: String,
    /// `(symbol name, attributed)` pairs, in RHS order.
    pub rhs: Vec<(String, bool)>,
}

/// The grammar half of a static payload: rule 0 must be the synthetic
/// `$ENTRY -> entry $END` rule, matching what [`Grammar::build`] produces.
#[derive(Debug, Clone)]
pub struct StaticGrammar {
    pub rules: Vec<StaticRule>,
    /// Error-production lhs -> handler name.
    pub error_rules: Vec<(String, String)>,
}

/// One action-table cell.
#[derive(Debug, Clone, Copy)]
pub enum StaticAction {
    Shift(u32),
    Reduce(u32),
}

/// A complete, pre-built table set.
#[derive(Debug, Clone)]
pub struct StaticTables {
    pub grammar: StaticGrammar,
    /// Per state: `(terminal-or-nonterminal name, action)`.
    pub action_table: Vec<Vec<(String, StaticAction)>>,
    /// Per state: `(sync terminal name, error lhs name, handler name)`.
    pub error_handlers: Vec<Vec<(String, String, String)>>,
}

/// Rebuilds a [`Grammar`] and [`Automaton`] from a static payload without
/// running closure/BFS construction. Rule 0's shape is not re-derived
/// (there is no grammar-builder pass to synthesize it) and is instead
/// trusted as supplied, exactly as the rest of the payload is.
pub fn decode(tables: StaticTables) -> Result<(Grammar, Automaton), TableError> {
    let mut symbols = SymbolTable::new();
    let mut rules = Vec::with_capacity(tables.grammar.rules.len());

    for (id, rule) in tables.grammar.rules.iter().enumerate() {
        let lhs = symbols.intern(&rule.lhs);
        let rhs: Vec<RhsSymbol> = rule
            .rhs
            .iter()
            .map(|(name, attributed)| RhsSymbol {
                symbol: symbols.intern(name),
                attributed: *attributed,
            })
            .collect();
        rules.push(Rule {
            id: id as u32,
            action_name: rule.action_name.clone(),
            lhs,
            rhs,
        });
    }

    if rules.is_empty() {
        return Err(TableError("static grammar has no rules".to_string()));
    }

    let entry = rules[0].lhs;
    let end = rules[0]
        .rhs
        .get(1)
        .map(|s| s.symbol)
        .ok_or_else(|| TableError("rule 0 is missing its `$END` position".to_string()))?;

    let mut error_rules = BTreeMap::new();
    for (lhs, handler) in tables.grammar.error_rules {
        let lhs = symbols.intern(&lhs);
        error_rules.insert(lhs, handler);
    }

    let grammar = Grammar {
        symbols,
        rules,
        error_rules,
        entry,
        end,
    };

    let num_states = tables.action_table.len();
    if tables.error_handlers.len() != num_states {
        return Err(TableError(format!(
            "action table has {} states but error-handler table has {}",
            num_states,
            tables.error_handlers.len()
        )));
    }

    let mut action_table = Vec::with_capacity(num_states);
    for row in tables.action_table {
        let mut cells = BTreeMap::new();
        for (name, action) in row {
            let sym = grammar
                .symbols
                .get(&name)
                .ok_or_else(|| TableError(format!("action table references unknown symbol `{name}`")))?;
            let action = match action {
                StaticAction::Shift(target) => {
                    if target as usize >= num_states {
                        return Err(TableError(format!(
                            "shift to out-of-range state {target}"
                        )));
                    }
                    Action::Shift(target)
                }
                StaticAction::Reduce(rule_id) => {
                    if rule_id as usize >= grammar.rules.len() {
                        return Err(TableError(format!(
                            "reduce references out-of-range rule #{rule_id}"
                        )));
                    }
                    Action::Reduce(rule_id)
                }
            };
            cells.insert(sym, action);
        }
        action_table.push(cells);
    }

    let mut error_handlers = Vec::with_capacity(num_states);
    for row in tables.error_handlers {
        let mut cells = BTreeMap::new();
        for (terminal, lhs, handler) in row {
            let terminal_sym = grammar.symbols.get(&terminal).ok_or_else(|| {
                TableError(format!("error handler references unknown symbol `{terminal}`"))
            })?;
            let lhs_sym = grammar
                .symbols
                .get(&lhs)
                .ok_or_else(|| TableError(format!("error handler references unknown lhs `{lhs}`")))?;
            cells.insert(terminal_sym, (lhs_sym, handler));
        }
        error_handlers.push(cells);
    }

    let automaton = Automaton {
        states: vec![Vec::new(); num_states],
        action_table,
        error_handlers,
    };

    Ok((grammar, automaton))
}
