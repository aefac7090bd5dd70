//! Grammar model: host-facing rule input and its resolved, numbered form.
//!
//! A host describes its language as a flat list of [`RuleSpec`]s. Building
//! a [`Grammar`] interns every symbol it sees, renumbers rules from 1,
//! synthesizes the root rule `$ENTRY -> entry $END`, and splits out `$ERROR`
//! productions into a side table instead of numbering them as rules (they
//! never derive anything; they only mark a recovery point).

use crate::error::GrammarError;
use crate::symbol::{Symbol, SymbolTable, END, ENTRY, ERROR_BODY, START};
use std::collections::BTreeMap;

/// One rule as the host writes it, before interning or numbering.
///
/// `rhs` is whitespace-separated symbol names. A name prefixed with `_` is
/// present in the derivation but not passed to the action (mirrors the
/// distilled spec's origin's leading-underscore convention for "matched but
/// not attributed"). `rhs == "$ERROR"` declares an error-recovery production
/// for `lhs` instead of an ordinary rule; `action_name` is then required and
/// names the recovery handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    pub action_name: Option<String>,
    pub lhs: String,
    pub rhs: String,
}

impl RuleSpec {
    pub fn new(action_name: Option<&str>, lhs: &str, rhs: &str) -> Self {
        Self {
            action_name: action_name.map(str::to_owned),
            lhs: lhs.to_owned(),
            rhs: rhs.to_owned(),
        }
    }
}

/// One symbol position on a rule's right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RhsSymbol {
    pub symbol: Symbol,
    pub attributed: bool,
}

/// A numbered grammar rule. Rule `0` is always the synthesized start rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub id: u32,
    pub action_name: Option<String>,
    pub lhs: Symbol,
    pub rhs: Vec<RhsSymbol>,
}

impl Rule {
    /// Whether this rule forwards exactly one attributed value unchanged
    /// rather than invoking a named action (the synthesized start rule, and
    /// any host rule declared without an `action_name`).
    pub fn is_transparent(&self) -> bool {
        self.action_name.is_none()
    }

    /// The attributed RHS positions, in order.
    pub fn attributed_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.rhs
            .iter()
            .enumerate()
            .filter(|(_, s)| s.attributed)
            .map(|(i, _)| i)
    }
}

/// A resolved grammar: interned symbols, numbered rules, declared error
/// productions.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub symbols: SymbolTable,
    pub rules: Vec<Rule>,
    /// Error-production lhs -> recovery handler name.
    pub error_rules: BTreeMap<Symbol, String>,
    pub entry: Symbol,
    pub end: Symbol,
}

impl Grammar {
    /// Builds a grammar from host-authored [`RuleSpec`]s.
    pub fn build(specs: &[RuleSpec]) -> Result<Self, GrammarError> {
        let mut symbols = SymbolTable::new();
        let entry_sym = symbols.intern(ENTRY);
        let end_sym = symbols.intern(END);
        let start_sym = symbols.intern(START);

        let mut rules = Vec::new();
        let mut error_rules = BTreeMap::new();

        for spec in specs {
            let lhs = symbols.intern(&spec.lhs);
            let body: Vec<&str> = spec.rhs.split_whitespace().collect();

            if body.len() == 1 && body[0] == ERROR_BODY {
                let action = spec.action_name.clone().ok_or_else(|| {
                    GrammarError::ErrorProductionMissingAction {
                        lhs: spec.lhs.clone(),
                    }
                })?;
                if error_rules.insert(lhs, action).is_some() {
                    return Err(GrammarError::DuplicateErrorProduction {
                        lhs: spec.lhs.clone(),
                    });
                }
                continue;
            }

            if body.is_empty() {
                return Err(GrammarError::EmptyProduction {
                    lhs: spec.lhs.clone(),
                });
            }

            let rhs = body
                .iter()
                .map(|tok| {
                    let (name, attributed) = match tok.strip_prefix('_') {
                        Some(rest) => (rest, false),
                        None => (*tok, true),
                    };
                    RhsSymbol {
                        symbol: symbols.intern(name),
                        attributed,
                    }
                })
                .collect();

            rules.push(Rule {
                id: 0, // assigned below, after the synthetic rule 0
                action_name: spec.action_name.clone(),
                lhs,
                rhs,
            });
        }

        if !rules.iter().any(|r| r.lhs == start_sym) {
            return Err(GrammarError::MissingStartRule);
        }

        let synthetic = Rule {
            id: 0,
            action_name: None,
            lhs: entry_sym,
            rhs: vec![
                RhsSymbol {
                    symbol: start_sym,
                    attributed: true,
                },
                RhsSymbol {
                    symbol: end_sym,
                    attributed: false,
                },
            ],
        };

        let mut numbered = Vec::with_capacity(rules.len() + 1);
        numbered.push(synthetic);
        for (i, mut rule) in rules.into_iter().enumerate() {
            rule.id = (i + 1) as u32;
            numbered.push(rule);
        }

        Ok(Self {
            symbols,
            rules: numbered,
            error_rules,
            entry: entry_sym,
            end: end_sym,
        })
    }

    pub fn rule(&self, id: u32) -> &Rule {
        &self.rules[id as usize]
    }

    pub fn rules_for(&self, lhs: Symbol) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |r| r.lhs == lhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr_grammar() -> Vec<RuleSpec> {
        vec![
            RuleSpec::new(Some("id"), "entry", "INT"),
            RuleSpec::new(Some("add"), "entry", "entry + INT"),
        ]
    }

    #[test]
    fn build_synthesizes_rule_zero() {
        let g = Grammar::build(&expr_grammar()).unwrap();
        let r0 = g.rule(0);
        assert!(r0.is_transparent());
        assert_eq!(r0.rhs.len(), 2);
        assert!(r0.rhs[0].attributed);
        assert!(!r0.rhs[1].attributed);
        assert_eq!(g.rules.len(), 3);
    }

    #[test]
    fn missing_start_rule_is_an_error() {
        let specs = vec![RuleSpec::new(Some("x"), "expr", "INT")];
        let err = Grammar::build(&specs).unwrap_err();
        assert_eq!(err, GrammarError::MissingStartRule);
    }

    #[test]
    fn empty_production_is_rejected() {
        let specs = vec![
            RuleSpec::new(Some("id"), "entry", "INT"),
            RuleSpec::new(Some("bad"), "entry", ""),
        ];
        let err = Grammar::build(&specs).unwrap_err();
        assert_eq!(
            err,
            GrammarError::EmptyProduction {
                lhs: "entry".to_string()
            }
        );
    }

    #[test]
    fn underscore_prefix_marks_symbol_unattributed() {
        let specs = vec![RuleSpec::new(Some("id"), "entry", "_( entry _)")];
        let g = Grammar::build(&specs).unwrap();
        let rule = g.rule(1);
        assert!(!rule.rhs[0].attributed);
        assert!(rule.rhs[1].attributed);
        assert!(!rule.rhs[2].attributed);
    }

    #[test]
    fn error_production_requires_action_name() {
        let specs = vec![
            RuleSpec::new(Some("id"), "entry", "INT"),
            RuleSpec::new(None, "stmt", "$ERROR"),
        ];
        let err = Grammar::build(&specs).unwrap_err();
        assert_eq!(
            err,
            GrammarError::ErrorProductionMissingAction {
                lhs: "stmt".to_string()
            }
        );
    }

    #[test]
    fn error_production_is_recorded_not_numbered() {
        let specs = vec![
            RuleSpec::new(Some("id"), "entry", "INT"),
            RuleSpec::new(Some("recover"), "entry", "$ERROR"),
        ];
        let g = Grammar::build(&specs).unwrap();
        assert_eq!(g.rules.len(), 2);
        let entry = g.symbols.get("entry").unwrap();
        assert_eq!(g.error_rules.get(&entry).map(String::as_str), Some("recover"));
    }
}
