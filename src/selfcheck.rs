//! Self-check: verifies a host's [`ActionRegistry`] actually matches the
//! grammar it is paired with, before any parse ever runs.
//!
//! The distilled spec's origin does this with `inspect.signature` at
//! runtime, since Python handlers are introspectable. Rust closures are
//! not, so the host declares each reduce action's [`Arity`] up front and
//! this module checks it against what each rule actually requires. Error
//! handlers have a fixed Rust signature, so only their *presence* needs
//! checking — the compiler already enforces their arity.

use crate::action::ActionRegistry;
use crate::error::SelfCheckError;
use crate::grammar::Grammar;

/// Verifies every rule's action is registered with a compatible arity, and
/// every declared error production has a registered handler.
pub fn check<V>(grammar: &Grammar, actions: &ActionRegistry<V>) -> Result<(), SelfCheckError> {
    for rule in &grammar.rules {
        let required = rule.attributed_positions().count();

        if rule.is_transparent() {
            if required != 1 {
                return Err(SelfCheckError::TransparentArity {
                    rule: rule.id,
                    count: required,
                });
            }
            continue;
        }

        let name = rule.action_name.as_deref().expect("non-transparent rule has a name");
        let action = actions
            .action(name)
            .ok_or_else(|| SelfCheckError::MissingAction {
                name: name.to_string(),
            })?;
        if !action.arity.accepts(required) {
            return Err(SelfCheckError::ArityMismatch {
                name: name.to_string(),
                required,
                range: action.arity.to_string(),
            });
        }
    }

    for handler_name in grammar.error_rules.values() {
        if !actions.has_error_handler(handler_name) {
            return Err(SelfCheckError::MissingErrorHandler {
                name: handler_name.clone(),
            });
        }
    }

    Ok(())
}
