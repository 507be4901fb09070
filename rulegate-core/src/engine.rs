// rulegate-core/src/engine.rs
//! Runs one field's rule list.

use log::{debug, trace};

use crate::check::{CheckInput, Outcome, Snapshot};
use crate::entity::Entity;
use crate::errors::ValidateError;
use crate::flags::Control;
use crate::messages::MessageCatalog;
use crate::rule::Rule;
use crate::tree::ValidationContext;

/// Whether traversal continues after a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Abort,
}

/// Executes rule lists against the scope held in a [`ValidationContext`].
#[derive(Debug, Clone, Copy)]
pub struct RuleEngine<'m> {
    messages: &'m MessageCatalog,
}

impl<'m> RuleEngine<'m> {
    pub fn new(messages: &'m MessageCatalog) -> Self {
        Self { messages }
    }

    /// Runs `rules` for `field` of `entity`, recording failures under
    /// `path_key`.
    ///
    /// Rules whose scope does not intersect the context scope are skipped
    /// without effect. A rule flagged `EXIT_IF_ALREADY_ERRORED` ends the list
    /// if `path_key` already holds errors. Check errors are returned
    /// unchanged; an [`Outcome::Abort`] is reported as [`Flow::Abort`].
    pub fn run_field(
        &self,
        field: &str,
        rules: &[Rule],
        entity: &dyn Entity,
        lineage: &[Snapshot],
        path_key: &str,
        ctx: &mut ValidationContext,
    ) -> Result<Flow, ValidateError> {
        let shape = entity.shape();
        let label = shape.label(field);
        let value = entity.get(field);

        for rule in rules {
            if !rule.scope().intersects(ctx.scope) {
                trace!("Skipping '{}' on '{}': out of scope.", rule.check_id(), path_key);
                continue;
            }
            if rule.control().contains(Control::EXIT_IF_ALREADY_ERRORED) && ctx.errors.has(path_key) {
                debug!("'{}' already has errors; skipping remaining rules.", path_key);
                break;
            }

            let input = CheckInput {
                field,
                label,
                value: &value,
                scope: ctx.scope,
                entity,
                lineage,
                messages: self.messages,
            };
            let outcome = rule
                .check()
                .run(&input, rule.args())
                .map_err(ValidateError::from_collaborator)?;

            match outcome {
                Outcome::Abort => {
                    debug!("Check '{}' aborted validation at '{}'.", rule.check_id(), path_key);
                    return Ok(Flow::Abort);
                }
                Outcome::Errors(messages) if !messages.is_empty() => {
                    trace!("'{}' failed '{}': {:?}", path_key, rule.check_id(), messages);
                    ctx.errors.extend_at(path_key, messages);
                    if rule.control().contains(Control::EXIT_ON_FAILURE) {
                        break;
                    }
                }
                Outcome::Pass | Outcome::Errors(_) => {
                    if rule.control().contains(Control::EXIT_ON_SUCCESS) {
                        break;
                    }
                }
            }
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::check_fn;
    use crate::flags::Scope;
    use crate::record::Record;
    use crate::registry::CheckRegistry;
    use crate::rule::RuleDecl;
    use crate::shape::EntityShape;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_registry(calls: Arc<AtomicUsize>) -> CheckRegistry {
        let mut registry = CheckRegistry::with_builtins();
        registry.register(
            "counted",
            check_fn(move |_, _| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Outcome::Pass)
            }),
        );
        registry
    }

    fn run(shape: EntityShape, value: serde_json::Value, scope: Scope, seed: &[(&str, &str)]) -> (ValidationContext, Flow) {
        let shape = Arc::new(shape);
        let mut record = Record::new(Arc::clone(&shape));
        record.set("name", value).unwrap();
        let mut ctx = ValidationContext::new(scope);
        for (key, message) in seed {
            ctx.errors.push(*key, *message);
        }
        let messages = MessageCatalog::default();
        let engine = RuleEngine::new(&messages);
        let flow = engine
            .run_field("name", shape.rules_for("name"), &record, &[], "name", &mut ctx)
            .unwrap();
        (ctx, flow)
    }

    #[test]
    fn test_out_of_scope_rule_is_never_invoked() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(Arc::clone(&calls));
        let shape = EntityShape::builder("t")
            .field("name")
            .rule("name", RuleDecl::new("counted", Scope::DELETE))
            .build(&registry)
            .unwrap();
        run(shape, json!("x"), Scope::SAVE, &[]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_exit_on_failure_stops_the_field() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(Arc::clone(&calls));
        let shape = EntityShape::builder("t")
            .field("name")
            .rule("name", RuleDecl::new("required", Scope::SAVE).control(Control::EXIT_ON_FAILURE))
            .rule("name", RuleDecl::new("counted", Scope::SAVE))
            .build(&registry)
            .unwrap();
        let (ctx, flow) = run(shape, json!(""), Scope::CREATE, &[]);
        assert_eq!(flow, Flow::Continue);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(ctx.errors.get("name").unwrap(), ["name is required"]);
    }

    #[test]
    fn test_exit_on_success_stops_the_field() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(Arc::clone(&calls));
        let shape = EntityShape::builder("t")
            .field("name")
            .rule("name", RuleDecl::new("required", Scope::SAVE).control(Control::EXIT_ON_SUCCESS))
            .rule("name", RuleDecl::new("counted", Scope::SAVE))
            .build(&registry)
            .unwrap();
        let (ctx, _) = run(shape, json!("present"), Scope::UPDATE, &[]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(ctx.errors.is_empty());
    }

    #[test]
    fn test_existing_error_skips_guarded_rule_and_the_rest() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(Arc::clone(&calls));
        let shape = EntityShape::builder("t")
            .field("name")
            .rule(
                "name",
                RuleDecl::new("counted", Scope::SAVE).control(Control::EXIT_IF_ALREADY_ERRORED),
            )
            .rule("name", RuleDecl::new("counted", Scope::SAVE))
            .build(&registry)
            .unwrap();
        let (ctx, _) = run(shape, json!("x"), Scope::SAVE, &[("name", "upload failed")]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(ctx.errors.get("name").unwrap(), ["upload failed"]);
    }

    #[test]
    fn test_guard_uses_exact_key() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(Arc::clone(&calls));
        let shape = EntityShape::builder("t")
            .field("name")
            .rule(
                "name",
                RuleDecl::new("counted", Scope::SAVE).control(Control::EXIT_IF_ALREADY_ERRORED),
            )
            .build(&registry)
            .unwrap();
        run(shape, json!("x"), Scope::SAVE, &[("name[first]", "bad")]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_abort_records_nothing() {
        let shape = EntityShape::builder("t")
            .field("name")
            .rule("name", RuleDecl::new("abort_if_blank", Scope::SAVE))
            .rule("name", RuleDecl::new("required", Scope::SAVE))
            .build(&CheckRegistry::with_builtins())
            .unwrap();
        let (ctx, flow) = run(shape, json!(null), Scope::SAVE, &[]);
        assert_eq!(flow, Flow::Abort);
        assert!(ctx.errors.is_empty());
    }

    #[test]
    fn test_collaborator_error_passes_through() {
        let mut registry = CheckRegistry::new();
        registry.register("broken", check_fn(|_, _| Err(anyhow::anyhow!("database is down"))));
        let shape = Arc::new(
            EntityShape::builder("t")
                .field("name")
                .rule("name", RuleDecl::new("broken", Scope::SAVE))
                .build(&registry)
                .unwrap(),
        );
        let record = Record::new(Arc::clone(&shape));
        let messages = MessageCatalog::default();
        let mut ctx = ValidationContext::new(Scope::SAVE);
        let err = RuleEngine::new(&messages)
            .run_field("name", shape.rules_for("name"), &record, &[], "name", &mut ctx)
            .unwrap_err();
        assert!(matches!(err, ValidateError::Collaborator(_)));
        assert_eq!(err.to_string(), "database is down");
    }
}
