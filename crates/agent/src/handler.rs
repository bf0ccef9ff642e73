use indexmap::IndexMap;

use crate::action::Action;
use crate::collection::ParameterSet;
use crate::env::{EnvSnapshot, ResourceIdentity};
use crate::error::{AgentError, ParameterError};
use crate::exitcode::Outcome;
use crate::kind::ParameterValue;

/// Opaque failure raised by a handler that is not one of the ten
/// outcomes. The dispatch boundary remaps it to `ErrGeneric`.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What a handler produces: a terminal [`Outcome`], or an error that the
/// dispatch boundary converts to `ErrGeneric`.
pub type HandlerResult = Result<Outcome, HandlerError>;

type HandlerFn = Box<dyn Fn(&ActionContext<'_>) -> HandlerResult>;

/// Everything a handler sees when invoked: the action, its declared
/// defaults, the populated parameter set, and the environment snapshot
/// (absent in test mode without cluster variables).
#[derive(Debug)]
pub struct ActionContext<'a> {
    action: Action,
    defaults: &'a IndexMap<String, ParameterValue>,
    params: &'a ParameterSet,
    env: Option<&'a EnvSnapshot>,
}

impl<'a> ActionContext<'a> {
    pub(crate) fn new(
        action: Action,
        defaults: &'a IndexMap<String, ParameterValue>,
        params: &'a ParameterSet,
        env: Option<&'a EnvSnapshot>,
    ) -> Self {
        Self {
            action,
            defaults,
            params,
            env,
        }
    }

    /// The action being executed.
    #[must_use]
    pub fn action(&self) -> Action {
        self.action
    }

    /// The advisory timeout declared for this handler, in seconds.
    ///
    /// Enforced by the external caller, never by the engine.
    #[must_use]
    pub fn timeout(&self) -> Option<i64> {
        self.defaults.get("timeout").and_then(ParameterValue::as_integer)
    }

    /// A declared handler default by name.
    #[must_use]
    pub fn default(&self, name: &str) -> Option<&ParameterValue> {
        self.defaults.get(name)
    }

    /// The agent's parameter declarations, values populated from the
    /// environment.
    #[must_use]
    pub fn params(&self) -> &ParameterSet {
        self.params
    }

    /// The effective value of a declared parameter.
    pub fn param(&self, name: &str) -> Result<Option<&ParameterValue>, ParameterError> {
        self.params.value(name)
    }

    /// The environment snapshot, when one was taken.
    #[must_use]
    pub fn env(&self) -> Option<&EnvSnapshot> {
        self.env
    }

    /// The resource identity parsed from `OCF_RESOURCE_*` variables.
    #[must_use]
    pub fn identity(&self) -> Option<&ResourceIdentity> {
        self.env.and_then(EnvSnapshot::identity)
    }
}

/// A registered handler: the action it serves, its declared parameter
/// defaults (which must include `timeout`), and the function to run.
pub struct HandlerDecl {
    action: Action,
    defaults: IndexMap<String, ParameterValue>,
    run: HandlerFn,
}

impl HandlerDecl {
    /// Declare a handler for an action.
    pub fn new<F>(action: Action, run: F) -> Self
    where
        F: Fn(&ActionContext<'_>) -> HandlerResult + 'static,
    {
        Self {
            action,
            defaults: IndexMap::new(),
            run: Box::new(run),
        }
    }

    /// Declare the advisory timeout, in seconds. Every handler must
    /// declare one.
    #[must_use]
    pub fn timeout(self, seconds: i64) -> Self {
        self.default("timeout", seconds)
    }

    /// Declare a named parameter default for this handler.
    #[must_use]
    pub fn default(mut self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    /// The action this handler serves.
    #[must_use]
    pub fn action(&self) -> Action {
        self.action
    }

    /// The declared defaults, in declaration order.
    #[must_use]
    pub fn defaults(&self) -> &IndexMap<String, ParameterValue> {
        &self.defaults
    }

    /// Run the handler.
    pub fn invoke(&self, ctx: &ActionContext<'_>) -> HandlerResult {
        (self.run)(ctx)
    }
}

impl std::fmt::Debug for HandlerDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerDecl")
            .field("action", &self.action)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

/// The registered handlers of a concrete agent, keyed by action,
/// order-stable for reproducible metadata output.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    handlers: IndexMap<Action, HandlerDecl>,
}

impl HandlerRegistry {
    /// Build the registry from handler declarations.
    ///
    /// Checked before anything else runs: start/stop/monitor must all be
    /// present. Then every handler must be a registrable action, appear
    /// once, and declare a `timeout` default.
    pub fn build(decls: Vec<HandlerDecl>) -> Result<Self, AgentError> {
        for action in Action::MANDATORY {
            if !decls.iter().any(|d| d.action == action) {
                return Err(AgentError::MissingMandatoryHandler { action });
            }
        }

        let mut handlers = IndexMap::with_capacity(decls.len());
        for decl in decls {
            if !decl.action.is_handler() {
                return Err(AgentError::ReservedAction {
                    action: decl.action,
                });
            }
            if !decl.defaults.contains_key("timeout") {
                return Err(AgentError::MissingTimeout {
                    action: decl.action,
                });
            }
            if handlers.contains_key(&decl.action) {
                return Err(AgentError::DuplicateHandler {
                    action: decl.action,
                });
            }
            handlers.insert(decl.action, decl);
        }

        Ok(Self { handlers })
    }

    /// Get a handler by action.
    #[must_use]
    pub fn get(&self, action: Action) -> Option<&HandlerDecl> {
        self.handlers.get(&action)
    }

    /// Whether a handler for the action is registered.
    #[must_use]
    pub fn contains(&self, action: Action) -> bool {
        self.handlers.contains_key(&action)
    }

    /// Registered actions, in registration order.
    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.handlers.keys().copied()
    }

    /// Iterate over registered handlers, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &HandlerDecl> {
        self.handlers.values()
    }

    /// The number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(action: Action) -> HandlerDecl {
        HandlerDecl::new(action, |_ctx| Ok(Outcome::success("ok"))).timeout(10)
    }

    fn trio() -> Vec<HandlerDecl> {
        vec![
            noop(Action::Start),
            noop(Action::Stop),
            noop(Action::Monitor),
        ]
    }

    #[test]
    fn registry_with_mandatory_trio_builds() {
        let registry = HandlerRegistry::build(trio()).unwrap();
        assert_eq!(registry.len(), 3);
        assert!(registry.contains(Action::Start));
        assert!(registry.get(Action::Monitor).is_some());
        assert!(!registry.contains(Action::Promote));
    }

    #[test]
    fn missing_mandatory_handler_fails_first() {
        let decls = vec![noop(Action::Start), noop(Action::Monitor)];
        let err = HandlerRegistry::build(decls).unwrap_err();
        assert_eq!(
            err,
            AgentError::MissingMandatoryHandler {
                action: Action::Stop,
            }
        );
    }

    #[test]
    fn missing_timeout_is_fatal() {
        let mut decls = trio();
        decls.push(HandlerDecl::new(Action::Reload, |_| {
            Ok(Outcome::success("ok"))
        }));
        let err = HandlerRegistry::build(decls).unwrap_err();
        assert_eq!(
            err,
            AgentError::MissingTimeout {
                action: Action::Reload,
            }
        );
    }

    #[test]
    fn reserved_actions_cannot_be_registered() {
        let mut decls = trio();
        decls.push(noop(Action::MetaData));
        let err = HandlerRegistry::build(decls).unwrap_err();
        assert_eq!(
            err,
            AgentError::ReservedAction {
                action: Action::MetaData,
            }
        );
    }

    #[test]
    fn duplicate_handlers_are_rejected() {
        let mut decls = trio();
        decls.push(noop(Action::Start));
        let err = HandlerRegistry::build(decls).unwrap_err();
        assert!(matches!(err, AgentError::DuplicateHandler { .. }));
    }

    #[test]
    fn registration_order_is_preserved() {
        let decls = vec![
            noop(Action::Monitor),
            noop(Action::Stop),
            noop(Action::Start),
            noop(Action::Reload),
        ];
        let registry = HandlerRegistry::build(decls).unwrap();
        let actions: Vec<Action> = registry.actions().collect();
        assert_eq!(
            actions,
            vec![
                Action::Monitor,
                Action::Stop,
                Action::Start,
                Action::Reload,
            ]
        );
    }

    #[test]
    fn defaults_keep_declaration_order_with_timeout() {
        let decl = HandlerDecl::new(Action::MigrateTo, |_| Ok(Outcome::success("ok")))
            .timeout(30)
            .default("target", "node2");
        let keys: Vec<&str> = decl.defaults().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["timeout", "target"]);
    }

    #[test]
    fn context_exposes_timeout_and_defaults() {
        let registry = HandlerRegistry::build(trio()).unwrap();
        let params = ParameterSet::new();
        let decl = registry.get(Action::Start).unwrap();
        let ctx = ActionContext::new(Action::Start, decl.defaults(), &params, None);

        assert_eq!(ctx.action(), Action::Start);
        assert_eq!(ctx.timeout(), Some(10));
        assert!(ctx.default("missing").is_none());
        assert!(ctx.env().is_none());
        assert!(ctx.identity().is_none());

        let outcome = decl.invoke(&ctx).unwrap();
        assert_eq!(outcome, Outcome::success("ok"));
    }
}
