use crate::collection::ParameterSet;
use crate::env::{EnvSnapshot, ProviderStrictness};
use crate::error::AgentError;
use crate::handler::{HandlerDecl, HandlerRegistry};
use crate::metadata;
use crate::parameter::ParameterDecl;

/// The self-describing identity of a concrete agent: name, version and
/// the two mandatory descriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentMeta {
    name: String,
    version: String,
    shortdesc: String,
    longdesc: String,
}

impl AgentMeta {
    /// Create agent metadata. Emptiness is validated by
    /// [`AgentBuilder::build`], not here.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        shortdesc: impl Into<String>,
        longdesc: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            shortdesc: shortdesc.into(),
            longdesc: longdesc.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn shortdesc(&self) -> &str {
        &self.shortdesc
    }

    #[must_use]
    pub fn longdesc(&self) -> &str {
        &self.longdesc
    }
}

/// A fully constructed resource agent: identity, parameter
/// declarations, handler registry and protocol options.
///
/// Built exactly once per process via [`Agent::builder`] — plain
/// one-shot construction, no caching. After construction the only
/// mutation is the single parameter-population pass during dispatch.
#[derive(Debug)]
pub struct Agent {
    pub(crate) meta: AgentMeta,
    pub(crate) params: ParameterSet,
    pub(crate) handlers: HandlerRegistry,
    pub(crate) strictness: ProviderStrictness,
    pub(crate) test_mode: bool,
    pub(crate) env: Option<EnvSnapshot>,
}

impl Agent {
    /// Start building an agent.
    #[must_use]
    pub fn builder(name: impl Into<String>, version: impl Into<String>) -> AgentBuilder {
        AgentBuilder {
            name: name.into(),
            version: version.into(),
            shortdesc: None,
            longdesc: None,
            params: Vec::new(),
            handlers: Vec::new(),
            strictness: ProviderStrictness::default(),
            test_mode: false,
        }
    }

    /// The agent's identity block.
    #[must_use]
    pub fn meta(&self) -> &AgentMeta {
        &self.meta
    }

    /// The declared parameters.
    #[must_use]
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// The registered handlers.
    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// The environment snapshot, once a real action has taken one.
    #[must_use]
    pub fn env(&self) -> Option<&EnvSnapshot> {
        self.env.as_ref()
    }

    /// The one-line usage summary: the agent name and the full sorted
    /// action list (declared handlers plus `usage` and `meta-data`).
    #[must_use]
    pub fn usage_line(&self) -> String {
        let mut actions: Vec<&str> = self
            .handlers
            .actions()
            .map(crate::action::Action::as_str)
            .chain(["usage", "meta-data"])
            .collect();
        actions.sort_unstable();
        format!("usage: {} {{{}}}", self.meta.name, actions.join("|"))
    }

    /// Render the XML self-description document.
    #[must_use]
    pub fn metadata(&self) -> String {
        metadata::render(&self.meta, &self.params, &self.handlers)
    }
}

/// Builder for [`Agent`]: the explicit registration step that replaces
/// any runtime discovery. All registration-time validation happens in
/// [`AgentBuilder::build`].
pub struct AgentBuilder {
    name: String,
    version: String,
    shortdesc: Option<String>,
    longdesc: Option<String>,
    params: Vec<ParameterDecl>,
    handlers: Vec<HandlerDecl>,
    strictness: ProviderStrictness,
    test_mode: bool,
}

impl AgentBuilder {
    /// One-line agent description for metadata. Mandatory.
    #[must_use]
    pub fn shortdesc(mut self, text: impl Into<String>) -> Self {
        self.shortdesc = Some(text.into());
        self
    }

    /// Full agent description for metadata. Mandatory.
    #[must_use]
    pub fn longdesc(mut self, text: impl Into<String>) -> Self {
        self.longdesc = Some(text.into());
        self
    }

    /// Declare a parameter.
    #[must_use]
    pub fn parameter(mut self, decl: ParameterDecl) -> Self {
        self.params.push(decl);
        self
    }

    /// Register a handler.
    #[must_use]
    pub fn handler(mut self, decl: HandlerDecl) -> Self {
        self.handlers.push(decl);
        self
    }

    /// Whether `OCF_RESOURCE_PROVIDER` is mandatory (default: optional).
    #[must_use]
    pub fn provider_strictness(mut self, strictness: ProviderStrictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Relax the mandatory-environment checks so the agent can run
    /// without a cluster manager (default: off).
    #[must_use]
    pub fn test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Validate and construct the agent.
    ///
    /// The mandatory-handler check runs before everything else; then
    /// identity fields, parameter declarations and handler defaults are
    /// validated in that order.
    pub fn build(self) -> Result<Agent, AgentError> {
        let handlers = HandlerRegistry::build(self.handlers)?;

        if self.name.is_empty() {
            return Err(AgentError::MissingAgentField { field: "name" });
        }
        if self.version.is_empty() {
            return Err(AgentError::MissingAgentField { field: "version" });
        }
        let shortdesc = self
            .shortdesc
            .filter(|s| !s.is_empty())
            .ok_or(AgentError::MissingAgentField { field: "shortdesc" })?;
        let longdesc = self
            .longdesc
            .filter(|s| !s.is_empty())
            .ok_or(AgentError::MissingAgentField { field: "longdesc" })?;

        let mut params = ParameterSet::new();
        for decl in self.params {
            params.add(decl)?;
        }

        Ok(Agent {
            meta: AgentMeta {
                name: self.name,
                version: self.version,
                shortdesc,
                longdesc,
            },
            params,
            handlers,
            strictness: self.strictness,
            test_mode: self.test_mode,
            env: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::error::ParameterError;
    use crate::exitcode::{Outcome, OutcomeKind};
    use crate::handler::ActionContext;

    fn noop(action: Action) -> HandlerDecl {
        HandlerDecl::new(action, |_: &ActionContext<'_>| Ok(Outcome::success("ok"))).timeout(10)
    }

    fn demo_builder() -> AgentBuilder {
        Agent::builder("TestOCF", "0.10")
            .shortdesc("Demo OCF agent")
            .longdesc("Demonstrates the contract engine")
            .handler(noop(Action::Start))
            .handler(noop(Action::Stop))
            .handler(noop(Action::Monitor))
    }

    #[test]
    fn builder_constructs_agent() {
        let agent = demo_builder().build().unwrap();
        assert_eq!(agent.meta().name(), "TestOCF");
        assert_eq!(agent.meta().version(), "0.10");
        assert_eq!(agent.handlers().len(), 3);
        assert!(agent.env().is_none());
    }

    #[test]
    fn missing_stop_handler_fails_for_any_definition() {
        let err = Agent::builder("TestOCF", "0.10")
            .shortdesc("s")
            .longdesc("l")
            .handler(noop(Action::Start))
            .handler(noop(Action::Monitor))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            AgentError::MissingMandatoryHandler {
                action: Action::Stop,
            }
        );
        assert_eq!(err.exit_kind(), OutcomeKind::ErrUnimplemented);
    }

    #[test]
    fn handler_check_runs_before_identity_check() {
        // No descriptions AND no handlers: the handler defect wins.
        let err = Agent::builder("TestOCF", "0.10").build().unwrap_err();
        assert!(matches!(err, AgentError::MissingMandatoryHandler { .. }));
    }

    #[test]
    fn missing_descriptions_are_fatal() {
        let err = Agent::builder("TestOCF", "0.10")
            .longdesc("l")
            .handler(noop(Action::Start))
            .handler(noop(Action::Stop))
            .handler(noop(Action::Monitor))
            .build()
            .unwrap_err();
        assert_eq!(err, AgentError::MissingAgentField { field: "shortdesc" });
    }

    #[test]
    fn duplicate_parameters_fail_construction() {
        let decl = || {
            ParameterDecl::string("host")
                .shortdesc("s")
                .longdesc("l")
                .build()
                .unwrap()
        };
        let err = demo_builder()
            .parameter(decl())
            .parameter(decl())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            AgentError::Parameter(ParameterError::Duplicate {
                name: "host".into(),
            })
        );
    }

    #[test]
    fn usage_line_is_sorted_and_complete() {
        let agent = demo_builder().handler(noop(Action::Reload)).build().unwrap();
        assert_eq!(
            agent.usage_line(),
            "usage: TestOCF {meta-data|monitor|reload|start|stop|usage}"
        );
    }

    #[test]
    fn repeated_construction_yields_distinct_agents() {
        // Plain one-shot construction: no hidden instance caching.
        let a = demo_builder().build().unwrap();
        let b = demo_builder()
            .parameter(
                ParameterDecl::string("extra")
                    .shortdesc("s")
                    .longdesc("l")
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        assert_eq!(a.params().len(), 0);
        assert_eq!(b.params().len(), 1);
    }
}
