use std::any::Any;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::action::Action;
use crate::agent::Agent;
use crate::env::EnvSnapshot;
use crate::error::AgentError;
use crate::exitcode::Outcome;
use crate::handler::ActionContext;

impl Agent {
    /// Resolve and execute one action, returning its terminal outcome.
    ///
    /// `args` is the full argv; the action name is `args[1]`. With no
    /// argument the usage line is printed and the outcome is
    /// `ErrUnimplemented` — nothing was accomplished. Environment
    /// parsing is skipped entirely for `usage` and `meta-data`, which
    /// must work offline. Any handler failure not expressed as one of
    /// the ten outcomes is caught here and remapped to `ErrGeneric`.
    ///
    /// One-shot: no retries happen inside the engine.
    pub fn dispatch<W: Write>(
        &mut self,
        args: &[String],
        env_vars: Vec<(String, String)>,
        out: &mut W,
    ) -> Outcome {
        let Some(raw_action) = args.get(1) else {
            let _ = writeln!(out, "{}", self.usage_line());
            return Outcome::err_unimplemented("no action specified");
        };

        let action = match raw_action.parse::<Action>() {
            Ok(action) => action,
            Err(err) => {
                warn!(action = %raw_action, "unrecognized action");
                return err.outcome();
            }
        };
        debug!(action = %action, agent = self.meta.name(), "dispatching");

        match action {
            Action::Usage => {
                let _ = writeln!(out, "{}", self.usage_line());
                Outcome::success("usage printed")
            }
            Action::MetaData => {
                let _ = write!(out, "{}", self.metadata());
                Outcome::success("meta-data printed")
            }
            action => self.run_handler(action, raw_action, env_vars),
        }
    }

    fn run_handler(
        &mut self,
        action: Action,
        raw_action: &str,
        env_vars: Vec<(String, String)>,
    ) -> Outcome {
        // Member of the closed set, but not declared by this agent.
        if !self.handlers.contains(action) {
            return AgentError::UnknownAction {
                name: raw_action.to_owned(),
            }
            .outcome();
        }

        let snapshot = match EnvSnapshot::parse(env_vars, self.strictness, self.test_mode) {
            Ok(snapshot) => snapshot,
            Err(err) => return err.outcome(),
        };
        if let Err(err) = snapshot.populate(&mut self.params) {
            return err.outcome();
        }
        self.env = Some(snapshot);

        let Some(decl) = self.handlers.get(action) else {
            // Checked above; kept as an error path rather than a panic.
            return AgentError::UnknownAction {
                name: raw_action.to_owned(),
            }
            .outcome();
        };
        let ctx = ActionContext::new(action, decl.defaults(), &self.params, self.env.as_ref());

        match panic::catch_unwind(AssertUnwindSafe(|| decl.invoke(&ctx))) {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                warn!(action = %action, error = %err, "handler failed outside the taxonomy");
                Outcome::err_generic(err.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(action = %action, message, "handler panicked");
                Outcome::err_generic(message)
            }
        }
    }

    /// Execute the action named on the command line against the real
    /// process environment, then terminate with the outcome's exit
    /// code. Error outcomes emit a conventional `ERROR:` line first.
    pub fn run(mut self) -> ! {
        let args: Vec<String> = std::env::args().collect();
        let env_vars: Vec<(String, String)> = std::env::vars().collect();
        let mut stdout = std::io::stdout();

        let outcome = self.dispatch(&args, env_vars, &mut stdout);
        if outcome.kind().is_error() {
            eprintln!("ERROR: {}", outcome.message());
        }
        debug!(code = outcome.exit_code(), "terminating");
        std::process::exit(outcome.exit_code())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ProviderStrictness;
    use crate::handler::HandlerDecl;
    use crate::kind::ParameterValue;
    use crate::parameter::ParameterDecl;

    fn args(argv: &[&str]) -> Vec<String> {
        argv.iter().map(|s| (*s).to_owned()).collect()
    }

    fn cluster_env() -> Vec<(String, String)> {
        [
            ("OCF_ROOT", "/usr/lib/ocf"),
            ("OCF_RA_VERSION_MAJOR", "1"),
            ("OCF_RA_VERSION_MINOR", "0"),
            ("OCF_RESOURCE_INSTANCE", "myres"),
            ("OCF_RESOURCE_TYPE", "TestOCF"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
    }

    fn demo_agent() -> Agent {
        let noop = |_: &ActionContext<'_>| Ok(Outcome::success("ok"));
        Agent::builder("TestOCF", "0.10")
            .shortdesc("Demo OCF agent")
            .longdesc("Demonstrates the contract engine")
            .handler(HandlerDecl::new(Action::Start, noop).timeout(10))
            .handler(HandlerDecl::new(Action::Stop, noop).timeout(10))
            .handler(
                HandlerDecl::new(Action::Monitor, |_: &ActionContext<'_>| {
                    Ok(Outcome::not_running("stopped"))
                })
                .timeout(10),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn no_argument_prints_usage_and_exits_unimplemented() {
        let mut agent = demo_agent();
        let mut out = Vec::new();
        let outcome = agent.dispatch(&args(&["testocf"]), cluster_env(), &mut out);

        assert_eq!(outcome.exit_code(), 3);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "usage: TestOCF {meta-data|monitor|start|stop|usage}\n"
        );
    }

    #[test]
    fn explicit_usage_exits_success() {
        let mut agent = demo_agent();
        let mut out = Vec::new();
        let outcome = agent.dispatch(&args(&["testocf", "usage"]), cluster_env(), &mut out);

        assert_eq!(outcome.exit_code(), 0);
        assert!(String::from_utf8(out).unwrap().starts_with("usage: TestOCF {"));
    }

    #[test]
    fn usage_and_meta_data_need_no_environment() {
        let mut agent = demo_agent();
        let mut out = Vec::new();
        let outcome = agent.dispatch(&args(&["testocf", "usage"]), Vec::new(), &mut out);
        assert_eq!(outcome.exit_code(), 0);

        let mut out = Vec::new();
        let outcome = agent.dispatch(&args(&["testocf", "meta-data"]), Vec::new(), &mut out);
        assert_eq!(outcome.exit_code(), 0);
        let doc = String::from_utf8(out).unwrap();
        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"));
        assert!(doc.ends_with("</resource-agent>\n"));
    }

    #[test]
    fn unknown_action_is_err_args() {
        let mut agent = demo_agent();
        let mut out = Vec::new();
        let outcome = agent.dispatch(&args(&["testocf", "status"]), cluster_env(), &mut out);
        assert_eq!(outcome.exit_code(), 2);
        assert_eq!(outcome.message(), "unknown action: `status`");
    }

    #[test]
    fn undeclared_optional_action_is_err_args() {
        let mut agent = demo_agent();
        let mut out = Vec::new();
        let outcome = agent.dispatch(&args(&["testocf", "promote"]), cluster_env(), &mut out);
        assert_eq!(outcome.exit_code(), 2);
        assert_eq!(outcome.message(), "unknown action: `promote`");
    }

    #[test]
    fn real_action_without_environment_is_err_args() {
        let mut agent = demo_agent();
        let mut out = Vec::new();
        let outcome = agent.dispatch(&args(&["testocf", "start"]), Vec::new(), &mut out);
        assert_eq!(outcome.exit_code(), 2);
        assert!(outcome.message().contains("OCF_ROOT"));
    }

    #[test]
    fn handler_outcome_passes_through() {
        let mut agent = demo_agent();
        let mut out = Vec::new();
        let outcome = agent.dispatch(&args(&["testocf", "monitor"]), cluster_env(), &mut out);
        assert_eq!(outcome, Outcome::not_running("stopped"));
        assert_eq!(outcome.exit_code(), 7);
    }

    #[test]
    fn handler_error_is_remapped_to_err_generic() {
        let noop = |_: &ActionContext<'_>| Ok(Outcome::success("ok"));
        let mut agent = Agent::builder("TestOCF", "0.10")
            .shortdesc("s")
            .longdesc("l")
            .handler(
                HandlerDecl::new(Action::Start, |_: &ActionContext<'_>| {
                    Err("pidfile unwritable".into())
                })
                .timeout(10),
            )
            .handler(HandlerDecl::new(Action::Stop, noop).timeout(10))
            .handler(HandlerDecl::new(Action::Monitor, noop).timeout(10))
            .build()
            .unwrap();

        let mut out = Vec::new();
        let outcome = agent.dispatch(&args(&["testocf", "start"]), cluster_env(), &mut out);
        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(outcome.message(), "pidfile unwritable");
    }

    #[test]
    fn handler_panic_is_remapped_to_err_generic() {
        let noop = |_: &ActionContext<'_>| Ok(Outcome::success("ok"));
        let mut agent = Agent::builder("TestOCF", "0.10")
            .shortdesc("s")
            .longdesc("l")
            .handler(
                HandlerDecl::new(Action::Start, |_: &ActionContext<'_>| {
                    panic!("unexpected state")
                })
                .timeout(10),
            )
            .handler(HandlerDecl::new(Action::Stop, noop).timeout(10))
            .handler(HandlerDecl::new(Action::Monitor, noop).timeout(10))
            .build()
            .unwrap();

        let mut out = Vec::new();
        let outcome = agent.dispatch(&args(&["testocf", "start"]), cluster_env(), &mut out);
        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(outcome.message(), "unexpected state");
    }

    #[test]
    fn handler_sees_populated_parameters_and_identity() {
        let noop = |_: &ActionContext<'_>| Ok(Outcome::success("ok"));
        let mut agent = Agent::builder("TestOCF", "0.10")
            .shortdesc("s")
            .longdesc("l")
            .parameter(
                ParameterDecl::string("fake")
                    .default("bla")
                    .shortdesc("s")
                    .longdesc("l")
                    .build()
                    .unwrap(),
            )
            .handler(
                HandlerDecl::new(Action::Start, |ctx: &ActionContext<'_>| {
                    assert_eq!(ctx.timeout(), Some(10));
                    assert_eq!(
                        ctx.param("fake").unwrap(),
                        Some(&ParameterValue::String("override".into()))
                    );
                    let identity = ctx.identity().unwrap();
                    assert_eq!(identity.instance, "myres");
                    Ok(Outcome::success("started"))
                })
                .timeout(10),
            )
            .handler(HandlerDecl::new(Action::Stop, noop).timeout(10))
            .handler(HandlerDecl::new(Action::Monitor, noop).timeout(10))
            .build()
            .unwrap();

        let mut env = cluster_env();
        env.push(("OCF_RESKEY_fake".to_owned(), "override".to_owned()));
        let mut out = Vec::new();
        let outcome = agent.dispatch(&args(&["testocf", "start"]), env, &mut out);
        assert_eq!(outcome, Outcome::success("started"));
    }

    #[test]
    fn required_parameter_missing_is_err_configured() {
        let noop = |_: &ActionContext<'_>| Ok(Outcome::success("ok"));
        let mut agent = Agent::builder("TestOCF", "0.10")
            .shortdesc("s")
            .longdesc("l")
            .parameter(
                ParameterDecl::string("host")
                    .required(true)
                    .shortdesc("s")
                    .longdesc("l")
                    .build()
                    .unwrap(),
            )
            .handler(HandlerDecl::new(Action::Start, noop).timeout(10))
            .handler(HandlerDecl::new(Action::Stop, noop).timeout(10))
            .handler(HandlerDecl::new(Action::Monitor, noop).timeout(10))
            .build()
            .unwrap();

        let mut out = Vec::new();
        let outcome = agent.dispatch(&args(&["testocf", "start"]), cluster_env(), &mut out);
        assert_eq!(outcome.exit_code(), 6);
        assert!(outcome.message().contains("host"));
    }

    #[test]
    fn test_mode_runs_without_cluster_environment() {
        let noop = |_: &ActionContext<'_>| Ok(Outcome::success("ok"));
        let mut agent = Agent::builder("TestOCF", "0.10")
            .shortdesc("s")
            .longdesc("l")
            .test_mode(true)
            .handler(HandlerDecl::new(Action::Start, noop).timeout(10))
            .handler(HandlerDecl::new(Action::Stop, noop).timeout(10))
            .handler(HandlerDecl::new(Action::Monitor, noop).timeout(10))
            .build()
            .unwrap();

        let mut out = Vec::new();
        let outcome = agent.dispatch(&args(&["testocf", "start"]), Vec::new(), &mut out);
        assert_eq!(outcome.exit_code(), 0);
    }

    #[test]
    fn provider_strictness_reaches_dispatch() {
        let noop = |_: &ActionContext<'_>| Ok(Outcome::success("ok"));
        let mut agent = Agent::builder("TestOCF", "0.10")
            .shortdesc("s")
            .longdesc("l")
            .provider_strictness(ProviderStrictness::Required)
            .handler(HandlerDecl::new(Action::Start, noop).timeout(10))
            .handler(HandlerDecl::new(Action::Stop, noop).timeout(10))
            .handler(HandlerDecl::new(Action::Monitor, noop).timeout(10))
            .build()
            .unwrap();

        let mut out = Vec::new();
        let outcome = agent.dispatch(&args(&["testocf", "start"]), cluster_env(), &mut out);
        assert_eq!(outcome.exit_code(), 2);
        assert!(outcome.message().contains("OCF_RESOURCE_PROVIDER"));
    }
}
