//! Contract engine for OCF resource agents.
//!
//! A conforming agent process is invoked once with an action name as its
//! sole argument, receives configuration through `OCF_*` environment
//! variables, and reports its outcome via one of ten fixed exit codes.
//! This crate is the engine behind that contract: action dispatch, typed
//! parameter declarations, environment parsing with clone detection, the
//! exit-code taxonomy, and XML metadata generation. The concrete
//! start/stop/monitor logic plugs in as handler functions.
//!
//! ```no_run
//! use ocf_agent::prelude::*;
//!
//! let agent = Agent::builder("TestOCF", "0.10")
//!     .shortdesc("Demo OCF agent")
//!     .longdesc("Demonstrates the contract engine")
//!     .parameter(
//!         ParameterDecl::string("fake")
//!             .default("bla")
//!             .shortdesc("Fake parameter")
//!             .longdesc("A demonstration parameter")
//!             .build()?,
//!     )
//!     .handler(HandlerDecl::new(Action::Start, |_ctx| Ok(Outcome::success("started"))).timeout(10))
//!     .handler(HandlerDecl::new(Action::Stop, |_ctx| Ok(Outcome::success("stopped"))).timeout(10))
//!     .handler(
//!         HandlerDecl::new(Action::Monitor, |_ctx| Ok(Outcome::not_running("not running")))
//!             .timeout(10),
//!     )
//!     .build()?;
//! agent.run();
//! # #[allow(unreachable_code)]
//! # Ok::<(), ocf_agent::error::AgentError>(())
//! ```

pub mod action;
pub mod agent;
pub mod collection;
pub mod dispatch;
pub mod env;
pub mod error;
pub mod exitcode;
pub mod handler;
pub mod kind;
pub mod metadata;
pub mod parameter;

pub mod prelude {
    pub use crate::action::Action;
    pub use crate::agent::{Agent, AgentBuilder, AgentMeta};
    pub use crate::collection::ParameterSet;
    pub use crate::env::{EnvSnapshot, ProviderStrictness, ResourceIdentity};
    pub use crate::error::{AgentError, ParameterError};
    pub use crate::exitcode::{Outcome, OutcomeKind};
    pub use crate::handler::{ActionContext, HandlerDecl, HandlerRegistry, HandlerResult};
    pub use crate::kind::{ParameterKind, ParameterValue};
    pub use crate::parameter::{ParameterBuilder, ParameterDecl};
}
