use crate::action::Action;
use crate::exitcode::{Outcome, OutcomeKind};
use crate::kind::ParameterKind;

/// Error type for parameter declaration and value handling.
///
/// Covers registration-time defects (missing descriptions, duplicate
/// names) and value-time defects (type mismatches, bad literals,
/// missing required values).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    /// Value type does not match the declared parameter type.
    #[error("invalid type for `{name}`: expected {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: ParameterKind,
        actual: ParameterKind,
    },

    /// A literal could not be coerced to a boolean.
    #[error("invalid boolean literal for `{name}`: `{literal}`")]
    InvalidBool { name: String, literal: String },

    /// A literal could not be coerced to an integer.
    #[error("invalid integer literal for `{name}`: `{literal}`")]
    InvalidInteger { name: String, literal: String },

    /// A declaration is missing its short or long description.
    #[error("parameter `{name}` has no {field}")]
    MissingDescription { name: String, field: &'static str },

    /// A parameter value was assigned more than once.
    #[error("value for `{name}` is already assigned")]
    AlreadyAssigned { name: String },

    /// A parameter with the given name is already declared.
    #[error("parameter already declared: `{name}`")]
    Duplicate { name: String },

    /// A required parameter has no value in the environment.
    #[error("missing value for required parameter `{name}`")]
    MissingValue { name: String },
}

/// Error type for agent construction and environment parsing.
///
/// Every variant maps onto the exit-code taxonomy via
/// [`AgentError::outcome`], so a failing agent always terminates through
/// one of the ten OCF codes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// One of start/stop/monitor has no registered handler.
    #[error("mandatory handler `{action}` is not implemented")]
    MissingMandatoryHandler { action: Action },

    /// A handler declares no `timeout` default.
    #[error("handler `{action}` declares no `timeout` default")]
    MissingTimeout { action: Action },

    /// A handler for the given action is already registered.
    #[error("handler already registered: `{action}`")]
    DuplicateHandler { action: Action },

    /// `usage` and `meta-data` are served by the engine and cannot be
    /// registered as handlers.
    #[error("`{action}` is reserved and cannot be registered as a handler")]
    ReservedAction { action: Action },

    /// A mandatory agent attribute (name, version, descriptions) is empty.
    #[error("agent {field} must not be empty")]
    MissingAgentField { field: &'static str },

    /// A parameter declaration or value defect.
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// A mandatory `OCF_*` environment variable is absent.
    #[error("mandatory environment variable {name} not found")]
    MissingEnvVar { name: String },

    /// The resource-agent API version is not exactly 1.0.
    #[error("unsupported resource-agent API version {major}.{minor}, expected 1.0")]
    UnsupportedRaVersion { major: String, minor: String },

    /// The clone suffix of `OCF_RESOURCE_INSTANCE` is not an integer.
    #[error("invalid clone id in resource instance `{instance}`")]
    InvalidCloneId { instance: String },

    /// The requested action is not recognized or not declared.
    #[error("unknown action: `{name}`")]
    UnknownAction { name: String },
}

impl AgentError {
    /// The outcome kind this error terminates the process with.
    ///
    /// Registration-time defects are programmer errors and map to
    /// `ErrUnimplemented` (missing mandatory handler) or `ErrConfigured`;
    /// environment-time defects are caller-configuration errors and map
    /// to `ErrArgs`.
    #[must_use]
    pub fn exit_kind(&self) -> OutcomeKind {
        match self {
            Self::MissingMandatoryHandler { .. } => OutcomeKind::ErrUnimplemented,
            Self::MissingTimeout { .. }
            | Self::DuplicateHandler { .. }
            | Self::ReservedAction { .. }
            | Self::MissingAgentField { .. }
            | Self::Parameter(_) => OutcomeKind::ErrConfigured,
            Self::MissingEnvVar { .. }
            | Self::UnsupportedRaVersion { .. }
            | Self::InvalidCloneId { .. }
            | Self::UnknownAction { .. } => OutcomeKind::ErrArgs,
        }
    }

    /// The terminal outcome for this error.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        Outcome::new(self.exit_kind(), self.to_string())
    }

    /// Whether the operation might succeed if retried with the same
    /// input. All engine errors are deterministic, so never.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        false
    }
}
