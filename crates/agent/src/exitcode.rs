use serde::{Deserialize, Serialize};

/// The ten outcome kinds of the OCF resource-agent contract.
///
/// Exit codes 0–9 are the sole channel through which an agent reports
/// success or failure to the cluster resource manager. The numeric codes
/// are fixed by the OCF specification and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    ErrGeneric,
    ErrArgs,
    ErrUnimplemented,
    ErrPerm,
    ErrInstalled,
    ErrConfigured,
    NotRunning,
    RunningMaster,
    FailedMaster,
}

impl OutcomeKind {
    /// All ten kinds, in exit-code order.
    pub const ALL: [Self; 10] = [
        Self::Success,
        Self::ErrGeneric,
        Self::ErrArgs,
        Self::ErrUnimplemented,
        Self::ErrPerm,
        Self::ErrInstalled,
        Self::ErrConfigured,
        Self::NotRunning,
        Self::RunningMaster,
        Self::FailedMaster,
    ];

    /// The process exit code for this outcome.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::ErrGeneric => 1,
            Self::ErrArgs => 2,
            Self::ErrUnimplemented => 3,
            Self::ErrPerm => 4,
            Self::ErrInstalled => 5,
            Self::ErrConfigured => 6,
            Self::NotRunning => 7,
            Self::RunningMaster => 8,
            Self::FailedMaster => 9,
        }
    }

    /// Look up a kind by its exit code.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// The conventional `OCF_*` constant name for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "OCF_SUCCESS",
            Self::ErrGeneric => "OCF_ERR_GENERIC",
            Self::ErrArgs => "OCF_ERR_ARGS",
            Self::ErrUnimplemented => "OCF_ERR_UNIMPLEMENTED",
            Self::ErrPerm => "OCF_ERR_PERM",
            Self::ErrInstalled => "OCF_ERR_INSTALLED",
            Self::ErrConfigured => "OCF_ERR_CONFIGURED",
            Self::NotRunning => "OCF_NOT_RUNNING",
            Self::RunningMaster => "OCF_RUNNING_MASTER",
            Self::FailedMaster => "OCF_FAILED_MASTER",
        }
    }

    /// Whether the resource manager treats this kind as a failure.
    ///
    /// `NotRunning` and `RunningMaster` are legitimate monitor reports,
    /// not errors; everything with code 1–6 and `FailedMaster` is.
    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(
            self,
            Self::ErrGeneric
                | Self::ErrArgs
                | Self::ErrUnimplemented
                | Self::ErrPerm
                | Self::ErrInstalled
                | Self::ErrConfigured
                | Self::FailedMaster
        )
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A terminal outcome: one of the ten kinds plus a human-readable message.
///
/// An outcome is produced at most once per process. Monitor semantics for
/// handler authors (enforced by convention, not by the engine): return
/// [`Outcome::not_running`] for a cleanly stopped resource,
/// [`Outcome::running_master`] / [`Outcome::failed_master`] only from
/// stateful agents, and success means "running" for primitives or
/// "running as slave" for stateful resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    kind: OutcomeKind,
    message: String,
}

impl Outcome {
    /// Create an outcome from a kind and message.
    #[must_use]
    pub fn new(kind: OutcomeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Action completed successfully (exit code 0).
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Success, message)
    }

    /// Generic or unspecified error (exit code 1). The resource manager
    /// treats this as a soft error and recovers in place.
    #[must_use]
    pub fn err_generic(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::ErrGeneric, message)
    }

    /// Invalid or excess arguments (exit code 2).
    #[must_use]
    pub fn err_args(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::ErrArgs, message)
    }

    /// Requested action is not implemented (exit code 3).
    #[must_use]
    pub fn err_unimplemented(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::ErrUnimplemented, message)
    }

    /// Insufficient privilege (exit code 4). Hard error: recovery moves
    /// the resource to a different node.
    #[must_use]
    pub fn err_perm(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::ErrPerm, message)
    }

    /// Required component missing on this node (exit code 5).
    #[must_use]
    pub fn err_installed(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::ErrInstalled, message)
    }

    /// Resource is misconfigured (exit code 6). Fatal error: the
    /// misconfiguration is cluster-wide, so no recovery is attempted.
    #[must_use]
    pub fn err_configured(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::ErrConfigured, message)
    }

    /// Resource is cleanly stopped (exit code 7). Monitor only.
    #[must_use]
    pub fn not_running(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::NotRunning, message)
    }

    /// Resource is running in the master role (exit code 8). Monitor of
    /// stateful resources only.
    #[must_use]
    pub fn running_master(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::RunningMaster, message)
    }

    /// Resource has failed in the master role (exit code 9). Monitor of
    /// stateful resources only.
    #[must_use]
    pub fn failed_master(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::FailedMaster, message)
    }

    /// The outcome kind.
    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        self.kind
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The process exit code.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.kind.code()
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
