use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// The closed set of OCF action names.
///
/// `Start`, `Stop` and `Monitor` are mandatory for every agent; the next
/// seven are optional handler actions; `Usage` and `MetaData` are served
/// by the engine itself and cannot be registered as handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Start,
    Stop,
    Monitor,
    Promote,
    Demote,
    MigrateTo,
    MigrateFrom,
    Notify,
    Recover,
    Reload,
    Usage,
    #[serde(rename = "meta-data")]
    MetaData,
}

impl Action {
    /// Actions that every agent must implement.
    pub const MANDATORY: [Self; 3] = [Self::Start, Self::Stop, Self::Monitor];

    /// All actions a concrete agent may register a handler for.
    pub const HANDLERS: [Self; 10] = [
        Self::Start,
        Self::Stop,
        Self::Monitor,
        Self::Promote,
        Self::Demote,
        Self::MigrateTo,
        Self::MigrateFrom,
        Self::Notify,
        Self::Recover,
        Self::Reload,
    ];

    /// The wire name of this action, as it appears on the command line
    /// and in metadata output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Monitor => "monitor",
            Self::Promote => "promote",
            Self::Demote => "demote",
            Self::MigrateTo => "migrate_to",
            Self::MigrateFrom => "migrate_from",
            Self::Notify => "notify",
            Self::Recover => "recover",
            Self::Reload => "reload",
            Self::Usage => "usage",
            Self::MetaData => "meta-data",
        }
    }

    /// Whether an agent must implement this action.
    #[must_use]
    pub fn is_mandatory(self) -> bool {
        Self::MANDATORY.contains(&self)
    }

    /// Whether a concrete agent may register a handler for this action.
    #[must_use]
    pub fn is_handler(self) -> bool {
        Self::HANDLERS.contains(&self)
    }

    /// Whether the engine serves this action itself, without any
    /// environment parsing (`usage` and `meta-data` must work offline).
    #[must_use]
    pub fn is_introspection(self) -> bool {
        matches!(self, Self::Usage | Self::MetaData)
    }
}

impl FromStr for Action {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "monitor" => Ok(Self::Monitor),
            "promote" => Ok(Self::Promote),
            "demote" => Ok(Self::Demote),
            "migrate_to" => Ok(Self::MigrateTo),
            "migrate_from" => Ok(Self::MigrateFrom),
            "notify" => Ok(Self::Notify),
            "recover" => Ok(Self::Recover),
            "reload" => Ok(Self::Reload),
            "usage" => Ok(Self::Usage),
            "meta-data" => Ok(Self::MetaData),
            other => Err(AgentError::UnknownAction {
                name: other.to_owned(),
            }),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
