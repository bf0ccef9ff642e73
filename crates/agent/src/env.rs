use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collection::ParameterSet;
use crate::error::{AgentError, ParameterError};

/// `OCF_*` variables the cluster manager must supply for real actions.
const MANDATORY_VARS: &[&str] = &[
    "OCF_ROOT",
    "OCF_RA_VERSION_MAJOR",
    "OCF_RA_VERSION_MINOR",
    "OCF_RESOURCE_INSTANCE",
    "OCF_RESOURCE_TYPE",
];

/// Whether `OCF_RESOURCE_PROVIDER` is mandatory.
///
/// Deployments disagree on this one: some resource managers always set
/// it, some never do. Strictness is therefore configurable instead of
/// fixed, defaulting to the permissive reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStrictness {
    Required,
    #[default]
    Optional,
}

/// The identity of the managed resource instance, parsed from
/// `OCF_RESOURCE_*` variables.
///
/// A clone instance arrives as `<name>:<id>`; the numeric suffix becomes
/// [`ResourceIdentity::clone_id`] and `is_clone` is set. A plain
/// instance keeps `clone_id` at −1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentity {
    pub resource_type: String,
    pub provider: Option<String>,
    pub instance: String,
    pub is_clone: bool,
    pub clone_id: i64,
}

impl ResourceIdentity {
    fn parse(
        raw_instance: &str,
        resource_type: String,
        provider: Option<String>,
    ) -> Result<Self, AgentError> {
        let (instance, is_clone, clone_id) = match raw_instance.split_once(':') {
            Some((name, suffix)) => {
                let id = suffix
                    .parse::<i64>()
                    .map_err(|_| AgentError::InvalidCloneId {
                        instance: raw_instance.to_owned(),
                    })?;
                (name.to_owned(), true, id)
            }
            None => (raw_instance.to_owned(), false, -1),
        };

        Ok(Self {
            resource_type,
            provider,
            instance,
            is_clone,
            clone_id,
        })
    }
}

/// An immutable snapshot of the process environment, split into the
/// protocol-significant `OCF_*` namespace and the opaque `HA_*`
/// namespace.
///
/// Parsing is a pure function over key/value pairs, taken exactly once
/// per process; nothing here reads or mutates globals after the
/// snapshot exists. Usage and meta-data paths never take one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    ocf: BTreeMap<String, String>,
    ha: BTreeMap<String, String>,
    identity: Option<ResourceIdentity>,
}

impl EnvSnapshot {
    /// Snapshot the real process environment.
    pub fn capture(
        strictness: ProviderStrictness,
        test_mode: bool,
    ) -> Result<Self, AgentError> {
        Self::parse(std::env::vars(), strictness, test_mode)
    }

    /// Parse an environment from key/value pairs.
    ///
    /// Outside test mode the mandatory variables must all be present
    /// (plus the provider under [`ProviderStrictness::Required`]) and
    /// the RA protocol version must be exactly 1.0. Test mode relaxes
    /// the presence checks so agents can run without a cluster manager;
    /// whatever identity variables do exist are still parsed.
    pub fn parse(
        vars: impl IntoIterator<Item = (String, String)>,
        strictness: ProviderStrictness,
        test_mode: bool,
    ) -> Result<Self, AgentError> {
        let mut ocf = BTreeMap::new();
        let mut ha = BTreeMap::new();

        for (key, value) in vars {
            if key.starts_with("OCF_") {
                ocf.insert(key, value);
            } else if key.starts_with("HA_") {
                ha.insert(key, value);
            }
        }
        debug!(ocf = ocf.len(), ha = ha.len(), "environment snapshot taken");

        if !test_mode {
            for name in MANDATORY_VARS {
                if !ocf.contains_key(*name) {
                    return Err(AgentError::MissingEnvVar {
                        name: (*name).to_owned(),
                    });
                }
            }
            if strictness == ProviderStrictness::Required
                && !ocf.contains_key("OCF_RESOURCE_PROVIDER")
            {
                return Err(AgentError::MissingEnvVar {
                    name: "OCF_RESOURCE_PROVIDER".to_owned(),
                });
            }
            check_ra_version(&ocf)?;
        }

        let identity = match (ocf.get("OCF_RESOURCE_INSTANCE"), ocf.get("OCF_RESOURCE_TYPE")) {
            (Some(instance), Some(resource_type)) => Some(ResourceIdentity::parse(
                instance,
                resource_type.clone(),
                ocf.get("OCF_RESOURCE_PROVIDER").cloned(),
            )?),
            // Only reachable in test mode; real actions validated above.
            _ => None,
        };

        Ok(Self { ocf, ha, identity })
    }

    /// An `OCF_*` variable by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.ocf.get(key).map(String::as_str)
    }

    /// The `OCF_*` namespace.
    #[must_use]
    pub fn ocf(&self) -> &BTreeMap<String, String> {
        &self.ocf
    }

    /// The `HA_*` namespace: captured, never interpreted.
    #[must_use]
    pub fn ha(&self) -> &BTreeMap<String, String> {
        &self.ha
    }

    /// The parsed resource identity, when the identity variables were
    /// present.
    #[must_use]
    pub fn identity(&self) -> Option<&ResourceIdentity> {
        self.identity.as_ref()
    }

    /// Fill parameter values from `OCF_RESKEY_<name>` variables.
    ///
    /// Each present variable is coerced per the declared type and
    /// single-assigned. A required parameter with no variable is fatal;
    /// this runs only on the real-action path, so the check is
    /// unconditional here.
    pub fn populate(&self, params: &mut ParameterSet) -> Result<(), AgentError> {
        for decl in params.iter_mut() {
            let key = format!("OCF_RESKEY_{}", decl.name());
            match self.ocf.get(&key) {
                Some(raw) => {
                    debug!(parameter = decl.name(), "populating from environment");
                    decl.assign_literal(raw)?;
                }
                None if decl.required() => {
                    return Err(ParameterError::MissingValue {
                        name: decl.name().to_owned(),
                    }
                    .into());
                }
                None => {}
            }
        }
        Ok(())
    }
}

fn check_ra_version(ocf: &BTreeMap<String, String>) -> Result<(), AgentError> {
    let major = ocf.get("OCF_RA_VERSION_MAJOR").map(String::as_str).unwrap_or("");
    let minor = ocf.get("OCF_RA_VERSION_MINOR").map(String::as_str).unwrap_or("");

    let parsed = (
        major.trim().parse::<u32>().ok(),
        minor.trim().parse::<u32>().ok(),
    );
    if parsed == (Some(1), Some(0)) {
        Ok(())
    } else {
        Err(AgentError::UnsupportedRaVersion {
            major: major.to_owned(),
            minor: minor.to_owned(),
        })
    }
}
