use serde::{Deserialize, Serialize};

use crate::error::ParameterError;

/// Boolean literals accepted from the environment protocol.
const TRUTHY: &[&str] = &["1", "t", "true", "yes"];
const FALSY: &[&str] = &["0", "f", "false", "no", "n"];

/// The semantic type of a parameter, one of the three kinds the OCF
/// metadata format knows about.
///
/// The set is closed, so an "unknown type" cannot be constructed; what
/// remains at runtime is coercion of environment literals via
/// [`ParameterKind::coerce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    String,
    Integer,
    Boolean,
}

impl ParameterKind {
    /// The type name as it appears in metadata `content` elements.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }

    /// Coerce an environment literal into a typed value.
    ///
    /// Strings pass through verbatim. Integers go through a numeric
    /// parse. Booleans accept exactly the truthy literals
    /// {"1","t","true","yes"} and falsy literals {"0","f","false","no",
    /// "n"}; anything else is a value error naming the token.
    pub fn coerce(self, name: &str, literal: &str) -> Result<ParameterValue, ParameterError> {
        match self {
            Self::String => Ok(ParameterValue::String(literal.to_owned())),
            Self::Integer => literal
                .trim()
                .parse::<i64>()
                .map(ParameterValue::Integer)
                .map_err(|_| ParameterError::InvalidInteger {
                    name: name.to_owned(),
                    literal: literal.to_owned(),
                }),
            Self::Boolean => {
                if TRUTHY.contains(&literal) {
                    Ok(ParameterValue::Boolean(true))
                } else if FALSY.contains(&literal) {
                    Ok(ParameterValue::Boolean(false))
                } else {
                    Err(ParameterError::InvalidBool {
                        name: name.to_owned(),
                        literal: literal.to_owned(),
                    })
                }
            }
        }
    }
}

impl std::fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl ParameterValue {
    /// The kind of this value.
    #[must_use]
    pub fn kind(&self) -> ParameterKind {
        match self {
            Self::String(_) => ParameterKind::String,
            Self::Integer(_) => ParameterKind::Integer,
            Self::Boolean(_) => ParameterKind::Boolean,
        }
    }

    /// The string payload, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The integer payload, if this is an integer value.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean payload, if this is a boolean value.
    #[must_use]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParameterValue {
    /// Stringified form used in metadata attributes.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}
