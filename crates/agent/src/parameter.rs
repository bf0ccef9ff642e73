use crate::error::ParameterError;
use crate::kind::{ParameterKind, ParameterValue};

/// A typed, validated parameter declaration.
///
/// Declarations are built once at agent startup through the builder
/// returned by [`ParameterDecl::string`], [`ParameterDecl::integer`] or
/// [`ParameterDecl::boolean`]. After construction the only mutation is a
/// single value assignment during environment population; everything
/// else is read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDecl {
    name: String,
    kind: ParameterKind,
    default: Option<ParameterValue>,
    required: bool,
    unique: bool,
    shortdesc: String,
    longdesc: String,
    value: Option<ParameterValue>,
}

impl ParameterDecl {
    /// Start declaring a string parameter.
    #[must_use]
    pub fn string(name: impl Into<String>) -> ParameterBuilder {
        ParameterBuilder::new(name, ParameterKind::String)
    }

    /// Start declaring an integer parameter.
    #[must_use]
    pub fn integer(name: impl Into<String>) -> ParameterBuilder {
        ParameterBuilder::new(name, ParameterKind::Integer)
    }

    /// Start declaring a boolean parameter.
    #[must_use]
    pub fn boolean(name: impl Into<String>) -> ParameterBuilder {
        ParameterBuilder::new(name, ParameterKind::Boolean)
    }

    /// The parameter name, as used in `OCF_RESKEY_<name>`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared semantic type.
    #[must_use]
    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    /// The declared default, if any.
    #[must_use]
    pub fn default(&self) -> Option<&ParameterValue> {
        self.default.as_ref()
    }

    /// Whether a value must be supplied through the environment.
    #[must_use]
    pub fn required(&self) -> bool {
        self.required
    }

    /// Whether this parameter is flagged unique in metadata (OCF spec
    /// §2.4 hint to the resource manager).
    #[must_use]
    pub fn unique(&self) -> bool {
        self.unique
    }

    /// One-line description for metadata.
    #[must_use]
    pub fn shortdesc(&self) -> &str {
        &self.shortdesc
    }

    /// Full description for metadata.
    #[must_use]
    pub fn longdesc(&self) -> &str {
        &self.longdesc
    }

    /// Whether a value has been assigned from the environment.
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.value.is_some()
    }

    /// The effective value: the assigned value if one exists, otherwise
    /// the default. Either is type-checked against the declared kind
    /// before being returned. `Ok(None)` means no value and no default.
    pub fn value(&self) -> Result<Option<&ParameterValue>, ParameterError> {
        let candidate = self.value.as_ref().or(self.default.as_ref());
        match candidate {
            Some(v) => {
                self.check_kind(v)?;
                Ok(Some(v))
            }
            None => Ok(None),
        }
    }

    /// Assign the value parsed from the environment.
    ///
    /// Exactly one assignment is allowed per process lifetime, and the
    /// value's type must match the declaration.
    pub fn assign(&mut self, value: ParameterValue) -> Result<(), ParameterError> {
        if self.value.is_some() {
            return Err(ParameterError::AlreadyAssigned {
                name: self.name.clone(),
            });
        }
        self.check_kind(&value)?;
        self.value = Some(value);
        Ok(())
    }

    /// Coerce a raw environment literal per the declared kind, then
    /// assign it.
    pub fn assign_literal(&mut self, literal: &str) -> Result<(), ParameterError> {
        let value = self.kind.coerce(&self.name, literal)?;
        self.assign(value)
    }

    fn check_kind(&self, value: &ParameterValue) -> Result<(), ParameterError> {
        if value.kind() == self.kind {
            Ok(())
        } else {
            Err(ParameterError::TypeMismatch {
                name: self.name.clone(),
                expected: self.kind,
                actual: value.kind(),
            })
        }
    }
}

/// Builder for [`ParameterDecl`].
///
/// [`ParameterBuilder::build`] performs the registration-time checks:
/// both descriptions must be present and non-empty.
#[derive(Debug, Clone)]
pub struct ParameterBuilder {
    name: String,
    kind: ParameterKind,
    default: Option<ParameterValue>,
    required: bool,
    unique: bool,
    shortdesc: Option<String>,
    longdesc: Option<String>,
}

impl ParameterBuilder {
    fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            required: false,
            unique: true,
            shortdesc: None,
            longdesc: None,
        }
    }

    /// Set the default value.
    #[must_use]
    pub fn default(mut self, value: impl Into<ParameterValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Mark the parameter as required (default: not required).
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Set the unique flag (default: unique).
    #[must_use]
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// One-line description. Mandatory.
    #[must_use]
    pub fn shortdesc(mut self, text: impl Into<String>) -> Self {
        self.shortdesc = Some(text.into());
        self
    }

    /// Full description. Mandatory.
    #[must_use]
    pub fn longdesc(mut self, text: impl Into<String>) -> Self {
        self.longdesc = Some(text.into());
        self
    }

    /// Finish the declaration, validating mandatory descriptions.
    pub fn build(self) -> Result<ParameterDecl, ParameterError> {
        let shortdesc = self
            .shortdesc
            .filter(|s| !s.is_empty())
            .ok_or(ParameterError::MissingDescription {
                name: self.name.clone(),
                field: "shortdesc",
            })?;
        let longdesc = self
            .longdesc
            .filter(|s| !s.is_empty())
            .ok_or(ParameterError::MissingDescription {
                name: self.name.clone(),
                field: "longdesc",
            })?;

        Ok(ParameterDecl {
            name: self.name,
            kind: self.kind,
            default: self.default,
            required: self.required,
            unique: self.unique,
            shortdesc,
            longdesc,
            value: None,
        })
    }
}
