use crate::error::ParameterError;
use crate::kind::ParameterValue;
use crate::parameter::ParameterDecl;

/// An ordered, duplicate-rejecting set of parameter declarations.
///
/// Declaration order is preserved so metadata output is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    parameters: Vec<ParameterDecl>,
}

impl ParameterSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration, rejecting duplicate names.
    pub fn add(&mut self, decl: ParameterDecl) -> Result<&mut Self, ParameterError> {
        if self.contains(decl.name()) {
            return Err(ParameterError::Duplicate {
                name: decl.name().to_owned(),
            });
        }
        self.parameters.push(decl);
        Ok(self)
    }

    /// Get a declaration by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterDecl> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    /// Get a declaration mutably by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ParameterDecl> {
        self.parameters.iter_mut().find(|p| p.name() == name)
    }

    /// The effective value of the named parameter (assigned or default).
    ///
    /// `Ok(None)` covers both an unknown name and a declaration with
    /// neither value nor default; use [`ParameterSet::get`] to tell the
    /// two apart.
    pub fn value(&self, name: &str) -> Result<Option<&ParameterValue>, ParameterError> {
        match self.get(name) {
            Some(decl) => decl.value(),
            None => Ok(None),
        }
    }

    /// Whether a declaration with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name() == name)
    }

    /// Iterate over declarations in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterDecl> {
        self.parameters.iter()
    }

    /// Iterate mutably over declarations in declaration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ParameterDecl> {
        self.parameters.iter_mut()
    }

    /// Iterate over declaration names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(ParameterDecl::name)
    }

    /// The number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a ParameterDecl;
    type IntoIter = std::slice::Iter<'a, ParameterDecl>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(name: &str) -> ParameterDecl {
        ParameterDecl::string(name)
            .shortdesc("short")
            .longdesc("long")
            .build()
            .unwrap()
    }

    #[test]
    fn new_is_empty() {
        let set = ParameterSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn add_and_get() {
        let mut set = ParameterSet::new();
        set.add(decl("host")).unwrap();
        set.add(decl("port")).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("host").unwrap().name(), "host");
        assert!(set.get("missing").is_none());
        assert!(set.contains("port"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut set = ParameterSet::new();
        set.add(decl("host")).unwrap();
        let err = set.add(decl("host")).unwrap_err();
        assert_eq!(err, ParameterError::Duplicate { name: "host".into() });
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn order_is_declaration_order() {
        let mut set = ParameterSet::new();
        set.add(decl("b")).unwrap();
        set.add(decl("a")).unwrap();
        set.add(decl("c")).unwrap();

        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn value_lookup_falls_back_to_default() {
        let mut set = ParameterSet::new();
        set.add(
            ParameterDecl::string("fake")
                .default("bla")
                .shortdesc("short")
                .longdesc("long")
                .build()
                .unwrap(),
        )
        .unwrap();

        assert_eq!(
            set.value("fake").unwrap().and_then(ParameterValue::as_str),
            Some("bla")
        );
        assert_eq!(set.value("missing").unwrap(), None);
    }

    #[test]
    fn get_mut_allows_assignment() {
        let mut set = ParameterSet::new();
        set.add(decl("host")).unwrap();

        set.get_mut("host")
            .unwrap()
            .assign(ParameterValue::String("node1".into()))
            .unwrap();
        assert_eq!(
            set.value("host").unwrap().and_then(ParameterValue::as_str),
            Some("node1")
        );
    }
}
