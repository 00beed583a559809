//! Flat descriptors of declarations found by a source-tree walker.
//!
//! These replace any live code model: a walker reports each processed
//! container as a [`Container`] value, which is everything a [`StepIndex`]
//! needs to (re)build the container's [`StepDefinition`]s.
//!
//! [`StepDefinition`]: super::StepDefinition
//! [`StepIndex`]: crate::StepIndex

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::location::Location;

/// Container (e.g. a class) owning zero or more declarations.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Container {
    /// Fully-qualified name of this [`Container`].
    pub name: String,

    /// Attribute-like declarations found inside this [`Container`].
    #[serde(default)]
    pub declarations: Vec<Declaration>,

    /// Constants declared in this [`Container`], used for resolving
    /// [`Declaration`] values referring to them.
    #[serde(default)]
    pub constants: Vec<Constant>,
}

impl Container {
    /// Creates a new empty [`Container`] with the given `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Adds the given [`Declaration`] to this [`Container`].
    #[must_use]
    pub fn declaration(mut self, declaration: Declaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// Adds a [`Constant`] to this [`Container`].
    #[must_use]
    pub fn constant(
        mut self,
        name: impl Into<String>,
        value: Option<impl Into<String>>,
    ) -> Self {
        self.constants.push(Constant {
            name: name.into(),
            value: value.map(Into::into),
        });
        self
    }
}

/// Single declaration descriptor, as reported by a walker.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Declaration {
    /// Fully-qualified kind of the declaration marker (e.g.
    /// `TechTalk.SpecFlow.GivenAttribute`).
    pub kind: String,

    /// Raw source text of the marker value, quotes and escapes included.
    pub value: String,

    /// Location of the declaration, if known.
    #[serde(default)]
    pub location: Option<Location>,

    /// Qualified name of the function owning the declaration, if known.
    #[serde(default)]
    pub owner: Option<String>,
}

impl Declaration {
    /// Creates a new [`Declaration`] of the given `kind` and raw `value`,
    /// without location and owner.
    #[must_use]
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
            location: None,
            owner: None,
        }
    }

    /// Sets the [`Location`] of this [`Declaration`].
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Sets the owning function of this [`Declaration`].
    #[must_use]
    pub fn owned_by(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

/// Constant declared in a [`Container`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Constant {
    /// Name of the constant.
    pub name: String,

    /// Literal string initializer, if the constant has one.
    #[serde(default)]
    pub value: Option<String>,
}

/// Lookup of constants by name, used to resolve declaration values referring
/// to a constant instead of holding a literal.
pub trait ConstantResolver {
    /// Returns the literal initializer of the constant with the given `name`.
    fn resolve(&self, name: &str) -> Option<&str>;
}

/// [`ConstantResolver`] knowing no constants.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoConstants;

impl ConstantResolver for NoConstants {
    fn resolve(&self, _: &str) -> Option<&str> {
        None
    }
}

impl ConstantResolver for [Constant] {
    fn resolve(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|c| c.name == name)
            .and_then(|c| c.value.as_deref())
    }
}

impl ConstantResolver for Vec<Constant> {
    fn resolve(&self, name: &str) -> Option<&str> {
        self.as_slice().resolve(name)
    }
}

impl ConstantResolver for HashMap<String, String> {
    fn resolve(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl<R: ConstantResolver + ?Sized> ConstantResolver for &R {
    fn resolve(&self, name: &str) -> Option<&str> {
        (**self).resolve(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Point;

    #[test]
    fn resolves_only_constants_with_initializer() {
        let container = Container::new("Steps.Login")
            .constant("LoggedIn", Some("\"I am logged in\""))
            .constant("Computed", None::<String>);

        assert_eq!(
            container.constants.resolve("LoggedIn"),
            Some("\"I am logged in\""),
        );
        assert_eq!(container.constants.resolve("Computed"), None);
        assert_eq!(container.constants.resolve("Missing"), None);
    }

    #[test]
    fn resolves_from_map() {
        let map = HashMap::from([("A".to_owned(), "\"a\"".to_owned())]);
        assert_eq!(map.resolve("A"), Some("\"a\""));
        assert_eq!(NoConstants.resolve("A"), None);
    }

    #[test]
    fn deserializes_manifest_container() {
        let container: Container = serde_json::from_str(
            r#"{
                "name": "Steps.Login",
                "declarations": [{
                    "kind": "TechTalk.SpecFlow.GivenAttribute",
                    "value": "\"I am logged in\"",
                    "location": {
                        "path": "Steps/Login.cs",
                        "start": {"line": 10, "column": 5},
                        "end": {"line": 10, "column": 30}
                    },
                    "owner": "Steps.Login.LogIn"
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(container.name, "Steps.Login");
        assert!(container.constants.is_empty());
        let decl = &container.declarations[0];
        assert_eq!(decl.value, "\"I am logged in\"");
        assert_eq!(decl.owner.as_deref(), Some("Steps.Login.LogIn"));
        assert_eq!(
            decl.location.as_ref().map(|l| l.start),
            Some(Point::new(10, 5)),
        );
    }

    #[test]
    fn deserializes_declaration_without_optional_fields() {
        let decl: Declaration =
            serde_json::from_str(r#"{"kind": "k", "value": "v"}"#).unwrap();
        assert_eq!(decl, Declaration::new("k", "v"));
    }
}
