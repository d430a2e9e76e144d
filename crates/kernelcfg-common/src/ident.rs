use core::{fmt::Display, str::FromStr};
use std::borrow::Cow;

use crate::ConfigError;

/// A validated C identifier, used for kernel names and any name derived from them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(Cow<'static, str>);

impl Ident {
    /// Validates `name` as an identifier.
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();

        if is_valid(&name) {
            Ok(Self(Cow::Owned(name)))
        } else {
            Err(ConfigError::InvalidIdent(name))
        }
    }

    /// Creates an identifier from a literal known to be valid.
    ///
    /// # Panics
    ///
    /// When `name` is not a valid identifier.
    pub fn from_static(name: &'static str) -> Self {
        assert!(is_valid(name), "`{name}` is not a valid identifier");
        Self(Cow::Borrowed(name))
    }

    /// Composes a derived identifier out of the *values* of two identifiers.
    ///
    /// Both sides are already resolved when they reach this point, so binding `foo` and
    /// `bar` gives `foobar` no matter what the bindings were called.
    pub fn concat(lhs: &Ident, rhs: &Ident) -> Ident {
        let mut name = String::with_capacity(lhs.0.len() + rhs.0.len());
        name.push_str(&lhs.0);
        name.push_str(&rhs.0);

        // Two valid identifiers always concatenate into a valid one.
        Self(Cow::Owned(name))
    }

    /// Appends a suffix, such as `_down`, to the identifier.
    pub fn with_suffix(&self, suffix: &str) -> Result<Ident, ConfigError> {
        Ident::new(format!("{}{suffix}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Default for Ident {
    /// The kernel name bound when none was provided.
    fn default() -> Self {
        Self::from_static("add")
    }
}

impl Display for Ident {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Ident {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ident::new(s.trim())
    }
}

impl TryFrom<String> for Ident {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ident::new(value)
    }
}

impl From<Ident> for String {
    fn from(value: Ident) -> Self {
        value.0.into_owned()
    }
}
