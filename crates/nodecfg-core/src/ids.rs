//! Core identifier types for nodecfg.
//!
//! This module provides strongly-typed identifiers for devices and patterns.
//! Both are string-backed because the registry hands them out as text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The identifier was empty.
    #[error("identifier is empty")]
    Empty,

    /// The identifier contained whitespace.
    #[error("identifier contains whitespace: {0:?}")]
    Whitespace(String),

    /// A pattern identifier was not of the form `org/name`.
    #[error("pattern identifier must be of the form org/name, got {0:?}")]
    MalformedPattern(String),
}

fn check_segment(s: &str) -> Result<(), IdError> {
    if s.is_empty() {
        return Err(IdError::Empty);
    }
    if s.chars().any(char::is_whitespace) {
        return Err(IdError::Whitespace(s.to_string()));
    }
    Ok(())
}

/// A device identifier as issued at registration time.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a `DeviceId` after validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty or contains whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, IdError> {
        let id = id.into();
        check_segment(&id)?;
        Ok(Self(id))
    }

    /// Return the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DeviceId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> Self {
        id.0
    }
}

/// A pattern identifier, `org/name`.
///
/// The registry keys pattern definitions by this string, so `Display`
/// produces exactly that key.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatternId {
    org: String,
    name: String,
}

impl PatternId {
    /// Create a pattern identifier from its organization and name.
    ///
    /// # Errors
    ///
    /// Returns an error if either part is empty, contains whitespace, or
    /// contains a `/`.
    pub fn new(org: impl Into<String>, name: impl Into<String>) -> Result<Self, IdError> {
        let org = org.into();
        let name = name.into();
        check_segment(&org)?;
        check_segment(&name)?;
        if org.contains('/') || name.contains('/') {
            return Err(IdError::MalformedPattern(format!("{org}/{name}")));
        }
        Ok(Self { org, name })
    }

    /// The organization that owns the pattern.
    #[must_use]
    pub fn org(&self) -> &str {
        &self.org
    }

    /// The pattern name within its organization.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The registry key for this pattern.
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Debug for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PatternId({}/{})", self.org, self.name)
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.name)
    }
}

impl FromStr for PatternId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (org, name) = s
            .split_once('/')
            .ok_or_else(|| IdError::MalformedPattern(s.to_string()))?;
        Self::new(org, name)
    }
}

impl TryFrom<String> for PatternId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PatternId> for String {
    fn from(id: PatternId) -> Self {
        id.to_string()
    }
}
