//! Dependency version ordering.
//!
//! Versions are dot-separated non-negative integers with any number of
//! components. Comparison is numeric, component by component, and missing
//! trailing components count as zero, so `1.2 == 1.2.0` and `1.10 > 1.9`.
//! Components are compared as digit strings, so their size is unbounded and
//! leading zeros are ignored (`1.01 == 1.1`).
//!
//! [`compare_versions`] extends this to arbitrary strings so that every pair
//! of version strings has an answer: strings that do not parse sort below
//! every valid version, and compare lexically among themselves.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when parsing a version string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// The version string was empty.
    #[error("version is empty")]
    Empty,

    /// A component was not a non-negative integer.
    #[error("invalid version component {component:?} in {version:?}")]
    InvalidComponent {
        /// The full version string.
        version: String,
        /// The component that failed to parse.
        component: String,
    },
}

/// A parsed, numerically comparable version.
///
/// Each component is held as its digits with leading zeros removed; zero is
/// the empty string.
#[derive(Debug, Clone)]
pub struct Version {
    components: Vec<String>,
}

impl Version {
    /// Parse a version string such as `1.2.3`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty or any component is not a
    /// non-negative integer.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        if s.is_empty() {
            return Err(VersionError::Empty);
        }

        let components = s
            .split('.')
            .map(|c| {
                if c.is_empty() || !c.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(VersionError::InvalidComponent {
                        version: s.to_string(),
                        component: c.to_string(),
                    });
                }
                Ok(c.trim_start_matches('0').to_string())
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { components })
    }

    /// The components of this version in decimal, without leading zeros.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.components
            .iter()
            .map(|c| if c.is_empty() { "0" } else { c.as_str() })
    }

    fn component(&self, ix: usize) -> &str {
        self.components.get(ix).map_or("", String::as_str)
    }
}

/// Compare two normalized digit strings numerically.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|ix| cmp_digits(self.component(ix), other.component(ix)))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.components().collect();
        f.write_str(&parts.join("."))
    }
}

/// Compare two version strings under the total order described in the
/// module documentation.
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (Version::parse(a), Version::parse(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
