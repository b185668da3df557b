//! Dependency references and the list algebra used to deduplicate them.
//!
//! A workload resolves to a list of [`DependencyRef`]s. When several
//! workloads (or several version choices of one workload) are resolved for a
//! node, their lists are folded into one running total with
//! [`DependencyList::absorb`], which:
//!
//! 1. keeps at most one version of each singleton dependency, preferring the
//!    higher version ([`DependencyList::replace_higher_singleton`]), and
//! 2. drops exact duplicates ([`DependencyList::merge_without_duplicates`]).
//!
//! All operations return new lists; the receiver is never modified.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::version::compare_versions;

/// A resolved, versioned dependency required by a workload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyRef {
    /// URL identifying the dependency.
    pub spec_ref: String,
    /// Organization that publishes the dependency.
    pub org: String,
    /// Exact version chosen for this node.
    pub version: String,
    /// Hardware architecture of the chosen definition.
    #[serde(default)]
    pub arch: String,
    /// Whether only one version of this dependency may run on a node.
    #[serde(default)]
    pub exclusive: bool,
}

impl DependencyRef {
    /// Create a non-singleton reference with no architecture.
    #[must_use]
    pub fn new(
        spec_ref: impl Into<String>,
        org: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            spec_ref: spec_ref.into(),
            org: org.into(),
            version: version.into(),
            arch: String::new(),
            exclusive: false,
        }
    }

    /// Mark this reference as a singleton dependency.
    #[must_use]
    pub fn singleton(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// Set the architecture of this reference.
    #[must_use]
    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = arch.into();
        self
    }

    /// True if both references name the same dependency at the same version.
    #[must_use]
    pub fn is_exact_duplicate(&self, other: &Self) -> bool {
        self.spec_ref == other.spec_ref && self.org == other.org && self.version == other.version
    }

    /// True if both references are singletons of the same dependency,
    /// regardless of version.
    #[must_use]
    pub fn is_same_singleton(&self, other: &Self) -> bool {
        self.exclusive && other.exclusive && self.spec_ref == other.spec_ref && self.org == other.org
    }

    /// The name of the local service provisioned for this reference.
    #[must_use]
    pub fn service_name(&self) -> String {
        service_name(&self.spec_ref, &self.org, &self.version)
    }
}

/// Derive the local service name for a dependency.
///
/// The reference URL is split on `/` into at most three pieces. For a URL of
/// the form `scheme://rest` the third piece is `rest` (host and path); one
/// trailing `/` is stripped from it and its slashes are replaced with `-`.
/// A reference with fewer than three pieces contributes an empty string.
///
/// ```
/// use nodecfg_core::service_name;
///
/// assert_eq!(
///     service_name("https://bluehorizon.network/microservices/gps", "myorg", "2.0.3"),
///     "bluehorizon.network-microservices-gps_myorg_2.0.3"
/// );
/// ```
#[must_use]
pub fn service_name(spec_ref: &str, org: &str, version: &str) -> String {
    let pieces: Vec<&str> = spec_ref.splitn(3, '/').collect();
    let url = match pieces.as_slice() {
        [_, _, path] => {
            let path = path.strip_suffix('/').unwrap_or(path);
            path.replace('/', "-")
        }
        _ => String::new(),
    };

    format!("{url}_{org}_{version}")
}

/// The outcome of [`DependencyList::replace_higher_singleton`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingletonResolution {
    /// The base list with every singleton superseded by a higher incoming
    /// version removed.
    pub base: DependencyList,
    /// The incoming list with every singleton that would be a downgrade
    /// removed.
    pub incoming: DependencyList,
}

/// An ordered list of dependency references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyList(Vec<DependencyRef>);

impl DependencyList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The entries of this list.
    #[must_use]
    pub fn as_slice(&self) -> &[DependencyRef] {
        &self.0
    }

    /// Iterate the entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, DependencyRef> {
        self.0.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the list has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if an entry with the same reference, org and version is present.
    #[must_use]
    pub fn contains_exact(&self, dep: &DependencyRef) -> bool {
        self.0.iter().any(|d| d.is_exact_duplicate(dep))
    }

    /// Append every incoming entry whose exact reference/org/version triple
    /// is not already present in this list.
    ///
    /// Entries are compared against the list as it grows, so duplicates
    /// inside `incoming` are collapsed too.
    #[must_use]
    pub fn merge_without_duplicates(&self, incoming: &Self) -> Self {
        let merged = incoming.iter().fold(self.0.clone(), |mut acc, dep| {
            if !acc.iter().any(|d| d.is_exact_duplicate(dep)) {
                acc.push(dep.clone());
            }
            acc
        });
        Self(merged)
    }

    /// Resolve singleton conflicts between this list and `incoming`.
    ///
    /// For each singleton in `incoming`, any singleton of the same reference
    /// and org with a lower version is removed from the base. If the base
    /// (or an earlier incoming entry) already holds an equal or higher
    /// version, the incoming entry is dropped instead, so a singleton is
    /// never downgraded. Non-singleton entries pass through untouched.
    #[must_use]
    pub fn replace_higher_singleton(&self, incoming: &Self) -> SingletonResolution {
        let mut base = self.0.clone();
        let mut kept: Vec<DependencyRef> = Vec::with_capacity(incoming.len());

        for dep in incoming {
            if !dep.exclusive {
                kept.push(dep.clone());
                continue;
            }

            let superseded = base
                .iter()
                .chain(kept.iter())
                .filter(|d| d.is_same_singleton(dep))
                .any(|d| compare_versions(&d.version, &dep.version) != Ordering::Less);
            if superseded {
                continue;
            }

            base.retain(|d| !d.is_same_singleton(dep));
            kept.retain(|d| !d.is_same_singleton(dep));
            kept.push(dep.clone());
        }

        SingletonResolution {
            base: Self(base),
            incoming: Self(kept),
        }
    }

    /// Fold `incoming` into this list: singleton replacement followed by a
    /// duplicate-free merge.
    #[must_use]
    pub fn absorb(&self, incoming: &Self) -> Self {
        let resolved = self.replace_higher_singleton(incoming);
        resolved.base.merge_without_duplicates(&resolved.incoming)
    }
}

impl From<Vec<DependencyRef>> for DependencyList {
    fn from(deps: Vec<DependencyRef>) -> Self {
        Self(deps)
    }
}

impl FromIterator<DependencyRef> for DependencyList {
    fn from_iter<I: IntoIterator<Item = DependencyRef>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for DependencyList {
    type Item = DependencyRef;
    type IntoIter = std::vec::IntoIter<DependencyRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a DependencyList {
    type Item = &'a DependencyRef;
    type IntoIter = std::slice::Iter<'a, DependencyRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
