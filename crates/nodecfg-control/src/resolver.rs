//! Pattern resolution.
//!
//! A pattern lists workloads, each with one or more acceptable versions.
//! Resolving it for a node means resolving every workload version built for
//! the node's architecture and folding the resulting dependency lists into a
//! single deduplicated list.

use futures::stream::{self, TryStreamExt};
use nodecfg_core::{DependencyList, PatternId};
use nodecfg_registry::{Pattern, PatternSource, Requester, WorkloadQuery, WorkloadResolver};

use crate::error::{ControlError, Result};

/// Fetch the definition of `pattern`, checking the registry returned exactly
/// that pattern.
///
/// # Errors
///
/// Returns a systemic error if the fetch fails, the registry returns other
/// than one pattern, or the one returned is keyed differently.
pub async fn fetch_pattern<P: PatternSource + ?Sized>(
    patterns: &P,
    pattern: &PatternId,
    requester: &Requester,
) -> Result<Pattern> {
    let mut found = patterns
        .get_patterns(pattern, requester)
        .await
        .map_err(|source| ControlError::PatternFetch {
            pattern: pattern.clone(),
            source,
        })?;

    if found.len() != 1 {
        return Err(ControlError::PatternCount(found.len()));
    }

    let key = pattern.key();
    found.remove(&key).ok_or_else(|| ControlError::PatternKeyMismatch {
        expected: key,
        received: found.keys().cloned().collect(),
    })
}

/// The workload versions of `pattern` that apply to `arch`, in declaration
/// order.
///
/// Workloads built for other architectures are skipped.
#[must_use]
pub fn workload_queries(pattern: &Pattern, arch: &str) -> Vec<WorkloadQuery> {
    pattern
        .workloads
        .iter()
        .filter(|w| w.workload_arch == arch)
        .flat_map(|w| {
            w.workload_versions.iter().map(|choice| WorkloadQuery {
                url: w.workload_url.clone(),
                org: w.workload_org.clone(),
                version: choice.version.clone(),
                arch: arch.to_string(),
            })
        })
        .collect()
}

/// Resolve a pattern to the complete, deduplicated list of dependencies this
/// node must run.
///
/// Workload versions are resolved one at a time, in declaration order. Any
/// failure aborts resolution; no partial list is returned.
///
/// # Errors
///
/// Returns a systemic error if the pattern cannot be fetched or any workload
/// version cannot be resolved.
pub async fn resolve_pattern<P, W>(
    patterns: &P,
    workloads: &W,
    pattern: &PatternId,
    requester: &Requester,
    arch: &str,
) -> Result<DependencyList>
where
    P: PatternSource + ?Sized,
    W: WorkloadResolver + ?Sized,
{
    let definition = fetch_pattern(patterns, pattern, requester).await?;
    tracing::debug!(pattern = %pattern, definition = ?definition, "Working with pattern definition");

    let queries = workload_queries(&definition, arch);

    let resolved = stream::iter(queries.into_iter().map(Ok::<_, ControlError>))
        .try_fold(DependencyList::new(), |total, query| async move {
            workloads
                .resolve_workload(&query, requester)
                .await
                .map(|deps| total.absorb(&deps))
                .map_err(|source| ControlError::WorkloadResolution {
                    url: query.url.clone(),
                    org: query.org.clone(),
                    version: query.version.clone(),
                    arch: query.arch.clone(),
                    source,
                })
        })
        .await?;

    tracing::debug!(
        pattern = %pattern,
        dependencies = ?resolved,
        "Resolved pattern to dependencies"
    );

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;
    use nodecfg_core::{DependencyRef, DeviceId};
    use nodecfg_registry::{RegistryError, WorkloadChoice, WorkloadReference};

    const GPS: &str = "https://bluehorizon.network/microservices/gps";
    const NET: &str = "https://bluehorizon.network/microservices/network";

    /// Serves a fixed pattern map and per-version dependency lists.
    struct FakeRegistry {
        patterns: HashMap<String, Pattern>,
        workloads: HashMap<(String, String), DependencyList>,
    }

    #[async_trait]
    impl PatternSource for FakeRegistry {
        async fn get_patterns(
            &self,
            _pattern: &PatternId,
            _requester: &Requester,
        ) -> nodecfg_registry::Result<HashMap<String, Pattern>> {
            Ok(self.patterns.clone())
        }
    }

    #[async_trait]
    impl WorkloadResolver for FakeRegistry {
        async fn resolve_workload(
            &self,
            query: &WorkloadQuery,
            _requester: &Requester,
        ) -> nodecfg_registry::Result<DependencyList> {
            self.workloads
                .get(&(query.url.clone(), query.version.clone()))
                .cloned()
                .ok_or_else(|| RegistryError::Unavailable(format!("no {}", query.url)))
        }
    }

    struct FailingPatterns;

    #[async_trait]
    impl PatternSource for FailingPatterns {
        async fn get_patterns(
            &self,
            _pattern: &PatternId,
            _requester: &Requester,
        ) -> nodecfg_registry::Result<HashMap<String, Pattern>> {
            Err(RegistryError::Unavailable("connection refused".into()))
        }
    }

    fn requester() -> Requester {
        Requester::new(DeviceId::new("dev1").unwrap(), "token")
    }

    fn pattern_id() -> PatternId {
        PatternId::new("myorg", "sdr").unwrap()
    }

    fn workload(url: &str, arch: &str, versions: &[&str]) -> WorkloadReference {
        WorkloadReference {
            workload_url: url.to_string(),
            workload_org: "myorg".to_string(),
            workload_arch: arch.to_string(),
            workload_versions: versions.iter().map(|v| WorkloadChoice::new(*v)).collect(),
        }
    }

    fn gps(version: &str) -> DependencyRef {
        DependencyRef::new(GPS, "myorg", version).singleton()
    }

    fn net(version: &str) -> DependencyRef {
        DependencyRef::new(NET, "myorg", version)
    }

    fn registry(workloads: Vec<WorkloadReference>) -> FakeRegistry {
        let pattern = Pattern {
            workloads,
            ..Pattern::default()
        };
        FakeRegistry {
            patterns: HashMap::from([("myorg/sdr".to_string(), pattern)]),
            workloads: HashMap::new(),
        }
    }

    #[test]
    fn queries_skip_other_architectures() {
        let pattern = Pattern {
            workloads: vec![
                workload("https://x/a", "amd64", &["1.0.0", "0.9.0"]),
                workload("https://x/b", "arm64", &["1.0.0"]),
            ],
            ..Pattern::default()
        };

        let queries = workload_queries(&pattern, "amd64");

        assert_eq!(queries.len(), 2);
        assert!(queries.iter().all(|q| q.url == "https://x/a" && q.arch == "amd64"));
        assert_eq!(queries[0].version, "1.0.0");
        assert_eq!(queries[1].version, "0.9.0");
    }

    #[tokio::test]
    async fn resolves_and_deduplicates_across_workloads() {
        let mut reg = registry(vec![
            workload("https://x/a", "amd64", &["1.0.0"]),
            workload("https://x/b", "amd64", &["2.0.0"]),
        ]);
        reg.workloads.insert(
            ("https://x/a".into(), "1.0.0".into()),
            vec![gps("1.0.0"), net("1.0.0")].into(),
        );
        reg.workloads.insert(
            ("https://x/b".into(), "2.0.0".into()),
            vec![gps("1.2.0"), net("1.0.0")].into(),
        );

        let deps = resolve_pattern(&reg, &reg, &pattern_id(), &requester(), "amd64")
            .await
            .unwrap();

        assert_eq!(deps, DependencyList::from(vec![net("1.0.0"), gps("1.2.0")]));
    }

    #[tokio::test]
    async fn every_version_choice_is_resolved() {
        let mut reg = registry(vec![workload("https://x/a", "amd64", &["2.0.0", "1.0.0"])]);
        reg.workloads
            .insert(("https://x/a".into(), "2.0.0".into()), vec![net("2.0.0")].into());
        reg.workloads
            .insert(("https://x/a".into(), "1.0.0".into()), vec![net("1.0.0")].into());

        let deps = resolve_pattern(&reg, &reg, &pattern_id(), &requester(), "amd64")
            .await
            .unwrap();

        assert_eq!(deps, DependencyList::from(vec![net("2.0.0"), net("1.0.0")]));
    }

    #[tokio::test]
    async fn other_arch_contributes_nothing() {
        let mut reg = registry(vec![workload("https://x/a", "arm64", &["1.0.0"])]);
        reg.workloads
            .insert(("https://x/a".into(), "1.0.0".into()), vec![net("1.0.0")].into());

        let deps = resolve_pattern(&reg, &reg, &pattern_id(), &requester(), "amd64")
            .await
            .unwrap();

        assert!(deps.is_empty());
    }

    #[tokio::test]
    async fn workload_failure_aborts_resolution() {
        let reg = registry(vec![workload("https://x/a", "amd64", &["1.0.0"])]);

        let result = resolve_pattern(&reg, &reg, &pattern_id(), &requester(), "amd64").await;

        assert!(matches!(
            result,
            Err(ControlError::WorkloadResolution { ref url, .. }) if url == "https://x/a"
        ));
    }

    #[tokio::test]
    async fn fetch_failure_is_reported() {
        let reg = registry(Vec::new());
        let result =
            resolve_pattern(&FailingPatterns, &reg, &pattern_id(), &requester(), "amd64").await;
        assert!(matches!(result, Err(ControlError::PatternFetch { .. })));
    }

    #[tokio::test]
    async fn zero_patterns_is_a_count_fault() {
        let mut reg = registry(Vec::new());
        reg.patterns.clear();

        let result = fetch_pattern(&reg, &pattern_id(), &requester()).await;
        assert!(matches!(result, Err(ControlError::PatternCount(0))));
    }

    #[tokio::test]
    async fn two_patterns_is_a_count_fault() {
        let mut reg = registry(Vec::new());
        reg.patterns.insert("myorg/other".into(), Pattern::default());

        let result = fetch_pattern(&reg, &pattern_id(), &requester()).await;
        assert!(matches!(result, Err(ControlError::PatternCount(2))));
    }

    #[tokio::test]
    async fn wrong_key_is_a_mismatch_fault() {
        let mut reg = registry(Vec::new());
        reg.patterns.clear();
        reg.patterns.insert("myorg/other".into(), Pattern::default());

        match fetch_pattern(&reg, &pattern_id(), &requester()).await {
            Err(ControlError::PatternKeyMismatch { expected, received }) => {
                assert_eq!(expected, "myorg/sdr");
                assert_eq!(received, vec!["myorg/other".to_string()]);
            }
            other => panic!("expected PatternKeyMismatch, got {other:?}"),
        }
    }
}
