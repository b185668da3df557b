//! Node hardware architecture.

/// Returns the architecture name this node reports to the registry.
///
/// Rust target names are mapped onto the names used by workload
/// definitions (`amd64`, `arm64`, `arm`, `ppc64le`). Unknown targets are
/// reported unchanged.
#[must_use]
pub fn node_arch() -> String {
    arch_name(std::env::consts::ARCH).to_string()
}

/// Map a Rust target architecture onto its registry name.
#[must_use]
pub fn arch_name(rust_arch: &str) -> &str {
    match rust_arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64le",
        "x86" => "386",
        other => other,
    }
}
