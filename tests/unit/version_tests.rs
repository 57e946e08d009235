//! Tests for the crate version constant surfaced by `--version`.

/// `CARGO_PKG_VERSION` must be MAJOR.MINOR.PATCH with numeric parts.
#[test]
fn cargo_pkg_version_is_valid_semver() {
    let version = env!("CARGO_PKG_VERSION");
    assert!(!version.is_empty(), "CARGO_PKG_VERSION must not be empty");
    let major_minor_patch: Vec<&str> = version.split('-').next().unwrap_or("").split('.').collect();
    assert!(
        major_minor_patch.len() >= 3,
        "CARGO_PKG_VERSION must have at least MAJOR.MINOR.PATCH, got: {version}"
    );
    for part in &major_minor_patch {
        assert!(
            part.parse::<u64>().is_ok(),
            "CARGO_PKG_VERSION numeric part must parse as u64: '{part}' in '{version}'"
        );
    }
}

