use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::pom::DeclaredDependency;

/// Matches a whole-string property reference such as `${junit.version}`.
static PROPERTY_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$\{([^}]+)\}$").expect("valid property reference pattern"));

/// Resolve a declared version against the owning POM's `<properties>`.
///
/// A `${name}` placeholder is replaced by the property's value; an unknown
/// property leaves the version absent. Literal versions pass through. Only one
/// level is resolved: a property whose value is itself a placeholder is kept
/// verbatim.
pub fn resolve_version(raw: Option<&str>, properties: &HashMap<String, String>) -> Option<String> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty())?;

    match PROPERTY_REFERENCE.captures(raw) {
        Some(caps) => properties
            .get(caps[1].trim())
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string),
        None => Some(raw.to_string()),
    }
}

/// Apply [`resolve_version`] to every declaration in place.
pub fn substitute_versions(
    dependencies: &mut [DeclaredDependency],
    properties: &HashMap<String, String>,
) {
    for dependency in dependencies {
        dependency.version = resolve_version(dependency.version.as_deref(), properties);
    }
}
