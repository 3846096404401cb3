//! Package names, dependencies and the immutable base package entity.
//!
//! This module defines:
//! - `PackageName`: a validated, PEP 503-normalized project name
//! - `Dependency`: a requirement with constraint, marker and root flag
//! - `Package`: an immutable package at a specific version

use crate::marker::Marker;
use crate::version::{PythonVersion, VersionConstraint};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// A validated Python project name.
///
/// Package names must:
/// - Contain only ASCII letters, digits, `.`, `-` and `_`
/// - Start and end with a letter or digit
///
/// The name is normalized per PEP 503 (lowercased, separator runs folded to
/// `-`); the as-written form is kept for display.
#[derive(Clone)]
pub struct PackageName {
    /// The as-written name.
    pretty: Arc<str>,
    /// The PEP 503 normalized name.
    normalized: Arc<str>,
}

impl PackageName {
    /// Parse a package name from a string.
    ///
    /// Returns `None` if the string is not a valid package name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let valid_interior = s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        let first = s.chars().next()?;
        let last = s.chars().next_back()?;
        if !valid_interior || !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
            return None;
        }

        let mut normalized = String::with_capacity(s.len());
        let mut in_separator = false;
        for c in s.chars() {
            if matches!(c, '.' | '-' | '_') {
                if !in_separator {
                    normalized.push('-');
                }
                in_separator = true;
            } else {
                normalized.push(c.to_ascii_lowercase());
                in_separator = false;
            }
        }

        Some(Self {
            pretty: Arc::from(s),
            normalized: Arc::from(normalized),
        })
    }

    /// Get the normalized name.
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Get the as-written name.
    #[must_use]
    #[inline]
    pub fn pretty(&self) -> &str {
        &self.pretty
    }
}

impl fmt::Debug for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PackageName").field(&self.normalized).finish()
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pretty)
    }
}

impl PartialEq for PackageName {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for PackageName {}

impl Hash for PackageName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl PartialOrd for PackageName {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageName {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.normalized.cmp(&other.normalized)
    }
}

impl FromStr for PackageName {
    type Err = PackageNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| PackageNameError(s.to_string()))
    }
}

impl Serialize for PackageName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.pretty)
    }
}

impl<'de> Deserialize<'de> for PackageName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid package name: {s}")))
    }
}

/// Error when parsing an invalid package name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid package name: {0}")]
pub struct PackageNameError(pub String);

impl From<PackageNameError> for stanza_core::Error {
    fn from(err: PackageNameError) -> Self {
        Self::invalid_package_name(err.0)
    }
}

/// A dependency requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    /// The package name.
    pub name: PackageName,
    /// Version constraint.
    pub constraint: VersionConstraint,
    /// Environment marker gating applicability.
    pub marker: Marker,
    /// Whether this dependency refers to the resolution root.
    pub is_root: bool,
}

impl Dependency {
    /// Create a new dependency with no marker, not marked as root.
    #[must_use]
    pub const fn new(name: PackageName, constraint: VersionConstraint) -> Self {
        Self {
            name,
            constraint,
            marker: Marker::Any,
            is_root: false,
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.constraint)
    }
}

/// An immutable package at a specific version.
///
/// Ordinary (dependency-resolved) packages never change version or Python
/// range after construction; identity and hashing may therefore include the
/// version. The mutable project-self entity is
/// [`ProjectPackage`](crate::project::ProjectPackage).
#[derive(Debug, Clone)]
pub struct Package {
    pub(crate) name: PackageName,
    pub(crate) version: PythonVersion,
    /// Short description.
    pub description: Option<String>,
    /// Homepage URL.
    pub homepage: Option<String>,
    /// Repository URL.
    pub repository_url: Option<String>,
    /// Documentation URL.
    pub documentation_url: Option<String>,
    pub(crate) python_versions: Arc<str>,
    pub(crate) python_constraint: VersionConstraint,
    pub(crate) python_marker: Marker,
}

impl Package {
    /// Create a new package supporting any Python version.
    #[must_use]
    pub fn new(name: PackageName, version: PythonVersion) -> Self {
        Self {
            name,
            version,
            description: None,
            homepage: None,
            repository_url: None,
            documentation_url: None,
            python_versions: Arc::from("*"),
            python_constraint: VersionConstraint::any(),
            python_marker: Marker::Any,
        }
    }

    /// Get the package name.
    #[must_use]
    #[inline]
    pub const fn name(&self) -> &PackageName {
        &self.name
    }

    /// Get the package version.
    #[must_use]
    #[inline]
    pub const fn version(&self) -> &PythonVersion {
        &self.version
    }

    /// Get the supported Python version spec string.
    #[must_use]
    #[inline]
    pub fn python_versions(&self) -> &str {
        &self.python_versions
    }

    /// Get the parsed Python support constraint.
    #[must_use]
    #[inline]
    pub const fn python_constraint(&self) -> &VersionConstraint {
        &self.python_constraint
    }

    /// Get the Python support marker.
    #[must_use]
    #[inline]
    pub const fn python_marker(&self) -> &Marker {
        &self.python_marker
    }

    /// Whether this package is the resolution root.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        false
    }

    /// Compute the package's URL set.
    ///
    /// Returns a fresh map each call; mutating it does not affect the
    /// package.
    #[must_use]
    pub fn urls(&self) -> BTreeMap<String, String> {
        let mut urls = BTreeMap::new();
        if let Some(homepage) = &self.homepage {
            urls.insert("Homepage".to_string(), homepage.clone());
        }
        if let Some(repository) = &self.repository_url {
            urls.insert("Repository".to_string(), repository.clone());
        }
        if let Some(documentation) = &self.documentation_url {
            urls.insert("Documentation".to_string(), documentation.clone());
        }
        urls
    }

    /// Convert this package into a dependency reference on itself.
    #[must_use]
    pub fn to_dependency(&self) -> Dependency {
        Dependency {
            name: self.name.clone(),
            constraint: VersionConstraint::exact(self.version.clone()),
            marker: self.python_marker.clone(),
            is_root: false,
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.version)
    }
}

impl PartialEq for Package {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version
    }
}

impl Eq for Package {}

impl Hash for Package {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Version is immutable on ordinary packages, so it may participate
        self.name.hash(state);
        self.version.hash(state);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod package_name {
        use super::*;

        #[test]
        fn parse_valid() {
            let name = PackageName::parse("requests").unwrap();
            assert_eq!(name.as_str(), "requests");
            assert_eq!(name.pretty(), "requests");
        }

        #[test]
        fn parse_normalizes() {
            let name = PackageName::parse("My.Package_Name").unwrap();
            assert_eq!(name.as_str(), "my-package-name");
            assert_eq!(name.pretty(), "My.Package_Name");

            let runs = PackageName::parse("a__b..c").unwrap();
            assert_eq!(runs.as_str(), "a-b-c");
        }

        #[test]
        fn normalized_forms_are_equal() {
            let a = PackageName::parse("Typing-Extensions").unwrap();
            let b = PackageName::parse("typing_extensions").unwrap();
            assert_eq!(a, b);
        }

        #[test]
        fn parse_invalid() {
            assert!(PackageName::parse("").is_none());
            assert!(PackageName::parse("-leading").is_none());
            assert!(PackageName::parse("trailing-").is_none());
            assert!(PackageName::parse("has space").is_none());
            assert!(PackageName::parse("emoji🚀").is_none());
        }
    }

    mod dependency {
        use super::*;

        #[test]
        fn create_dependency() {
            let dep = Dependency::new(
                PackageName::parse("requests").unwrap(),
                VersionConstraint::parse("^2.31").unwrap(),
            );
            assert_eq!(dep.name.as_str(), "requests");
            assert!(!dep.is_root);
            assert_eq!(dep.marker, Marker::Any);
        }
    }

    mod package {
        use super::*;
        use pretty_assertions::assert_eq;

        fn package(name: &str, version: &str) -> Package {
            Package::new(
                PackageName::parse(name).unwrap(),
                PythonVersion::parse(version).unwrap(),
            )
        }

        #[test]
        fn defaults() {
            let pkg = package("my-app", "1.2.3");
            assert_eq!(pkg.python_versions(), "*");
            assert!(pkg.python_constraint().is_any());
            assert_eq!(*pkg.python_marker(), Marker::Any);
            assert!(!pkg.is_root());
        }

        #[test]
        fn urls_reflect_set_fields() {
            let mut pkg = package("my-app", "1.0.0");
            pkg.homepage = Some("https://example.com".to_string());
            pkg.repository_url = Some("https://github.com/example/my-app".to_string());

            let urls = pkg.urls();
            assert_eq!(urls.len(), 2);
            assert_eq!(urls["Homepage"], "https://example.com");
            assert_eq!(urls["Repository"], "https://github.com/example/my-app");
        }

        #[test]
        fn urls_returns_fresh_map() {
            let mut pkg = package("my-app", "1.0.0");
            pkg.homepage = Some("https://example.com".to_string());

            let mut urls = pkg.urls();
            urls.insert("Homepage".to_string(), "https://other.example".to_string());
            assert_eq!(pkg.urls()["Homepage"], "https://example.com");
        }

        #[test]
        fn to_dependency_is_exact_and_not_root() {
            let pkg = package("my-app", "1.2.3");
            let dep = pkg.to_dependency();
            assert_eq!(dep.name, *pkg.name());
            assert!(dep.constraint.matches(pkg.version()));
            assert!(!dep.constraint.matches(&PythonVersion::new(1, 2, 4)));
            assert!(!dep.is_root);
        }

        #[test]
        fn hash_includes_version() {
            use std::collections::hash_map::DefaultHasher;

            let hash = |pkg: &Package| {
                let mut hasher = DefaultHasher::new();
                pkg.hash(&mut hasher);
                hasher.finish()
            };

            let v1 = package("my-app", "1.0.0");
            let v2 = package("my-app", "2.0.0");
            assert_ne!(hash(&v1), hash(&v2));
        }
    }
}
