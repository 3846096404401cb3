//! The project's own package entity.
//!
//! [`ProjectPackage`] represents the package being built, as opposed to the
//! immutable dependency packages it consumes. Its version and Python support
//! range stay mutable for the whole resolution/build session, and the
//! derived constraint and marker are rewritten in lockstep with every range
//! assignment.

use crate::marker::{Marker, MarkerParseError, nested_marker, parse_marker};
use crate::package::{Dependency, Package, PackageName};
use crate::version::{ConstraintParseError, PythonVersion, VersionConstraint};
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Python range a bare `"*"` spec stands for: the interpreters the
/// toolchain historically supported.
const LEGACY_PYTHON_RANGE: &str = "~2.7 || >=3.4";

fn legacy_python_constraint() -> VersionConstraint {
    VersionConstraint::parse(LEGACY_PYTHON_RANGE).expect("valid legacy range")
}

/// Distribution format a file selection applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistFormat {
    /// Source distribution.
    Sdist,
    /// Built wheel.
    Wheel,
}

fn all_formats() -> SmallVec<[DistFormat; 2]> {
    smallvec![DistFormat::Sdist, DistFormat::Wheel]
}

/// Build configuration from the project manifest.
///
/// All keys are optional; absent keys fall back to documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Entry-point build script path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    /// Whether a setup file should be generated (defaults to false).
    #[serde(
        rename = "generate-setup-file",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub generate_setup_file: Option<bool>,
}

/// An extra source tree to bundle into distributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Source path to include.
    pub include: String,
    /// Destination inside the distribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Distribution formats the spec applies to.
    #[serde(default = "all_formats")]
    pub formats: SmallVec<[DistFormat; 2]>,
}

/// A path to include in or exclude from distributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeSpec {
    /// The path.
    pub path: String,
    /// Distribution formats the spec applies to.
    #[serde(default = "all_formats")]
    pub formats: SmallVec<[DistFormat; 2]>,
}

/// Error when assigning an invalid Python version range.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PythonRangeError {
    /// The range string did not parse as a constraint.
    #[error(transparent)]
    Constraint(#[from] ConstraintParseError),
    /// The derived marker expression did not parse.
    #[error(transparent)]
    Marker(#[from] MarkerParseError),
}

impl From<PythonRangeError> for stanza_core::Error {
    fn from(err: PythonRangeError) -> Self {
        match err {
            PythonRangeError::Constraint(e) => e.into(),
            PythonRangeError::Marker(e) => e.into(),
        }
    }
}

/// The mutable project-self package.
///
/// Unlike [`Package`], the version and Python support range are settable
/// after construction; assigning the range re-derives the constraint and
/// marker atomically. Contained collections (`packages`, `include`,
/// `exclude`, `custom_urls`, `build_config`) are reassigned wholesale rather
/// than mutated in place, which keeps cloning cheap and correct.
#[derive(Debug, Clone)]
pub struct ProjectPackage {
    package: Package,
    /// Build configuration.
    pub build_config: BuildConfig,
    /// Extra source trees to bundle per distribution format.
    pub packages: Vec<PackageSpec>,
    /// Paths to force-include in distributions.
    pub include: Vec<IncludeSpec>,
    /// Paths to exclude from distributions.
    pub exclude: Vec<IncludeSpec>,
    /// URL overrides layered over the computed URL set.
    pub custom_urls: BTreeMap<String, String>,
}

impl ProjectPackage {
    /// Create the project package.
    ///
    /// A package constructed with the default `"*"` Python spec gets the
    /// legacy default constraint seeded immediately, so resolution has a
    /// sane range before any explicit assignment; the marker is left alone
    /// on this path.
    #[must_use]
    pub fn new(name: PackageName, version: PythonVersion) -> Self {
        let mut package = Package::new(name, version);
        if package.python_versions() == "*" {
            package.python_constraint = legacy_python_constraint();
        }

        Self {
            package,
            build_config: BuildConfig::default(),
            packages: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            custom_urls: BTreeMap::new(),
        }
    }

    /// Create the project package with a legacy display-version argument.
    ///
    /// The `pretty_version` parameter is obsolete: it is accepted for
    /// backward compatibility, warned about, and otherwise ignored.
    #[deprecated(note = "the pretty_version parameter is obsolete; use `new` instead")]
    #[must_use]
    pub fn new_with_pretty_version(
        name: PackageName,
        version: PythonVersion,
        pretty_version: Option<&str>,
    ) -> Self {
        if let Some(pretty) = pretty_version {
            tracing::warn!(
                pretty_version = pretty,
                "the pretty_version parameter is deprecated and will be removed in a future release"
            );
        }
        Self::new(name, version)
    }

    /// Get the base package entity.
    #[must_use]
    #[inline]
    pub const fn base(&self) -> &Package {
        &self.package
    }

    /// Get the base package entity mutably, for metadata fields.
    #[inline]
    pub const fn base_mut(&mut self) -> &mut Package {
        &mut self.package
    }

    /// Get the package name.
    #[must_use]
    #[inline]
    pub const fn name(&self) -> &PackageName {
        self.package.name()
    }

    /// Get the current version.
    #[must_use]
    #[inline]
    pub const fn version(&self) -> &PythonVersion {
        self.package.version()
    }

    /// Set the version.
    ///
    /// Ordinary packages keep their version immutable; the project package
    /// is re-versioned as the session's build target changes.
    pub fn set_version(&mut self, version: PythonVersion) {
        self.package.version = version;
    }

    /// Get the supported Python version spec, verbatim as last assigned.
    #[must_use]
    #[inline]
    pub fn python_versions(&self) -> &str {
        self.package.python_versions()
    }

    /// Set the supported Python version range.
    ///
    /// The spec string is stored verbatim; `"*"` is substituted with the
    /// legacy default range for derivation only. The derived constraint and
    /// marker are parsed before any field is written, so a failed assignment
    /// leaves the entity in its previous, consistent state.
    ///
    /// # Errors
    /// Returns [`PythonRangeError`] if the range or the derived marker
    /// expression fails to parse.
    pub fn set_python_versions(
        &mut self,
        value: impl Into<Arc<str>>,
    ) -> Result<(), PythonRangeError> {
        let value: Arc<str> = value.into();
        let derive_source = if value.as_ref() == "*" {
            LEGACY_PYTHON_RANGE
        } else {
            value.as_ref()
        };

        let constraint = VersionConstraint::parse(derive_source)
            .ok_or_else(|| ConstraintParseError(value.to_string()))?;
        let marker = parse_marker(&nested_marker("python_version", &constraint))?;

        self.package.python_versions = value;
        self.package.python_constraint = constraint;
        self.package.python_marker = marker;
        Ok(())
    }

    /// Get the parsed Python support constraint.
    #[must_use]
    #[inline]
    pub const fn python_constraint(&self) -> &VersionConstraint {
        self.package.python_constraint()
    }

    /// Get the Python support marker.
    #[must_use]
    #[inline]
    pub const fn python_marker(&self) -> &Marker {
        self.package.python_marker()
    }

    /// Get the build script path, if configured.
    #[must_use]
    pub fn build_script(&self) -> Option<&str> {
        self.build_config.script.as_deref()
    }

    /// Whether the build should generate a setup file. Defaults to false.
    #[must_use]
    pub fn build_should_generate_setup_file(&self) -> bool {
        self.build_config.generate_setup_file.unwrap_or(false)
    }

    /// Whether this package is the resolution root. Always true.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        true
    }

    /// Convert into a dependency reference marked as the resolution root.
    ///
    /// Apart from the root flag, the result is indistinguishable from an
    /// ordinary dependency reference.
    #[must_use]
    pub fn to_dependency(&self) -> Dependency {
        let mut dependency = self.package.to_dependency();
        dependency.is_root = true;
        dependency
    }

    /// Compute the package's URL set with custom URLs overlaid.
    ///
    /// Custom entries win on key collision. Returns a fresh map each call.
    #[must_use]
    pub fn urls(&self) -> BTreeMap<String, String> {
        let mut urls = self.package.urls();
        urls.extend(
            self.custom_urls
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        urls
    }
}

impl fmt::Display for ProjectPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.package)
    }
}

impl PartialEq for ProjectPackage {
    fn eq(&self, other: &Self) -> bool {
        self.package == other.package
    }
}

impl Eq for ProjectPackage {}

impl Hash for ProjectPackage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // The base entity's hash incorporates the version, which is safe
        // only while the version is immutable. The project package's version
        // mutates, so its hash covers the name alone and stays stable for
        // the entity's whole lifetime.
        self.package.name().hash(state);
    }
}
