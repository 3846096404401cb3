//! Package model for the Stanza packaging toolchain.
//!
//! This crate provides the dependency-model layer used throughout Stanza:
//! - PEP 440 versions and version constraints
//! - Environment markers (`python_version >= "3.8"`)
//! - Package names, the immutable [`Package`] entity and [`Dependency`]
//! - The mutable [`ProjectPackage`] root entity

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod marker;
pub mod package;
pub mod project;
pub mod version;

pub use marker::{Marker, MarkerOperator, MarkerParseError, nested_marker, parse_marker};
pub use package::{Dependency, Package, PackageName, PackageNameError};
pub use project::{
    BuildConfig, DistFormat, IncludeSpec, PackageSpec, ProjectPackage, PythonRangeError,
};
pub use version::{ConstraintParseError, PythonVersion, VersionConstraint, VersionParseError};
