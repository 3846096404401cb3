//! End-to-end tests for the project package through the public API.

#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use smallvec::smallvec;
use stanza_package::{
    BuildConfig, DistFormat, IncludeSpec, Marker, PackageName, PackageSpec, ProjectPackage,
    PythonVersion, VersionConstraint,
};

fn project(name: &str, version: &str) -> ProjectPackage {
    ProjectPackage::new(
        PackageName::parse(name).unwrap(),
        PythonVersion::parse(version).unwrap(),
    )
}

#[test]
fn build_session_lifecycle() {
    let mut project = project("my-app", "0.1.0");

    // Fresh project: wildcard spec with the legacy constraint pre-seeded
    assert_eq!(project.python_versions(), "*");
    assert!(
        project
            .python_constraint()
            .matches(&PythonVersion::parse("2.7.18").unwrap())
    );
    assert!(
        !project
            .python_constraint()
            .matches(&PythonVersion::parse("3.0.0").unwrap())
    );

    // Narrow the supported range for this build target
    project.set_python_versions(">=3.9,<4.0").unwrap();
    assert_eq!(project.python_versions(), ">=3.9,<4.0");
    assert!(
        !project
            .python_constraint()
            .matches(&PythonVersion::parse("2.7.18").unwrap())
    );

    let env: ahash::AHashMap<String, String> =
        [("python_version".to_string(), "3.12".to_string())]
            .into_iter()
            .collect();
    assert!(project.python_marker().evaluate(&env));

    // Re-version for a release build; identity hash must not move
    use std::hash::{Hash, Hasher};
    let hash = |p: &ProjectPackage| {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        p.hash(&mut hasher);
        hasher.finish()
    };
    let before = hash(&project);
    project.set_version(PythonVersion::parse("0.2.0").unwrap());
    assert_eq!(before, hash(&project));

    // The resolver sees the project as a root-flagged dependency
    let dep = project.to_dependency();
    assert!(dep.is_root);
    assert_eq!(dep.name.as_str(), "my-app");
    assert!(dep.constraint.matches(&PythonVersion::parse("0.2.0").unwrap()));
}

#[test]
fn failed_range_assignment_is_transactional() {
    let mut project = project("my-app", "0.1.0");
    project.set_python_versions("^3.8").unwrap();

    assert!(project.set_python_versions("not a range").is_err());

    assert_eq!(project.python_versions(), "^3.8");
    assert_eq!(
        *project.python_constraint(),
        VersionConstraint::parse("^3.8").unwrap()
    );
    assert_ne!(*project.python_marker(), Marker::Any);
}

#[test]
fn clones_are_independent() {
    let mut original = project("my-app", "0.1.0");
    original.custom_urls.insert(
        "Homepage".to_string(),
        "https://example.com".to_string(),
    );
    original.packages.push(PackageSpec {
        include: "src/my_app".to_string(),
        to: None,
        formats: smallvec![DistFormat::Sdist, DistFormat::Wheel],
    });

    let mut copy = original.clone();
    copy.custom_urls
        .insert("Homepage".to_string(), "https://fork.example".to_string());
    copy.packages.clear();
    copy.set_version(PythonVersion::parse("9.0.0").unwrap());

    assert_eq!(original.urls()["Homepage"], "https://example.com");
    assert_eq!(original.packages.len(), 1);
    assert_eq!(original.version(), &PythonVersion::parse("0.1.0").unwrap());
}

#[test]
fn file_selection_specs_roundtrip_through_json() {
    let spec = PackageSpec {
        include: "extra_package/**/*.py".to_string(),
        to: Some("lib".to_string()),
        formats: smallvec![DistFormat::Sdist],
    };
    let json = stanza_core::to_json(&spec).unwrap();
    assert!(json.contains("\"sdist\""));
    let parsed: PackageSpec = stanza_core::from_json(&json).unwrap();
    assert_eq!(spec, parsed);

    // Absent format list defaults to both distribution formats
    let parsed: IncludeSpec = stanza_core::from_json(r#"{"path": "CHANGELOG.md"}"#).unwrap();
    assert_eq!(
        parsed.formats.as_slice(),
        &[DistFormat::Sdist, DistFormat::Wheel]
    );
}

#[test]
fn build_config_uses_manifest_key_names() {
    let config: BuildConfig =
        stanza_core::from_json(r#"{"script": "build.py", "generate-setup-file": true}"#).unwrap();
    assert_eq!(config.script.as_deref(), Some("build.py"));
    assert_eq!(config.generate_setup_file, Some(true));

    let mut project = project("my-app", "0.1.0");
    project.build_config = config;
    assert_eq!(project.build_script(), Some("build.py"));
    assert!(project.build_should_generate_setup_file());
}
