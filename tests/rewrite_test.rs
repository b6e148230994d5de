// tests/rewrite_test.rs
mod common;

use std::fs;
use std::sync::Arc;

use common::{copy_reactor, fixture, plan, resolved};
use pom_release::domain::{Reactor, RewriteMode};
use pom_release::rewrite::{RewriteEngine, RewriteOptions, ScmTagTransform, StaticVersionMap};
use pom_release::scm::{MockScmProvider, ScmCall};
use pom_release::warnings::RewriteWarning;
use pom_release::ReleaseError;

fn options() -> RewriteOptions {
    RewriteOptions {
        ls: "\n".to_string(),
        release_label: Some("v1.0".to_string()),
        ..Default::default()
    }
}

fn engine(mode: RewriteMode, version: &str) -> RewriteEngine {
    RewriteEngine::new(mode, options())
        .with_next_versions(StaticVersionMap(plan(version)))
        .with_resolved_snapshots(resolved())
        .with_scm_transform(ScmTagTransform::release())
}

#[test]
fn test_tag_mode_rewrites_whole_reactor() {
    let dir = tempfile::tempdir().unwrap();
    let paths = copy_reactor(dir.path());
    let reactor = Reactor::load(&paths, "\n").unwrap();

    let report = engine(RewriteMode::Tag, "1.0").execute(&reactor).unwrap();
    assert_eq!(report.written, paths);
    assert_eq!(report.properties, 2);

    let parent = fs::read_to_string(&paths[0]).unwrap();
    assert_eq!(
        parent,
        fixture("pom.xml")
            .replace("1.0-SNAPSHOT", "1.0")
            .replace("3.0-SNAPSHOT", "3.0")
            .replace("<tag>HEAD</tag>", "<tag>v1.0</tag>")
    );

    let api = fs::read_to_string(&paths[1]).unwrap();
    assert_eq!(
        api,
        fixture("api/pom.xml")
            .replace("1.0-SNAPSHOT", "1.0")
            .replace("2.0-SNAPSHOT", "2.0")
    );

    let core = fs::read_to_string(&paths[2]).unwrap();
    assert_eq!(core, fixture("core/pom.xml").replace("1.0-SNAPSHOT", "1.0"));

    // The property already holds the release value when the reference is reached
    assert_eq!(
        report.warnings,
        vec![RewriteWarning::AlreadyUpdated {
            module: "Example Core".to_string(),
            expression: "${api.version}".to_string(),
        }]
    );
}

#[test]
fn test_release_mode_rewrites_property_through_reference() {
    let dir = tempfile::tempdir().unwrap();
    let paths = copy_reactor(dir.path());
    let reactor = Reactor::load(&paths, "\n").unwrap();

    let report = engine(RewriteMode::Release, "1.0").execute(&reactor).unwrap();
    assert!(report.warnings.is_empty());

    // Snapshot properties keep their development value in release mode
    let parent = fs::read_to_string(&paths[0]).unwrap();
    assert!(parent.contains("<version>1.0</version>"));
    assert!(parent.contains("<shared.version>1.0-SNAPSHOT</shared.version>"));

    // ...unless a reference to a reactor module points at them
    let core = fs::read_to_string(&paths[2]).unwrap();
    assert!(core.contains("<api.version>1.0</api.version>"));
    assert!(core.contains("<version>${api.version}</version>"));
    assert!(core.contains("<version>4.13.2</version>"));
    assert!(!core.contains("SNAPSHOT"));
}

#[test]
fn test_simulate_leaves_descriptors_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let paths = copy_reactor(dir.path());
    let reactor = Reactor::load(&paths, "\n").unwrap();
    let engine = engine(RewriteMode::Release, "1.0");

    let report = engine.simulate(&reactor).unwrap();
    assert!(report.simulated);
    for (path, relative) in paths.iter().zip(common::REACTOR) {
        assert_eq!(fs::read_to_string(path).unwrap(), fixture(relative));
        let side_file = path.with_file_name("pom.xml.release");
        assert!(report.written.contains(&side_file));
        assert!(!fs::read_to_string(&side_file)
            .unwrap()
            .contains("<version>1.0-SNAPSHOT</version>"));
    }

    let removed = engine.clean(&reactor).unwrap();
    assert_eq!(removed.len(), 3);
    assert!(removed.iter().all(|path| !path.exists()));
}

#[test]
fn test_next_mode_decrements_and_resets_scm_tag() {
    let dir = tempfile::tempdir().unwrap();
    let paths = copy_reactor(dir.path());
    let reactor = Reactor::load(&paths[..1], "\n").unwrap();

    RewriteEngine::new(RewriteMode::Next, options())
        .with_next_versions(StaticVersionMap(plan("1.2-SNAPSHOT")))
        .with_resolved_snapshots(resolved())
        .with_scm_transform(ScmTagTransform::fixed("HEAD"))
        .execute(&reactor)
        .unwrap();

    let parent = fs::read_to_string(&paths[0]).unwrap();
    assert!(parent.contains("<version>1.1-SNAPSHOT</version>"));
    assert!(parent.contains("<shared.version>1.0-SNAPSHOT</shared.version>"));
    assert!(parent.contains("<tag>HEAD</tag>"));
}

#[test]
fn test_next_mode_cannot_decrement_zero() {
    let dir = tempfile::tempdir().unwrap();
    let paths = copy_reactor(dir.path());
    let reactor = Reactor::load(&paths[..1], "\n").unwrap();

    let err = engine(RewriteMode::Next, "2.0-SNAPSHOT")
        .execute(&reactor)
        .unwrap_err();
    assert!(matches!(err, ReleaseError::Version(_)));
    assert_eq!(fs::read_to_string(&paths[0]).unwrap(), fixture("pom.xml"));
}

#[test]
fn test_unmapped_parent_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let paths = copy_reactor(dir.path());
    let reactor = Reactor::load(&paths[1..], "\n").unwrap();

    let mut next = plan("1.0");
    next.remove(&common::key("com.example:parent"));
    let err = RewriteEngine::new(RewriteMode::Release, options())
        .with_next_versions(StaticVersionMap(next))
        .with_original_versions(StaticVersionMap(plan("1.0-SNAPSHOT")))
        .execute(&reactor)
        .unwrap_err();

    assert!(matches!(err, ReleaseError::UnmappedParent(ref name) if name == "com.example:parent"));
}

#[test]
fn test_conflicting_property_aborts_without_rollback() {
    let dir = tempfile::tempdir().unwrap();
    let paths = copy_reactor(dir.path());
    let core = fixture("core/pom.xml").replace(
        "<api.version>1.0-SNAPSHOT</api.version>",
        "<api.version>0.9</api.version>",
    );
    fs::write(&paths[2], &core).unwrap();
    let reactor = Reactor::load(&paths, "\n").unwrap();

    let err = engine(RewriteMode::Release, "1.0")
        .execute(&reactor)
        .unwrap_err();
    assert!(matches!(err, ReleaseError::Conflict(_)));

    // Modules before the failing one stay written
    assert!(fs::read_to_string(&paths[0])
        .unwrap()
        .contains("<version>1.0</version>"));
    assert_eq!(fs::read_to_string(&paths[2]).unwrap(), core);
}

#[test]
fn test_dependency_updates_disabled_keeps_releases() {
    let dir = tempfile::tempdir().unwrap();
    let paths = copy_reactor(dir.path());
    let api = fixture("api/pom.xml").replace(
        "<version>2.0-SNAPSHOT</version>",
        "<version>2.0-SNAPSHOT</version>\n    </dependency>\n    <dependency>\n      <groupId>com.example</groupId>\n      <artifactId>core</artifactId>\n      <version>0.9</version>",
    );
    fs::write(&paths[1], &api).unwrap();
    let reactor = Reactor::load(&paths[..2], "\n").unwrap();

    let report = RewriteEngine::new(
        RewriteMode::Next,
        RewriteOptions {
            update_dependencies: false,
            ..options()
        },
    )
    .with_next_versions(StaticVersionMap(plan("1.1-SNAPSHOT")))
    .execute(&reactor)
    .unwrap();

    assert_eq!(
        report.warnings,
        vec![RewriteWarning::KeptRelease {
            module: "Example API".to_string(),
            artifact: "com.example:core".to_string(),
            version: "0.9".to_string(),
        }]
    );
    assert!(fs::read_to_string(&paths[1])
        .unwrap()
        .contains("<version>0.9</version>"));
}

#[test]
fn test_edit_mode_follows_reactor_order() {
    let dir = tempfile::tempdir().unwrap();
    let paths = copy_reactor(dir.path());
    let reactor = Reactor::load(&paths, "\n").unwrap();
    let mock = Arc::new(MockScmProvider::new());

    RewriteEngine::new(
        RewriteMode::Release,
        RewriteOptions {
            scm_use_edit_mode: true,
            ..options()
        },
    )
    .with_next_versions(StaticVersionMap(plan("1.0")))
    .with_resolved_snapshots(resolved())
    .with_scm_provider(mock.clone())
    .execute(&reactor)
    .unwrap();

    let edited: Vec<_> = mock
        .calls()
        .into_iter()
        .map(|call| match call {
            ScmCall::Edit { file, .. } => file,
            other => panic!("unexpected call {:?}", other),
        })
        .collect();
    assert_eq!(edited, paths);
}

#[test]
fn test_schema_annotation() {
    let dir = tempfile::tempdir().unwrap();
    let paths = copy_reactor(dir.path());
    let reactor = Reactor::load(&paths[..1], "\n").unwrap();

    RewriteEngine::new(
        RewriteMode::Tag,
        RewriteOptions {
            add_schema: true,
            ..options()
        },
    )
    .with_next_versions(StaticVersionMap(plan("1.0")))
    .with_resolved_snapshots(resolved())
    .execute(&reactor)
    .unwrap();

    let parent = fs::read_to_string(&paths[0]).unwrap();
    assert!(parent.contains("xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\""));
    assert!(parent.contains(
        "xsi:schemaLocation=\"http://maven.apache.org/POM/4.0.0 http://maven.apache.org/maven-v4_0_0.xsd\""
    ));
    assert!(parent.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- Aggregator"));
}
