// tests/common/mod.rs
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use pom_release::domain::{ArtifactKey, ResolvedSnapshot, ResolvedSnapshots, VersionMap};

/// Descriptors of the example reactor, in build order
pub const REACTOR: &[&str] = &["pom.xml", "api/pom.xml", "core/pom.xml"];

pub fn fixture(relative: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/reactor")
        .join(relative);
    fs::read_to_string(path).unwrap()
}

/// Copy the example reactor into `dir` and return the descriptor paths
pub fn copy_reactor(dir: &Path) -> Vec<PathBuf> {
    REACTOR
        .iter()
        .map(|relative| {
            let target = dir.join(relative);
            fs::create_dir_all(target.parent().unwrap()).unwrap();
            fs::write(&target, fixture(relative)).unwrap();
            target
        })
        .collect()
}

pub fn key(coordinates: &str) -> ArtifactKey {
    coordinates.parse().unwrap()
}

/// Every reactor module mapped to `version`
pub fn plan(version: &str) -> VersionMap {
    ["com.example:parent", "com.example:api", "com.example:core"]
        .iter()
        .map(|k| (key(k), version.to_string()))
        .collect()
}

/// Out-of-reactor snapshots resolved to releases
pub fn resolved() -> ResolvedSnapshots {
    let mut resolved = ResolvedSnapshots::new();
    resolved.insert(
        key("org.external:lib"),
        ResolvedSnapshot {
            mapped: "2.0".to_string(),
            original: "2.0-SNAPSHOT".to_string(),
        },
    );
    resolved.insert(
        key("org.apache.maven.plugins:maven-custom-plugin"),
        ResolvedSnapshot {
            mapped: "3.0".to_string(),
            original: "3.0-SNAPSHOT".to_string(),
        },
    );
    resolved
}
