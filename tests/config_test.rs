// tests/config_test.rs
use pom_release::config::{load_config, ReleaseConfig};
use pom_release::domain::ArtifactKey;
use pom_release::ReleaseError;
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const PLAN: &str = r#"
reactor = ["pom.xml", "core/pom.xml"]

[release]
line_separator = "lf"
update_dependencies = false

[scm]
release_label = "example-1.0"
comment_prefix = "[ci] "
remote_tagging = false
wait_before_tagging = 5
trunk_base = "scm:git:https://example.com/repo/trunk"
tag_base = "scm:git:https://example.com/repo/tags/example-1.0"

[versions.next]
"com.example:parent" = "1.0"
"com.example:core" = "1.0"

[versions.original]
"com.example:parent" = "1.0-SNAPSHOT"

[resolved_snapshots."org.external:lib"]
mapped = "2.0"
original = "2.0-SNAPSHOT"
"#;

#[test]
fn test_load_default_config() {
    let config = ReleaseConfig::default();
    assert!(config.reactor.is_empty());
    assert!(config.versions.next.is_empty());
    assert!(config.release.update_scm);
    assert_eq!(config.scm.working_directory, PathBuf::from("."));
}

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(PLAN.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    let base = temp_file.path().parent().unwrap();
    assert_eq!(config.reactor, vec![base.join("pom.xml"), base.join("core/pom.xml")]);
    assert_eq!(config.scm.working_directory, base.join("."));
    assert_eq!(config.versions.next.len(), 2);
    assert_eq!(
        config.versions.original[&ArtifactKey::new("com.example", "parent")],
        "1.0-SNAPSHOT"
    );
    assert_eq!(
        config.resolved_snapshots[&ArtifactKey::new("org.external", "lib")].mapped,
        "2.0"
    );

    let options = config.rewrite_options().unwrap();
    assert_eq!(options.ls, "\n");
    assert!(!options.update_dependencies);
    assert_eq!(options.release_label.as_deref(), Some("example-1.0"));

    let settings = config.tag_settings();
    assert!(!settings.remote_tagging);
    assert_eq!(settings.wait_before_tagging, 5);
    assert_eq!(settings.tag_message("example-1.0"), "[ci] copy for tag example-1.0");
}

#[test]
fn test_invalid_toml_is_an_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"reactor = [").unwrap();
    temp_file.flush().unwrap();

    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert!(matches!(err, ReleaseError::Toml(_)));
}

#[test]
fn test_missing_custom_file_is_an_error() {
    let err = load_config(Some("/nonexistent/pomrelease.toml")).unwrap_err();
    assert!(matches!(err, ReleaseError::Config(_)));
}

#[test]
#[serial]
fn test_current_directory_file_is_preferred() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("pomrelease.toml"), PLAN).unwrap();

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let config = load_config(None);
    std::env::set_current_dir(previous).unwrap();

    let config = config.unwrap();
    assert_eq!(config.scm.release_label.as_deref(), Some("example-1.0"));
    assert_eq!(config.reactor[0], PathBuf::from("./pom.xml"));
}
