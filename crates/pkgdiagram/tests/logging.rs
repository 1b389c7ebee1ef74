//! Logging setup and tracing during diagram operations

use pkgdiagram::core::logging::{init_logging, LogFormat};
use pkgdiagram::prelude::*;
use std::str::FromStr;
use tempfile::tempdir;
use tracing_subscriber::util::SubscriberInitExt;

fn small_package() -> Package {
    let mut package = Package::new("app", "Logging");
    package
        .add_target(Target::class("Main", ClassRole::Standard, Point::new(40, 40)))
        .unwrap();
    package
        .add_target(Target::class("Helper", ClassRole::Standard, Point::new(40, 200)))
        .unwrap();
    package.add_dependency(Dependency::uses("Main", "Helper"));
    package
}

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
    assert_eq!(LogFormat::from_str("Pretty").unwrap(), LogFormat::Pretty);
    assert!(LogFormat::from_str("xml").is_err());
    assert_eq!(LogFormat::variants().len(), 3);
}

#[test]
fn test_init_logging_rejects_unknown_format() {
    assert!(init_logging(Some("info"), Some("yaml")).is_err());
}

#[test]
fn test_init_logging_does_not_panic() {
    let _ = init_logging(Some("debug"), Some("compact"));
    // a second call fails because a global subscriber is already set
    let _ = init_logging(Some("trace"), Some("json"));
}

#[test]
fn test_save_and_load_with_tracing() {
    let _guard = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .set_default();

    let dir = tempdir().unwrap();
    let path = dir.path().join("package.pkgd");
    small_package().save_file(&path).unwrap();
    let loaded = Package::load_file(&path).unwrap();
    assert_eq!(loaded.dependency_count(), 1);
}

#[test]
fn test_unreadable_dependency_is_skipped_with_warning() {
    let _guard = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::WARN)
        .set_default();

    let mut props = Properties::new();
    small_package().save(&mut props);
    props.set("dependency1.type", "CallsDependency");

    let package = Package::load(&props).unwrap();
    assert_eq!(package.dependency_count(), 0);
    assert!(package.target("Main").is_some());
}

#[test]
fn test_printing_with_tracing() {
    let _guard = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .set_default();

    let dir = tempdir().unwrap();
    let package = small_package();
    let mut device = SvgPageDevice::new(dir.path());
    let pages = print_package(&package, &DiagramConfig::default(), &mut device, &PageFormat::a4())
        .unwrap();
    assert_eq!(pages, 1);
    assert_eq!(device.written().len(), 1);
}
