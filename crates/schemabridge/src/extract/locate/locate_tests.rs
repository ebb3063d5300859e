#![allow(non_snake_case)]

use super::*;
use std::fs;
use tempfile::TempDir;
use test_case::test_case;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A workspace with an internal crate depending on a path crate, an inherited
/// workspace crate, a vendored crate and a registry crate.
fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "Cargo.toml",
        r#"
[workspace]
members = ["internal", "sdk", "shared"]

[workspace.dependencies]
shared-sdk = { path = "shared" }
"#,
    );
    write(
        root,
        "internal/Cargo.toml",
        r#"
[package]
name = "internal-types"
version.workspace = true

[dependencies]
atlas-sdk = { path = "../sdk" }
shared-sdk = { workspace = true }
vendored = "1.0"
serde = { version = "1", features = ["derive"] }

[dev-dependencies]
renamed = { package = "atlas-sdk", path = "../sdk" }
"#,
    );
    write(root, "internal/src/lib.rs", "pub mod def;\n");
    write(root, "internal/src/def.rs", "pub struct Resource;\n");
    write(root, "sdk/Cargo.toml", "[package]\nname = \"atlas-sdk\"\n");
    write(root, "sdk/src/lib.rs", "pub struct Resource;\n");
    write(
        root,
        "shared/Cargo.toml",
        "[package]\nname = \"shared-sdk\"\n\n[lib]\npath = \"source/lib.rs\"\n",
    );
    write(root, "shared/source/lib.rs", "pub struct Shared;\n");
    write(root, "vendor/vendored/src/lib.rs", "pub struct Vendored;\n");
    write(
        root,
        "Cargo.lock",
        r#"
version = 4

[[package]]
name = "serde"
version = "1.0.228"

[[package]]
name = "vendored"
version = "1.0.0"
"#,
    );
    dir
}

fn cargo_home(root: &Path) -> PathBuf {
    let home = root.join("cargo-home");
    write(
        &home,
        "registry/src/index.crates.io-1949cf8c6b5b557f/serde-1.0.228/src/lib.rs",
        "",
    );
    home
}

// ============================================================================
// Discovery and module paths
// ============================================================================

#[test]
fn Locator___discover_from_file___anchors_at_nearest_package() {
    let dir = workspace();

    let locator = Locator::discover(dir.path().join("internal/src/def.rs")).unwrap();

    assert_eq!(locator.manifest_dir(), dir.path().join("internal"));
    assert_eq!(locator.crate_name().unwrap(), "internal_types");
}

#[test]
fn Locator___discover_outside_any_package___returns_package_not_found() {
    let dir = TempDir::new().unwrap();

    let result = Locator::discover(dir.path());

    assert!(matches!(result, Err(GenError::PackageNotFound { .. })));
}

#[test_case("src/lib.rs", "internal_types"; "crate root")]
#[test_case("src/def.rs", "internal_types::def"; "module file")]
#[test_case("src/nested/mod.rs", "internal_types::nested"; "mod file")]
#[test_case("src/nested/leaf.rs", "internal_types::nested::leaf"; "nested module")]
fn Locator___module_path___follows_file_layout(relative: &str, expected: &str) {
    let dir = workspace();
    let locator = Locator::new(dir.path().join("internal"));

    let module = locator.module_path(dir.path().join("internal").join(relative)).unwrap();

    assert_eq!(module, expected);
}

#[test]
fn Locator___module_path_outside_src___returns_package_not_found() {
    let dir = workspace();
    let locator = Locator::new(dir.path().join("internal"));

    let result = locator.module_path(dir.path().join("internal/build.rs"));

    assert!(matches!(result, Err(GenError::PackageNotFound { .. })));
}

// ============================================================================
// Crate sources
// ============================================================================

#[test]
fn Locator___own_crate___resolves_to_src() {
    let dir = workspace();
    let locator = Locator::new(dir.path().join("internal"));

    assert_eq!(
        locator.crate_src_dir("internal_types").unwrap(),
        dir.path().join("internal/src")
    );
}

#[test]
fn Locator___path_dependency___resolves_relative_to_manifest() {
    let dir = workspace();
    let locator = Locator::new(dir.path().join("internal"));

    let src = locator.crate_src_dir("atlas_sdk").unwrap();

    assert_eq!(src, dir.path().join("internal/../sdk/src"));
}

#[test]
fn Locator___renamed_dependency___resolves_by_key() {
    let dir = workspace();
    let locator = Locator::new(dir.path().join("internal"));

    let src = locator.crate_src_dir("renamed").unwrap();

    assert!(src.join("lib.rs").is_file());
}

#[test]
fn Locator___workspace_dependency___uses_workspace_path_and_lib_path() {
    let dir = workspace();
    let locator = Locator::new(dir.path().join("internal"));

    let src = locator.crate_src_dir("shared_sdk").unwrap();

    assert_eq!(src, dir.path().join("shared/source"));
}

#[test]
fn Locator___vendored_crate___resolves_under_vendor() {
    let dir = workspace();
    let locator = Locator::new(dir.path().join("internal"));

    let src = locator.crate_src_dir("vendored").unwrap();

    assert_eq!(src, dir.path().join("vendor/vendored/src"));
}

#[test]
fn Locator___registry_crate___uses_locked_version() {
    let dir = workspace();
    let home = cargo_home(dir.path());
    let locator = Locator::new(dir.path().join("internal")).with_cargo_home(&home);

    let src = locator.crate_src_dir("serde").unwrap();

    assert_eq!(
        src,
        home.join("registry/src/index.crates.io-1949cf8c6b5b557f/serde-1.0.228/src")
    );
}

#[test]
fn Locator___unknown_crate___returns_package_not_found() {
    let dir = workspace();
    let home = cargo_home(dir.path());
    let locator = Locator::new(dir.path().join("internal")).with_cargo_home(home);

    let result = locator.crate_src_dir("missing");

    assert!(matches!(result, Err(GenError::PackageNotFound { package, .. }) if package == "missing"));
}

#[test]
fn Locator___std_crate___resolves_in_sysroot() {
    let dir = workspace();
    let sysroot = dir.path().join("sysroot");
    write(&sysroot, "lib/rustlib/src/rust/library/core/src/lib.rs", "");
    let locator = Locator::new(dir.path().join("internal")).with_sysroot(&sysroot);

    let src = locator.crate_src_dir("core").unwrap();

    assert_eq!(src, sysroot.join("lib/rustlib/src/rust/library/core/src"));
}

#[test]
fn Locator___std_without_rust_src___returns_package_not_found() {
    let dir = workspace();
    let locator = Locator::new(dir.path().join("internal")).with_sysroot(dir.path().join("empty"));

    let result = locator.crate_src_dir("std");

    assert!(matches!(result, Err(GenError::PackageNotFound { .. })));
}

#[test]
fn Locator___malformed_manifest___returns_toml_error() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "Cargo.toml", "[package\nname = ");
    let locator = Locator::new(dir.path());

    let result = locator.crate_name();

    assert!(matches!(result, Err(GenError::Toml { .. })));
}

#[test_case("lib.rs", &[]; "lib root")]
#[test_case("a/b.rs", &["a", "b"]; "nested file")]
#[test_case("a/mod.rs", &["a"]; "mod file")]
fn module_segments___relative_path___drops_root_files(relative: &str, expected: &[&str]) {
    assert_eq!(module_segments(Path::new(relative)), expected);
}
