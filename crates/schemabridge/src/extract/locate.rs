//! Locating crate sources on disk
//!
//! A [`Locator`] is anchored at one crate (the nearest `Cargo.toml` with a
//! `[package]` section) and answers two questions: which module path a source
//! file of that crate has, and where the sources of a crate it can name live.

use crate::error::{GenError, GenResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const MANIFEST: &str = "Cargo.toml";
const LOCK_FILE: &str = "Cargo.lock";
const SYSROOT_CRATES: &[&str] = &["std", "core", "alloc", "proc_macro", "test"];

#[derive(Debug, Default, Deserialize)]
struct Manifest {
    package: Option<PackageSection>,
    workspace: Option<WorkspaceSection>,
    lib: Option<LibSection>,
    #[serde(default)]
    dependencies: BTreeMap<String, DependencySpec>,
    #[serde(default, rename = "dev-dependencies")]
    dev_dependencies: BTreeMap<String, DependencySpec>,
    #[serde(default, rename = "build-dependencies")]
    build_dependencies: BTreeMap<String, DependencySpec>,
}

#[derive(Debug, Deserialize)]
struct PackageSection {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct WorkspaceSection {
    #[serde(default)]
    dependencies: BTreeMap<String, DependencySpec>,
}

#[derive(Debug, Deserialize)]
struct LibSection {
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum DependencySpec {
    Version(String),
    Detailed(DependencyDetail),
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DependencyDetail {
    version: Option<String>,
    path: Option<PathBuf>,
    package: Option<String>,
    #[serde(default)]
    workspace: bool,
}

#[derive(Debug, Default, Deserialize)]
struct LockFile {
    #[serde(default)]
    package: Vec<LockedPackage>,
}

#[derive(Debug, Deserialize)]
struct LockedPackage {
    name: String,
    version: String,
}

/// A dependency entry after `workspace = true` indirection is resolved.
#[derive(Debug)]
struct ResolvedDependency {
    package: String,
    path: Option<PathBuf>,
}

/// Finds module paths and crate source directories relative to one crate.
#[derive(Debug, Clone)]
pub struct Locator {
    manifest_dir: PathBuf,
    sysroot: Option<PathBuf>,
    cargo_home: Option<PathBuf>,
}

impl Locator {
    /// Anchor at the crate containing `start` (a file or directory).
    pub fn discover(start: impl AsRef<Path>) -> GenResult<Self> {
        let start = start.as_ref();
        let mut dir = if start.is_dir() { Some(start) } else { start.parent() };
        while let Some(candidate) = dir {
            let manifest = candidate.join(MANIFEST);
            if manifest.is_file() && read_manifest(&manifest)?.package.is_some() {
                return Ok(Self::new(candidate));
            }
            dir = candidate.parent();
        }
        Err(GenError::PackageNotFound {
            package: start.display().to_string(),
            reason: format!("no {MANIFEST} with a [package] section above it"),
        })
    }

    /// Anchor at the crate whose manifest lives in `manifest_dir`.
    pub fn new(manifest_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest_dir: manifest_dir.into(),
            sysroot: None,
            cargo_home: None,
        }
    }

    /// Use `sysroot` instead of asking `rustc` for it.
    pub fn with_sysroot(mut self, sysroot: impl Into<PathBuf>) -> Self {
        self.sysroot = Some(sysroot.into());
        self
    }

    /// Use `cargo_home` instead of `$CARGO_HOME` / `~/.cargo`.
    pub fn with_cargo_home(mut self, cargo_home: impl Into<PathBuf>) -> Self {
        self.cargo_home = Some(cargo_home.into());
        self
    }

    pub fn manifest_dir(&self) -> &Path {
        &self.manifest_dir
    }

    /// Name of the anchored crate as written in code (`atlas_types`).
    pub fn crate_name(&self) -> GenResult<String> {
        let manifest = read_manifest(&self.manifest_dir.join(MANIFEST))?;
        manifest
            .package
            .map(|package| crate_ident(&package.name))
            .ok_or_else(|| GenError::PackageNotFound {
                package: self.manifest_dir.display().to_string(),
                reason: "manifest has no [package] section".to_string(),
            })
    }

    /// Module path of `file`, e.g. `atlas_types::def` for `src/def.rs`.
    pub fn module_path(&self, file: impl AsRef<Path>) -> GenResult<String> {
        let file = file.as_ref();
        let src = self.manifest_dir.join("src");
        let relative = file.strip_prefix(&src).map_err(|_| GenError::PackageNotFound {
            package: file.display().to_string(),
            reason: format!("file is outside {}", src.display()),
        })?;

        let mut path = vec![self.crate_name()?];
        path.extend(module_segments(relative));
        Ok(path.join("::"))
    }

    /// Source directory of crate `name` as seen from the anchored crate.
    ///
    /// Looks in the sysroot for standard library crates, then at the anchored
    /// crate itself, its path dependencies, the `vendor/` directory and finally
    /// the Cargo registry cache.
    pub fn crate_src_dir(&self, name: &str) -> GenResult<PathBuf> {
        let name = crate_ident(name);
        let not_found = |reason: String| GenError::PackageNotFound {
            package: name.clone(),
            reason,
        };

        if SYSROOT_CRATES.contains(&name.as_str()) {
            let sysroot = self.sysroot()?;
            let dir = sysroot.join("lib/rustlib/src/rust/library").join(&name).join("src");
            return existing(dir)
                .ok_or_else(|| not_found(format!("rust-src is not installed in {}", sysroot.display())));
        }

        let manifest = read_manifest(&self.manifest_dir.join(MANIFEST))?;
        if manifest.package.as_ref().is_some_and(|package| crate_ident(&package.name) == name) {
            return Ok(lib_dir(&self.manifest_dir, &manifest));
        }

        let workspace_root = self.workspace_root()?;
        let dependency = self.resolve_dependency(&manifest, &name, workspace_root.as_deref())?;
        let package = dependency.as_ref().map_or_else(|| name.clone(), |dep| dep.package.clone());

        if let Some(path) = dependency.as_ref().and_then(|dep| dep.path.clone()) {
            let dep_manifest = read_manifest(&path.join(MANIFEST))?;
            debug!(package = %package, path = %path.display(), "resolved path dependency");
            return Ok(lib_dir(&path, &dep_manifest));
        }

        let root = workspace_root.unwrap_or_else(|| self.manifest_dir.clone());
        if let Some(dir) = existing(root.join("vendor").join(&package).join("src")) {
            debug!(package = %package, path = %dir.display(), "resolved vendored crate");
            return Ok(dir);
        }

        let version = locked_version(&root, &package)?
            .ok_or_else(|| not_found(format!("not a dependency of {}", self.manifest_dir.display())))?;
        let registry = self.cargo_home()?.join("registry").join("src");
        let entries = std::fs::read_dir(&registry).map_err(|e| GenError::io(&registry, e))?;
        let mut indexes: Vec<PathBuf> = entries.filter_map(|entry| entry.ok().map(|e| e.path())).collect();
        indexes.sort();
        indexes
            .into_iter()
            .find_map(|index| existing(index.join(format!("{package}-{version}")).join("src")))
            .inspect(|dir| debug!(package = %package, path = %dir.display(), "resolved registry crate"))
            .ok_or_else(|| not_found(format!("{package} {version} is not in {}", registry.display())))
    }

    fn resolve_dependency(
        &self,
        manifest: &Manifest,
        name: &str,
        workspace_root: Option<&Path>,
    ) -> GenResult<Option<ResolvedDependency>> {
        let tables = [
            &manifest.dependencies,
            &manifest.dev_dependencies,
            &manifest.build_dependencies,
        ];
        let Some((key, spec)) = tables
            .iter()
            .flat_map(|table| table.iter())
            .find(|(key, spec)| crate_ident(&renamed_from(key, spec)) == name || crate_ident(key) == name)
        else {
            return Ok(None);
        };

        let detail = match spec {
            DependencySpec::Version(_) => DependencyDetail::default(),
            DependencySpec::Detailed(detail) => detail.clone(),
        };

        if detail.workspace {
            let root = workspace_root.ok_or_else(|| GenError::PackageNotFound {
                package: name.to_string(),
                reason: format!("{key} inherits from a workspace that was not found"),
            })?;
            let workspace = read_manifest(&root.join(MANIFEST))?.workspace.unwrap_or_default();
            let inherited = workspace.dependencies.get(key.as_str());
            return Ok(Some(ResolvedDependency {
                package: inherited.map_or_else(|| key.clone(), |spec| renamed_from(key, spec)),
                path: inherited.and_then(spec_path).map(|path| root.join(path)),
            }));
        }

        Ok(Some(ResolvedDependency {
            package: renamed_from(key, spec),
            path: detail.path.map(|path| self.manifest_dir.join(path)),
        }))
    }

    /// Nearest ancestor directory (the crate's own included) with a `[workspace]`.
    fn workspace_root(&self) -> GenResult<Option<PathBuf>> {
        let mut dir = Some(self.manifest_dir.as_path());
        while let Some(candidate) = dir {
            let manifest = candidate.join(MANIFEST);
            if manifest.is_file() && read_manifest(&manifest)?.workspace.is_some() {
                return Ok(Some(candidate.to_path_buf()));
            }
            dir = candidate.parent();
        }
        Ok(None)
    }

    fn sysroot(&self) -> GenResult<PathBuf> {
        if let Some(sysroot) = &self.sysroot {
            return Ok(sysroot.clone());
        }
        let output = std::process::Command::new("rustc")
            .args(["--print", "sysroot"])
            .output()
            .map_err(|e| GenError::io("rustc", e))?;
        if !output.status.success() {
            return Err(GenError::PackageNotFound {
                package: "std".to_string(),
                reason: "`rustc --print sysroot` failed".to_string(),
            });
        }
        Ok(PathBuf::from(String::from_utf8_lossy(&output.stdout).trim()))
    }

    fn cargo_home(&self) -> GenResult<PathBuf> {
        if let Some(home) = &self.cargo_home {
            return Ok(home.clone());
        }
        if let Some(home) = std::env::var_os("CARGO_HOME") {
            return Ok(PathBuf::from(home));
        }
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".cargo"))
            .ok_or_else(|| GenError::Config("neither CARGO_HOME nor HOME is set".to_string()))
    }
}

/// Crate names use `_` in code and may use `-` in manifests.
fn crate_ident(name: &str) -> String {
    name.replace('-', "_")
}

fn renamed_from(key: &str, spec: &DependencySpec) -> String {
    match spec {
        DependencySpec::Detailed(DependencyDetail {
            package: Some(package), ..
        }) => package.clone(),
        _ => key.to_string(),
    }
}

fn spec_path(spec: &DependencySpec) -> Option<&PathBuf> {
    match spec {
        DependencySpec::Detailed(detail) => detail.path.as_ref(),
        DependencySpec::Version(_) => None,
    }
}

fn existing(dir: PathBuf) -> Option<PathBuf> {
    dir.is_dir().then_some(dir)
}

/// Directory holding the library root, `src` unless `[lib] path` says otherwise.
fn lib_dir(crate_dir: &Path, manifest: &Manifest) -> PathBuf {
    manifest
        .lib
        .as_ref()
        .and_then(|lib| lib.path.as_ref())
        .and_then(|path| crate_dir.join(path).parent().map(Path::to_path_buf))
        .unwrap_or_else(|| crate_dir.join("src"))
}

/// Module segments of a file path relative to `src/`.
pub(crate) fn module_segments(relative: &Path) -> Vec<String> {
    let mut segments: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    if let Some(file) = segments.pop() {
        match file.strip_suffix(".rs") {
            Some("lib" | "main" | "mod") | None => {}
            Some(stem) => segments.push(stem.to_string()),
        }
    }
    segments
}

fn locked_version(root: &Path, package: &str) -> GenResult<Option<String>> {
    let path = root.join(LOCK_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path).map_err(|e| GenError::io(&path, e))?;
    let lock: LockFile = toml::from_str(&content).map_err(|source| GenError::Toml {
        path: path.clone(),
        source,
    })?;
    Ok(lock
        .package
        .into_iter()
        .find(|locked| crate_ident(&locked.name) == crate_ident(package))
        .map(|locked| locked.version))
}

fn read_manifest(path: &Path) -> GenResult<Manifest> {
    let content = std::fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
    toml::from_str(&content).map_err(|source| GenError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "locate/locate_tests.rs"]
mod locate_tests;
