//! Command implementations

use anyhow::{Context, Result, bail};
use schemabridge::{AnnotationExtractor, SETTINGS_FILE, Settings};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

const DEFAULT_OUTPUT: &str = "generated.rs";

/// Generate the translation layer for `source` and write it to `output`.
pub fn run(source: &Path, output: Option<PathBuf>, config: Option<PathBuf>) -> Result<()> {
    let settings = load_settings(config.as_deref(), source)?;
    let layer = AnnotationExtractor::new(&settings)
        .extract_file(source)
        .with_context(|| format!("Failed to extract translation layer from {}", source.display()))?;
    if layer.wrapped_type.is_none() {
        bail!("No {}: directives found in {}", settings.annotation_prefix(), source.display());
    }

    let code = layer.generate(&settings).context("Failed to generate code")?;
    let output = output.unwrap_or_else(|| default_output(source));
    write_atomically(&output, &code)?;

    info!(source = %source.display(), output = %output.display(), "generated translation layer");
    println!("Generated {}", output.display());
    Ok(())
}

/// Print the extracted translation layer as JSON.
pub fn describe(source: &Path, config: Option<PathBuf>) -> Result<()> {
    let settings = load_settings(config.as_deref(), source)?;
    let layer = AnnotationExtractor::new(&settings)
        .extract_file(source)
        .with_context(|| format!("Failed to extract translation layer from {}", source.display()))?;
    println!("{}", serde_json::to_string_pretty(&layer)?);
    Ok(())
}

/// List the directives found in `source`.
pub fn annotations(source: &Path, config: Option<PathBuf>) -> Result<()> {
    let settings = load_settings(config.as_deref(), source)?;
    let text = std::fs::read_to_string(source).with_context(|| format!("Failed to read {}", source.display()))?;
    let directives = AnnotationExtractor::new(&settings).directives(&text)?;
    if directives.is_empty() {
        println!("No directives found");
    }
    for directive in directives {
        println!("{directive}");
    }
    Ok(())
}

/// Validate a settings file.
pub fn check(config: Option<PathBuf>) -> Result<()> {
    let path = config.unwrap_or_else(|| PathBuf::from(SETTINGS_FILE));
    let settings =
        Settings::from_file(&path).with_context(|| format!("Failed to load settings: {}", path.display()))?;
    settings.validate()?;
    println!("✓ {} is valid", path.display());
    println!("  Generator: {}", settings.generator);
    println!("  External system: {}", settings.external_name);
    println!("  Strict annotations: {}", settings.strict_annotations);
    Ok(())
}

/// Settings from `config`, else the nearest settings file above `source`,
/// else the defaults.
fn load_settings(config: Option<&Path>, source: &Path) -> Result<Settings> {
    let path = match config {
        Some(path) => Some(path.to_path_buf()),
        None => find_settings(source),
    };
    let settings = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading settings");
            Settings::from_file(&path).with_context(|| format!("Failed to load settings: {}", path.display()))?
        }
        None => Settings::default(),
    };
    settings.validate()?;
    Ok(settings)
}

fn find_settings(source: &Path) -> Option<PathBuf> {
    source
        .ancestors()
        .skip(1)
        .map(|dir| dir.join(SETTINGS_FILE))
        .find(|candidate| candidate.is_file())
}

fn default_output(source: &Path) -> PathBuf {
    source.with_file_name(DEFAULT_OUTPUT)
}

/// Replace `path` with `contents` without leaving a partial file behind.
fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file =
        NamedTempFile::new_in(dir).with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    file.write_all(contents.as_bytes())?;
    file.persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
