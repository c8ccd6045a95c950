//! Build metadata provider
//!
//! Package name and version come from the project manifest (`package.json` or
//! `Cargo.toml`), branch and short revision from git unless overridden in the
//! config, and the date from the system clock (UTC).

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{NaiveDate, Utc};
use shaderpack_core::PlaceholderBindings;

use crate::PackageInfoConfig;

/// Values substituted into package info templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMetadata {
    pub pkg_name: String,
    pub pkg_version: String,
    pub git_branch: String,
    pub git_revision: String,
    pub date: NaiveDate,
}

impl BuildMetadata {
    /// Gather metadata for the configured manifest
    pub fn collect(config: &PackageInfoConfig) -> Result<Self, MetadataError> {
        let (pkg_name, pkg_version) = read_manifest(&config.manifest)?;

        let repo_dir = config
            .manifest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        let git_branch = match &config.git_branch {
            Some(branch) => branch.clone(),
            None => git_output(repo_dir, &["rev-parse", "--abbrev-ref", "HEAD"])?,
        };
        let git_revision = match &config.git_revision {
            Some(revision) => revision.clone(),
            None => git_output(repo_dir, &["rev-parse", "--short", "HEAD"])?,
        };

        let metadata = Self {
            pkg_name,
            pkg_version,
            git_branch,
            git_revision,
            date: Utc::now().date_naive(),
        };
        log::debug!("Collected build metadata: {:?}", metadata);
        Ok(metadata)
    }

    /// The standard placeholder bindings for this metadata
    pub fn bindings(&self) -> PlaceholderBindings {
        PlaceholderBindings::standard(
            self.pkg_name.clone(),
            self.date.format("%Y-%m-%d").to_string(),
            self.git_branch.clone(),
            self.pkg_version.clone(),
            self.git_revision.clone(),
        )
    }
}

/// Read `(name, version)` from a manifest
///
/// `.toml` files are read as Cargo manifests (`[package]` table), anything
/// else as `package.json`.
pub fn read_manifest(path: &Path) -> Result<(String, String), MetadataError> {
    let content = fs::read_to_string(path)
        .map_err(|e| MetadataError::ManifestRead(path.to_path_buf(), e))?;

    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    if is_toml {
        let value: toml::Value = toml::from_str(&content)
            .map_err(|e| MetadataError::ManifestParse(path.to_path_buf(), e.to_string()))?;
        let package = value.get("package");
        let field = |key: &'static str| {
            package
                .and_then(|p| p.get(key))
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| MetadataError::MissingField(path.to_path_buf(), key))
        };
        Ok((field("name")?, field("version")?))
    } else {
        let value: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| MetadataError::ManifestParse(path.to_path_buf(), e.to_string()))?;
        let field = |key: &'static str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| MetadataError::MissingField(path.to_path_buf(), key))
        };
        Ok((field("name")?, field("version")?))
    }
}

/// Run a git command in `dir` and return its trimmed stdout
fn git_output(dir: &Path, args: &[&str]) -> Result<String, MetadataError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| MetadataError::Git(format!("failed to run git: {}", e)))?;

    if !output.status.success() {
        return Err(MetadataError::Git(format!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Metadata collection errors
#[derive(Debug)]
pub enum MetadataError {
    /// Failed to read the manifest
    ManifestRead(PathBuf, std::io::Error),
    /// Manifest is not valid JSON/TOML
    ManifestParse(PathBuf, String),
    /// Manifest lacks a string field
    MissingField(PathBuf, &'static str),
    /// git could not be run or returned an error
    Git(String),
}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataError::ManifestRead(path, e) => write!(f, "Failed to read {:?}: {}", path, e),
            MetadataError::ManifestParse(path, e) => write!(f, "Failed to parse {:?}: {}", path, e),
            MetadataError::MissingField(path, key) => {
                write!(f, "Manifest {:?} has no string field '{}'", path, key)
            }
            MetadataError::Git(e) => write!(f, "Git lookup failed: {}", e),
        }
    }
}

impl std::error::Error for MetadataError {}
