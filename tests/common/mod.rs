//! Common test utilities and harness
//!
//! Provides an isolated project directory with helpers for writing shader
//! trees, templates and manifests, plus a pipeline preconfigured for it.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use shaderpack::Pipeline;
use shaderpack_config::{BuildMetadata, Config};
use tempfile::TempDir;

/// Test environment with an isolated project directory
pub struct TestEnvironment {
    /// Temporary directory holding the project
    pub temp_dir: TempDir,
    /// Project root
    pub root: PathBuf,
}

impl TestEnvironment {
    /// Create a new isolated test environment
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();

        std::fs::create_dir_all(root.join("shaders")).expect("Failed to create shaders directory");

        Self { temp_dir, root }
    }

    /// Write a file relative to the project root, creating parent directories
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Write a shader under `shaders/`
    pub fn write_shader(&self, rel: &str, content: &str) -> PathBuf {
        self.write(&format!("shaders/{rel}"), content)
    }

    /// Write the package info template at its default location
    pub fn write_template(&self, content: &str) -> PathBuf {
        self.write("templates/package-info.tpl", content)
    }

    /// Read a file relative to the project root
    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.root.join(rel)).expect("Failed to read output file")
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Default config with every path resolved inside the project
    pub fn config(&self) -> Config {
        Config::default().resolve_paths(&self.root)
    }

    /// Pipeline with fixed metadata so no git repository is needed
    pub fn pipeline(&self, config: Config) -> Pipeline {
        Pipeline::new(config).with_metadata(fixed_metadata())
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

pub fn fixed_metadata() -> BuildMetadata {
    BuildMetadata {
        pkg_name: "demo".to_string(),
        pkg_version: "1.2.3".to_string(),
        git_branch: "main".to_string(),
        git_revision: "abc1234".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date"),
    }
}

/// Drop the generation-date line so two runs can be compared
pub fn without_date_line(text: &str) -> String {
    text.lines()
        .filter(|line| !line.starts_with("// shader source file automatically built on"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn relative<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}
