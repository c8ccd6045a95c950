//! Package info rendering
//!
//! Substitutes `{{key}}` placeholders in a text template. Substitution is
//! literal, global and case-sensitive; tokens without a binding are left as
//! they are.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const PKG_NAME: &str = "pkg_name";
pub const DATE: &str = "date";
pub const GIT_BRANCH: &str = "git_branch";
pub const PKG_VERSION: &str = "pkg_version";
pub const GIT_MAIN: &str = "git_main";

#[derive(Error, Debug)]
pub enum PackageInfoError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Ordered placeholder key -> value mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderBindings {
    entries: Vec<(String, String)>,
}

impl PlaceholderBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// The five standard bindings in their substitution order
    pub fn standard(
        pkg_name: impl Into<String>,
        date: impl Into<String>,
        git_branch: impl Into<String>,
        pkg_version: impl Into<String>,
        git_main: impl Into<String>,
    ) -> Self {
        let mut bindings = Self::new();
        bindings.insert(PKG_NAME, pkg_name);
        bindings.insert(DATE, date);
        bindings.insert(GIT_BRANCH, git_branch);
        bindings.insert(PKG_VERSION, pkg_version);
        bindings.insert(GIT_MAIN, git_main);
        bindings
    }

    /// Bind `key`, replacing the value in place if it is already bound
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Replace every bound `{{key}}` token, one binding at a time in order
pub fn render_template(template: &str, bindings: &PlaceholderBindings) -> String {
    let mut text = template.to_string();
    for (key, value) in bindings.iter() {
        let token = format!("{{{{{key}}}}}");
        if text.contains(&token) {
            text = text.replace(&token, value);
        }
    }
    text
}

/// Outcome of a render
#[derive(Debug, Clone)]
pub struct RenderReport {
    pub output: PathBuf,
    /// The template could not be read and an empty one was used
    pub degraded: bool,
    /// Why the template could not be read
    pub template_error: Option<String>,
    pub bytes_written: usize,
}

/// Render `template_path` into `output_path`
///
/// An unreadable template is logged and rendered as empty; the report is
/// flagged `degraded` so the caller can decide whether that is acceptable.
/// Write failures are returned.
pub fn write_package_info(
    template_path: &Path,
    output_path: &Path,
    bindings: &PlaceholderBindings,
) -> Result<RenderReport, PackageInfoError> {
    let (template, template_error) = match fs::read_to_string(template_path) {
        Ok(text) => (text, None),
        Err(e) => {
            log::error!("Failed to read template {:?}: {}", template_path, e);
            (String::new(), Some(e.to_string()))
        }
    };

    let text = render_template(&template, bindings);

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PackageInfoError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(output_path, &text).map_err(|source| PackageInfoError::Write {
        path: output_path.to_path_buf(),
        source,
    })?;

    log::info!("Wrote package info to {:?}", output_path);

    Ok(RenderReport {
        output: output_path.to_path_buf(),
        degraded: template_error.is_some(),
        template_error,
        bytes_written: text.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn demo_bindings() -> PlaceholderBindings {
        PlaceholderBindings::standard("demo", "2024-03-09", "main", "1.2.3", "abc1234")
    }

    #[test]
    fn test_render_basic() {
        let mut bindings = PlaceholderBindings::new();
        bindings.insert("pkg_name", "demo");
        bindings.insert("pkg_version", "1.2.3");
        assert_eq!(render_template("{{pkg_name}} v{{pkg_version}}", &bindings), "demo v1.2.3");
    }

    #[test]
    fn test_render_all_standard_tokens() {
        let template = "{{pkg_name}} {{pkg_version}} built {{date}} from {{git_branch}}@{{git_main}}";
        assert_eq!(
            render_template(template, &demo_bindings()),
            "demo 1.2.3 built 2024-03-09 from main@abc1234"
        );
    }

    #[test]
    fn test_render_is_global() {
        assert_eq!(
            render_template("{{pkg_name}}/{{pkg_name}}/{{pkg_name}}", &demo_bindings()),
            "demo/demo/demo"
        );
    }

    #[test]
    fn test_unknown_and_case_mismatch_pass_through() {
        assert_eq!(
            render_template("{{unknown}} {{PKG_NAME}} { {pkg_name} }", &demo_bindings()),
            "{{unknown}} {{PKG_NAME}} { {pkg_name} }"
        );
    }

    #[test]
    fn test_substitution_order() {
        // A value that contains a later token is expanded by that later binding
        let mut bindings = PlaceholderBindings::new();
        bindings.insert("pkg_name", "{{pkg_version}}");
        bindings.insert("pkg_version", "1.0");
        assert_eq!(render_template("{{pkg_name}}", &bindings), "1.0");
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut bindings = demo_bindings();
        bindings.insert(PKG_NAME, "renamed");
        assert_eq!(bindings.len(), 5);
        assert_eq!(bindings.get(PKG_NAME), Some("renamed"));
        assert_eq!(bindings.iter().next(), Some((PKG_NAME, "renamed")));
    }

    #[test]
    fn test_write_package_info() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("package-info.tpl");
        fs::write(&template, "name={{pkg_name}}\nversion={{pkg_version}}\n").unwrap();
        let output = dir.path().join("dist/package-info.txt");

        let report = write_package_info(&template, &output, &demo_bindings()).unwrap();
        assert!(!report.degraded);
        assert!(report.template_error.is_none());
        assert_eq!(fs::read_to_string(&output).unwrap(), "name=demo\nversion=1.2.3\n");
    }

    #[test]
    fn test_missing_template_degrades() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("package-info.txt");

        let report =
            write_package_info(&dir.path().join("missing.tpl"), &output, &demo_bindings()).unwrap();
        assert!(report.degraded);
        assert!(report.template_error.is_some());
        assert_eq!(report.bytes_written, 0);
        assert_eq!(fs::read_to_string(&output).unwrap(), "");
    }

    #[test]
    fn test_write_failure_is_returned() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("t.tpl");
        fs::write(&template, "x").unwrap();
        // The output path is an existing directory
        let err = write_package_info(&template, dir.path(), &demo_bindings()).unwrap_err();
        assert!(matches!(err, PackageInfoError::Write { .. }));
    }
}
