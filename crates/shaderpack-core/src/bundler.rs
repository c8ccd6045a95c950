//! Shader bundling
//!
//! Collects shader files from a directory tree, sanitizes them and writes a
//! single ES module exposing two objects:
//! - `shaderNames`: symbolic name -> original file name
//! - `shadersrc`: file name -> sanitized source text

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

use crate::sanitize::sanitize;
use crate::scanner::{DirectoryScanner, ScanError, ScanOptions};

/// Extensions bundled when none are configured
pub const DEFAULT_EXTENSIONS: &[&str] = &["frag", "vert", "glsl", "gl"];

/// Exported name of the source mapping
pub const SOURCES_EXPORT: &str = "shadersrc";

/// Exported name of the name table
pub const NAMES_EXPORT: &str = "shaderNames";

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("no shader extensions configured")]
    NoExtensions,

    #[error("invalid extension filter: {0}")]
    InvalidFilter(#[from] regex::Error),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("failed to read shader {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

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

/// One bundled shader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderRecord {
    /// File name without its final extension
    pub name: String,
    /// File name including extension
    pub file_name: String,
    /// Where the shader was read from
    pub path: PathBuf,
    /// Sanitized source text
    pub source: String,
}

impl ShaderRecord {
    /// Read and sanitize a shader file
    pub fn load(path: &Path) -> Result<Self, BundleError> {
        let raw = fs::read_to_string(path).map_err(|source| BundleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_source(path, &raw))
    }

    /// Build a record from already loaded text
    pub fn from_source(path: &Path, raw: &str) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            name: symbolic_name(&file_name).to_string(),
            file_name,
            path: path.to_path_buf(),
            source: sanitize(raw),
        }
    }
}

/// Two files that mapped to the same symbolic name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollision {
    pub name: String,
    /// The file that now owns the name
    pub kept: PathBuf,
    /// The file it displaced
    pub replaced: PathBuf,
}

/// Ordered set of shaders keyed by symbolic name
///
/// Later records with an existing name replace the earlier one in place, so
/// the table keeps the position of the first occurrence and the contents of
/// the last.
#[derive(Debug, Clone, Default)]
pub struct ShaderBundle {
    records: Vec<ShaderRecord>,
    collisions: Vec<NameCollision>,
}

impl ShaderBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every path in order
    pub fn from_files(paths: &[PathBuf]) -> Result<Self, BundleError> {
        let mut bundle = Self::new();
        for path in paths {
            log::debug!("Bundling shader {:?}", path);
            bundle.insert(ShaderRecord::load(path)?);
        }
        Ok(bundle)
    }

    /// Add a record, returning the one it replaced
    pub fn insert(&mut self, record: ShaderRecord) -> Option<ShaderRecord> {
        match self.records.iter_mut().find(|r| r.name == record.name) {
            Some(existing) => {
                log::warn!(
                    "Shader name '{}' from {:?} replaces {:?}",
                    record.name,
                    record.path,
                    existing.path
                );
                self.collisions.push(NameCollision {
                    name: record.name.clone(),
                    kept: record.path.clone(),
                    replaced: existing.path.clone(),
                });
                Some(std::mem::replace(existing, record))
            }
            None => {
                self.records.push(record);
                None
            }
        }
    }

    pub fn records(&self) -> &[ShaderRecord] {
        &self.records
    }

    pub fn get(&self, name: &str) -> Option<&ShaderRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn collisions(&self) -> &[NameCollision] {
        &self.collisions
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Render the generated module text
    pub fn render(&self, license: &str, date: NaiveDate) -> String {
        let mut text = String::new();

        // Writing into a String cannot fail
        let _ = write!(text, "{license}\n\n");
        let _ = write!(
            text,
            "// shader source file automatically built on {}\n\n",
            date.format("%Y-%m-%d")
        );
        let _ = write!(text, "const {SOURCES_EXPORT} = {{}};\n\n");

        let _ = writeln!(text, "const {NAMES_EXPORT} = {{");
        for record in &self.records {
            let _ = writeln!(
                text,
                "\t{}: '{}',",
                property_key(&record.name),
                escape_single_quoted(&record.file_name)
            );
        }
        text.push_str("};\n\n");

        for record in &self.records {
            let _ = write!(
                text,
                "{SOURCES_EXPORT}[{NAMES_EXPORT}{}] = `\n{}`;\n\n",
                property_access(&record.name),
                escape_template_literal(&record.source)
            );
        }

        let _ = writeln!(text, "export {{{SOURCES_EXPORT}, {NAMES_EXPORT}}};");
        text
    }
}

/// Inputs for one bundling run
#[derive(Debug, Clone)]
pub struct BundleOptions {
    pub shaders_dir: PathBuf,
    pub output: PathBuf,
    pub license: String,
    pub extensions: Vec<String>,
    pub scan: ScanOptions,
}

impl BundleOptions {
    pub fn new(shaders_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            shaders_dir: shaders_dir.into(),
            output: output.into(),
            license: String::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            scan: ScanOptions::default(),
        }
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_scan_options(mut self, scan: ScanOptions) -> Self {
        self.scan = scan;
        self
    }
}

/// Outcome of a bundling run
#[derive(Debug, Clone)]
pub struct BundleReport {
    pub output: PathBuf,
    pub shader_count: usize,
    pub collisions: Vec<NameCollision>,
    pub bytes_written: usize,
}

/// Build a filter matching paths that end in one of `extensions`
pub fn extension_filter<S: AsRef<str>>(extensions: &[S]) -> Result<Regex, BundleError> {
    if extensions.is_empty() {
        return Err(BundleError::NoExtensions);
    }
    let alternatives: Vec<String> = extensions
        .iter()
        .map(|e| regex::escape(e.as_ref().trim_start_matches('.')))
        .collect();
    Ok(Regex::new(&format!(r"\.({})$", alternatives.join("|")))?)
}

/// Scan, sanitize and write the shader module
pub fn bundle_shaders(options: &BundleOptions, date: NaiveDate) -> Result<BundleReport, BundleError> {
    let filter = extension_filter(&options.extensions)?;
    let files = DirectoryScanner::new(filter)
        .with_options(options.scan)
        .scan(&options.shaders_dir)?;

    let bundle = ShaderBundle::from_files(&files)?;
    let text = bundle.render(&options.license, date);

    if let Some(parent) = options.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| BundleError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&options.output, &text).map_err(|source| BundleError::Write {
        path: options.output.clone(),
        source,
    })?;

    log::info!(
        "Bundled {} shaders from {:?} into {:?}",
        bundle.len(),
        options.shaders_dir,
        options.output
    );

    Ok(BundleReport {
        output: options.output.clone(),
        shader_count: bundle.len(),
        collisions: bundle.collisions().to_vec(),
        bytes_written: text.len(),
    })
}

/// File name with its final extension removed
///
/// `blur.h.frag` gives `blur.h`, and a bare `.frag` gives an empty name.
pub fn symbolic_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) if dot + 1 < file_name.len() => &file_name[..dot],
        _ => file_name,
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("'{}'", escape_single_quoted(name))
    }
}

fn property_access(name: &str) -> String {
    if is_identifier(name) {
        format!(".{name}")
    } else {
        format!("['{}']", escape_single_quoted(name))
    }
}

fn escape_single_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for a backtick literal so the runtime value is unchanged
fn escape_template_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            _ => out.push(c),
        }
    }
    out
}
