//! shaderpack configuration
//!
//! Loads `shaderpack.toml` and collects the build metadata used to fill
//! package info templates. Every field has a default, so an empty or missing
//! file gives a working configuration.

pub mod metadata;

pub use metadata::{BuildMetadata, MetadataError};

use serde::{Deserialize, Serialize};
use shaderpack_core::ScanOptions;
use shaderpack_core::bundler::DEFAULT_EXTENSIONS;
use shaderpack_core::scanner::DEFAULT_MAX_DEPTH;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "shaderpack.toml";

/// General configuration section
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Treat a degraded or unwritten package info file as a build failure
    pub strict: bool,
}

/// Shader bundling section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadersConfig {
    /// Run the shader bundler
    pub enabled: bool,
    /// Root directory scanned for shaders
    pub directory: PathBuf,
    /// Generated module path
    pub output: PathBuf,
    /// File extensions treated as shaders
    pub extensions: Vec<String>,
    /// License header emitted at the top of the module
    pub license: String,
    /// File whose contents are used as the license header (overrides `license`)
    pub license_file: Option<PathBuf>,
    /// Descend into symlinked directories
    pub follow_symlinks: bool,
    /// Maximum directory nesting below `directory`
    pub max_depth: usize,
}

impl Default for ShadersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("shaders"),
            output: PathBuf::from("src/shaders/shaders_src.js"),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            license: String::new(),
            license_file: None,
            follow_symlinks: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ShadersConfig {
    /// Resolve the license header text
    pub fn license_text(&self) -> Result<String, ConfigError> {
        match &self.license_file {
            Some(path) => {
                let text =
                    fs::read_to_string(path).map_err(|e| ConfigError::ReadError(path.clone(), e))?;
                Ok(text.trim_end().to_string())
            }
            None => Ok(self.license.clone()),
        }
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            follow_symlinks: self.follow_symlinks,
            max_depth: self.max_depth,
        }
    }
}

/// Package info section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageInfoConfig {
    /// Run the package info renderer
    pub enabled: bool,
    /// Template containing `{{placeholder}}` tokens
    pub template: PathBuf,
    /// Rendered output path
    pub output: PathBuf,
    /// `package.json` or `Cargo.toml` providing name and version
    pub manifest: PathBuf,
    /// Branch name to use instead of asking git
    pub git_branch: Option<String>,
    /// Short revision to use instead of asking git
    pub git_revision: Option<String>,
}

impl Default for PackageInfoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            template: PathBuf::from("templates/package-info.tpl"),
            output: PathBuf::from("dist/package-info.txt"),
            manifest: PathBuf::from("package.json"),
            git_branch: None,
            git_revision: None,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub shaders: ShadersConfig,

    #[serde(default)]
    pub package_info: PackageInfoConfig,
}

impl Config {
    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("Config file {:?} not found, using defaults", path);
            return Ok(Config::default());
        }
        Self::load_from(path)
    }

    /// Make every relative path absolute against `base_dir`
    ///
    /// `base_dir` is normally the directory holding the config file.
    pub fn resolve_paths(mut self, base_dir: &Path) -> Self {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base_dir.join(&*p);
            }
        };

        resolve(&mut self.shaders.directory);
        resolve(&mut self.shaders.output);
        if let Some(license_file) = self.shaders.license_file.as_mut() {
            resolve(license_file);
        }
        resolve(&mut self.package_info.template);
        resolve(&mut self.package_info.output);
        resolve(&mut self.package_info.manifest);
        self
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read a file
    ReadError(PathBuf, std::io::Error),
    /// Failed to parse config file
    ParseError(PathBuf, toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => write!(f, "Failed to read {:?}: {}", path, e),
            ConfigError::ParseError(path, e) => write!(f, "Failed to parse {:?}: {}", path, e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError(_, e) => Some(e),
            ConfigError::ParseError(_, e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.general.strict);
        assert!(config.shaders.enabled);
        assert_eq!(config.shaders.directory, PathBuf::from("shaders"));
        assert_eq!(config.shaders.extensions, vec!["frag", "vert", "glsl", "gl"]);
        assert_eq!(config.shaders.max_depth, 64);
        assert!(config.package_info.enabled);
        assert_eq!(config.package_info.manifest, PathBuf::from("package.json"));
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.shaders.output, config.shaders.output);
        assert_eq!(parsed.package_info.template, config.package_info.template);
    }

    #[test]
    fn test_partial_config() {
        let partial = r#"
            [shaders]
            directory = "assets/glsl"
            extensions = ["wgsl"]

            [package_info]
            git_branch = "release"
        "#;
        let config: Config = toml::from_str(partial).unwrap();
        assert_eq!(config.shaders.directory, PathBuf::from("assets/glsl"));
        assert_eq!(config.shaders.extensions, vec!["wgsl"]);
        // Other fields should have defaults
        assert!(config.shaders.follow_symlinks);
        assert_eq!(config.package_info.git_branch.as_deref(), Some("release"));
        assert!(config.package_info.git_revision.is_none());
    }

    #[test]
    fn test_resolve_paths() {
        let mut config = Config::default();
        config.package_info.output = PathBuf::from("/abs/out.txt");
        config.shaders.license_file = Some(PathBuf::from("LICENSE_HEADER"));

        let config = config.resolve_paths(Path::new("/project"));
        assert_eq!(config.shaders.directory, PathBuf::from("/project/shaders"));
        assert_eq!(
            config.shaders.license_file,
            Some(PathBuf::from("/project/LICENSE_HEADER"))
        );
        assert_eq!(config.package_info.output, PathBuf::from("/abs/out.txt"));
    }

    #[test]
    fn test_license_text() {
        let dir = TempDir::new().unwrap();
        let mut shaders = ShadersConfig {
            license: "/* inline */".to_string(),
            ..ShadersConfig::default()
        };
        assert_eq!(shaders.license_text().unwrap(), "/* inline */");

        let license_path = dir.path().join("HEADER");
        fs::write(&license_path, "/* from file */\n\n").unwrap();
        shaders.license_file = Some(license_path);
        assert_eq!(shaders.license_text().unwrap(), "/* from file */");

        shaders.license_file = Some(dir.path().join("missing"));
        assert!(matches!(shaders.license_text(), Err(ConfigError::ReadError(..))));
    }

    #[test]
    fn test_load_or_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let config = Config::load_or_default(&path).unwrap();
        assert!(config.shaders.enabled);

        fs::write(&path, "[general]\nstrict = true\n").unwrap();
        let config = Config::load_or_default(&path).unwrap();
        assert!(config.general.strict);

        fs::write(&path, "[general\nstrict = ").unwrap();
        assert!(matches!(
            Config::load_or_default(&path),
            Err(ConfigError::ParseError(..))
        ));
    }
}
