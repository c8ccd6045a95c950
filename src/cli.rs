//! Command line arguments

use std::path::PathBuf;

use shaderpack_config::{CONFIG_FILE_NAME, Config, ConfigError};

pub const USAGE: &str = "\
Usage: shaderpack [OPTIONS]

Options:
  -c, --config <FILE>     Config file (default: shaderpack.toml)
      --strict            Fail when package info is degraded or unwritten
      --skip-package-info Do not render package info
      --skip-shaders      Do not bundle shaders
  -v, --verbose           Debug logging
  -h, --help              Print help
  -V, --version           Print version";

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config: PathBuf,
    /// `--config` was given, so the file must exist
    pub config_explicit: bool,
    pub strict: bool,
    pub skip_package_info: bool,
    pub skip_shaders: bool,
    pub verbose: bool,
    pub help: bool,
    pub version: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            config: PathBuf::from(CONFIG_FILE_NAME),
            config_explicit: false,
            strict: false,
            skip_package_info: false,
            skip_shaders: false,
            verbose: false,
            help: false,
            version: false,
        }
    }
}

impl CliArgs {
    /// Parse arguments, excluding the program name
    pub fn parse<I, S>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = Self::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-c" | "--config" => {
                    let value = args
                        .next()
                        .ok_or_else(|| format!("{arg} requires a value"))?;
                    parsed.config = PathBuf::from(value);
                    parsed.config_explicit = true;
                }
                "--strict" => parsed.strict = true,
                "--skip-package-info" => parsed.skip_package_info = true,
                "--skip-shaders" => parsed.skip_shaders = true,
                "-v" | "--verbose" => parsed.verbose = true,
                "-h" | "--help" => parsed.help = true,
                "-V" | "--version" => parsed.version = true,
                other => {
                    if let Some(value) = other.strip_prefix("--config=") {
                        parsed.config = PathBuf::from(value);
                        parsed.config_explicit = true;
                    } else {
                        return Err(format!("unexpected argument '{other}'"));
                    }
                }
            }
        }

        Ok(parsed)
    }

    /// Load the selected config file with paths resolved against its directory
    ///
    /// Only the implicit `shaderpack.toml` may be missing; an explicit
    /// `--config` path that does not exist is an error.
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let config = if self.config_explicit {
            Config::load_from(&self.config)?
        } else {
            Config::load_or_default(&self.config)?
        };

        Ok(match self.config.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(base_dir) => config.resolve_paths(base_dir),
            None => config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let args = CliArgs::parse(Vec::<String>::new()).unwrap();
        assert_eq!(args, CliArgs::default());
        assert_eq!(args.config, PathBuf::from("shaderpack.toml"));
    }

    #[test]
    fn test_flags() {
        let args = CliArgs::parse(["--strict", "--skip-shaders", "-v", "-c", "build/sp.toml"]).unwrap();
        assert!(args.strict);
        assert!(args.skip_shaders);
        assert!(!args.skip_package_info);
        assert!(args.verbose);
        assert!(args.config_explicit);
        assert_eq!(args.config, PathBuf::from("build/sp.toml"));
    }

    #[test]
    fn test_config_equals_form() {
        let args = CliArgs::parse(["--config=other.toml"]).unwrap();
        assert_eq!(args.config, PathBuf::from("other.toml"));
        assert!(args.config_explicit);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("build/typo.toml");
        let args = CliArgs::parse(["--config".to_string(), missing.display().to_string()]).unwrap();
        assert!(matches!(args.load_config(), Err(ConfigError::ReadError(path, _)) if path == missing));
    }

    #[test]
    fn test_missing_implicit_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let args = CliArgs {
            config: dir.path().join(CONFIG_FILE_NAME),
            ..CliArgs::default()
        };
        let config = args.load_config().unwrap();
        assert!(config.shaders.enabled);
        assert_eq!(config.shaders.directory, dir.path().join("shaders"));
    }

    #[test]
    fn test_explicit_config_is_loaded_and_resolved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sp.toml");
        std::fs::write(&path, "[shaders]\ndirectory = \"glsl\"\n").unwrap();
        let args = CliArgs::parse(["-c".to_string(), path.display().to_string()]).unwrap();
        let config = args.load_config().unwrap();
        assert_eq!(config.shaders.directory, dir.path().join("glsl"));
    }

    #[test]
    fn test_errors() {
        assert!(CliArgs::parse(["--config"]).is_err());
        assert!(CliArgs::parse(["--bogus"]).is_err());
    }
}
