//! Sequential generation pipeline
//!
//! Runs the package info renderer, then the shader bundler. Each stage
//! finishes its write before returning a report, and the reports are handed
//! back to the caller together.

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};

use shaderpack_config::{BuildMetadata, Config};
use shaderpack_core::{BundleOptions, BundleReport, RenderReport, bundle_shaders, write_package_info};

/// What happened to the package info stage
#[derive(Debug)]
pub enum PackageInfoStage {
    /// Disabled in config or on the command line
    Skipped,
    /// File written (possibly from an empty template, see `degraded`)
    Rendered(RenderReport),
    /// Write failed; tolerated outside strict mode
    Failed(String),
}

/// Reports from a full run
#[derive(Debug)]
pub struct PipelineReport {
    pub package_info: PackageInfoStage,
    pub shaders: Option<BundleReport>,
}

pub struct Pipeline {
    config: Config,
    metadata: Option<BuildMetadata>,
    date: NaiveDate,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            metadata: None,
            date: Utc::now().date_naive(),
        }
    }

    /// Use fixed metadata instead of reading the manifest and git
    pub fn with_metadata(mut self, metadata: BuildMetadata) -> Self {
        self.date = metadata.date;
        self.metadata = Some(metadata);
        self
    }

    pub fn run(&self) -> Result<PipelineReport> {
        let package_info = self.render_package_info()?;
        let shaders = self.bundle_shaders()?;
        Ok(PipelineReport {
            package_info,
            shaders,
        })
    }

    fn render_package_info(&self) -> Result<PackageInfoStage> {
        let section = &self.config.package_info;
        if !section.enabled {
            log::info!("Package info rendering disabled");
            return Ok(PackageInfoStage::Skipped);
        }

        let metadata = match &self.metadata {
            Some(metadata) => metadata.clone(),
            None => BuildMetadata::collect(section).context("collecting build metadata")?,
        };

        match write_package_info(&section.template, &section.output, &metadata.bindings()) {
            Ok(report) => {
                if report.degraded && self.config.general.strict {
                    bail!(
                        "package info template {:?} could not be read: {}",
                        section.template,
                        report.template_error.as_deref().unwrap_or("unknown error")
                    );
                }
                Ok(PackageInfoStage::Rendered(report))
            }
            Err(e) if !self.config.general.strict => {
                log::error!("{}", e);
                Ok(PackageInfoStage::Failed(e.to_string()))
            }
            Err(e) => Err(e).context("writing package info"),
        }
    }

    fn bundle_shaders(&self) -> Result<Option<BundleReport>> {
        let section = &self.config.shaders;
        if !section.enabled {
            log::info!("Shader bundling disabled");
            return Ok(None);
        }

        let license = section.license_text().context("loading license header")?;
        let options = BundleOptions::new(&section.directory, &section.output)
            .with_license(license)
            .with_extensions(section.extensions.iter().cloned())
            .with_scan_options(section.scan_options());

        let report = bundle_shaders(&options, self.date)
            .with_context(|| format!("bundling shaders from {:?}", section.directory))?;
        Ok(Some(report))
    }
}
