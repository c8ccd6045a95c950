//! shaderpack - render package info and bundle shaders before the main build

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use env_logger::Env;

use shaderpack::cli::{CliArgs, USAGE};
use shaderpack::{PackageInfoStage, Pipeline};

fn main() -> ExitCode {
    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    if args.help {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }
    if args.version {
        println!("shaderpack {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> anyhow::Result<()> {
    let mut config = args
        .load_config()
        .with_context(|| format!("loading {:?}", args.config))?;

    config.general.strict |= args.strict;
    if args.skip_package_info {
        config.package_info.enabled = false;
    }
    if args.skip_shaders {
        config.shaders.enabled = false;
    }

    let report = Pipeline::new(config).run()?;

    match &report.package_info {
        PackageInfoStage::Rendered(r) if r.degraded => {
            log::warn!("Package info written from an empty template: {}", display(&r.output));
        }
        PackageInfoStage::Failed(e) => log::warn!("Package info not written: {}", e),
        _ => {}
    }
    if let Some(shaders) = &report.shaders {
        log::info!(
            "{} shaders, {} bytes -> {}",
            shaders.shader_count,
            shaders.bytes_written,
            display(&shaders.output)
        );
    }

    Ok(())
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
