//! shaderpack - build-time asset code generation
//!
//! The implementation lives in:
//! - `shaderpack-core` - Directory scanning, sanitization, bundling, templates
//! - `shaderpack-config` - `shaderpack.toml` and build metadata
//!
//! This crate wires them into the `shaderpack` command:
//! ```sh
//! shaderpack --config shaderpack.toml
//! ```

pub mod cli;
pub mod pipeline;

pub use cli::CliArgs;
pub use pipeline::{PackageInfoStage, Pipeline, PipelineReport};
