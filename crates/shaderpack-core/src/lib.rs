//! shaderpack core - build-time asset code generation
//!
//! This crate provides:
//! - Recursive, filtered directory scanning
//! - Shader sanitization (comment removal, whitespace squeezing)
//! - Shader bundling into a generated ES module
//! - `{{placeholder}}` template rendering for package metadata

pub mod bundler;
pub mod package_info;
pub mod sanitize;
pub mod scanner;

pub use bundler::{
    BundleError, BundleOptions, BundleReport, NameCollision, ShaderBundle, ShaderRecord,
    bundle_shaders, extension_filter,
};
pub use package_info::{
    PackageInfoError, PlaceholderBindings, RenderReport, render_template, write_package_info,
};
pub use sanitize::sanitize;
pub use scanner::{DirectoryScanner, ScanError, ScanOptions, files_in_directory};
