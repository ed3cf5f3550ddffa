//! Android Gradle build file handling
//!
//! - [`patcher`]: brace-depth line patcher for build scripts
//! - [`quality_service`]: the ad-review Gradle plugin applied through the patcher
//! - [`properties`]: `gradle.properties`, wrapper URL and Android Gradle plugin version
//! - [`error`]: patch errors

pub mod error;
pub mod patcher;
pub mod properties;
pub mod quality_service;

pub use error::PatchError;
pub use patcher::{BuildScriptDocument, RemovalSummary, replace_line_in_file};
pub use quality_service::QualityServicePlugin;
