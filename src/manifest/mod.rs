//! Package manifest (`Packages/manifest.json`) handling
//!
//! - [`document`]: the JSON document model and its mutations
//! - [`packages`]: network package operations and plugin migration
//! - [`error`]: load/save errors

pub mod document;
pub mod error;
pub mod packages;

pub use document::{DependencyManifest, ScopedRegistry};
pub use error::ManifestError;
