//! Integration layer
//!
//! - [`manager`]: `IntegrationManager` driving catalog, discovery, manifest and Gradle changes
//! - [`auto_update`]: update-check throttle and compatibility report

pub mod auto_update;
pub mod manager;

pub use auto_update::{UpdateCheckState, UpdateReport};
pub use manager::{IntegrationError, IntegrationManager, QualityServiceOutcome};
