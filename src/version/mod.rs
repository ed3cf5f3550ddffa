//! Version layer for mediation network adapters
//!
//! This module provides version parsing and comparison, the catalog model,
//! and the classification of installed networks against the catalog.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Catalog   │────▶│    Types    │◀────│   Checker   │
//! │  (fetch)    │     │ (PluginData)│     │ (classify)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                       │
//!        ▼                                       ▼
//! ┌─────────────┐                         ┌─────────────┐
//! │  Catalogs   │                         │   Compare   │
//! │   (http)    │                         │(version cmp)│
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`value`]: `VersionValue` parsed from bare or platform-composite strings
//! - [`compare`]: Version comparison algorithms
//! - [`checker`]: Install/upgrade classification and minimum-version checks
//! - [`catalog`]: Catalog trait for fetching plugin data
//! - [`catalogs`]: Concrete catalog implementations
//! - [`error`]: Error types for catalog operations
//! - [`types`]: Catalog types like `PluginData` and `Network`

pub mod catalog;
pub mod catalogs;
pub mod checker;
pub mod compare;
pub mod error;
pub mod types;
pub mod value;
