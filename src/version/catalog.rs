//! Catalog trait for fetching the published plugin data

#[cfg(test)]
use mockall::automock;

use crate::version::error::CatalogError;
use crate::version::types::PluginData;

/// Trait for fetching the remote plugin catalog
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetches the catalog published for the given host plugin version
    ///
    /// # Arguments
    /// * `plugin_version` - Version of the installed host plugin (e.g., "8.0.0")
    ///
    /// # Returns
    /// * `Ok(PluginData)` - Latest versions and packages for the SDK and every network
    /// * `Err(CatalogError)` - If the fetch fails
    async fn fetch_plugin_data(&self, plugin_version: &str) -> Result<PluginData, CatalogError>;
}
