//! HTTP catalog implementation

use crate::version::catalog::CatalogSource;
use crate::version::error::CatalogError;
use crate::version::types::PluginData;
use tracing::{debug, warn};

/// Default base URL for the plugin catalog
pub const DEFAULT_BASE_URL: &str = "https://unity.applovin.com";

const PLUGIN_DATA_PATH: &str = "max/1.0/integration_manager_info";

/// Catalog implementation backed by the integration manager info endpoint
#[derive(Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    /// Creates a new HttpCatalog with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("mediation-manager")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for HttpCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl CatalogSource for HttpCatalog {
    async fn fetch_plugin_data(&self, plugin_version: &str) -> Result<PluginData, CatalogError> {
        let endpoint = format!("{}/{}", self.base_url, PLUGIN_DATA_PATH);
        let url = reqwest::Url::parse_with_params(&endpoint, &[("plugin_version", plugin_version)])
            .map_err(|e| CatalogError::InvalidUrl(format!("{endpoint}: {e}")))?;
        debug!("Fetching plugin data from {}", url);

        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(plugin_version.to_string()));
        }

        if !status.is_success() {
            warn!("Plugin catalog returned status {}: {}", status, url);
            return Err(CatalogError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse plugin catalog response: {}", e);
            CatalogError::InvalidResponse(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn fetch_plugin_data_returns_catalog() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/max/1.0/integration_manager_info")
            .match_query(Matcher::UrlEncoded(
                "plugin_version".into(),
                "8.0.0".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "AppLovinMax": {
                        "Name": "APPLOVIN_NETWORK",
                        "DisplayName": "AppLovin",
                        "LatestVersions": { "Unity": "8.0.1", "Android": "13.0.1", "Ios": "13.0.1" }
                    },
                    "MediatedNetworks": [{
                        "Name": "ADMOB_NETWORK",
                        "DisplayName": "AdMob",
                        "LatestVersions": { "Unity": "android_23.3.0.1_ios_11.9.0.1" },
                        "Packages": [{ "Name": "com.applovin.mediation.adapters.google.android", "Version": "23.3.0.1" }]
                    }],
                    "PartnerMicroSdks": []
                }"#,
            )
            .create_async()
            .await;

        let catalog = HttpCatalog::new(&server.url());
        let result = catalog.fetch_plugin_data("8.0.0").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.sdk.latest_versions.unity.as_deref(), Some("8.0.1"));
        assert_eq!(result.mediated_networks.len(), 1);
        assert_eq!(result.mediated_networks[0].name, "ADMOB_NETWORK");
    }

    #[tokio::test]
    async fn fetch_plugin_data_returns_not_found_for_unknown_version() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/max/1.0/integration_manager_info")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let catalog = HttpCatalog::new(&server.url());
        let result = catalog.fetch_plugin_data("0.0.1").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(CatalogError::NotFound(v)) if v == "0.0.1"));
    }

    #[tokio::test]
    async fn fetch_plugin_data_rejects_malformed_body() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/max/1.0/integration_manager_info")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json")
            .create_async()
            .await;

        let catalog = HttpCatalog::new(&server.url());
        let result = catalog.fetch_plugin_data("8.0.0").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(CatalogError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn fetch_plugin_data_encodes_plugin_version() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/max/1.0/integration_manager_info")
            .match_query(Matcher::UrlEncoded(
                "plugin_version".into(),
                "8.0.0 beta&1".into(),
            ))
            .with_status(404)
            .create_async()
            .await;

        let catalog = HttpCatalog::new(&format!("{}/", server.url()));
        let result = catalog.fetch_plugin_data("8.0.0 beta&1").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn fetch_plugin_data_rejects_invalid_base_url() {
        let catalog = HttpCatalog::new("not a url");

        let result = catalog.fetch_plugin_data("8.0.0").await;

        assert!(matches!(result, Err(CatalogError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn fetch_plugin_data_rejects_server_error() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/max/1.0/integration_manager_info")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let catalog = HttpCatalog::new(&server.url());
        let result = catalog.fetch_plugin_data("8.0.0").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(CatalogError::InvalidResponse(_))));
    }
}
