//! Catalog types shared by the resolver, the manifest layer and the CLI

use serde::{Deserialize, Serialize};

use crate::version::compare::{VersionComparisonResult, adapter_sdk_version};
use crate::version::value::VersionValue;

/// Network name of the host SDK plugin itself
pub const SDK_NETWORK_NAME: &str = "APPLOVIN_NETWORK";

/// Remote plugin catalog snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PluginData {
    #[serde(rename = "AppLovinMax")]
    pub sdk: Network,
    #[serde(default)]
    pub mediated_networks: Vec<Network>,
    #[serde(default)]
    pub partner_micro_sdks: Vec<Network>,
}

impl PluginData {
    /// All adapter networks (mediated networks followed by partner micro SDKs)
    pub fn adapters(&self) -> impl Iterator<Item = &Network> {
        self.mediated_networks
            .iter()
            .chain(self.partner_micro_sdks.iter())
    }

    pub fn adapters_mut(&mut self) -> impl Iterator<Item = &mut Network> {
        self.mediated_networks
            .iter_mut()
            .chain(self.partner_micro_sdks.iter_mut())
    }

    pub fn find_network(&self, name: &str) -> Option<&Network> {
        std::iter::once(&self.sdk)
            .chain(self.adapters())
            .find(|network| network.name == name)
    }
}

/// A mediation network entry from the catalog.
///
/// `current_versions`, `comparison_result` and `requires_update` are not part
/// of the wire format; they are filled in when installed versions are rescanned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Network {
    pub name: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies_file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugin_file_paths: Vec<String>,
    #[serde(default)]
    pub latest_versions: Versions,
    #[serde(default)]
    pub packages: Vec<PackageInfo>,
    #[serde(skip)]
    pub current_versions: Versions,
    #[serde(skip, default = "default_comparison_result")]
    pub comparison_result: VersionComparisonResult,
    #[serde(skip)]
    pub requires_update: bool,
}

fn default_comparison_result() -> VersionComparisonResult {
    VersionComparisonResult::Lesser
}

impl Default for Network {
    fn default() -> Self {
        Self {
            name: String::new(),
            display_name: String::new(),
            download_url: None,
            dependencies_file_path: None,
            plugin_file_paths: Vec::new(),
            latest_versions: Versions::default(),
            packages: Vec::new(),
            current_versions: Versions::default(),
            comparison_result: default_comparison_result(),
            requires_update: false,
        }
    }
}

impl Network {
    pub fn is_sdk(&self) -> bool {
        self.name == SDK_NETWORK_NAME
    }

    pub fn is_installed(&self) -> bool {
        self.current_versions.is_installed()
    }
}

/// Per-platform version triple as published in the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Versions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub android: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ios: Option<String>,
}

impl Versions {
    /// Build versions from discovered platform versions, deriving the composite
    pub fn from_platforms(android: Option<String>, ios: Option<String>) -> Self {
        let composite = VersionValue::from_platforms(android.as_deref(), ios.as_deref());
        Self {
            unity: (!composite.is_empty()).then(|| composite.composite().to_string()),
            android,
            ios,
        }
    }

    pub fn unity_value(&self) -> VersionValue {
        VersionValue::parse(self.unity.as_deref().unwrap_or_default())
    }

    pub fn is_installed(&self) -> bool {
        self.unity.as_deref().is_some_and(|unity| !unity.is_empty())
    }

    /// Whether both platforms wrap the same SDK versions as `other`, ignoring adapter build numbers
    pub fn has_equal_sdk_versions(&self, other: &Versions) -> bool {
        fn sdk(version: &Option<String>) -> Option<&str> {
            version.as_deref().map(adapter_sdk_version)
        }

        sdk(&self.android) == sdk(&other.android) && sdk(&self.ios) == sdk(&other.ios)
    }
}

/// A package belonging to a network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plugin_data_deserializes_catalog_response() {
        let data: PluginData = serde_json::from_value(json!({
            "AppLovinMax": {
                "Name": "APPLOVIN_NETWORK",
                "DisplayName": "AppLovin",
                "LatestVersions": { "Unity": "8.0.0", "Android": "13.0.0", "Ios": "13.0.0" }
            },
            "MediatedNetworks": [{
                "Name": "VUNGLE_NETWORK",
                "DisplayName": "Liftoff Monetize",
                "DependenciesFilePath": "MaxSdk/Mediation/Vungle/Editor/Dependencies.xml",
                "LatestVersions": {
                    "Unity": "android_7.4.1.1_ios_7.4.1.1",
                    "Android": "7.4.1.1",
                    "Ios": "7.4.1.1"
                },
                "Packages": [
                    { "Name": "com.applovin.mediation.adapters.vungle.android", "Version": "7.4.1.1" },
                    { "Name": "com.applovin.mediation.adapters.vungle.ios", "Version": "7.4.1.1" }
                ]
            }]
        }))
        .unwrap();

        assert!(data.sdk.is_sdk());
        assert!(data.partner_micro_sdks.is_empty());

        let vungle = &data.mediated_networks[0];
        assert_eq!(vungle.display_name, "Liftoff Monetize");
        assert_eq!(
            vungle.latest_versions.unity.as_deref(),
            Some("android_7.4.1.1_ios_7.4.1.1")
        );
        assert_eq!(vungle.packages.len(), 2);
        assert_eq!(vungle.comparison_result, VersionComparisonResult::Lesser);
        assert!(!vungle.is_installed());
    }

    #[test]
    fn find_network_searches_sdk_and_adapters() {
        let data = PluginData {
            sdk: Network {
                name: SDK_NETWORK_NAME.to_string(),
                ..Default::default()
            },
            mediated_networks: vec![Network {
                name: "ADMOB_NETWORK".to_string(),
                ..Default::default()
            }],
            partner_micro_sdks: vec![Network {
                name: "PARTNER".to_string(),
                ..Default::default()
            }],
        };

        assert!(data.find_network(SDK_NETWORK_NAME).is_some());
        assert!(data.find_network("PARTNER").is_some());
        assert!(data.find_network("MISSING").is_none());
        assert_eq!(data.adapters().count(), 2);
    }

    #[test]
    fn versions_from_platforms_derives_unity_composite() {
        let versions = Versions::from_platforms(Some("1.2.3.4".into()), Some("5.6.7.8".into()));
        assert_eq!(
            versions.unity.as_deref(),
            Some("android_1.2.3.4_ios_5.6.7.8")
        );

        let empty = Versions::from_platforms(None, None);
        assert_eq!(empty.unity, None);
        assert!(!empty.is_installed());
    }

    #[test]
    fn has_equal_sdk_versions_ignores_adapter_build() {
        let installed = Versions::from_platforms(Some("23.3.0.1".into()), Some("11.9.0.1".into()));
        let same_sdk = Versions::from_platforms(Some("23.3.0.2".into()), Some("11.9.0.0".into()));
        let newer_sdk = Versions::from_platforms(Some("23.4.0.0".into()), Some("11.9.0.0".into()));

        assert!(installed.has_equal_sdk_versions(&same_sdk));
        assert!(!installed.has_equal_sdk_versions(&newer_sdk));
    }
}
