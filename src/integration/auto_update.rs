//! Update-check throttle and the post-check report

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::persist::write_atomically;
use crate::version::checker::{
    ADMOB_NETWORK_NAME, GOOGLE_AD_MANAGER_NETWORK_NAME, GOOGLE_ANDROID_BREAKING_VERSION,
    GOOGLE_IOS_BREAKING_VERSION, google_adapters_compatible,
};
use crate::version::compare::VersionComparisonResult;
use crate::version::types::{Network, PluginData};

/// Persisted state of the periodic update check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateCheckState {
    pub last_check: Option<DateTime<Utc>>,
    /// Cleared when the user opts out of plugin update prompts
    pub auto_update_enabled: bool,
}

impl Default for UpdateCheckState {
    fn default() -> Self {
        Self {
            last_check: None,
            auto_update_enabled: true,
        }
    }
}

impl UpdateCheckState {
    /// Load the state; a missing or unreadable file starts from scratch
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!("Failed to read update state {:?}: {}", path, e);
                return Self::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Discarding corrupt update state {:?}: {}", path, e);
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        write_atomically(path, &content)
    }

    /// True when prompts are enabled and no check has run yet or at least
    /// `interval` has elapsed since the last one
    pub fn should_check(&self, now: DateTime<Utc>, interval: Duration) -> bool {
        if !self.auto_update_enabled {
            return false;
        }

        match self.last_check {
            Some(last_check) => now - last_check >= interval,
            None => true,
        }
    }

    pub fn record_check(&mut self, now: DateTime<Utc>) {
        self.last_check = Some(now);
    }
}

/// An installed adapter below its minimum supported version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterWarning {
    pub display_name: String,
    pub required_version: String,
}

/// Findings of an update check over refreshed plugin data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub plugin_update_available: bool,
    pub incompatible_adapters: Vec<AdapterWarning>,
    /// AdMob and Google Ad Manager adapters wrap SDKs on different sides of a breaking version
    pub google_adapters_mismatch: bool,
    /// AdMob and Google Ad Manager adapters are both installed but wrap different SDK versions
    pub google_sdk_versions_differ: bool,
}

impl UpdateReport {
    /// Build the report from plugin data whose current versions are already refreshed
    pub fn from_plugin_data(data: &PluginData, minimum_versions: &IndexMap<String, String>) -> Self {
        let plugin_update_available = data.sdk.is_installed()
            && data.sdk.comparison_result == VersionComparisonResult::Lesser;

        let incompatible_adapters = data
            .mediated_networks
            .iter()
            .filter(|network| network.requires_update)
            .map(|network| AdapterWarning {
                display_name: network.display_name.clone(),
                required_version: minimum_versions
                    .get(&network.name)
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect();

        let google = installed_google_adapters(data);
        Self {
            plugin_update_available,
            incompatible_adapters,
            google_adapters_mismatch: google.is_some_and(|(admob, gam)| {
                !google_adapters_compatible_on_both_platforms(admob, gam)
            }),
            google_sdk_versions_differ: google.is_some_and(|(admob, gam)| {
                !admob
                    .current_versions
                    .has_equal_sdk_versions(&gam.current_versions)
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.plugin_update_available
            && self.incompatible_adapters.is_empty()
            && !self.google_adapters_mismatch
            && !self.google_sdk_versions_differ
    }
}

fn installed_google_adapters(data: &PluginData) -> Option<(&Network, &Network)> {
    let find = |name: &str| {
        data.mediated_networks
            .iter()
            .find(|network| network.name == name && network.is_installed())
    };
    Some((find(ADMOB_NETWORK_NAME)?, find(GOOGLE_AD_MANAGER_NETWORK_NAME)?))
}

fn google_adapters_compatible_on_both_platforms(admob: &Network, gam: &Network) -> bool {
    let android_compatible = google_adapters_compatible(
        admob.current_versions.android.as_deref().unwrap_or_default(),
        gam.current_versions.android.as_deref().unwrap_or_default(),
        GOOGLE_ANDROID_BREAKING_VERSION,
    );
    let ios_compatible = google_adapters_compatible(
        admob.current_versions.ios.as_deref().unwrap_or_default(),
        gam.current_versions.ios.as_deref().unwrap_or_default(),
        GOOGLE_IOS_BREAKING_VERSION,
    );

    android_compatible && ios_compatible
}

impl fmt::Display for UpdateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "Everything is up to date.");
        }

        let mut sections = Vec::new();
        if self.plugin_update_available {
            sections.push("A new version of the AppLovin MAX plugin is available.".to_string());
        }
        if !self.incompatible_adapters.is_empty() {
            let mut section = String::from(
                "The following network adapters are not compatible with the current version of AppLovin MAX Plugin:\n",
            );
            for adapter in &self.incompatible_adapters {
                section.push_str(&format!(
                    "\n- {} (Requires {} or newer)",
                    adapter.display_name, adapter.required_version
                ));
            }
            section.push_str("\n\nPlease update them to the latest versions to avoid any issues.");
            sections.push(section);
        }
        if self.google_adapters_mismatch {
            sections.push(
                "AdMob and Google Ad Manager adapters are on different sides of a breaking Google SDK update; update both adapters together."
                    .to_string(),
            );
        } else if self.google_sdk_versions_differ {
            sections.push(
                "AdMob and Google Ad Manager share the same SDKs; use adapter versions whose first three numbers match."
                    .to_string(),
            );
        }

        write!(f, "{}", sections.join("\n\n"))
    }
}
