//! Network package operations on the dependency manifest

use tracing::{debug, warn};

use crate::manifest::document::DependencyManifest;
use crate::version::types::{Network, PluginData};

/// Package name of the host SDK plugin
pub const SDK_PACKAGE_NAME: &str = "com.applovin.mediation.ads";

pub const APPLOVIN_REGISTRY_NAME: &str = "AppLovin MAX Unity";
pub const APPLOVIN_REGISTRY_URL: &str = "https://unity.packages.applovin.com/";
pub const APPLOVIN_REGISTRY_SCOPES: [&str; 3] = [
    "com.applovin.mediation.ads",
    "com.applovin.mediation.adapters",
    "com.applovin.mediation.dsp",
];

pub const OPEN_UPM_REGISTRY_NAME: &str = "package.openupm.com";
pub const OPEN_UPM_REGISTRY_URL: &str = "https://package.openupm.com";
pub const OPEN_UPM_REGISTRY_SCOPES: [&str; 1] = ["com.google.external-dependency-manager"];

/// Declare every package of `network`, dropping any beta variant of each
pub fn add_network_packages(network: &Network, manifest: &mut DependencyManifest) {
    for package in &network.packages {
        manifest.add_dependency(&package.name, &package.version);
        if manifest.remove_beta_variant(&package.name) {
            debug!("Removed beta variant of {}", package.name);
        }
    }
}

/// Remove every package of `network` together with its beta variant
pub fn remove_network_packages(network: &Network, manifest: &mut DependencyManifest) {
    for package in &network.packages {
        manifest.remove_dependency(&package.name);
        manifest.remove_beta_variant(&package.name);
    }
}

/// Declare the packages of every installed adapter network.
///
/// Returns the names of the migrated networks.
pub fn migrate_adapters(plugin_data: &PluginData, manifest: &mut DependencyManifest) -> Vec<String> {
    plugin_data
        .adapters()
        .filter(|network| network.is_installed())
        .map(|network| {
            add_network_packages(network, manifest);
            network.name.clone()
        })
        .collect()
}

/// Add the package registries and the SDK package at its latest version
pub fn migrate_plugin(plugin_data: &PluginData, manifest: &mut DependencyManifest) {
    manifest.add_or_update_registry(
        APPLOVIN_REGISTRY_NAME,
        APPLOVIN_REGISTRY_URL,
        &APPLOVIN_REGISTRY_SCOPES,
    );
    manifest.add_or_update_registry(
        OPEN_UPM_REGISTRY_NAME,
        OPEN_UPM_REGISTRY_URL,
        &OPEN_UPM_REGISTRY_SCOPES,
    );

    match plugin_data.sdk.latest_versions.unity.as_deref() {
        Some(version) if !version.is_empty() => manifest.add_dependency(SDK_PACKAGE_NAME, version),
        _ => warn!("Catalog has no latest plugin version; {} not added", SDK_PACKAGE_NAME),
    }
}
