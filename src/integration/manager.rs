//! Integration manager
//!
//! Ties the catalog, installed-version discovery, the resolver, the package
//! manifest and the Gradle patchers together for one host project.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::IntegrationConfig;
use crate::gradle::error::PatchError;
use crate::gradle::patcher::RemovalSummary;
use crate::gradle::properties::{
    GradlePluginStyle, set_android_gradle_plugin_version, set_distribution_url,
    update_gradle_properties,
};
use crate::gradle::quality_service::QualityServicePlugin;
use crate::integration::auto_update::UpdateReport;
use crate::manifest::document::DependencyManifest;
use crate::manifest::error::ManifestError;
use crate::manifest::packages::{
    add_network_packages, migrate_adapters, migrate_plugin, remove_network_packages,
};
use crate::parser::dependencies_xml::DependenciesXmlParser;
use crate::version::catalog::CatalogSource;
use crate::version::checker::{NetworkStatus, is_adapter_installed, refresh_network};
use crate::version::error::CatalogError;
use crate::version::types::{Network, PluginData};

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Quality service API key is not configured")]
    MissingApiKey,
}

/// Outcome of applying the quality service settings to the Gradle files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityServiceOutcome {
    Applied,
    Removed(RemovalSummary),
    Skipped(String),
}

pub struct IntegrationManager {
    config: IntegrationConfig,
    catalog: Arc<dyn CatalogSource>,
    parser: DependenciesXmlParser,
    quality_service: QualityServicePlugin,
}

impl IntegrationManager {
    pub fn new(config: IntegrationConfig, catalog: Arc<dyn CatalogSource>) -> Self {
        Self {
            config,
            catalog,
            parser: DependenciesXmlParser::new(),
            quality_service: QualityServicePlugin::new(),
        }
    }

    pub fn config(&self) -> &IntegrationConfig {
        &self.config
    }

    /// Fetch the catalog and fill in the installed versions of every network
    pub async fn load_plugin_data(&self) -> Result<PluginData, IntegrationError> {
        let mut data = self
            .catalog
            .fetch_plugin_data(&self.config.plugin_version)
            .await
            .inspect_err(|e| error!("Failed to load plugin data: {}", e))?;

        self.refresh_current_versions(&mut data);
        Ok(data)
    }

    /// Rescan installed versions and recompute every network's status
    pub fn refresh_current_versions(&self, data: &mut PluginData) -> Vec<(String, NetworkStatus)> {
        let mut statuses = Vec::new();

        let sdk_status = self.refresh(&mut data.sdk);
        statuses.push((data.sdk.name.clone(), sdk_status));

        for network in data.adapters_mut() {
            let status = self.refresh(network);
            statuses.push((network.name.clone(), status));
        }

        statuses
    }

    fn refresh(&self, network: &mut Network) -> NetworkStatus {
        let paths: Vec<_> = network
            .dependencies_file_path
            .iter()
            .map(|path| self.config.assets_dir().join(path))
            .collect();
        let mut current = self.parser.read_versions(&paths);

        if network.is_sdk() && !self.config.plugin_version.is_empty() {
            current.unity = Some(self.config.plugin_version.clone());
        }

        let status = refresh_network(network, current, &self.config.minimum_versions);
        debug!(
            "{}: {:?} (requires update: {})",
            network.name, status.action, status.requires_update
        );
        status
    }

    /// Declare a network's packages in the manifest
    pub fn install_network(&self, data: &PluginData, name: &str) -> Result<(), IntegrationError> {
        let network = find_network(data, name)?;
        let path = self.config.manifest_path();

        let mut manifest = DependencyManifest::load(&path)?;
        add_network_packages(network, &mut manifest);
        manifest.save(&path)?;

        info!("Added {} to {:?}", network.display_name, path);
        Ok(())
    }

    /// Remove a network's packages from the manifest
    pub fn uninstall_network(&self, data: &PluginData, name: &str) -> Result<(), IntegrationError> {
        let network = find_network(data, name)?;
        let path = self.config.manifest_path();

        let mut manifest = DependencyManifest::load(&path)?;
        remove_network_packages(network, &mut manifest);
        manifest.save(&path)?;

        info!("Removed {} from {:?}", network.display_name, path);
        Ok(())
    }

    /// Move the plugin and every installed adapter to the package manager.
    ///
    /// Returns the names of the migrated adapters.
    pub fn migrate_to_package_manager(
        &self,
        data: &PluginData,
    ) -> Result<Vec<String>, IntegrationError> {
        let path = self.config.manifest_path();

        let mut manifest = DependencyManifest::load(&path)?;
        let migrated = migrate_adapters(data, &mut manifest);
        migrate_plugin(data, &mut manifest);
        manifest.save(&path)?;

        info!("Migrated plugin and {} adapters to {:?}", migrated.len(), path);
        Ok(migrated)
    }

    /// Whether an adapter is installed at or above the given per-platform minimums.
    ///
    /// Reads `MaxSdk/Mediation/<adapter>/Editor/Dependencies.xml` under the assets directory.
    pub fn is_adapter_installed(
        &self,
        adapter_name: &str,
        min_ios: Option<&str>,
        min_android: Option<&str>,
    ) -> bool {
        let path = self
            .config
            .assets_dir()
            .join("MaxSdk/Mediation")
            .join(adapter_name)
            .join("Editor/Dependencies.xml");
        let current = self.parser.read_versions(&[path]);

        let installed = is_adapter_installed(&current, min_ios, min_android);
        debug!("{} installed: {} ({:?})", adapter_name, installed, current.unity);
        installed
    }

    pub fn update_report(&self, data: &PluginData) -> UpdateReport {
        UpdateReport::from_plugin_data(data, &self.config.minimum_versions)
    }

    /// Add or remove the quality service plugin according to the config
    pub fn apply_quality_service(&self) -> Result<QualityServiceOutcome, IntegrationError> {
        let build_file = self.config.resolve(&self.config.gradle.build_file);

        if !self.config.quality_service.enabled {
            return match self.quality_service.remove_from_build_file(&build_file) {
                Ok(summary) => Ok(QualityServiceOutcome::Removed(summary)),
                Err(PatchError::NotFound(path)) => {
                    warn!("Couldn't find {:?}, nothing to remove", path);
                    Ok(QualityServiceOutcome::Skipped(format!(
                        "{} not found",
                        path.display()
                    )))
                }
                Err(e) => Err(e.into()),
            };
        }

        let api_key = self.config.api_key().ok_or(IntegrationError::MissingApiKey)?;

        if let Some(reason) = self.apply_quality_service_root()? {
            return Ok(QualityServiceOutcome::Skipped(reason));
        }

        match self.quality_service.add_to_build_file(
            &build_file,
            api_key,
            self.config.gradle.add_build_script_lines_to_build_file,
        ) {
            Ok(_) => Ok(QualityServiceOutcome::Applied),
            Err(PatchError::NotFound(path)) => {
                warn!(
                    "Couldn't find {:?}. Failed to add the quality service plugin",
                    path
                );
                Ok(QualityServiceOutcome::Skipped(format!(
                    "{} not found",
                    path.display()
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Root and settings file changes; returns a reason when the application file must be left alone
    fn apply_quality_service_root(&self) -> Result<Option<String>, IntegrationError> {
        let gradle = &self.config.gradle;
        let root_build_file = self.config.resolve(&gradle.root_build_file);

        match gradle.plugin_style {
            GradlePluginStyle::Classpath => {
                match self.quality_service.add_build_script_lines(&root_build_file) {
                    Ok(_) => Ok(None),
                    Err(PatchError::NotFound(path)) => {
                        warn!("Couldn't find root build file {:?}", path);
                        Ok(Some(format!("{} not found", path.display())))
                    }
                    Err(e) => Err(e.into()),
                }
            }
            GradlePluginStyle::PluginsBlock => {
                let settings_file = self.config.resolve(&gradle.settings_file);
                log_missing(
                    self.quality_service.add_to_root_plugins(&root_build_file),
                    &root_build_file,
                )?;
                log_missing(
                    self.quality_service.add_repository_to_settings(&settings_file),
                    &settings_file,
                )?;
                Ok(None)
            }
        }
    }

    /// Rewrite gradle.properties and apply the custom Gradle versions, if configured.
    ///
    /// A missing wrapper or root build file is logged and skipped.
    pub fn update_android_properties(&self) -> Result<(), IntegrationError> {
        let gradle = &self.config.gradle;

        if let Some(url) = gradle.custom_gradle_version_url.as_deref() {
            let wrapper = self.config.resolve(&gradle.wrapper_properties_file);
            log_missing(set_distribution_url(&wrapper, url), &wrapper)?;
        }

        if let Some(version) = gradle.custom_gradle_tools_version.as_deref() {
            let root_build_file = self.config.resolve(&gradle.root_build_file);
            log_missing(
                set_android_gradle_plugin_version(&root_build_file, version, gradle.plugin_style),
                &root_build_file,
            )?;
        }

        let properties = self.config.resolve(&gradle.properties_file);
        update_gradle_properties(&properties)?;
        info!("Updated Android properties in {:?}", properties);
        Ok(())
    }
}

fn find_network<'a>(data: &'a PluginData, name: &str) -> Result<&'a Network, IntegrationError> {
    data.find_network(name)
        .ok_or_else(|| IntegrationError::UnknownNetwork(name.to_string()))
}

fn log_missing(result: Result<bool, PatchError>, path: &Path) -> Result<(), PatchError> {
    match result {
        Ok(true) => {
            debug!("Patched {:?}", path);
            Ok(())
        }
        Ok(false) => Ok(()),
        Err(PatchError::NotFound(_)) => {
            warn!("Couldn't find {:?}, skipping", path);
            Ok(())
        }
        Err(e) => Err(e),
    }
}
