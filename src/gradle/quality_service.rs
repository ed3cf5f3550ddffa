//! Ad-review (quality service) Gradle plugin
//!
//! The application build file gets an `apply plugin:` line and an
//! `applovin { apiKey '...' }` block after `apply plugin: 'com.android.application'`.
//! The root build file gets the maven repository and the plugin classpath
//! inside `buildscript`, or an `id ... apply false` entry in `plugins { }`.
//! Newer projects declare the repository in `settings.gradle` under
//! `pluginManagement { repositories { } }`.

use std::path::Path;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::gradle::error::PatchError;
use crate::gradle::patcher::{
    BlockOutcome, BlockTemplate, BuildScriptDocument, ClosureInsertion, RemovalSummary,
    RemovalTemplate,
};

/// Indentation of lines placed inside `buildscript { repositories/dependencies { } }`
pub const BUILD_SCRIPT_LINE_INDENT: &str = "        ";

const PLUGIN_BLOCK: &str = "applovin {";
const API_KEY_LINE: &str = "    apiKey '{key}'";
const API_KEY_COMMENT: &str =
    "    // NOTE: DO NOT CHANGE - this is NOT your AppLovin MAX SDK key - this is a derived key.";
const APPLY_PLUGIN: &str = "apply plugin: 'applovin-quality-service'";
const MAVEN_REPO: &str = "maven { url 'https://artifacts.applovin.com/android'; content { includeGroupByRegex 'com.applovin.*' } }";
const CLASSPATH: &str = "classpath 'com.applovin.quality:AppLovinQualityServiceGradlePlugin:+'";
const ROOT_PLUGIN: &str = "    id 'com.applovin.quality' version '+' apply false // NOTE: Requires version 4.8.3+ for Gradle version 7.2+";

const BUILD_SCRIPT_MATCHER: &str = "buildscript";
const PLUGINS_MATCHER: &str = "plugins";
const PLUGIN_MANAGEMENT_MATCHER: &str = "pluginManagement";

const LEGACY_BINTRAY_REPO: &str = "https://applovin.bintray.com/Quality-Service";
const LEGACY_NO_REGEX_REPO: &str = "maven { url 'https://artifacts.applovin.com/android' }";
const LEGACY_CLASSPATH_V3: &str =
    "classpath 'com.applovin.quality:AppLovinQualityServiceGradlePlugin:3.+'";

const SAFEDK_BLOCK: &str = "safedk {";
const SAFEDK_REPO: &str = "http://download.safedk.com";
const SAFEDK_CLASSPATH: &str = "com.safedk:SafeDKGradlePlugin:";

/// Applies and removes the quality service plugin in Gradle build files
pub struct QualityServicePlugin {
    repositories_re: Regex,
    gradle_classpath_re: Regex,
    application_plugin_re: Regex,
    api_key_re: Regex,
    apply_plugin_re: Regex,
    safedk_apply_plugin_re: Regex,
}

impl QualityServicePlugin {
    pub fn new() -> Self {
        Self {
            repositories_re: Regex::new(r".*repositories.*").unwrap(),
            gradle_classpath_re: Regex::new(r".*classpath 'com.android.tools.build:gradle.*")
                .unwrap(),
            application_plugin_re: Regex::new(r".*apply plugin: 'com.android.application'.*")
                .unwrap(),
            api_key_re: Regex::new(r".*apiKey.*").unwrap(),
            apply_plugin_re: Regex::new(r".*apply plugin:.+?applovin-quality-service.*").unwrap(),
            safedk_apply_plugin_re: Regex::new(r".*apply plugin:.+?safedk.*").unwrap(),
        }
    }

    /// Add or update the plugin in the application build file.
    ///
    /// The legacy SafeDK plugin is stripped first and outdated repository or
    /// classpath lines are migrated. With `add_build_script_lines` the
    /// repository and classpath go into this file's `buildscript` closure too.
    /// Nothing is written on failure.
    pub fn add_to_build_file(
        &self,
        path: &Path,
        api_key: &str,
        add_build_script_lines: bool,
    ) -> Result<BlockOutcome, PatchError> {
        let mut document = BuildScriptDocument::read(path)?;
        let original = document.clone();

        let legacy = document.remove_block(&self.safedk_removal());
        if !legacy.is_empty() {
            info!("Removed legacy SafeDK plugin from {:?}", path);
        }
        self.migrate_legacy_lines(&mut document);

        let build_script = add_build_script_lines.then(|| self.build_script_insertion());
        let outcome = document.upsert_block(&self.plugin_block(api_key), build_script.as_ref())?;

        if document != original {
            document.write(path)?;
        }
        debug!("Quality service plugin {:?} in {:?}", outcome, path);
        Ok(outcome)
    }

    /// Add the repository and classpath to the `buildscript` closure of the root build file
    pub fn add_build_script_lines(&self, root_path: &Path) -> Result<bool, PatchError> {
        let mut document = BuildScriptDocument::read(root_path)?;
        let original = document.clone();
        self.migrate_legacy_lines(&mut document);

        document.insert_build_script_lines(&self.build_script_insertion())?;

        let changed = document != original;
        if changed {
            document.write(root_path)?;
        }
        Ok(changed)
    }

    /// Declare the plugin in the root build file's `plugins { }` closure
    pub fn add_to_root_plugins(&self, root_path: &Path) -> Result<bool, PatchError> {
        let mut document = BuildScriptDocument::read(root_path)?;

        let added = document.insert_before_closure_end(PLUGINS_MATCHER, ROOT_PLUGIN)?;
        if added {
            document.write(root_path)?;
        }
        Ok(added)
    }

    /// Add the maven repository to `pluginManagement { repositories { } }` in `settings.gradle`
    pub fn add_repository_to_settings(&self, settings_path: &Path) -> Result<bool, PatchError> {
        let mut document = BuildScriptDocument::read(settings_path)?;

        let added = document.insert_into_closure(
            PLUGIN_MANAGEMENT_MATCHER,
            &self.repositories_re,
            &build_script_line(MAVEN_REPO),
        )?;
        if added {
            document.write(settings_path)?;
        }
        Ok(added)
    }

    /// Remove the legacy SafeDK plugin and then the quality service plugin
    pub fn remove_from_build_file(&self, path: &Path) -> Result<RemovalSummary, PatchError> {
        let mut document = BuildScriptDocument::read(path)?;

        let legacy = document.remove_block(&self.safedk_removal());
        let summary = document.remove_block(&self.plugin_removal());

        if legacy.is_empty() && summary.is_empty() {
            debug!("No quality service plugin in {:?}", path);
            return Ok(summary);
        }

        document.write(path)?;
        Ok(summary)
    }

    fn migrate_legacy_lines(&self, document: &mut BuildScriptDocument) {
        if document.replace_first_containing(
            &[LEGACY_BINTRAY_REPO, LEGACY_NO_REGEX_REPO],
            &build_script_line(MAVEN_REPO),
        ) {
            warn!("Replaced outdated quality service maven repository");
        }
        if document.replace_first_containing(&[LEGACY_CLASSPATH_V3], &build_script_line(CLASSPATH)) {
            warn!("Replaced versioned quality service classpath");
        }
    }

    fn plugin_block(&self, api_key: &str) -> BlockTemplate {
        BlockTemplate {
            open_line: PLUGIN_BLOCK.to_string(),
            key_pattern: self.api_key_re.clone(),
            key_line: API_KEY_LINE.replace("{key}", api_key),
            comment_lines: vec![API_KEY_COMMENT.to_string()],
            prefix_lines: vec![APPLY_PLUGIN.to_string()],
            anchor: self.application_plugin_re.clone(),
        }
    }

    fn build_script_insertion(&self) -> ClosureInsertion {
        ClosureInsertion {
            closure_literal: BUILD_SCRIPT_MATCHER.to_string(),
            repository_anchor: self.repositories_re.clone(),
            repository_line: build_script_line(MAVEN_REPO),
            classpath_anchor: self.gradle_classpath_re.clone(),
            classpath_line: build_script_line(CLASSPATH),
        }
    }

    fn plugin_removal(&self) -> RemovalTemplate {
        RemovalTemplate {
            open_line: PLUGIN_BLOCK.to_string(),
            repository_literal: MAVEN_REPO.to_string(),
            classpath_literal: CLASSPATH.to_string(),
            apply_pattern: self.apply_plugin_re.clone(),
        }
    }

    fn safedk_removal(&self) -> RemovalTemplate {
        RemovalTemplate {
            open_line: SAFEDK_BLOCK.to_string(),
            repository_literal: SAFEDK_REPO.to_string(),
            classpath_literal: SAFEDK_CLASSPATH.to_string(),
            apply_pattern: self.safedk_apply_plugin_re.clone(),
        }
    }
}

impl Default for QualityServicePlugin {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_script_line(line: &str) -> String {
    format!("{BUILD_SCRIPT_LINE_INDENT}{line}")
}
