//! Android project properties: `gradle.properties`, the Gradle wrapper URL
//! and the Android Gradle plugin version

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::gradle::error::PatchError;
use crate::gradle::patcher::replace_line_in_file;
use crate::gradle::quality_service::build_script_line;
use crate::persist::write_atomically;
use crate::version::compare::{VersionComparisonResult, compare_versions};

const PROPERTY_ANDROIDX: &str = "android.useAndroidX";
const PROPERTY_JETIFIER: &str = "android.enableJetifier";
const PROPERTY_DEXING_ARTIFACT_TRANSFORM: &str = "android.enableDexingArtifactTransform";

/// Lowest Android Gradle plugin version accepted in the `plugins { }` style
pub const MIN_PLUGINS_BLOCK_GRADLE_PLUGIN_VERSION: &str = "7.1.2";

/// How the root build file declares the Android Gradle plugin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GradlePluginStyle {
    /// `id 'com.android.application' version '...' apply false`
    #[default]
    PluginsBlock,
    /// `classpath 'com.android.tools.build:gradle:...'`
    Classpath,
}

/// Rewrite `gradle.properties` so AndroidX and Jetifier are enabled and
/// dexing via artifact transform is disabled.
///
/// Every other line is kept. The file is created when missing.
pub fn update_gradle_properties(path: &Path) -> Result<(), PatchError> {
    let io_error = |source| PatchError::Io {
        path: path.to_path_buf(),
        source,
    };

    let existing = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(io_error(e)),
    };

    let mut lines: Vec<String> = existing
        .lines()
        .filter(|line| {
            !line.contains(PROPERTY_ANDROIDX)
                && !line.contains(PROPERTY_JETIFIER)
                && !line.contains(PROPERTY_DEXING_ARTIFACT_TRANSFORM)
        })
        .map(String::from)
        .collect();
    lines.push(format!("{PROPERTY_ANDROIDX}=true"));
    lines.push(format!("{PROPERTY_JETIFIER}=true"));
    lines.push(format!("{PROPERTY_DEXING_ARTIFACT_TRANSFORM}=false"));

    write_atomically(path, &(lines.join("\n") + "\n")).map_err(io_error)?;
    debug!("Updated {:?}", path);
    Ok(())
}

/// Point the Gradle wrapper at `url`.
///
/// Returns `false` when the wrapper properties file has no `distributionUrl`
/// and `PatchError::NotFound` when the file is missing.
pub fn set_distribution_url(wrapper_properties_path: &Path, url: &str) -> Result<bool, PatchError> {
    let pattern = Regex::new(r".*distributionUrl.*").unwrap();
    let replaced = replace_line_in_file(
        wrapper_properties_path,
        &pattern,
        &format!("distributionUrl={url}"),
    )?;

    if replaced {
        debug!("Distribution url set to {}", url);
    } else {
        warn!("Failed to set distribution url in {:?}", wrapper_properties_path);
    }
    Ok(replaced)
}

/// Set the Android Gradle plugin version declared in the root build file.
///
/// In the `plugins { }` style both the application and library entries are
/// rewritten and versions below 7.1.2 are refused. Returns whether the
/// application (or classpath) line was replaced. A missing root build file
/// is `PatchError::NotFound`.
pub fn set_android_gradle_plugin_version(
    root_build_path: &Path,
    version: &str,
    style: GradlePluginStyle,
) -> Result<bool, PatchError> {
    match style {
        GradlePluginStyle::PluginsBlock => {
            if compare_versions(version, MIN_PLUGINS_BLOCK_GRADLE_PLUGIN_VERSION)
                == VersionComparisonResult::Lesser
            {
                return Err(PatchError::VersionTooLow {
                    version: version.to_string(),
                    minimum: MIN_PLUGINS_BLOCK_GRADLE_PLUGIN_VERSION.to_string(),
                });
            }

            let library = Regex::new(r#".*id ['"]com\.android\.library['"] version"#).unwrap();
            let library_line =
                build_script_line(&format!("id 'com.android.library' version '{version}' apply false"));
            if !replace_line_in_file(root_build_path, &library, &library_line)? {
                warn!("Failed to set gradle library version in {:?}", root_build_path);
            }

            let application =
                Regex::new(r#".*id ['"]com\.android\.application['"] version"#).unwrap();
            let application_line = build_script_line(&format!(
                "id 'com.android.application' version '{version}' apply false"
            ));
            replace_version_line(root_build_path, &application, &application_line)
        }
        GradlePluginStyle::Classpath => {
            let classpath =
                Regex::new(r#".*classpath ['"]com\.android\.tools\.build:gradle:.*"#).unwrap();
            let classpath_line =
                build_script_line(&format!("classpath 'com.android.tools.build:gradle:{version}'"));
            replace_version_line(root_build_path, &classpath, &classpath_line)
        }
    }
}

fn replace_version_line(path: &Path, pattern: &Regex, line: &str) -> Result<bool, PatchError> {
    let replaced = replace_line_in_file(path, pattern, line)?;
    if replaced {
        debug!("Gradle plugin version set to {}", line.trim());
    } else {
        warn!("Failed to set gradle plugin version in {:?}", path);
    }
    Ok(replaced)
}
