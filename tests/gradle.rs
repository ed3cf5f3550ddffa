use std::fs;
use std::path::PathBuf;

use mediation_manager::gradle::patcher::{BlockOutcome, BlockTemplate};
use mediation_manager::gradle::properties::{
    GradlePluginStyle, set_android_gradle_plugin_version, update_gradle_properties,
};
use mediation_manager::gradle::{BuildScriptDocument, PatchError, QualityServicePlugin};
use regex::Regex;
use tempfile::TempDir;

const MAIN_TEMPLATE: &str = "\
apply plugin: 'com.android.application'

dependencies {
    implementation fileTree(dir: 'libs', include: ['*.jar'])
}
";

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn crashlytics_block(enabled: bool) -> BlockTemplate {
    BlockTemplate {
        open_line: "crashlytics {".to_string(),
        key_pattern: Regex::new(r".*mappingFileUploadEnabled.*").unwrap(),
        key_line: format!("    mappingFileUploadEnabled {enabled}"),
        comment_lines: Vec::new(),
        prefix_lines: Vec::new(),
        anchor: Regex::new(r".*apply plugin: 'com.android.application'.*").unwrap(),
    }
}

#[test]
fn upsert_block_inserts_then_updates_key() {
    let mut document = BuildScriptDocument::from_text(MAIN_TEMPLATE);

    let inserted = document.upsert_block(&crashlytics_block(true), None).unwrap();
    assert_eq!(inserted, BlockOutcome::Inserted);
    assert_eq!(
        document.to_text(),
        "\
apply plugin: 'com.android.application'

crashlytics {
    mappingFileUploadEnabled true
}

dependencies {
    implementation fileTree(dir: 'libs', include: ['*.jar'])
}
"
    );

    let updated = document.upsert_block(&crashlytics_block(false), None).unwrap();
    assert_eq!(updated, BlockOutcome::Updated);
    assert!(document.to_text().contains("    mappingFileUploadEnabled false\n}"));
    assert_eq!(document.to_text().matches("crashlytics {").count(), 1);
}

#[test]
fn upsert_block_without_anchor_leaves_document_untouched() {
    let mut document = BuildScriptDocument::from_text("dependencies {\n}\n");
    let before = document.clone();

    let result = document.upsert_block(&crashlytics_block(true), None);

    assert!(matches!(result, Err(PatchError::PluginBlockNotAdded { .. })));
    assert_eq!(document, before);
}

#[test]
fn build_script_lines_skip_closures_without_anchors() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "baseProjectTemplate.gradle",
        "\
buildscript {
    ext.kotlin_version = '1.8.0'
}
buildscript {
    repositories {
        google()
    }
    dependencies {
        classpath 'com.android.tools.build:gradle:7.4.2'
    }
}
",
    );
    let plugin = QualityServicePlugin::new();

    assert!(plugin.add_build_script_lines(&path).unwrap());
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("buildscript {\n    ext.kotlin_version = '1.8.0'\n}\n"));
    assert!(content.contains(
        "    repositories {\n        maven { url 'https://artifacts.applovin.com/android'"
    ));
    assert!(content.contains(
        "        classpath 'com.android.tools.build:gradle:7.4.2'\n        classpath 'com.applovin.quality:AppLovinQualityServiceGradlePlugin:+'\n"
    ));

    assert!(!plugin.add_build_script_lines(&path).unwrap());
    assert_eq!(fs::read_to_string(&path).unwrap(), content);
}

#[test]
fn quality_service_add_then_remove_clears_plugin() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "mainTemplate.gradle", MAIN_TEMPLATE);
    let plugin = QualityServicePlugin::new();

    plugin.add_to_build_file(&path, "derived-key", false).unwrap();
    assert!(fs::read_to_string(&path).unwrap().contains("apiKey 'derived-key'"));

    let summary = plugin.remove_from_build_file(&path).unwrap();

    assert!(summary.block);
    assert!(summary.apply_plugin);
    let content = fs::read_to_string(&path).unwrap();
    assert!(!content.contains("applovin {"));
    assert!(!content.contains("applovin-quality-service"));
    assert!(content.contains("apply plugin: 'com.android.application'"));
}

#[test]
fn missing_build_file_is_reported() {
    let dir = TempDir::new().unwrap();

    let result =
        QualityServicePlugin::new().add_to_build_file(&dir.path().join("missing.gradle"), "k", false);

    assert!(matches!(result, Err(PatchError::NotFound(_))));
}

#[test]
fn gradle_properties_keep_unrelated_settings() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "gradleTemplate.properties",
        "org.gradle.jvmargs=-Xmx4096M\nandroid.useAndroidX=false\n",
    );

    update_gradle_properties(&path).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "org.gradle.jvmargs=-Xmx4096M\nandroid.useAndroidX=true\nandroid.enableJetifier=true\nandroid.enableDexingArtifactTransform=false\n"
    );
}

#[test]
fn plugins_block_refuses_old_gradle_plugin() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "baseProjectTemplate.gradle",
        "plugins {\n    id 'com.android.application' version '7.4.2' apply false\n}\n",
    );

    let result = set_android_gradle_plugin_version(&path, "7.0.4", GradlePluginStyle::PluginsBlock);

    assert!(matches!(result, Err(PatchError::VersionTooLow { .. })));
    assert!(fs::read_to_string(&path).unwrap().contains("'7.4.2'"));
}
