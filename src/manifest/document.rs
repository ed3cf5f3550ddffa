//! Package manifest document (`Packages/manifest.json`)
//!
//! Format:
//! ```json
//! {
//!   "dependencies": { "com.applovin.mediation.ads": "8.0.0" },
//!   "scopedRegistries": [
//!     { "name": "AppLovin MAX Unity", "url": "https://unity.packages.applovin.com/", "scopes": ["com.applovin.mediation.ads"] }
//!   ]
//! }
//! ```
//!
//! Unknown keys at the top level and inside registries are kept as-is, and
//! top-level keys are written back in the order they were read.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::manifest::error::ManifestError;
use crate::persist::write_atomically;

/// Namespace prefixes that have a `.beta` counterpart, checked in order
pub const BETA_PACKAGE_PREFIXES: [&str; 3] = [
    "com.applovin.mediation.adapters",
    "com.applovin.mediation.dsp",
    "com.applovin.mediation.ads",
];

const BETA_INFIX: &str = ".beta";

/// A named package source trusted for a set of package scopes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopedRegistry {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub scopes: IndexSet<String>,
    #[serde(flatten)]
    pub other: IndexMap<String, serde_json::Value>,
}

/// In-memory model of the dependency manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyManifest {
    pub dependencies: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoped_registries: Option<Vec<ScopedRegistry>>,
    #[serde(flatten)]
    pub other: IndexMap<String, serde_json::Value>,
    /// Top-level keys in source order
    #[serde(skip)]
    key_order: Vec<String>,
}

impl DependencyManifest {
    /// Load the manifest from disk.
    ///
    /// A missing, empty or undeserializable manifest is an error; there is no fallback.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ManifestError::NotFound(path.to_path_buf()),
            _ => ManifestError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        Self::from_json_str(&content).map_err(|e| match e {
            ManifestError::Empty(_) => ManifestError::Empty(path.to_path_buf()),
            ManifestError::Deserialize { source, .. } => ManifestError::Deserialize {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self, ManifestError> {
        if content.trim().is_empty() {
            return Err(ManifestError::Empty(PathBuf::new()));
        }

        let deserialize_error = |source| ManifestError::Deserialize {
            path: PathBuf::new(),
            source,
        };

        let value: Value = serde_json::from_str(content).map_err(deserialize_error)?;
        let key_order = match &value {
            Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        };

        let mut manifest: Self = serde_json::from_value(value).map_err(deserialize_error)?;
        manifest.key_order = key_order;
        Ok(manifest)
    }

    /// Pretty-printed JSON with a trailing newline.
    ///
    /// Keys read from the source come first in their original order; new keys follow.
    pub fn to_json_string(&self) -> Result<String, ManifestError> {
        let mut fields = match serde_json::to_value(self).map_err(ManifestError::Serialize)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let mut ordered = Map::new();
        for key in &self.key_order {
            if let Some(value) = fields.shift_remove(key) {
                ordered.insert(key.clone(), value);
            }
        }
        ordered.extend(fields);

        let mut content =
            serde_json::to_string_pretty(&Value::Object(ordered)).map_err(ManifestError::Serialize)?;
        content.push('\n');
        Ok(content)
    }

    /// Write the whole document back to `path`.
    ///
    /// The content goes to a sibling temp file first and is then renamed over the target.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let content = self.to_json_string()?;
        write_atomically(path, &content).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Saved manifest to {:?}", path);
        Ok(())
    }

    /// Add a scoped registry, or merge `scopes` into the existing registry of the same name.
    ///
    /// The URL of an existing registry is left untouched.
    pub fn add_or_update_registry(&mut self, name: &str, url: &str, scopes: &[&str]) {
        let registries = self.scoped_registries.get_or_insert_with(Vec::new);

        match registries.iter_mut().find(|registry| registry.name == name) {
            Some(registry) => {
                registry
                    .scopes
                    .extend(scopes.iter().map(|scope| scope.to_string()));
            }
            None => registries.push(ScopedRegistry {
                name: name.to_string(),
                url: url.to_string(),
                scopes: scopes.iter().map(|scope| scope.to_string()).collect(),
                other: IndexMap::new(),
            }),
        }
    }

    pub fn registry(&self, name: &str) -> Option<&ScopedRegistry> {
        self.scoped_registries
            .as_ref()?
            .iter()
            .find(|registry| registry.name == name)
    }

    /// Insert or overwrite a dependency
    pub fn add_dependency(&mut self, package_name: &str, version: &str) {
        self.dependencies
            .insert(package_name.to_string(), version.to_string());
    }

    /// Remove a dependency, returning whether it was present
    pub fn remove_dependency(&mut self, package_name: &str) -> bool {
        self.dependencies.shift_remove(package_name).is_some()
    }

    /// Remove the `.beta` counterpart of a package if it is declared.
    ///
    /// Returns whether a beta dependency was removed.
    pub fn remove_beta_variant(&mut self, package_name: &str) -> bool {
        match beta_package_name(package_name) {
            Some(beta_name) => self.remove_dependency(&beta_name),
            None => false,
        }
    }
}

/// `com.applovin.mediation.adapters.vungle.android` ->
/// `com.applovin.mediation.adapters.beta.vungle.android`
pub fn beta_package_name(package_name: &str) -> Option<String> {
    let prefix = BETA_PACKAGE_PREFIXES
        .iter()
        .find(|prefix| package_name.contains(*prefix))?;

    Some(package_name.replace(prefix, &format!("{prefix}{BETA_INFIX}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
  "dependencies": {
    "com.unity.ugui": "1.0.0",
    "com.applovin.mediation.ads": "8.0.0"
  },
  "scopedRegistries": [
    {
      "name": "AppLovin MAX Unity",
      "url": "https://unity.packages.applovin.com/",
      "scopes": [
        "com.applovin.mediation.ads"
      ]
    }
  ],
  "testables": [
    "com.unity.ugui"
  ]
}
"#;

    #[test]
    fn round_trip_preserves_document() {
        let manifest = DependencyManifest::from_json_str(MANIFEST).unwrap();

        assert_eq!(manifest.to_json_string().unwrap(), MANIFEST);
    }

    #[test]
    fn round_trip_keeps_source_key_order() {
        let source = r#"{"scopedRegistries":[],"lock":{"zeta":1,"alpha":2},"dependencies":{"a":"1.0.0"}}"#;

        let manifest = DependencyManifest::from_json_str(source).unwrap();

        assert_eq!(
            manifest.to_json_string().unwrap(),
            "{\n  \"scopedRegistries\": [],\n  \"lock\": {\n    \"zeta\": 1,\n    \"alpha\": 2\n  },\n  \"dependencies\": {\n    \"a\": \"1.0.0\"\n  }\n}\n"
        );
    }

    #[test]
    fn new_top_level_keys_follow_source_keys() {
        let mut manifest =
            DependencyManifest::from_json_str(r#"{"testables": [], "dependencies": {}}"#).unwrap();

        manifest.add_or_update_registry("openupm", "https://package.openupm.com", &["a"]);

        let content = manifest.to_json_string().unwrap();
        let testables = content.find("\"testables\"").unwrap();
        let dependencies = content.find("\"dependencies\"").unwrap();
        let registries = content.find("\"scopedRegistries\"").unwrap();
        assert!(testables < dependencies && dependencies < registries);
    }

    #[test]
    fn add_or_update_registry_merges_scopes_and_keeps_url() {
        let mut manifest = DependencyManifest::from_json_str(MANIFEST).unwrap();

        manifest.add_or_update_registry(
            "AppLovin MAX Unity",
            "https://example.com/",
            &["com.applovin.mediation.ads", "com.applovin.mediation.adapters"],
        );

        let registry = manifest.registry("AppLovin MAX Unity").unwrap();
        assert_eq!(registry.url, "https://unity.packages.applovin.com/");
        assert_eq!(
            registry.scopes.iter().collect::<Vec<_>>(),
            vec!["com.applovin.mediation.ads", "com.applovin.mediation.adapters"]
        );
        assert_eq!(manifest.scoped_registries.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn add_or_update_registry_is_idempotent() {
        let mut manifest = DependencyManifest::from_json_str(MANIFEST).unwrap();
        let scopes = ["com.google.external-dependency-manager"];

        manifest.add_or_update_registry("package.openupm.com", "https://package.openupm.com", &scopes);
        let first = manifest.to_json_string().unwrap();
        manifest.add_or_update_registry("package.openupm.com", "https://package.openupm.com", &scopes);

        assert_eq!(manifest.to_json_string().unwrap(), first);
        assert_eq!(manifest.scoped_registries.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn add_or_update_registry_creates_registry_section() {
        let mut manifest =
            DependencyManifest::from_json_str(r#"{"dependencies": {}}"#).unwrap();

        manifest.add_or_update_registry("openupm", "https://package.openupm.com", &["a", "a"]);

        let registry = manifest.registry("openupm").unwrap();
        assert_eq!(registry.scopes.len(), 1);
    }

    #[test]
    fn add_and_remove_dependencies() {
        let mut manifest =
            DependencyManifest::from_json_str(r#"{"dependencies": {"a": "1.0.0"}}"#).unwrap();

        manifest.add_dependency("b", "2.0.0");
        assert!(manifest.remove_dependency("a"));
        assert!(!manifest.remove_dependency("missing"));

        let json: serde_json::Value =
            serde_json::from_str(&manifest.to_json_string().unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"dependencies": {"b": "2.0.0"}}));
    }

    #[test]
    fn add_dependency_last_write_wins() {
        let mut manifest =
            DependencyManifest::from_json_str(r#"{"dependencies": {"a": "1.0.0", "b": "1.0.0"}}"#)
                .unwrap();

        manifest.add_dependency("a", "2.0.0");

        assert_eq!(manifest.dependencies.get("a").map(String::as_str), Some("2.0.0"));
        assert_eq!(
            manifest.dependencies.keys().collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }

    #[rstest]
    #[case(
        "com.applovin.mediation.adapters.vungle.android",
        Some("com.applovin.mediation.adapters.beta.vungle.android")
    )]
    #[case(
        "com.applovin.mediation.dsp.linkedindsp.ios",
        Some("com.applovin.mediation.dsp.beta.linkedindsp.ios")
    )]
    #[case("com.applovin.mediation.ads", Some("com.applovin.mediation.ads.beta"))]
    #[case("com.unity.ugui", None)]
    fn beta_package_name_inserts_infix(#[case] package: &str, #[case] expected: Option<&str>) {
        assert_eq!(beta_package_name(package).as_deref(), expected);
    }

    #[test]
    fn remove_beta_variant_removes_only_beta_package() {
        let mut manifest = DependencyManifest::from_json_str(
            r#"{"dependencies": {
                "com.applovin.mediation.adapters.vungle.android": "7.4.1.1",
                "com.applovin.mediation.adapters.beta.vungle.android": "7.5.0.0-beta1"
            }}"#,
        )
        .unwrap();

        assert!(manifest.remove_beta_variant("com.applovin.mediation.adapters.vungle.android"));
        assert!(!manifest.remove_beta_variant("com.unity.ugui"));
        assert_eq!(
            manifest.dependencies.keys().collect::<Vec<_>>(),
            vec!["com.applovin.mediation.adapters.vungle.android"]
        );
    }

    #[test]
    fn load_fails_for_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manifest.json");

        assert!(matches!(
            DependencyManifest::load(&path),
            Err(ManifestError::NotFound(p)) if p == path
        ));
    }

    #[test]
    fn load_fails_for_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manifest.json");
        fs::write(&path, "  \n").unwrap();

        assert!(matches!(
            DependencyManifest::load(&path),
            Err(ManifestError::Empty(p)) if p == path
        ));
    }

    #[rstest]
    #[case("not json")]
    #[case(r#"{"scopedRegistries": []}"#)]
    #[case("[]")]
    fn load_fails_for_undeserializable_file(#[case] content: &str) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manifest.json");
        fs::write(&path, content).unwrap();

        assert!(matches!(
            DependencyManifest::load(&path),
            Err(ManifestError::Deserialize { .. })
        ));
    }

    #[test]
    fn save_writes_document_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manifest.json");
        fs::write(&path, MANIFEST).unwrap();

        let mut manifest = DependencyManifest::load(&path).unwrap();
        manifest.add_dependency("com.applovin.mediation.adapters.vungle.android", "7.4.1.1");
        manifest.save(&path).unwrap();

        let reloaded = DependencyManifest::load(&path).unwrap();
        assert_eq!(reloaded, manifest);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn save_fails_when_directory_is_missing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("manifest.json");
        let manifest = DependencyManifest::from_json_str(MANIFEST).unwrap();

        assert!(matches!(
            manifest.save(&path),
            Err(ManifestError::Io { .. })
        ));
    }
}
