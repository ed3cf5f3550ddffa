//! Dependencies.xml parser
//!
//! Extracts the installed adapter versions from a network's dependency
//! declaration file.
//!
//! Format:
//! ```xml
//! <dependencies>
//!   <androidPackages>
//!     <androidPackage spec="com.applovin.mediation:vungle-adapter:[7.4.1.1]" />
//!   </androidPackages>
//!   <iosPods>
//!     <iosPod name="AppLovinMediationVungleAdapter" version="7.4.1.1" />
//!   </iosPods>
//! </dependencies>
//! ```
//!
//! Only the first `com.applovin` Android package and the first `AppLovin`
//! iOS pod are considered; other declarations belong to the wrapped SDKs.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use regex::Regex;
use tracing::{debug, warn};

use crate::version::types::Versions;

/// Platform versions declared in one dependency file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredVersions {
    pub android: Option<String>,
    pub ios: Option<String>,
}

/// Parser for Dependencies.xml files
pub struct DependenciesXmlParser {
    /// Matches `<!-- ... -->`
    comment_re: Regex,
    /// Matches `<androidPackage spec="com.applovin...:<version>"`
    android_package_re: Regex,
    /// Matches `<iosPod name="AppLovin..." ...>` capturing the remaining attributes
    ios_pod_re: Regex,
    /// Matches `version="<version>"`
    version_attr_re: Regex,
}

impl DependenciesXmlParser {
    pub fn new() -> Self {
        Self {
            comment_re: Regex::new(r"(?s)<!--.*?-->").unwrap(),
            android_package_re: Regex::new(
                r#"<androidPackage\s+spec\s*=\s*["'](com\.applovin[^"']*)["']"#,
            )
            .unwrap(),
            ios_pod_re: Regex::new(r#"<iosPod\s+name\s*=\s*["']AppLovin[^"']*["']([^>]*)>"#)
                .unwrap(),
            version_attr_re: Regex::new(r#"\bversion\s*=\s*["']([^"']*)["']"#).unwrap(),
        }
    }

    pub fn parse(&self, content: &str) -> DeclaredVersions {
        let content = self.comment_re.replace_all(content, "");

        let android = self
            .android_package_re
            .captures(&content)
            .and_then(|caps| caps.get(1))
            .and_then(|spec| spec.as_str().rsplit(':').next())
            .map(android_version);

        let ios = self
            .ios_pod_re
            .captures(&content)
            .and_then(|caps| caps.get(1))
            .and_then(|attrs| self.version_attr_re.captures(attrs.as_str()))
            .and_then(|caps| caps.get(1))
            .map(|version| version.as_str().to_string());

        DeclaredVersions { android, ios }
    }

    /// Read the installed versions from one or more dependency files.
    ///
    /// Packaged networks split Android and iOS into separate files, so later
    /// files fill in the platforms earlier ones lack. A missing file means the
    /// network is not installed from that path.
    pub fn read_versions<P: AsRef<Path>>(&self, paths: &[P]) -> Versions {
        let mut android = None;
        let mut ios = None;

        for path in paths {
            let path = path.as_ref();
            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("No dependency file at {:?}", path);
                    continue;
                }
                Err(e) => {
                    warn!("Failed to read dependency file {:?}: {}", path, e);
                    continue;
                }
            };

            let declared = self.parse(&content);
            if declared.android.is_some() {
                android = declared.android;
            }
            if declared.ios.is_some() {
                ios = declared.ios;
            }
        }

        Versions::from_platforms(android, ios)
    }
}

impl Default for DependenciesXmlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Some specs pin the version with square brackets (`[1.2.3]`)
fn android_version(version: &str) -> String {
    if version.starts_with('[') {
        version.trim_matches(|c| c == '[' || c == ']').to_string()
    } else {
        version.to_string()
    }
}
