//! Parsed representation of adapter version strings
//!
//! Two shapes of version string are in circulation:
//! - bare dotted-numeric versions with an optional beta suffix: `7.4.1.1`, `7.4.1.1-beta2`
//! - platform composites used for the host plugin: `android_7.4.1.1_ios_7.4.1.1`,
//!   `android_7.4.1.1` or `ios_7.4.1.1`

use std::cmp::Ordering;

use crate::version::compare::{VersionComparisonResult, compare_versions};

const ANDROID_PREFIX: &str = "android_";
const IOS_PREFIX: &str = "ios_";
const IOS_SEPARATOR: &str = "_ios_";
const BETA_MARKER: &str = "-beta";

/// Numeric and beta components of a single platform version
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlatformVersion {
    /// Version text with the beta suffix removed
    pub base: String,
    /// Dotted components, unparsable segments degrade to 0
    pub numeric_parts: Vec<i64>,
    /// Beta number if the version carries a `-beta` suffix (`-beta` alone is beta 0)
    pub beta: Option<i64>,
}

impl PlatformVersion {
    pub fn parse(version: &str) -> Self {
        let (base, beta) = split_beta(version);
        Self {
            base: base.to_string(),
            numeric_parts: numeric_parts(base),
            beta,
        }
    }

    /// Beta numbers only decide when the numeric text is identical; otherwise
    /// components are compared pairwise with missing ones padded by 0.
    pub fn compare(&self, other: &PlatformVersion) -> VersionComparisonResult {
        if self.base == other.base {
            return match (self.beta, other.beta) {
                (Some(a), Some(b)) => a.cmp(&b).into(),
                (Some(_), None) => VersionComparisonResult::Lesser,
                (None, Some(_)) => VersionComparisonResult::Greater,
                (None, None) => VersionComparisonResult::Equal,
            };
        }

        let length = self.numeric_parts.len().max(other.numeric_parts.len());
        (0..length)
            .map(|i| {
                let a = self.numeric_parts.get(i).copied().unwrap_or(0);
                let b = other.numeric_parts.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
            .into()
    }
}

/// Split a version into its numeric base and optional beta number.
///
/// `"1.2.3-beta4"` -> `("1.2.3", Some(4))`, `"1.2.3-beta"` -> `("1.2.3", Some(0))`
fn split_beta(version: &str) -> (&str, Option<i64>) {
    match version.split_once(BETA_MARKER) {
        Some((base, beta)) => (base, Some(beta.parse().unwrap_or(0))),
        None => (version, None),
    }
}

fn numeric_parts(base: &str) -> Vec<i64> {
    base.split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}

/// A version string as published in the catalog or derived from installed dependency files.
///
/// Platform segments are kept as raw strings and only decomposed into
/// [`PlatformVersion`] when asked for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionValue {
    composite: String,
    android: Option<String>,
    ios: Option<String>,
}

impl VersionValue {
    pub fn parse(version: &str) -> Self {
        let version = version.trim();
        let (android, ios) = if let Some(rest) = version.strip_prefix(ANDROID_PREFIX) {
            match rest.split_once(IOS_SEPARATOR) {
                Some((android, ios)) => (Some(android.to_string()), Some(ios.to_string())),
                None => (Some(rest.to_string()), None),
            }
        } else if let Some(rest) = version.strip_prefix(IOS_PREFIX) {
            (None, Some(rest.to_string()))
        } else {
            (None, None)
        };

        Self {
            composite: version.to_string(),
            android,
            ios,
        }
    }

    /// Build the composite form from separately tracked platform versions.
    ///
    /// Returns an empty value when neither platform is present.
    pub fn from_platforms(android: Option<&str>, ios: Option<&str>) -> Self {
        let composite = match (android, ios) {
            (Some(android), Some(ios)) => format!("{ANDROID_PREFIX}{android}{IOS_SEPARATOR}{ios}"),
            (Some(android), None) => format!("{ANDROID_PREFIX}{android}"),
            (None, Some(ios)) => format!("{IOS_PREFIX}{ios}"),
            (None, None) => String::new(),
        };
        Self::parse(&composite)
    }

    pub fn composite(&self) -> &str {
        &self.composite
    }

    pub fn android(&self) -> Option<&str> {
        self.android.as_deref()
    }

    pub fn ios(&self) -> Option<&str> {
        self.ios.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.composite.is_empty()
    }

    /// Whether this value carries platform tags rather than a bare dotted version
    pub fn is_platform_composite(&self) -> bool {
        self.android.is_some() || self.ios.is_some()
    }

    pub fn android_parts(&self) -> Option<PlatformVersion> {
        self.android.as_deref().map(PlatformVersion::parse)
    }

    pub fn ios_parts(&self) -> Option<PlatformVersion> {
        self.ios.as_deref().map(PlatformVersion::parse)
    }

    pub fn compare(&self, other: &VersionValue) -> VersionComparisonResult {
        if self.composite == other.composite {
            return VersionComparisonResult::Equal;
        }

        if !self.is_platform_composite() && !other.is_platform_composite() {
            return compare_versions(&self.composite, &other.composite);
        }

        self.compare_platforms(other)
    }

    /// Per-platform comparison used for composites.
    ///
    /// Equal on both platforms still resolves to `Lesser`.
    pub(crate) fn compare_platforms(&self, other: &VersionValue) -> VersionComparisonResult {
        let android = compare_platform(self.android_parts(), other.android_parts());
        let ios = compare_platform(self.ios_parts(), other.ios_parts());

        if android == VersionComparisonResult::Greater || ios == VersionComparisonResult::Greater {
            VersionComparisonResult::Greater
        } else {
            VersionComparisonResult::Lesser
        }
    }
}

impl std::fmt::Display for VersionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.composite)
    }
}

impl From<&str> for VersionValue {
    fn from(version: &str) -> Self {
        Self::parse(version)
    }
}

fn compare_platform(
    a: Option<PlatformVersion>,
    b: Option<PlatformVersion>,
) -> VersionComparisonResult {
    match (a, b) {
        (Some(a), Some(b)) => a.compare(&b),
        (Some(_), None) => VersionComparisonResult::Greater,
        (None, Some(_)) => VersionComparisonResult::Lesser,
        (None, None) => VersionComparisonResult::Equal,
    }
}
