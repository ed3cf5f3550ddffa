//! Classification of installed networks against the catalog

use indexmap::IndexMap;

use crate::version::compare::{VersionComparisonResult, compare, compare_versions};
use crate::version::types::{Network, Versions};
use crate::version::value::VersionValue;

/// Breaking SDK versions shared by the AdMob and Google Ad Manager adapters
pub const GOOGLE_ANDROID_BREAKING_VERSION: &str = "19.8.0.0";
pub const GOOGLE_IOS_BREAKING_VERSION: &str = "8.0.0.0";

pub const ADMOB_NETWORK_NAME: &str = "ADMOB_NETWORK";
pub const GOOGLE_AD_MANAGER_NETWORK_NAME: &str = "GOOGLE_AD_MANAGER_NETWORK";

/// What the caller should offer for a network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkAction {
    /// No installed version was found
    NotInstalled,
    /// The catalog has a newer version than the installed one
    UpgradeAvailable,
    /// Installed version matches the catalog or is ahead of it (beta)
    UpToDateOrNewer,
}

/// Result of resolving one network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkStatus {
    pub comparison_result: VersionComparisonResult,
    pub action: NetworkAction,
    /// Installed version is below the minimum supported version
    pub requires_update: bool,
}

/// Minimum adapter versions required by the current host plugin
pub fn default_minimum_versions() -> IndexMap<String, String> {
    [
        ("ADMOB_NETWORK", "android_23.3.0.1_ios_11.9.0.1"),
        ("BIDMACHINE_NETWORK", "android_3.0.1.1_ios_3.0.0.0.1"),
        ("CHARTBOOST_NETWORK", "android_9.7.0.3_ios_9.7.0.2"),
        ("FACEBOOK_MEDIATE", "android_6.17.0.1_ios_6.15.2.1"),
        ("FYBER_NETWORK", "android_8.3.1.1_ios_8.3.2.1"),
        ("GOOGLE_AD_MANAGER_NETWORK", "android_23.3.0.1_ios_11.9.0.1"),
        ("HYPRMX_NETWORK", "android_6.4.2.1_ios_6.4.1.0.1"),
        ("INMOBI_NETWORK", "android_10.7.7.1_ios_10.7.5.1"),
        ("IRONSOURCE_NETWORK", "android_8.3.0.0.2_ios_8.3.0.0.1"),
        ("LINE_NETWORK", "android_2024.8.27.1_ios_2.8.20240827.1"),
        ("MINTEGRAL_NETWORK", "android_16.8.51.1_ios_7.7.2.0.1"),
        ("MOBILEFUSE_NETWORK", "android_1.7.6.1_ios_1.7.6.1"),
        ("MOLOCO_NETWORK", "android_3.1.0.1_ios_3.1.3.1"),
        ("MYTARGET_NETWORK", "android_5.22.1.1_ios_5.21.7.1"),
        ("PUBMATIC_NETWORK", "android_3.9.0.2_ios_3.9.0.2"),
        ("SMAATO_NETWORK", "android_22.7.0.1_ios_22.8.4.1"),
        ("TIKTOK_NETWORK", "android_6.2.0.5.2_ios_6.2.0.7.2"),
        ("UNITY_NETWORK", "android_4.12.2.1_ios_4.12.2.1"),
        ("VERVE_NETWORK", "android_3.0.4.1_ios_3.0.4.1"),
        ("VUNGLE_NETWORK", "android_7.4.1.1_ios_7.4.1.1"),
        ("YANDEX_NETWORK", "android_7.4.0.1_ios_2.18.0.1"),
    ]
    .into_iter()
    .map(|(name, version)| (name.to_string(), version.to_string()))
    .collect()
}

/// Resolve an adapter network's installed version against the catalog.
///
/// `minimum` is the entry of the minimum-version table for this network, if any.
pub fn resolve_network(
    current: &VersionValue,
    latest: &VersionValue,
    minimum: Option<&str>,
) -> NetworkStatus {
    if current.is_empty() {
        return NetworkStatus {
            comparison_result: VersionComparisonResult::Lesser,
            action: NetworkAction::NotInstalled,
            requires_update: false,
        };
    }

    let comparison_result = current.compare(latest);
    let action = match comparison_result {
        VersionComparisonResult::Lesser => NetworkAction::UpgradeAvailable,
        VersionComparisonResult::Equal | VersionComparisonResult::Greater => {
            NetworkAction::UpToDateOrNewer
        }
    };
    let requires_update = minimum.is_some_and(|minimum| {
        current.compare(&VersionValue::parse(minimum)) == VersionComparisonResult::Lesser
    });

    NetworkStatus {
        comparison_result,
        action,
        requires_update,
    }
}

/// Resolve the host SDK, whose runtime, Android and iOS versions are tracked separately.
///
/// `Equal` only if all three match, `Greater` if any one is ahead (a beta on
/// one platform), `Lesser` otherwise.
pub fn resolve_sdk(current: &Versions, latest: &Versions) -> NetworkStatus {
    if !current.is_installed() {
        return NetworkStatus {
            comparison_result: VersionComparisonResult::Lesser,
            action: NetworkAction::NotInstalled,
            requires_update: false,
        };
    }

    let results = [
        compare_optional(&current.unity, &latest.unity),
        compare_optional(&current.android, &latest.android),
        compare_optional(&current.ios, &latest.ios),
    ];

    let comparison_result = if results.iter().all(|r| *r == VersionComparisonResult::Equal) {
        VersionComparisonResult::Equal
    } else if results.contains(&VersionComparisonResult::Greater) {
        VersionComparisonResult::Greater
    } else {
        VersionComparisonResult::Lesser
    };

    let action = if comparison_result == VersionComparisonResult::Lesser {
        NetworkAction::UpgradeAvailable
    } else {
        NetworkAction::UpToDateOrNewer
    };

    NetworkStatus {
        comparison_result,
        action,
        requires_update: false,
    }
}

fn compare_optional(a: &Option<String>, b: &Option<String>) -> VersionComparisonResult {
    compare_versions(
        a.as_deref().unwrap_or_default(),
        b.as_deref().unwrap_or_default(),
    )
}

/// Store freshly discovered versions on a network and recompute its status.
pub fn refresh_network(
    network: &mut Network,
    current: Versions,
    minimum_versions: &IndexMap<String, String>,
) -> NetworkStatus {
    network.current_versions = current;

    let status = if network.is_sdk() {
        resolve_sdk(&network.current_versions, &network.latest_versions)
    } else {
        resolve_network(
            &network.current_versions.unity_value(),
            &network.latest_versions.unity_value(),
            minimum_versions.get(&network.name).map(String::as_str),
        )
    };

    network.comparison_result = status.comparison_result;
    network.requires_update = status.requires_update;
    status
}

/// Whether the installed versions satisfy optional per-platform minimums
pub fn is_adapter_installed(
    current: &Versions,
    min_ios: Option<&str>,
    min_android: Option<&str>,
) -> bool {
    if !current.is_installed() {
        return false;
    }

    let satisfies = |installed: &Option<String>, minimum: Option<&str>| match minimum {
        Some(minimum) => {
            compare(installed.as_deref().unwrap_or_default(), minimum)
                != VersionComparisonResult::Lesser
        }
        None => true,
    };

    satisfies(&current.ios, min_ios) && satisfies(&current.android, min_android)
}

/// AdMob and Google Ad Manager share SDKs, so both adapters must sit on the same side
/// of a breaking SDK version.
pub fn google_adapters_compatible(
    admob_version: &str,
    google_ad_manager_version: &str,
    breaking_version: &str,
) -> bool {
    let admob_older =
        compare_versions(admob_version, breaking_version) == VersionComparisonResult::Lesser;
    let gam_older = compare_versions(google_ad_manager_version, breaking_version)
        == VersionComparisonResult::Lesser;

    admob_older == gam_older
}
