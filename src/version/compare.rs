use std::cmp::Ordering;

use crate::version::value::{PlatformVersion, VersionValue};

/// Outcome of comparing version A against version B
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionComparisonResult {
    Lesser,
    Equal,
    Greater,
}

impl VersionComparisonResult {
    pub fn reverse(self) -> Self {
        match self {
            VersionComparisonResult::Lesser => VersionComparisonResult::Greater,
            VersionComparisonResult::Equal => VersionComparisonResult::Equal,
            VersionComparisonResult::Greater => VersionComparisonResult::Lesser,
        }
    }
}

impl From<Ordering> for VersionComparisonResult {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => VersionComparisonResult::Lesser,
            Ordering::Equal => VersionComparisonResult::Equal,
            Ordering::Greater => VersionComparisonResult::Greater,
        }
    }
}

/// Compare two version strings of either shape.
///
/// Platform composites (`android_..._ios_...`) go through
/// [`compare_unity_mediation_versions`], everything else through [`compare_versions`].
pub fn compare(version_a: &str, version_b: &str) -> VersionComparisonResult {
    VersionValue::parse(version_a).compare(&VersionValue::parse(version_b))
}

/// Compare two bare dotted-numeric versions with optional `-betaN` suffix.
///
/// A beta is ordered below its non-beta counterpart. Unparsable numeric
/// segments count as 0 and missing trailing segments are padded with 0.
pub fn compare_versions(version_a: &str, version_b: &str) -> VersionComparisonResult {
    if version_a == version_b {
        return VersionComparisonResult::Equal;
    }

    PlatformVersion::parse(version_a).compare(&PlatformVersion::parse(version_b))
}

/// Compare two platform-composite plugin versions.
///
/// A platform present on only one side makes that side newer for that platform.
/// The result is `Greater` if either platform compares greater and `Lesser`
/// otherwise, which includes the case where both platforms compare equal.
pub fn compare_unity_mediation_versions(
    version_a: &str,
    version_b: &str,
) -> VersionComparisonResult {
    let a = VersionValue::parse(version_a);
    let b = VersionValue::parse(version_b);
    if a.composite() == b.composite() {
        return VersionComparisonResult::Equal;
    }

    a.compare_platforms(&b)
}

/// Whether two adapter versions wrap the same underlying SDK version.
///
/// Adapter versions append one build segment to the SDK version
/// (`7.4.1.2` wraps SDK `7.4.1`), so the last dotted segment is ignored.
pub fn compare_sdk_versions(version_a: &str, version_b: &str) -> bool {
    adapter_sdk_version(version_a) == adapter_sdk_version(version_b)
}

pub(crate) fn adapter_sdk_version(adapter_version: &str) -> &str {
    match adapter_version.rfind('.') {
        Some(index) if index > 0 => &adapter_version[..index],
        _ => adapter_version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.3", "1.2.4", VersionComparisonResult::Lesser)]
    #[case("1.2.4", "1.2.3", VersionComparisonResult::Greater)]
    #[case("1.2.3", "1.2.3", VersionComparisonResult::Equal)]
    #[case("1.2.3-beta1", "1.2.3", VersionComparisonResult::Lesser)]
    #[case("1.2.3", "1.2.3-beta1", VersionComparisonResult::Greater)]
    #[case("1.2.3-beta2", "1.2.3-beta1", VersionComparisonResult::Greater)]
    #[case("1.2.3-beta", "1.2.3-beta1", VersionComparisonResult::Lesser)]
    #[case("1.2", "1.2.0.0", VersionComparisonResult::Equal)]
    #[case("1.10.0", "1.9.0", VersionComparisonResult::Greater)]
    #[case("1.x.0", "1.0.0", VersionComparisonResult::Equal)] // unparsable segment degrades to 0
    #[case("1.2.4-beta1", "1.2.3", VersionComparisonResult::Greater)]
    #[case("", "0.0.1", VersionComparisonResult::Lesser)]
    fn compare_versions_returns_expected(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: VersionComparisonResult,
    ) {
        assert_eq!(compare_versions(a, b), expected);
    }

    #[rstest]
    #[case("1.2.3")]
    #[case("10.0.0.1")]
    #[case("3.1.0-beta7")]
    #[case("0")]
    fn compare_versions_is_reflexive(#[case] version: &str) {
        assert_eq!(
            compare_versions(version, version),
            VersionComparisonResult::Equal
        );
    }

    #[rstest]
    #[case("1.2.3", "1.2.4")]
    #[case("1.2.3-beta1", "1.2.3")]
    #[case("1.2.3-beta2", "1.2.3-beta1")]
    #[case("2.0", "1.9.9.9")]
    #[case("1.0", "1.0.0")]
    #[case("7.4.1.1", "7.4.1.1-beta3")]
    fn compare_versions_is_antisymmetric(#[case] a: &str, #[case] b: &str) {
        assert_eq!(compare_versions(a, b), compare_versions(b, a).reverse());
    }

    #[rstest]
    #[case("android_1.0.0_ios_2.0.0", "android_1.0.0_ios_1.9.0", VersionComparisonResult::Greater)]
    #[case("android_1.0.0_ios_1.9.0", "android_1.0.0_ios_2.0.0", VersionComparisonResult::Lesser)]
    #[case("android_2.0.0_ios_1.0.0", "android_1.0.0_ios_2.0.0", VersionComparisonResult::Greater)]
    #[case("android_1.0.0_ios_1.0.0", "android_1.0.0", VersionComparisonResult::Greater)]
    #[case("ios_1.0.0", "android_1.0.0_ios_1.0.0", VersionComparisonResult::Lesser)]
    #[case("android_1.0.0_ios_1.0.0", "android_1.0.0_ios_1.0.0", VersionComparisonResult::Equal)]
    #[case("android_1.0.0-beta1", "android_1.0.0", VersionComparisonResult::Lesser)]
    fn compare_unity_mediation_versions_returns_expected(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: VersionComparisonResult,
    ) {
        assert_eq!(compare_unity_mediation_versions(a, b), expected);
        assert_eq!(compare(a, b), expected);
    }

    // Two composites that are equal per platform but spelled differently resolve
    // to Lesser in both directions. This is the established tie-break and is not symmetric.
    #[test]
    fn composite_tie_break_is_lesser_in_both_directions() {
        let a = "android_1.0_ios_2.0";
        let b = "android_1.0.0_ios_2.0.0";

        assert_eq!(
            compare_unity_mediation_versions(a, b),
            VersionComparisonResult::Lesser
        );
        assert_eq!(
            compare_unity_mediation_versions(b, a),
            VersionComparisonResult::Lesser
        );
    }

    #[test]
    fn compare_dispatches_bare_versions_to_numeric_algorithm() {
        assert_eq!(compare("1.0", "1.0.0"), VersionComparisonResult::Equal);
        assert_eq!(compare("8.0.0", "7.9.9"), VersionComparisonResult::Greater);
    }

    #[rstest]
    #[case("7.4.1.1", "7.4.1.2", true)]
    #[case("7.4.1.1", "7.4.2.1", false)]
    #[case("7", "7", true)]
    #[case(".5", ".5", true)]
    #[case("23.3.0.1", "23.3.0.0", true)]
    fn compare_sdk_versions_ignores_adapter_build(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(compare_sdk_versions(a, b), expected);
    }
}
