use filecoll::checksum::{Algorithm, ChecksumCalculator};
use filecoll::package::{Dependency, Package};
use filecoll::version::Version;
use proptest::prelude::*;
use std::cmp::Ordering;

/// Version strings from one family: numbers, dots and release keywords.
fn version_text() -> impl Strategy<Value = String> {
    let part = prop_oneof![
        (0u32..30).prop_map(|n| n.to_string()),
        prop::sample::select(vec!["alpha", "beta", "pre", "rc", "a", "b", "final"])
            .prop_map(str::to_string),
    ];
    prop::collection::vec(part, 1..6).prop_map(|parts| parts.join("."))
}

proptest! {
    #[test]
    fn test_compare_is_antisymmetric(a in version_text(), b in version_text()) {
        let (a, b) = (Version::new(&a), Version::new(&b));
        prop_assert_eq!(a.compare(&b), b.compare(&a).reverse());
    }

    #[test]
    fn test_compare_is_transitive(
        a in version_text(),
        b in version_text(),
        c in version_text(),
    ) {
        let mut versions = [Version::new(&a), Version::new(&b), Version::new(&c)];
        versions.sort_by(Version::compare);
        prop_assert_ne!(versions[0].compare(&versions[1]), Ordering::Greater);
        prop_assert_ne!(versions[1].compare(&versions[2]), Ordering::Greater);
        prop_assert_ne!(versions[0].compare(&versions[2]), Ordering::Greater);
    }

    #[test]
    fn test_trailing_zeros_do_not_matter(v in version_text(), zeros in 1usize..4) {
        let padded = format!("{v}{}", ".0".repeat(zeros));
        prop_assert_eq!(Version::new(&v).compare(&Version::new(&padded)), Ordering::Equal);
    }

    #[test]
    fn test_unbounded_dependency_matches_same_name(name in "[a-z]{1,8}", v in version_text()) {
        let dependency = Dependency::new(&name, None, None);
        prop_assert!(dependency.check(&Package::new(&name, Some(&v))));
        prop_assert!(dependency.check(&Package::new(&name, None)));
    }

    #[test]
    fn test_minimum_excludes_older(low in 0u32..100, high in 0u32..100) {
        prop_assume!(low < high);
        let dependency = Dependency::new("lib", Some(&high.to_string()), None);
        let older = Package::new("lib", Some(&low.to_string()));
        prop_assert!(!dependency.check(&older));
    }

    #[test]
    fn test_chunking_does_not_change_digest(
        data in prop::collection::vec(any::<u8>(), 0..4096),
        chunk in 1usize..512,
    ) {
        let mut whole = ChecksumCalculator::with_algorithm(Algorithm::Sha256);
        whole.update(&data);

        let mut pieces = ChecksumCalculator::with_algorithm(Algorithm::Sha256);
        for part in data.chunks(chunk) {
            pieces.update(part);
        }

        prop_assert_eq!(whole.finish(), pieces.finish());
    }
}

#[test]
fn test_release_family_ordering() {
    let ordered = ["1.0alpha", "1.0beta1", "1.0rc", "1.0", "1.0a", "1.0final", "1.0.1", "1.1"];
    for pair in ordered.windows(2) {
        assert_eq!(
            Version::new(pair[0]).compare(&Version::new(pair[1])),
            Ordering::Less,
            "{} < {}",
            pair[0],
            pair[1]
        );
    }
    assert_eq!(Version::new("1.0").compare(&Version::new("1.0.0")), Ordering::Equal);
}
