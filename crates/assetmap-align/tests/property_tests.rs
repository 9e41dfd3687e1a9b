//! Property tests for the matcher and both mapping stages.

use assetmap_align::*;
use proptest::prelude::*;
use proptest::strategy::Strategy;
use std::collections::{BTreeSet, HashSet};

// ============================================================================
// Strategies
// ============================================================================

fn word() -> impl Strategy<Value = String> {
    "[A-Za-z ]{0,12}"
}

fn words(min: usize, max: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(word(), min..=max)
}

fn overrides_and_lists() -> impl Strategy<Value = (Vec<String>, Vec<String>, OverrideMap)> {
    (words(0, 8), words(0, 8)).prop_flat_map(|(sources, targets)| {
        let n = sources.len();
        let picks = proptest::collection::vec((0..n.max(1), 0..targets.len().max(1)), 0..=n);
        (Just(sources), Just(targets), picks).prop_map(|(sources, targets, picks)| {
            let overrides: OverrideMap = picks
                .into_iter()
                .filter(|_| !sources.is_empty() && !targets.is_empty())
                .map(|(i, j)| (sources[i].clone(), targets[j].clone()))
                .collect();
            (sources, targets, overrides)
        })
    })
}

fn check_classification(c: &Correspondence) -> Result<(), TestCaseError> {
    let expected = match (c.source(), c.target()) {
        (Some(s), Some(t)) if s == t => Classification::Match,
        (Some(_), Some(_)) => Classification::Rename,
        (Some(_), None) => Classification::SourceOnly,
        (None, Some(_)) => Classification::TargetOnly,
        (None, None) => return Err(TestCaseError::fail("both sides absent")),
    };
    prop_assert_eq!(c.classification(), expected);
    Ok(())
}

// ============================================================================
// Similarity
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn ratio_is_bounded(a in word(), b in word()) {
        let r = ratio(&a, &b);
        prop_assert!((0.0..=1.0).contains(&r));
    }

    #[test]
    fn best_match_is_maximal(x in word(), ys in words(1, 10)) {
        let best = best_match(&x, &ys).unwrap();
        for y in &ys {
            prop_assert!(best.score >= ratio(&x, y));
        }
        prop_assert_eq!(best.target, ys[best.index].as_str());
        // Last-wins tie-break: nothing after the winner scores as high.
        for y in &ys[best.index + 1..] {
            prop_assert!(ratio(&x, y) < best.score);
        }
    }

    #[test]
    fn best_match_of_self_is_perfect(x in "[A-Z]{1,10}") {
        let targets = [x.clone()];
        let best = best_match(&x, &targets).unwrap();
        prop_assert_eq!(best.score, 1.0);
        prop_assert_eq!(best.target, x.as_str());
    }

    #[test]
    fn empty_candidate_scores_zero(ys in proptest::collection::vec("[A-Z]{1,8}", 1..6)) {
        prop_assert_eq!(best_match("", &ys).unwrap().score, 0.0);
    }
}

// ============================================================================
// Auto-mapping coverage
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn auto_map_covers_every_target(sources in words(0, 8), targets in words(0, 8)) {
        let rows = auto_map(&sources, &targets);

        let seen: BTreeSet<&str> = rows.iter().filter_map(|r| r.target()).collect();
        let expected: BTreeSet<&str> = targets.iter().map(String::as_str).collect();
        prop_assert_eq!(seen, expected);

        // One row per source, in order.
        let from_sources: Vec<&str> = rows.iter().filter_map(|r| r.source()).collect();
        let expected_sources: Vec<&str> = sources.iter().map(String::as_str).collect();
        prop_assert_eq!(from_sources, expected_sources);

        for r in &rows {
            check_classification(r)?;
            if let Some(score) = r.similarity() {
                prop_assert!(score > AUTO_MATCH_THRESHOLD);
            }
        }
    }

    #[test]
    fn override_map_reports_every_key_once((sources, targets, overrides) in overrides_and_lists()) {
        let rows = override_map(&sources, &targets, &overrides);

        for (key, value) in overrides.iter() {
            let hits: Vec<_> = rows.iter().filter(|r| r.source() == Some(key)).collect();
            // Duplicate source names produce one row per occurrence.
            let occurrences = sources.iter().filter(|s| s.as_str() == key).count().max(1);
            prop_assert_eq!(hits.len(), occurrences);
            prop_assert!(hits.iter().all(|r| r.target() == Some(value)));
        }

        let seen: HashSet<&str> = rows.iter().filter_map(|r| r.target()).collect();
        for t in &targets {
            prop_assert!(seen.contains(t.as_str()));
        }
        for r in &rows {
            check_classification(r)?;
        }
    }
}
