use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use reconcile::config::ReconcileConfig;
use reconcile::hash::HashVariant;
use reconcile::mapping::cache::RowCache;
use reconcile::mapping::MethodKind;
use reconcile::reconciler::reconcile_in_memory;

fn config(method: MethodKind, n: u32) -> ReconcileConfig {
    ReconcileConfig {
        method,
        universe_size: n,
        superset_assumption: false,
        hash_variant: HashVariant::Xxh64,
        hash_seed: 99,
        max_iterations: 64,
    }
}

#[test]
fn egh_recovers_a_small_symmetric_difference() {
    let _ = tracing_subscriber::fmt::try_init();
    let cache = Arc::new(RowCache::new());
    let mine: Vec<u32> = (1..=90).collect();
    let mut theirs: Vec<u32> = (1..=85).collect();
    theirs.extend([200, 201, 202]);

    let result = reconcile_in_memory(&mine, &theirs, config(MethodKind::Egh, 1000), cache).unwrap();
    let mut in_mine = result.in_mine.clone();
    in_mine.sort_unstable();
    let mut in_theirs = result.in_theirs.clone();
    in_theirs.sort_unstable();

    assert_eq!(in_mine, (86..=90).collect::<Vec<_>>());
    assert_eq!(in_theirs, vec![200, 201, 202]);
}

#[test]
fn identical_sets_produce_an_empty_diff_on_the_first_iteration() {
    let cache = Arc::new(RowCache::new());
    let symbols: Vec<u32> = (1..=50).collect();
    let result =
        reconcile_in_memory(&symbols, &symbols, config(MethodKind::Egh, 1000), cache).unwrap();
    assert!(result.in_mine.is_empty());
    assert!(result.in_theirs.is_empty());
    assert_eq!(result.stats.cells_peeled, 0);
}

#[test]
fn disjoint_small_sets_reconcile_under_every_method() {
    let mine: Vec<u32> = vec![1, 5, 9];
    let theirs: Vec<u32> = vec![2, 6, 10];
    for method in [
        MethodKind::Egh,
        MethodKind::ExtendedHamming,
        MethodKind::Ols,
        MethodKind::Bch,
        MethodKind::Idm,
    ] {
        let cache = Arc::new(RowCache::new());
        let result = reconcile_in_memory(&mine, &theirs, config(method, 1000), cache)
            .unwrap_or_else(|e| panic!("method {method:?} failed to reconcile: {e}"));
        let mut in_mine = result.in_mine.clone();
        in_mine.sort_unstable();
        let mut in_theirs = result.in_theirs.clone();
        in_theirs.sort_unstable();
        assert_eq!(in_mine, vec![1, 5, 9], "method {method:?}");
        assert_eq!(in_theirs, vec![2, 6, 10], "method {method:?}");
    }
}

#[test]
fn superset_assumption_skips_checksums_and_still_decodes() {
    let cache = Arc::new(RowCache::new());
    let mut cfg = config(MethodKind::Egh, 1000);
    cfg.superset_assumption = true;
    let mine: Vec<u32> = (1..=20).collect();
    let theirs: Vec<u32> = (1..=18).collect();
    let result = reconcile_in_memory(&mine, &theirs, cfg, cache).unwrap();
    let mut in_mine = result.in_mine.clone();
    in_mine.sort_unstable();
    assert_eq!(in_mine, vec![19, 20]);
    assert!(result.in_theirs.is_empty());
}

#[test]
fn a_difference_too_large_for_one_iteration_is_reported_rather_than_silently_wrong() {
    let cache = Arc::new(RowCache::new());
    // n=1000 -> BCH's m=10, so iteration 1 has only 10 cells; 60 one-sided
    // differences cannot plausibly all land in distinct cells, so decoding
    // stays incomplete and the driver should stop at the iteration ceiling
    // rather than ever fabricate a result.
    let mut cfg = config(MethodKind::Bch, 1000);
    cfg.max_iterations = 1;
    let mine: Vec<u32> = (1..=60).collect();
    let theirs: Vec<u32> = vec![];
    let err = reconcile_in_memory(&mine, &theirs, cfg, cache).unwrap_err();
    assert!(matches!(
        err,
        reconcile::ReconcileError::ResourceExhaustion(_)
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]
    #[test]
    fn egh_reconciliation_matches_the_true_symmetric_difference(
        common in prop::collection::vec(1u32..=900, 0..40),
        mine_only in prop::collection::vec(901u32..=950, 0..5),
        theirs_only in prop::collection::vec(951u32..=999, 0..5),
    ) {
        let common: HashSet<u32> = common.into_iter().collect();
        let mine_only: HashSet<u32> = mine_only.into_iter().collect();
        let theirs_only: HashSet<u32> = theirs_only.into_iter().collect();

        let mut mine: Vec<u32> = common.iter().chain(mine_only.iter()).copied().collect();
        let mut theirs: Vec<u32> = common.iter().chain(theirs_only.iter()).copied().collect();
        mine.sort_unstable();
        theirs.sort_unstable();

        let cache = Arc::new(RowCache::new());
        let result = reconcile_in_memory(&mine, &theirs, config(MethodKind::Egh, 1000), cache).unwrap();

        let got_mine: HashSet<u32> = result.in_mine.into_iter().collect();
        let got_theirs: HashSet<u32> = result.in_theirs.into_iter().collect();
        prop_assert_eq!(got_mine, mine_only);
        prop_assert_eq!(got_theirs, theirs_only);
    }
}
