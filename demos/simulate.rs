//! Drives one in-process reconciliation session over a local channel pair
//! and prints what each side recovers. `cargo run --example simulate`.

use std::sync::Arc;
use std::thread;

use reconcile::config::ReconcileConfig;
use reconcile::hash::HashVariant;
use reconcile::mapping::{cache::RowCache, MethodKind};
use reconcile::reconciler::Reconciler;
use reconcile::transport::local_pair;

fn main() {
    tracing_subscriber::fmt::init();

    let universe_size = 10_000;
    let mine: Vec<u32> = (1..=500).collect();
    let theirs: Vec<u32> = (1..=480).chain(9501..=9520).collect();

    let config = ReconcileConfig {
        method: MethodKind::Egh,
        universe_size,
        superset_assumption: false,
        hash_variant: HashVariant::Xxh64,
        hash_seed: 0xC0FFEE,
        max_iterations: 64,
    };

    let cache = Arc::new(RowCache::new());
    let initiator = Reconciler::new(config, cache.clone());
    let responder = Reconciler::new(config, cache);
    let (mut end_a, mut end_b) = local_pair();

    let responder_handle = thread::spawn(move || responder.run_responder(&theirs, &mut end_b));
    let result = initiator
        .run_initiator(&mine, &mut end_a)
        .expect("reconciliation should converge within max_iterations");
    responder_handle.join().unwrap().expect("responder should not error");

    println!(
        "recovered {} symbols only I have, {} symbols only my peer has",
        result.in_mine.len(),
        result.in_theirs.len()
    );
    println!("decoding stats: {}", result.stats);
}
