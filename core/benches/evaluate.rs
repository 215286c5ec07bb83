//! Evaluation benchmarks — the terminal hot path.
//!
//! Measures: snapshot enumeration plus filtering, wildcard scans, AND-chains,
//! OR-branches, member walks over deep hierarchies, and trace overhead.

use scry::prelude::*;
use std::sync::Arc;

fn main() {
    divan::main();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Test fixtures
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
struct Snapshot(Vec<TypeRecord>);

impl TypeSource for Snapshot {
    fn type_names(&self) -> Vec<String> {
        self.0.iter().map(|r| r.name.clone()).collect()
    }

    fn lookup(&self, name: &str) -> Option<TypeRecord> {
        self.0.iter().find(|r| r.name == name).cloned()
    }
}

/// `n` classes split across two namespaces.
fn snapshot(n: usize) -> Arc<dyn TypeSource> {
    let records = (0..n)
        .map(|i| {
            let name = if i % 2 == 0 {
                format!("App\\Models\\Model{i}")
            } else {
                format!("App\\Services\\Service{i}")
            };
            TypeRecord::new(name, TypeKind::Class)
        })
        .collect();
    Arc::new(Snapshot(records))
}

/// A single-inheritance chain `Level0 extends Level1 extends ...`, one method
/// per level.
fn chain_snapshot(depth: usize) -> Arc<dyn TypeSource> {
    let records = (0..depth)
        .map(|i| {
            let mut record = TypeRecord::new(format!("App\\Level{i}"), TypeKind::Class);
            if i + 1 < depth {
                record.parent = Some(format!("App\\Level{}", i + 1));
            }
            record.methods.push(MethodRecord::new(format!("method{i}")));
            record
        })
        .collect();
    Arc::new(Snapshot(records))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Core scenario: exact name (baseline)
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn exact_name_hit(bencher: divan::Bencher) {
    let query = TypeQuery::new(snapshot(100)).where_name_equals("App\\Models\\Model42");

    bencher.bench_local(|| query.exists());
}

#[divan::bench]
fn exact_name_miss(bencher: divan::Bencher) {
    let query = TypeQuery::new(snapshot(100)).where_name_equals("App\\Models\\Missing");

    bencher.bench_local(|| query.exists());
}

// ═══════════════════════════════════════════════════════════════════════════════
// Core scenario: wildcard scan
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn wildcard_scan(bencher: divan::Bencher) {
    let query = TypeQuery::new(snapshot(100))
        .where_name("App\\Models\\*")
        .unwrap();

    bencher.bench_local(|| query.count());
}

#[divan::bench]
fn namespace_scan(bencher: divan::Bencher) {
    let query = TypeQuery::new(snapshot(100)).in_namespace("App\\Services");

    bencher.bench_local(|| query.count());
}

// ═══════════════════════════════════════════════════════════════════════════════
// Chain composition: AND and OR
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn and_chain_of_three(bencher: divan::Bencher) {
    let query = TypeQuery::new(snapshot(100))
        .where_name_starts_with("App\\")
        .where_name_contains("Models")
        .where_name_ends_with("2");

    bencher.bench_local(|| query.count());
}

#[divan::bench]
fn or_branch(bencher: divan::Bencher) {
    let query = TypeQuery::new(snapshot(100))
        .where_name_contains("Model")
        .or(|q| Ok(q.where_name_contains("Service")))
        .unwrap();

    bencher.bench_local(|| query.count());
}

// ═══════════════════════════════════════════════════════════════════════════════
// Scaling: snapshot size (enumeration cost)
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench(args = [10, 100, 1000])]
fn type_count(bencher: divan::Bencher, n: usize) {
    let query = TypeQuery::new(snapshot(n))
        .where_name("App\\Models\\*")
        .unwrap();

    bencher.bench_local(|| query.count());
}

// ═══════════════════════════════════════════════════════════════════════════════
// Scaling: chain length (per-filter overhead)
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench(args = [1, 4, 8, 16])]
fn filter_count(bencher: divan::Bencher, n: usize) {
    let mut query = TypeQuery::new(snapshot(100));
    for _ in 0..n {
        query = query.where_name_starts_with("App\\");
    }

    bencher.bench_local(|| query.count());
}

// ═══════════════════════════════════════════════════════════════════════════════
// Scaling: member walks over deep hierarchies
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench(args = [1, 4, 8, 16])]
fn member_walk_depth(bencher: divan::Bencher, depth: usize) {
    let source = chain_snapshot(depth);

    bencher.bench_local(|| source.all_methods("App\\Level0"));
}

#[divan::bench(args = [1, 4, 8, 16])]
fn ancestry_depth(bencher: divan::Bencher, depth: usize) {
    let source = chain_snapshot(depth);

    bencher.bench_local(|| source.extends("App\\Level0", "Level15"));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Trace overhead: terminal vs explain
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn trace_overhead_terminal(bencher: divan::Bencher) {
    let query = TypeQuery::new(snapshot(100))
        .where_name_starts_with("App\\Models\\")
        .where_name_ends_with("2");

    bencher.bench_local(|| query.exists());
}

#[divan::bench]
fn trace_overhead_explain(bencher: divan::Bencher) {
    let query = TypeQuery::new(snapshot(100))
        .where_name_starts_with("App\\Models\\")
        .where_name_ends_with("2");

    bencher.bench_local(|| query.explain("App\\Models\\Model42"));
}
