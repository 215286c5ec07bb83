//! Compilation benchmarks — pattern and chain construction.
//!
//! Measures the one-time cost of compiling wildcard patterns to anchored
//! regexes and of registering filter chains on a query.

use scry::prelude::*;
use std::sync::Arc;

fn main() {
    divan::main();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Pattern compilation
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn compile_literal(bencher: divan::Bencher) {
    bencher.bench_local(|| Pattern::compile("App\\Models\\User"));
}

#[divan::bench]
fn compile_trailing_wildcard(bencher: divan::Bencher) {
    bencher.bench_local(|| Pattern::compile("App\\Models\\*"));
}

#[divan::bench]
fn compile_mixed_wildcards(bencher: divan::Bencher) {
    bencher.bench_local(|| Pattern::compile("*\\Models\\*User*"));
}

#[divan::bench(args = [1, 4, 8, 16])]
fn compile_wildcard_count(bencher: divan::Bencher, n: usize) {
    let pattern = "Seg*".repeat(n);

    bencher.bench_local(|| Pattern::compile(&pattern));
}

#[divan::bench(args = [16, 64, 256, 1024])]
fn compile_literal_length(bencher: divan::Bencher, len: usize) {
    let pattern = "x".repeat(len);

    bencher.bench_local(|| Pattern::compile(&pattern));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Chain registration at scale
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

fn snapshot() -> Arc<dyn TypeSource> {
    let records = (0..10)
        .map(|i| TypeRecord::new(format!("App\\Type{i}"), TypeKind::Class))
        .collect();
    Arc::new(Snapshot(records))
}

#[divan::bench(args = [1, 10, 50])]
fn register_name_filters(bencher: divan::Bencher, n: usize) {
    let source = snapshot();

    bencher.bench_local(|| {
        let mut query = TypeQuery::new(Arc::clone(&source));
        for _ in 0..n {
            query = query.where_name_starts_with("App\\");
        }
        query
    });
}

#[divan::bench(args = [1, 10, 50])]
fn register_wildcard_filters(bencher: divan::Bencher, n: usize) {
    let source = snapshot();

    bencher.bench_local(|| {
        let mut query = TypeQuery::new(Arc::clone(&source));
        for i in 0..n {
            query = query.where_name(&format!("App\\*{i}")).unwrap();
        }
        query
    });
}
