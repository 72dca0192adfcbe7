//! Benchmarks for parsing and aggregation throughput.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use ipharvest::aggregator::{aggregate, Numbering};
use ipharvest::model::Category;
use ipharvest::parser::{parse_list, parse_mixed};
use ipharvest::subscription::parse_subscription;

/// Generate distinct IPv4 list lines, some with an inline remark
fn generate_list(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let line = format!("104.{}.{}.{}", (i / 65536) % 256, (i / 256) % 256, i % 256);
            if i % 3 == 0 {
                format!("{}#note", line)
            } else {
                line
            }
        })
        .collect()
}

/// Generate mixed-remark lines cycling through the carrier codes
fn generate_mixed(count: usize) -> Vec<String> {
    const REMARKS: [&str; 4] = ["CT-SH", "CU-HK", "CM", "HKG"];
    (0..count)
        .map(|i| {
            format!(
                "172.{}.{}.{}#{}",
                (i / 65536) % 256,
                (i / 256) % 256,
                i % 256,
                REMARKS[i % REMARKS.len()]
            )
        })
        .collect()
}

fn generate_subscription(count: usize) -> String {
    let body: Vec<String> = (0..count)
        .map(|i| {
            format!(
                "vless://uuid@162.{}.{}.{}:{}?security=tls#US-{}",
                (i / 65536) % 256,
                (i / 256) % 256,
                i % 256,
                if i % 5 == 0 { 8443 } else { 443 },
                i
            )
        })
        .collect();
    STANDARD.encode(body.join("\n"))
}

fn bench_parse_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_list");

    for size in [1_000, 10_000, 50_000] {
        let lines = generate_list(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &lines, |b, lines| {
            b.iter(|| parse_list(black_box(lines), Category::Telecom))
        });
    }

    group.finish();
}

fn bench_parse_mixed(c: &mut Criterion) {
    let lines = generate_mixed(10_000);
    c.bench_function("parse_mixed_10k", |b| {
        b.iter(|| parse_mixed(black_box(&lines)))
    });
}

fn bench_parse_subscription(c: &mut Criterion) {
    let blob = generate_subscription(5_000);
    c.bench_function("parse_subscription_5k", |b| {
        b.iter(|| parse_subscription(black_box(&blob)))
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for size in [1_000, 10_000, 50_000] {
        let telecom = parse_list(generate_list(size), Category::Telecom);
        // Half of the mixed batch repeats telecom addresses
        let mixed = parse_mixed(generate_mixed(size));
        let overlap = parse_list(generate_list(size / 2), Category::Unicom);
        let sources = vec![telecom, mixed, overlap];

        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &sources,
            |b, sources| b.iter(|| aggregate(black_box(sources.clone()), Numbering::default())),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_list,
    bench_parse_mixed,
    bench_parse_subscription,
    bench_aggregate
);
criterion_main!(benches);
