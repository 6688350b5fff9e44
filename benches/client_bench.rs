// Benchmarks for the request and response hot paths
// Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use etcd_v2_client::path::{resolve, with_query};
use etcd_v2_client::response::parse;
use etcd_v2_client::{ops, RawResponse, WatchOptions};
use http::StatusCode;

fn listing_body(children: usize) -> String {
    let nodes: Vec<String> = (0..children)
        .map(|i| {
            format!(
                r#"{{"key":"/dir/key_{i}","value":"value_{i}","modifiedIndex":{i},"createdIndex":{i}}}"#
            )
        })
        .collect();
    format!(
        r#"{{"action":"get","node":{{"key":"/dir","dir":true,"nodes":[{}]}}}}"#,
        nodes.join(",")
    )
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    group.bench_function("plain", |b| {
        b.iter(|| black_box(resolve(black_box("services/web/instance-1"), "/app", "v2")));
    });
    group.bench_function("needs_encoding", |b| {
        b.iter(|| black_box(resolve(black_box("my key/with?odd#chars"), "/app", "v2")));
    });
    group.bench_function("watch_uri", |b| {
        let options = WatchOptions {
            recursive: true,
            wait_index: Some(42),
        };
        b.iter(|| {
            let req = ops::watch(black_box("config"), &options);
            black_box(with_query(&resolve(&req.key, "/app", "v2"), &req.query))
        });
    });
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for children in [1usize, 100, 1_000] {
        let raw = RawResponse::new(StatusCode::OK, listing_body(children));
        group.throughput(Throughput::Bytes(raw.body.len() as u64));
        group.bench_with_input(BenchmarkId::new("listing", children), &raw, |b, raw| {
            b.iter(|| black_box(parse(raw).unwrap()));
        });
    }

    let error = RawResponse::new(
        StatusCode::PRECONDITION_FAILED,
        r#"{"errorCode":105,"message":"Key already exists","cause":"/a","index":10}"#,
    );
    group.bench_function("store_error", |b| {
        b.iter(|| black_box(parse(&error).unwrap_err()));
    });
    group.finish();
}

criterion_group!(benches, bench_resolve, bench_parse);
criterion_main!(benches);
