//! Codec benchmark suite.
//!
//! Benchmarks the per-request message work:
//! - Request encoding with growing bindings
//! - Inbound frame decoding
//! - Response treatment with streamed batches
//!
//! Run with: cargo bench --bench codec
//! Results saved to: target/criterion/

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use gremlin_client::RequestId;
use gremlin_client::protocol::{Bindings, InboundMessage, Request, treat_response};
use serde_json::{Value, json};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const BINDING_COUNTS: &[usize] = &[0, 16, 256];
const BATCH_COUNTS: &[usize] = &[1, 8, 64];

// ============================================================================
// Helpers
// ============================================================================

fn response_frame(request_id: RequestId, code: u16, items: usize) -> Value {
    json!({
        "requestId": request_id.to_string(),
        "status": { "code": code, "message": "", "attributes": {} },
        "result": { "data": (0..items).collect::<Vec<_>>(), "meta": {} }
    })
}

// ============================================================================
// Benchmark: Request Encoding
// ============================================================================

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for &count in BINDING_COUNTS {
        let bindings: Bindings = (0..count)
            .map(|i| (format!("var{i}"), json!(i)))
            .collect();

        group.bench_with_input(BenchmarkId::new("eval", count), &bindings, |b, bindings| {
            b.iter(|| {
                Request::eval(RequestId::generate(), "g.V().has('age', gt(var0))", bindings)
                    .encode()
                    .unwrap()
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Inbound Decoding
// ============================================================================

fn bench_decode(c: &mut Criterion) {
    let raw = response_frame(RequestId::generate(), 200, 100).to_string();

    c.bench_function("decode/frame_100_items", |b| {
        b.iter(|| InboundMessage::decode(black_box(&raw)).unwrap());
    });
}

// ============================================================================
// Benchmark: Response Treatment
// ============================================================================

fn bench_treat(c: &mut Criterion) {
    let mut group = c.benchmark_group("treat");
    let id = RequestId::generate();

    for &batches in BATCH_COUNTS {
        let partial: Vec<Value> = (0..batches - 1)
            .map(|_| json!((0..64).collect::<Vec<_>>()))
            .collect();
        let last = response_frame(id, 200, 64);

        group.bench_with_input(
            BenchmarkId::new("batches", batches),
            &(partial, last),
            |b, (partial, last)| {
                b.iter(|| treat_response(last.clone(), partial.clone()).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_treat);
criterion_main!(benches);
