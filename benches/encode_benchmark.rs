//! Benchmarks for flow-log conversion throughput.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nsgflow::{ExportOptions, FlowEncoder, FlowLogConverter, FlowLogRecords, PacketContext};

/// Generate a blob of `documents` documents with `tuples` tuples each.
fn generate_blob(documents: usize, tuples: usize) -> String {
    let mut records = Vec::with_capacity(documents);
    for d in 0..documents {
        let flow_tuples: Vec<String> = (0..tuples)
            .map(|i| {
                let protocol = if i % 4 == 0 { "U" } else { "T" };
                let direction = if i % 2 == 0 { "I" } else { "O" };
                let state = match i % 3 {
                    0 => "B",
                    1 => "C",
                    _ => "E",
                };
                format!(
                    "\"{},10.0.{}.{},10.1.{}.{},{},443,{},{},A,{},{},{},{},{}\"",
                    1_577_836_800 + i,
                    d % 256,
                    i % 256,
                    d % 256,
                    (i + 1) % 256,
                    40_000 + i % 20_000,
                    protocol,
                    direction,
                    state,
                    i,
                    i * 100,
                    i * 2,
                    i * 200
                )
            })
            .collect();
        records.push(format!(
            r#"{{"time":"2020-01-01T00:00:00Z","category":"NetworkSecurityGroupFlowEvent","resourceId":"/SUBSCRIPTIONS/X","operationName":"NetworkSecurityGroupFlowEvents","properties":{{"Version":2,"flows":[{{"rule":"DefaultRule_AllowInternetOutBound","flows":[{{"mac":"000D3AF87856","flowTuples":[{}]}}]}}]}}}}"#,
            flow_tuples.join(",")
        ));
    }
    format!(r#"{{"records":[{}]}}"#, records.join(","))
}

/// Benchmark flattening documents into records without encoding.
fn bench_denormalize(c: &mut Criterion) {
    let blob = generate_blob(1, 1_000);
    let logs = FlowLogRecords::from_json(&blob).unwrap();
    let document = &logs.records[0];

    let mut group = c.benchmark_group("denormalize");
    group.throughput(Throughput::Elements(document.tuple_count() as u64));

    group.bench_function("1k_tuples", |b| {
        b.iter(|| {
            for record in document.flow_records() {
                black_box(record.unwrap());
            }
        })
    });

    group.finish();
}

/// Benchmark packet encoding at different batch sizes.
fn bench_encode_packet(c: &mut Criterion) {
    let encoder = FlowEncoder::new(&ExportOptions::default()).unwrap();
    let mut group = c.benchmark_group("encode_packet");

    for size in [1, 100, 1_000].iter() {
        let blob = generate_blob(1, *size);
        let logs = FlowLogRecords::from_json(&blob).unwrap();
        let records: Vec<_> = logs.records[0]
            .flow_records()
            .collect::<Result<_, _>>()
            .unwrap();

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("records", size), size, |b, _| {
            b.iter(|| black_box(encoder.encode_batch(&records, PacketContext::new(0, 0))))
        });
    }

    group.finish();
}

/// Benchmark the whole blob path: parse, flatten, encode, base64.
fn bench_convert_blob(c: &mut Criterion) {
    let blob = generate_blob(50, 200);

    let mut group = c.benchmark_group("convert_blob");
    group.throughput(Throughput::Bytes(blob.len() as u64));

    group.bench_function("50_documents", |b| {
        b.iter_batched(
            || FlowLogConverter::new(&ExportOptions::default()).unwrap(),
            |mut converter| black_box(converter.convert(&blob).unwrap()),
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_denormalize, bench_encode_packet, bench_convert_blob);

criterion_main!(benches);
