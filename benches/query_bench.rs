//! Benchmarks for query rendering and result decoding
//!
//! Run with: cargo bench

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use serde_json::json;
use tsa::mapping::{QueryResponse, ResultMapper, Series};
use tsa::query::{QueryCriteria, Resolution, Shortcut};
use tsa::SensorData;

fn create_response(rows: usize) -> QueryResponse {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let series = (0..rows).fold(
        Series::new("sensorData")
            .columns(["time", "mean", "max", "min"])
            .tag("tenantId", "t1")
            .tag("id", "s1"),
        |series, i| {
            let time = start + chrono::Duration::seconds(30 * i as i64);
            series.row(vec![
                json!(time.to_rfc3339()),
                json!(20.0 + i as f64 * 0.01),
                json!(25.0),
                json!(15.0),
            ])
        },
    );
    QueryResponse::with_series(vec![series])
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    group.bench_function("bucketed", |b| {
        b.iter(|| {
            QueryCriteria::builder()
                .database("iot")
                .table("sensorData")
                .tenant_id(black_box("t1"))
                .id("s1")
                .from("now()-5m")
                .select("mean(*)")
                .interval(30, Resolution::Seconds)
                .build()
                .unwrap()
                .to_query()
                .unwrap()
        })
    });

    group.bench_function("drill_down_ladder", |b| {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let month = Shortcut::LastMonthGroupBy
            .criteria("t1", Some("s1"))
            .table("sensorData")
            .build()
            .unwrap();

        b.iter(|| {
            let mut current = month.clone();
            while let Some(finer) = current.drill_down(black_box(start)).unwrap() {
                current = finer;
            }
            current.to_query().unwrap()
        })
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let mapper = ResultMapper::new();

    for rows in [100, 1000, 10000] {
        let response = create_response(rows);
        group.throughput(Throughput::Elements(rows as u64));

        group.bench_function(format!("sensor_data_{}", rows), |b| {
            b.iter(|| {
                let data: Vec<SensorData> = mapper.to_records(black_box(&response)).unwrap();
                data
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render, bench_decode);
criterion_main!(benches);
