use std::thread;

use pretty_assertions::assert_eq;
use rand::Rng;
use serde_json::json;

use tsquery_model::QueryRequest;
use tsquery_runtime::{execute_request, MemorySeriesProvider};

const T0: i64 = 1356998400;
const WRITERS: usize = 9;
const POINTS_PER_WRITER: i64 = 50;

#[test]
fn nine_parallel_writers_are_visible_to_one_query() {
    let provider = MemorySeriesProvider::new();

    thread::scope(|scope| {
        for writer in 0..WRITERS as i64 {
            let provider = &provider;
            scope.spawn(move || {
                let mut rng = rand::thread_rng();
                for i in 0..POINTS_PER_WRITER {
                    let timestamp = T0 + 60 * (writer * POINTS_PER_WRITER + i);
                    let value = rng.gen_range(0.0..100.0);
                    provider
                        .put("ingest.load", &[("host", "shared")], timestamp, value)
                        .unwrap();
                }
            });
        }
    });

    let req: QueryRequest = serde_json::from_value(json!({
        "start": T0,
        "end": T0 + 60 * WRITERS as i64 * POINTS_PER_WRITER,
        "queries": [{"metric": "ingest.load", "aggregator": "sum"}]
    }))
    .unwrap();
    let results = execute_request(&provider, &req).unwrap();

    // A single series: every writer's points land at distinct timestamps
    // and the read sees all of them once the writes complete.
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].dps.len(), WRITERS * POINTS_PER_WRITER as usize);
}

#[test]
fn writers_on_distinct_series_group_cleanly() {
    let provider = MemorySeriesProvider::new();

    thread::scope(|scope| {
        for writer in 0..WRITERS {
            let provider = &provider;
            scope.spawn(move || {
                let host = format!("host{writer}");
                for i in 0..POINTS_PER_WRITER {
                    provider
                        .put("ingest.load", &[("host", &host)], T0 + 60 * i, 1.0)
                        .unwrap();
                }
            });
        }
    });

    let req: QueryRequest = serde_json::from_value(json!({
        "start": T0,
        "end": T0 + 60 * POINTS_PER_WRITER,
        "queries": [{
            "metric": "ingest.load",
            "aggregator": "sum",
            "filters": [{"type": "wildcard", "tagk": "host", "filter": "*", "groupBy": true}]
        }]
    }))
    .unwrap();
    let results = execute_request(&provider, &req).unwrap();

    assert_eq!(results.len(), WRITERS);
    for group in &results {
        assert_eq!(group.dps.len(), POINTS_PER_WRITER as usize);
        for (_, value) in group.dps.iter() {
            assert_eq!(*value, tsquery_model::WireValue::Number(1.0));
        }
    }
}
