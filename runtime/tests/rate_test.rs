use pretty_assertions::assert_eq;
use serde_json::json;

use tsquery_model::{QueryRequest, WireValue};
use tsquery_runtime::{execute_request, MemorySeriesProvider};

const T0: i64 = 1356998400;

fn request(body: serde_json::Value) -> QueryRequest {
    serde_json::from_value(body).unwrap()
}

#[test]
fn rate_emits_one_fewer_point_at_later_endpoints() {
    let provider = MemorySeriesProvider::new();
    for i in 0..10 {
        provider
            .put("m", &[("host", "a")], T0 + 60 * i, (i * 60) as f32)
            .unwrap();
    }

    let req = request(json!({
        "start": T0,
        "end": T0 + 600,
        "queries": [{"metric": "m", "aggregator": "sum", "rate": true}]
    }));
    let results = execute_request(&provider, &req).unwrap();
    assert_eq!(results.len(), 1);
    let dps: Vec<(i64, WireValue)> = results[0].dps.iter().copied().collect();
    assert_eq!(dps.len(), 9);
    for (i, (timestamp, value)) in dps.iter().enumerate() {
        assert_eq!(*timestamp, T0 + 60 * (i + 1) as i64);
        assert_eq!(*value, WireValue::Number(1.0));
    }
}

#[test]
fn counter_reset_uses_the_wraparound_formula() {
    let provider = MemorySeriesProvider::new();
    let values = [1.0, 10.0, 100.0, 1000.0, 1.0, 10.0, 100.0, 1000.0, 3000.0];
    for (i, value) in values.iter().enumerate() {
        provider
            .put("m", &[("host", "a")], T0 + 60 * i as i64, *value)
            .unwrap();
    }

    let req = request(json!({
        "start": T0,
        "end": T0 + 600,
        "queries": [{
            "metric": "m",
            "aggregator": "sum",
            "rate": true,
            "rateOptions": {"counter": true, "counterMax": 15000}
        }]
    }));
    let results = execute_request(&provider, &req).unwrap();
    let dps: Vec<(i64, WireValue)> = results[0].dps.iter().copied().collect();
    assert_eq!(dps.len(), values.len() - 1);

    // The drop from 1000 back to 1 wraps through the counter maximum
    // instead of going negative.
    let wrapped = (15000.0 - 1000.0 + 1.0) / 60.0;
    assert_eq!(dps[3], (T0 + 240, WireValue::Number(wrapped)));

    // Every other interval is a plain positive delta over 60s.
    assert_eq!(dps[0].1, WireValue::Number(9.0 / 60.0));
    assert_eq!(dps[7].1, WireValue::Number(2000.0 / 60.0));
}

#[test]
fn rates_above_the_reset_value_become_zero() {
    let provider = MemorySeriesProvider::new();
    for (i, value) in [100.0, 200.0, 1.0, 101.0].iter().enumerate() {
        provider
            .put("m", &[("host", "a")], T0 + 60 * i as i64, *value)
            .unwrap();
    }

    let req = request(json!({
        "start": T0,
        "end": T0 + 600,
        "queries": [{
            "metric": "m",
            "aggregator": "sum",
            "rate": true,
            "rateOptions": {"counter": true, "counterMax": 65535, "resetValue": 100}
        }]
    }));
    let results = execute_request(&provider, &req).unwrap();
    let dps: Vec<(i64, WireValue)> = results[0].dps.iter().copied().collect();

    // 200 -> 1 wraps to (65535 - 200 + 1)/60, far above the reset value,
    // so the interval reads as a discontinuity.
    assert_eq!(
        dps,
        vec![
            (T0 + 60, WireValue::Number(100.0 / 60.0)),
            (T0 + 120, WireValue::Number(0.0)),
            (T0 + 180, WireValue::Number(100.0 / 60.0)),
        ]
    );
}

#[test]
fn gauge_rate_keeps_negative_deltas() {
    let provider = MemorySeriesProvider::new();
    for (i, value) in [100.0, 40.0].iter().enumerate() {
        provider
            .put("m", &[("host", "a")], T0 + 60 * i as i64, *value)
            .unwrap();
    }

    let req = request(json!({
        "start": T0,
        "end": T0 + 600,
        "queries": [{"metric": "m", "aggregator": "sum", "rate": true}]
    }));
    let results = execute_request(&provider, &req).unwrap();
    let dps: Vec<(i64, WireValue)> = results[0].dps.iter().copied().collect();
    assert_eq!(dps, vec![(T0 + 60, WireValue::Number(-1.0))]);
}

#[test]
fn fill_markers_survive_the_rate_stage() {
    let provider = MemorySeriesProvider::new();
    provider.put("m", &[("host", "a")], T0, 0.0).unwrap();
    provider.put("m", &[("host", "a")], T0 + 60, 60.0).unwrap();
    provider.put("m", &[("host", "a")], T0 + 240, 240.0).unwrap();

    let req = request(json!({
        "start": T0,
        "end": T0 + 240,
        "queries": [{
            "metric": "m",
            "aggregator": "sum",
            "downsample": "1m-sum-null",
            "rate": true
        }]
    }));
    let results = execute_request(&provider, &req).unwrap();
    let dps: Vec<(i64, WireValue)> = results[0].dps.iter().copied().collect();
    assert_eq!(
        dps,
        vec![
            (T0 + 60, WireValue::Number(1.0)),
            (T0 + 120, WireValue::Null),
            (T0 + 180, WireValue::Null),
            (T0 + 240, WireValue::Null),
        ]
    );
}
