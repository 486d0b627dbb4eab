//! Checks the counters a station emits while decoding a noisy stream.
//!
//! Each test captures metrics with a thread-local recorder so tests do not
//! share global state.

use std::collections::BTreeMap;

use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use ws3_metrics::metric_defs;
use ws3_protocol::PacketVariant;
use ws3_station::{MemorySource, Station, StationConfig};

/// One emitted series: name, labels and value.
#[derive(Debug)]
struct Series {
    name: String,
    labels: BTreeMap<String, String>,
    value: DebugValue,
}

fn capture(stream: &[u8]) -> Vec<Series> {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let config = StationConfig {
            name: "roof".to_string(),
            variant: PacketVariant::Basic,
            ..StationConfig::default()
        };
        let mut source = MemorySource::new();
        source.feed(stream);
        let mut station = Station::new(config, source).unwrap();
        station.drain().unwrap();
    });

    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(key, _unit, _description, value)| {
            let key = key.key();
            Series {
                name: key.name().to_string(),
                labels: key
                    .labels()
                    .map(|label| (label.key().to_string(), label.value().to_string()))
                    .collect(),
                value,
            }
        })
        .collect()
}

fn counter(series: &[Series], name: &str, extra: &[(&str, &str)]) -> Option<u64> {
    series
        .iter()
        .find(|s| {
            s.name == name && extra.iter().all(|(k, v)| s.labels.get(*k).map(String::as_str) == Some(*v))
        })
        .and_then(|s| match s.value {
            DebugValue::Counter(n) => Some(n),
            _ => None,
        })
}

fn noisy_stream() -> Vec<u8> {
    let mut stream = Vec::new();
    stream.extend_from_slice(b"c225s000g000t093r000p000h18b09890*35\r\n");
    stream.extend_from_slice(b"c000s000g000t069r000p000h49b09945*39\r\n");
    stream.extend_from_slice(b"hello\r\n");
    stream.extend_from_slice(&[b'x'; 100]);
    stream.extend_from_slice(b"\n");
    stream.extend_from_slice(b"c000s000g000t075r000p019h43b09940*32\r\n");
    stream
}

#[test]
fn counts_packets_by_outcome() {
    let stream = noisy_stream();
    let series = capture(&stream);

    assert_eq!(counter(&series, metric_defs::PACKETS_ACCEPTED.name, &[]), Some(2));
    assert_eq!(
        counter(
            &series,
            metric_defs::PACKETS_REJECTED.name,
            &[("reason", "checksum_mismatch")]
        ),
        Some(1)
    );
    assert_eq!(
        counter(
            &series,
            metric_defs::PACKETS_REJECTED.name,
            &[("reason", "missing_delimiter")]
        ),
        Some(1)
    );
    assert_eq!(
        counter(&series, metric_defs::PACKETS_REJECTED.name, &[("reason", "tag_not_found")]),
        None
    );
    assert_eq!(counter(&series, metric_defs::FRAMER_OVERFLOWS.name, &[]), Some(1));
    assert_eq!(
        counter(&series, metric_defs::BYTES_RECEIVED.name, &[]),
        Some(stream.len() as u64)
    );
}

#[test]
fn emitted_labels_match_declarations() {
    let series = capture(&noisy_stream());
    assert!(!series.is_empty());

    for s in &series {
        let declared = metric_defs::find(&s.name)
            .unwrap_or_else(|| panic!("metric {} is not declared", s.name));
        let emitted: Vec<&str> = s.labels.keys().map(String::as_str).collect();
        let mut expected: Vec<&str> = declared.labels.to_vec();
        expected.sort_unstable();

        assert_eq!(emitted, expected, "labels of {}", s.name);
        assert_eq!(s.labels["station"], "roof");
        assert_eq!(s.labels["variant"], "basic");
    }
}

#[test]
fn quiet_source_emits_no_packet_counters() {
    let series = capture(b"");
    assert_eq!(counter(&series, metric_defs::PACKETS_ACCEPTED.name, &[]), None);
    assert_eq!(counter(&series, metric_defs::BYTES_RECEIVED.name, &[]), None);
}
