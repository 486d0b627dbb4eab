//! End-to-end tests driving a station from byte sources.

use std::io::Cursor;

use approx::assert_relative_eq;
use ws3_protocol::{encode_packet, PacketVariant, ParticleCounts, Reading};
use ws3_station::{ByteSource, MemorySource, ReaderSource, RecordingSink, Station, StationConfig};

fn config(variant: PacketVariant) -> StationConfig {
    StationConfig {
        name: "integration".to_string(),
        variant,
        read_chunk: 7,
        ..StationConfig::default()
    }
}

#[test]
fn capture_file_through_reader_source() {
    let capture = b"c000s000g000t069r000p000h49b09945*38\r\n\
                    c000s000g000t069r000p000h49b09945*39\r\n\
                    c000s000g000t075r000p019h43b09940*32\r\n"
        .to_vec();
    let mut station =
        Station::new(config(PacketVariant::Basic), ReaderSource::new(Cursor::new(capture))).unwrap();

    let mut results = Vec::new();
    while !station.is_exhausted() {
        results.extend(station.poll().unwrap().results);
    }

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_ok());

    let stats = station.stats();
    assert_eq!(stats.packets_accepted, 2);
    assert_eq!(stats.packets_rejected, 1);
    assert_eq!(stats.bytes_received, 38 * 3);

    let latest = station.latest().unwrap();
    assert_eq!(latest.temperature_f, 75);
    assert_relative_eq!(latest.rain_24h, 0.19);
}

#[test]
fn particulate_station_publishes_all_channels() {
    let reading = Reading {
        wind_direction: 90,
        temperature_f: 61,
        humidity: 77,
        air_pressure: 1013.2,
        particulates: Some(ParticleCounts::from_array([56, 90, 100, 494, 63, 70])),
        ..Reading::default()
    };
    let mut source = MemorySource::new();
    source.feed(&encode_packet(PacketVariant::Particulate, &reading).unwrap());

    let mut station = Station::new(config(PacketVariant::Particulate), source).unwrap();
    station.drain().unwrap();

    let mut sink = RecordingSink::new();
    assert!(station.publish(&mut sink));
    assert_eq!(sink.published.len(), 14);
    assert_eq!(sink.latest("particles_25um"), Some(494.0));
    assert_eq!(sink.latest("particles_100um"), Some(70.0));
    assert_relative_eq!(sink.latest("air_pressure").unwrap(), 1013.2, epsilon = 1e-3);
}

#[test]
fn overflow_is_counted_and_station_recovers() {
    let mut source = MemorySource::new();
    source.feed(&[b'x'; 500]);
    source.feed(b"\nc000s000g000t069r000p000h49b09945*38\n");

    let mut station = Station::new(config(PacketVariant::Basic), source).unwrap();
    let results = station.drain().unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].is_ok());
    assert!(station.stats().framer_overflows >= 1);
}

#[test]
fn closure_sink_receives_values() {
    let mut source = MemorySource::new();
    source.feed(b"c225s000g000t093r000p000h18b09890*35\r\n");
    let mut station = Station::new(config(PacketVariant::Basic), source).unwrap();
    station.drain().unwrap();

    let mut names = Vec::new();
    station.publish(&mut |channel: &'static str, _value: f64| names.push(channel));
    assert_eq!(
        names,
        [
            "wind_direction",
            "wind_speed",
            "wind_speed_peak_5m",
            "temperature",
            "rain_1h",
            "rain_24h",
            "humidity",
            "air_pressure",
        ]
    );
}

#[test]
fn memory_source_reports_exhaustion() {
    let mut source = MemorySource::new();
    source.feed(b"c225s000g000t093r000p000h18b09890*35\n");
    source.close();
    assert!(!source.is_exhausted());

    let mut station = Station::new(config(PacketVariant::Basic), source).unwrap();
    station.drain().unwrap();
    assert!(station.is_exhausted());
}
