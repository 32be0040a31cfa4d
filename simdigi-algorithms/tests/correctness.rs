use approx::assert_relative_eq;
use simdigi_algorithms::{
    ChannelClassifier, ChannelClusterer, DetectorType, DigitizationConfig, Digitizer,
    EventAssembler, WindowBound, WindowedThresholdClusterer,
};
use simdigi_core::{
    ChannelId, Energy, Event, ExtraField, GeneratorParticle, Hit, Record, Time, Value, N_GEN,
    N_HITS,
};

fn hit(detector: i64, time: f64, deposit: f64) -> Hit {
    Hit::new(
        Energy::from_mev(deposit),
        Time::from_ns(time),
        ChannelId::new(detector),
    )
}

fn muon() -> GeneratorParticle {
    GeneratorParticle {
        pdg: 13,
        track: 1,
        parent: 0,
        t: Time::from_ns(0.0),
        x: 10.0,
        y: -5.0,
        z: 500.0,
        e: Energy::from_mev(3000.0),
        px: 0.0,
        py: 0.0,
        pz: -3000.0,
        weight: 1.0,
    }
}

/// A record with canonical hit and generator names and the descriptive
/// cosmic-shower names for the aliased extras.
fn cosmic_record(detectors: &[i64], times: &[f64], deposits_kev: &[f64]) -> Record {
    let n = detectors.len();
    let mut record = Record::new()
        .with("Deposit", deposits_kev.to_vec())
        .with("Time", times.to_vec())
        // Detector stored as floats, as some writers do.
        .with("Detector", detectors.iter().map(|&d| d as f64).collect::<Vec<f64>>())
        .with("PDG", vec![13_i64; n])
        .with("Track", (1..=n as i64).collect::<Vec<i64>>())
        .with("Parent", vec![0_i64; n]);
    for name in ["X", "Y", "Z", "E", "PX", "PY", "PZ", "WEIGHT"] {
        record.insert(name, vec![1.0; n]);
    }
    for name in ["GEN_PDG", "GEN_Track", "GEN_Parent"] {
        record.insert(name, vec![13_i64]);
    }
    for name in [
        "GEN_T", "GEN_X", "GEN_Y", "GEN_Z", "GEN_E", "GEN_PX", "GEN_PY", "GEN_PZ", "GEN_WEIGHT",
    ] {
        record.insert(name, vec![1.0]);
    }
    for name in [
        "COSMIC_EVENT_ID",
        "COSMIC_CORE_X",
        "COSMIC_CORE_Y",
        "COSMIC_GEN_PRIMARY_ENERGY",
        "COSMIC_GEN_THETA",
        "COSMIC_GEN_PHI",
        "COSMIC_GEN_FIRST_HEIGHT",
        "COSMIC_GEN_ELECTRON_COUNT",
        "COSMIC_GEN_MUON_COUNT",
        "COSMIC_GEN_HADRON_COUNT",
        "COSMIC_GEN_PRIMARY_ID",
        "EXTRA_11",
        "EXTRA_12",
        "EXTRA_13",
        "EXTRA_14",
        "EXTRA_15",
    ] {
        record.insert(name, vec![42.0]);
    }
    record
}

#[test]
fn test_single_window_scenario() {
    let hits = [hit(3, 0.0, 1.0), hit(3, 5.0, 1.0), hit(3, 25.0, 1.0)];
    let clusterer = WindowedThresholdClusterer::new(Time::from_ns(20.0));

    let pulses = clusterer.cluster(&hits, Energy::from_mev(1.9));

    assert_eq!(pulses.len(), 1, "expected one pulse, found {}", pulses.len());
    assert_relative_eq!(pulses[0].time.as_ns(), 0.0);
    assert_relative_eq!(pulses[0].deposit.as_mev(), 2.0);

    let windows = clusterer.scan(&hits, Energy::from_mev(1.9));
    assert_eq!(windows[0].advance, 2);
    assert_eq!(windows[1].start, 2);
    assert!(!windows[1].emitted());
}

#[test]
fn test_empty_channel_scenario() {
    let clusterer = WindowedThresholdClusterer::default();
    assert!(clusterer.cluster(&[], Energy::from_mev(1.0)).is_empty());
}

#[test]
fn test_threshold_at_last_hit_consumes_everything() {
    let hits: Vec<Hit> = (0..5).map(|i| hit(3, f64::from(i) * 4.0, 0.2)).collect();
    let clusterer = WindowedThresholdClusterer::default();

    let windows = clusterer.scan(&hits, Energy::from_mev(0.95));

    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].crossing, Some(4));
    assert_eq!(windows[0].advance, hits.len());
}

#[test]
fn test_mixed_detector_event() {
    let event = Event {
        hits: vec![
            // Scintillator 7: two windows, both above 0.65 MeV.
            hit(7, 0.0, 0.4),
            hit(7, 10.0, 0.4),
            hit(7, 100.0, 0.7),
            // Scintillator 8: below threshold everywhere.
            hit(8, 0.0, 0.3),
            hit(8, 30.0, 0.3),
            // RPC 1001: 0.1 keV + 0.1 keV reaches 0.17 keV.
            hit(1001, 50.0, 0.0001),
            hit(1001, 45.0, 0.0001),
        ],
        generator: vec![muon()],
        extras: vec![ExtraField::new("EXTRA_00", vec![1.0])],
        ..Event::default()
    };

    let digitized = EventAssembler::default().assemble(&event);

    assert_eq!(digitized.n_hits(), 3);
    assert_eq!(digitized.n_gen(), 1);
    let channels: Vec<i64> = digitized.pulses.iter().map(|p| p.detector.as_i64()).collect();
    assert_eq!(channels, vec![7, 7, 1001]);
    assert_relative_eq!(digitized.pulses[0].deposit.as_mev(), 0.8, epsilon = 1e-12);
    assert_relative_eq!(digitized.pulses[2].time.as_ns(), 45.0);
    assert_relative_eq!(digitized.pulses[2].deposit.as_mev(), 0.0002, epsilon = 1e-15);
}

#[test]
fn test_exclusive_bound_splits_boundary_hit() {
    let config = DigitizationConfig::default().with_window_bound(WindowBound::Exclusive);
    let event = Event {
        hits: vec![hit(1, 0.0, 0.5), hit(1, 20.0, 0.5)],
        ..Event::default()
    };

    assert!(EventAssembler::from_config(&config).assemble(&event).is_empty());
    assert_eq!(EventAssembler::default().assemble(&event).n_hits(), 1);
}

#[test]
fn test_rpc_boundary_is_configurable() {
    let config = DigitizationConfig::default().with_rpc_channel_min(500);
    let assembler = EventAssembler::from_config(&config);
    let event = Event {
        hits: vec![hit(600, 0.0, 0.001)],
        ..Event::default()
    };

    assert_eq!(
        assembler.classifier().rpc_channel_min,
        500,
        "classifier should follow the configuration"
    );
    assert_eq!(assembler.assemble(&event).n_hits(), 1);
    assert!(EventAssembler::default().assemble(&event).is_empty());
    assert_eq!(
        ChannelClassifier::classify(assembler.classifier(), ChannelId::new(600)),
        DetectorType::Rpc
    );
}

#[test]
fn test_digitizer_kev_input_with_cosmic_aliases() {
    let config = DigitizationConfig::from_json(r#"{ "units": { "energy": "keV" } }"#).unwrap();
    // Deposits in keV: 700 keV on scintillator 2, 0.2 keV on RPC 1500.
    let input = cosmic_record(&[2, 1500, 2], &[3.0, 1.0, 60.0], &[700.0, 0.2, 100.0]);
    let digitizer = Digitizer::from_config(&config, input.field_names()).unwrap();

    let output = digitizer.process(&input).unwrap();

    assert_eq!(output.raw_hits, 3);
    assert_eq!(output.pulses, 2);
    let record = &output.record;
    assert_eq!(record.get(N_HITS), Some(&Value::Int(2)));
    assert_eq!(record.get(N_GEN), Some(&Value::Int(1)));
    assert_eq!(record.get("Detector"), Some(&Value::IntArray(vec![2, 1500])));
    match record.get("Deposit") {
        Some(Value::FloatArray(deposits)) => {
            assert_relative_eq!(deposits[0], 700.0, epsilon = 1e-9);
            assert_relative_eq!(deposits[1], 0.2, epsilon = 1e-12);
        }
        other => panic!("unexpected deposit column: {other:?}"),
    }
    assert_eq!(record.get("COSMIC_CORE_X"), Some(&Value::FloatArray(vec![42.0])));
    assert!(!record.contains("EXTRA_01"));
}

#[test]
fn test_digitizer_writes_event_metadata_verbatim() {
    let config = DigitizationConfig::from_json(r#"{ "units": { "energy": "keV" } }"#).unwrap();
    let mut input = cosmic_record(&[2], &[0.0], &[700.0]);
    input.insert("COSMIC_EVENT_ID", vec![9_007_199_254_740_993_i64]);
    input.insert("COSMIC_GEN_PRIMARY_ID", Value::Int(14));
    input.insert("GEN_E", vec![1234.567_891_234_5]);
    input.insert("GEN_PZ", vec![-0.1 - 0.2]);
    let digitizer = Digitizer::from_config(&config, input.field_names()).unwrap();

    let output = digitizer.process(&input).unwrap().record;

    for name in ["COSMIC_EVENT_ID", "COSMIC_GEN_PRIMARY_ID", "GEN_E", "GEN_PZ", "GEN_T"] {
        assert_eq!(output.get(name), input.get(name), "{name} changed");
    }
}
