use approx::assert_relative_eq;
use serde_json::json;
use simdigi_algorithms::DigitizationConfig;
use simdigi_core::{Record, Value, N_GEN, N_HITS};
use simdigi_io::{
    digitize_file, digitize_files, inspect_file, plan_jobs, DigitizeJob, EventFileReader,
    EventFileWriter, Error, FileHeader,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const HIT_FLOATS: [&str; 8] = ["X", "Y", "Z", "E", "PX", "PY", "PZ", "WEIGHT"];
const GEN_FLOATS: [&str; 9] = [
    "GEN_T", "GEN_X", "GEN_Y", "GEN_Z", "GEN_E", "GEN_PX", "GEN_PY", "GEN_PZ", "GEN_WEIGHT",
];

fn extra_names() -> Vec<String> {
    (0..16).map(|i| format!("EXTRA_{i:02}")).collect()
}

fn branches() -> Vec<String> {
    ["Deposit", "Time", "Detector", "PDG", "Track", "Parent"]
        .into_iter()
        .chain(HIT_FLOATS)
        .chain(["GEN_PDG", "GEN_Track", "GEN_Parent"])
        .chain(GEN_FLOATS)
        .map(str::to_string)
        .chain(extra_names())
        .collect()
}

/// One event with the given hits and a single generator muon.
fn event(hits: &[(i64, f64, f64)]) -> Record {
    let n = hits.len();
    let mut record = Record::new()
        .with("Detector", hits.iter().map(|h| h.0).collect::<Vec<i64>>())
        .with("Time", hits.iter().map(|h| h.1).collect::<Vec<f64>>())
        .with("Deposit", hits.iter().map(|h| h.2).collect::<Vec<f64>>())
        .with("PDG", vec![13_i64; n])
        .with("Track", vec![1_i64; n])
        .with("Parent", vec![0_i64; n]);
    for name in HIT_FLOATS {
        record.insert(name, vec![0.5; n]);
    }
    for name in ["GEN_PDG", "GEN_Track", "GEN_Parent"] {
        record.insert(name, vec![13_i64]);
    }
    for name in GEN_FLOATS {
        record.insert(name, vec![2.0]);
    }
    for name in extra_names() {
        record.insert(name, vec![9.0]);
    }
    record
}

fn write_input(path: &Path, tree: &str, events: &[Record]) {
    let header = FileHeader::new(tree, branches()).with_object("run", json!({"number": 12}));
    let mut writer = EventFileWriter::create(path, &header).unwrap();
    for record in events {
        writer.write_record(record).unwrap();
    }
    writer.finish().unwrap();
}

fn sample_events() -> Vec<Record> {
    vec![
        // Two pulses on scintillator 3, one on RPC 1002.
        event(&[
            (3, 0.0, 1.0),
            (3, 5.0, 1.0),
            (3, 40.0, 0.7),
            (1002, 12.0, 0.0002),
        ]),
        // Nothing above threshold.
        event(&[(4, 0.0, 0.1)]),
        // No hits at all.
        event(&[]),
    ]
}

#[test]
fn test_digitize_file_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("run.jsonl");
    let output = dir.path().join("run.digi.jsonl");
    write_input(&input, "Events", &sample_events());

    let summary = digitize_file(&input, &output, "Events", &DigitizationConfig::default()).unwrap();

    assert_eq!(summary.stats.events, 3);
    assert_eq!(summary.stats.raw_hits, 5);
    assert_eq!(summary.stats.pulses, 3);
    assert_eq!(summary.stats.empty_events, 2);

    let reader = EventFileReader::open(&output).unwrap();
    let header = reader.header();
    assert_eq!(header.tree, "Events_digi");
    assert!(header.digitized);
    assert!(header.branches.iter().any(|b| b == N_HITS));
    assert!(header.branches.iter().any(|b| b == N_GEN));
    assert_eq!(header.objects["run"], json!({"number": 12}));

    let records = reader.read_all().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].get(N_HITS), Some(&Value::Int(3)));
    assert_eq!(
        records[0].get("Detector"),
        Some(&Value::IntArray(vec![3, 3, 1002]))
    );
    match records[0].get("Deposit") {
        Some(Value::FloatArray(deposits)) => {
            assert_eq!(deposits.len(), 3);
            assert_relative_eq!(deposits[0], 2.0);
            assert_relative_eq!(deposits[1], 0.7);
            assert_relative_eq!(deposits[2], 0.0002);
        }
        other => panic!("unexpected deposit column: {other:?}"),
    }
    assert_eq!(records[1].get(N_HITS), Some(&Value::Int(0)));
    assert_eq!(records[2].get(N_GEN), Some(&Value::Int(1)));
    assert_eq!(records[2].get("EXTRA_05"), Some(&Value::FloatArray(vec![9.0])));
}

#[test]
fn test_tree_mismatch() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("run.jsonl");
    let output = dir.path().join("run.digi.jsonl");
    write_input(&input, "Events", &sample_events());

    let result = digitize_file(&input, &output, "Hits", &DigitizationConfig::default());

    assert!(matches!(result, Err(Error::TreeNotFound { .. })));
    assert!(!output.exists());
}

#[test]
fn test_digitized_input_rejected() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("run.jsonl");
    let first = dir.path().join("run.digi.jsonl");
    let second = dir.path().join("run.digi.digi.jsonl");
    write_input(&input, "Events", &sample_events());
    digitize_file(&input, &first, "Events", &DigitizationConfig::default()).unwrap();

    let result = digitize_file(&first, &second, "Events_digi", &DigitizationConfig::default());

    assert!(matches!(result, Err(Error::AlreadyDigitized(_))));
}

#[test]
fn test_bad_record_removes_partial_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("run.jsonl");
    let output = dir.path().join("run.digi.jsonl");
    let mut broken = event(&[(3, 0.0, 1.0)]);
    broken.insert("Time", vec![0.0, 1.0]);
    write_input(&input, "Events", &[event(&[(3, 0.0, 1.0)]), broken]);

    let result = digitize_file(&input, &output, "Events", &DigitizationConfig::default());

    assert!(matches!(result, Err(Error::CoreError(_))));
    assert!(!output.exists());
}

#[test]
fn test_missing_branch_fails_before_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("run.jsonl");
    let output = dir.path().join("run.digi.jsonl");
    let mut header = FileHeader::new("Events", branches());
    header.branches.retain(|b| b != "GEN_WEIGHT");
    EventFileWriter::create(&input, &header).unwrap().finish().unwrap();

    let result = digitize_file(&input, &output, "Events", &DigitizationConfig::default());

    assert!(matches!(
        result,
        Err(Error::CoreError(simdigi_core::Error::SchemaMismatch { .. }))
    ));
    assert!(!output.exists());
}

#[test]
fn test_digitize_files_parallel_matches_sequential() {
    let dir = TempDir::new().unwrap();
    for name in ["a", "b", "c"] {
        write_input(&dir.path().join(format!("{name}.jsonl")), "Events", &sample_events());
    }
    fs::write(dir.path().join("d.jsonl"), "").unwrap();
    let config = DigitizationConfig::default();

    let seq_dir = dir.path().join("seq");
    let par_dir = dir.path().join("par");
    fs::create_dir(&seq_dir).unwrap();
    fs::create_dir(&par_dir).unwrap();
    let sequential = digitize_files(
        &plan_jobs(dir.path(), Some(seq_dir.as_path())).unwrap(),
        "Events",
        &config,
        false,
    );
    let parallel = digitize_files(
        &plan_jobs(dir.path(), Some(par_dir.as_path())).unwrap(),
        "Events",
        &config,
        true,
    );

    assert_eq!(sequential.len(), 4);
    assert_eq!(parallel.len(), 4);
    for (s, p) in sequential.iter().zip(&parallel) {
        match (s, p) {
            (Ok(s), Ok(p)) => assert_eq!(s.stats, p.stats),
            (Err(Error::InvalidFormat(_)), Err(Error::InvalidFormat(_))) => {}
            other => panic!("results differ: {other:?}"),
        }
    }
    assert!(matches!(sequential[3], Err(Error::InvalidFormat(_))));
}

#[test]
fn test_inspect_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("run.jsonl");
    write_input(&input, "Events", &sample_events());

    let info = inspect_file(&input, &DigitizationConfig::default()).unwrap();

    assert_eq!(info.records, 3);
    assert_eq!(info.total_hits, 5);
    assert_eq!(info.scintillator_channels, 2);
    assert_eq!(info.rpc_channels, 1);
    assert_eq!(info.header.tree, "Events");
    assert_eq!(info.file_size as u64, fs::metadata(&input).unwrap().len());
}

#[test]
fn test_same_file_name_in_subdirectories() {
    let dir = TempDir::new().unwrap();
    let input_dir = dir.path().join("runs");
    let out_dir = dir.path().join("out");
    for (sub, count) in [("a", 3), ("b", 1)] {
        fs::create_dir_all(input_dir.join(sub)).unwrap();
        write_input(&input_dir.join(sub).join("run.jsonl"), "Events", &sample_events()[..count]);
    }

    let jobs = plan_jobs(&input_dir, Some(out_dir.as_path())).unwrap();
    let results = digitize_files(&jobs, "Events", &DigitizationConfig::default(), true);

    let events: Vec<usize> = results.iter().map(|r| r.as_ref().unwrap().stats.events).collect();
    assert_eq!(events, vec![3, 1]);
    for (sub, count) in [("a", 3), ("b", 1)] {
        let output = out_dir.join(sub).join("run.digi.jsonl");
        assert_eq!(EventFileReader::open(&output).unwrap().read_all().unwrap().len(), count);
    }
}

#[test]
fn test_duplicate_output_keeps_first_file() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.jsonl");
    let second = dir.path().join("second.jsonl");
    let output = dir.path().join("out").join("run.digi.jsonl");
    write_input(&first, "Events", &sample_events());
    write_input(&second, "Events", &sample_events()[..1]);
    let jobs = [
        DigitizeJob {
            input: first.clone(),
            output: output.clone(),
        },
        DigitizeJob {
            input: second.clone(),
            output: output.clone(),
        },
    ];

    for parallel in [false, true] {
        let results = digitize_files(&jobs, "Events", &DigitizationConfig::default(), parallel);

        assert_eq!(results[0].as_ref().unwrap().stats.events, 3);
        match &results[1] {
            Err(Error::DuplicateOutput { input, first: owner, .. }) => {
                assert_eq!(input, &second);
                assert_eq!(owner, &first);
            }
            other => panic!("expected a duplicate output error, got {other:?}"),
        }
        assert_eq!(EventFileReader::open(&output).unwrap().read_all().unwrap().len(), 3);
    }
}
