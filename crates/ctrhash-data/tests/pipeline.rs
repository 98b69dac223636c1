//! End-to-end tests: file in, hashed vectors out.

use std::io::Write;

use ctrhash_core::{FeatureHasher, HashingConfig, LabeledSparseVector, MappingRecorder};
use ctrhash_data::prelude::*;
use ctrhash_data::{DataError, RunSummary};

fn write_input(lines: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}

fn run_file(
    file: &tempfile::NamedTempFile,
    num_buckets: usize,
    format: OutputFormat,
) -> (RunSummary, String) {
    let pipeline = HashPipeline::new(HashingTransform::new(HashingConfig::new(num_buckets).unwrap()))
        .with_batch_size(3);
    let mut writer = VectorWriter::new(Vec::new(), format);
    let summary = pipeline
        .run(LineDataset::open(file.path()).unwrap(), &mut writer)
        .unwrap();
    (summary, String::from_utf8(writer.into_inner().unwrap()).unwrap())
}

#[test]
fn criteo_style_records_hash_to_known_buckets() {
    let file = write_input(&[
        "0,68fd1e64,80e26c9b,fb936136,7b4723c4,25c83c98,,1,05db9164",
        "1,05db9164,38a947a1,,e5ba7672",
    ]);

    let (summary, out) = run_file(&file, 1 << 15, OutputFormat::LibSvm);
    assert_eq!(summary.vectors, 2);

    let first = out.lines().next().unwrap();
    assert_eq!(
        first,
        "0 5673:1 6357:1 8143:1 14889:1 19846:1 24376:1 28470:1 31663:1"
    );
}

#[test]
fn bad_records_do_not_affect_neighbours() {
    let file = write_input(&[
        "1.0,0,1,1,0",
        "yes,0,1",
        "",
        "1.0,0,1,1,0",
        "0,a",
        "label-only-bad",
        "1.0,0,1,1,0",
    ]);

    let (summary, out) = run_file(&file, 4, OutputFormat::LibSvm);

    assert_eq!(summary.records, 7);
    assert_eq!(summary.vectors, 4);
    assert_eq!(summary.rejected, 3);
    let lines: Vec<u64> = summary.failures.iter().map(|f| f.line).collect();
    assert_eq!(lines, vec![2, 3, 6]);

    let written: Vec<&str> = out.lines().collect();
    assert_eq!(written[0], "1 0:1 2:2 3:1");
    assert_eq!(written[1], "1 0:1 2:2 3:1");
    assert!(written[2].starts_with("0 "));
    assert_eq!(written[3], "1 0:1 2:2 3:1");
}

#[test]
fn output_follows_input_order_across_batches() {
    let texts: Vec<String> = (0..500).map(|i| format!("{i},f{i},g{}", i % 7)).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let file = write_input(&refs);

    let (summary, out) = run_file(&file, 1 << 20, OutputFormat::JsonLines);
    assert_eq!(summary.vectors, 500);

    for (i, line) in out.lines().enumerate() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["label"].as_f64().unwrap(), i as f64);
        assert_eq!(value["dimension"].as_u64().unwrap(), 1 << 20);
    }
}

#[test]
fn fail_fast_reports_first_bad_line() {
    let file = write_input(&["1,a", "0,b", "?,c", "1,d", "x,e"]);

    let pipeline = HashPipeline::new(HashingTransform::new(HashingConfig::new(8).unwrap()))
        .with_error_policy(ErrorPolicy::FailFast);
    let mut vectors: Vec<LabeledSparseVector> = Vec::new();
    let err = pipeline
        .run(LineDataset::open(file.path()).unwrap(), &mut vectors)
        .unwrap_err();

    assert!(err.is_record_error());
    match err {
        DataError::Record(failure) => assert_eq!(failure.line, 3),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn observer_sees_every_mapping() {
    let recorder = std::sync::Arc::new(MappingRecorder::new());
    let hasher = FeatureHasher::with_num_buckets(1000)
        .unwrap()
        .with_shared_observer(recorder.clone());
    let pipeline = HashPipeline::new(HashingTransform::from_hasher(hasher));

    let dataset = VecDataset::from_strs(&["1,05db9164,38a947a1,,e5ba7672", "bad"]);
    let mut vectors: Vec<LabeledSparseVector> = Vec::new();
    let summary = pipeline.run(dataset, &mut vectors).unwrap();

    assert_eq!(summary.vectors, 1);
    let mut buckets: Vec<usize> = recorder.take().iter().map(|m| m.bucket).collect();
    buckets.sort_unstable();
    assert_eq!(buckets, vec![94, 212, 370, 710]);
}
