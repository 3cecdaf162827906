//! End-to-end integration tests: CSV -> classify / cross-validate -> JSON.

use std::fs;
use std::io::Write;
use std::path::Path;

use hashforest_classify::{
    BatchClassifier, ClassifierConfig, CrossValidation, DataSpecification, FeatureMetadata,
    RowSource,
};
use hashforest_io::{ExperimentName, ResultWriter, Table, TableReader};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Two well separated groups with a suppressed cell now and then.
fn write_fixture(dir: &Path, name: &str, n_per_label: usize) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut f = fs::File::create(&path).unwrap();
    writeln!(f, "income,region,outcome").unwrap();
    for i in 0..n_per_label {
        let low = if i % 7 == 0 { "*".to_string() } else { format!("{}", 10 + i % 5) };
        writeln!(f, "{low},north,denied").unwrap();
        writeln!(f, "{},south,approved", 90 + i % 5).unwrap();
    }
    path
}

fn spec_for(table: &Table) -> DataSpecification {
    let income = table.column_index("income").unwrap();
    let region = table.column_index("region").unwrap();
    let outcome = table.column_index("outcome").unwrap();
    DataSpecification::new(outcome, vec![income, region], vec![
        FeatureMetadata::numeric("income"),
        FeatureMetadata::categorical("region"),
    ])
    .unwrap()
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn evaluation_round_trip() {
    let dir = TempDir::new().unwrap();
    let table = TableReader::new(&write_fixture(dir.path(), "train.csv", 12))
        .read()
        .unwrap();
    assert_eq!(table.num_rows(), 24);

    let config = ClassifierConfig::new(128, 20).unwrap();
    let result = CrossValidation::new(3)
        .unwrap()
        .evaluate(&spec_for(&table), &config, &table)
        .unwrap();

    let writer =
        ResultWriter::new(&dir.path().join("out"), ExperimentName::new("eval_rt").unwrap())
            .unwrap();
    let path = writer.write_evaluation(&config, &result).unwrap();
    assert_eq!(path, dir.path().join("out").join("eval_rt_evaluation.json"));

    let content = read_json(&path);
    assert_eq!(content["experiment"], "eval_rt");
    assert_eq!(content["n_samples"].as_u64().unwrap(), 24);
    assert_eq!(content["fold_accuracies"].as_array().unwrap().len(), 3);
    assert_eq!(content["labels"], serde_json::json!(["denied", "approved"]));
    assert!(content["cv_accuracy_mean"].as_f64().unwrap() > 0.9);
    assert_eq!(content["class_metrics"][1]["label"], "approved");
    assert_eq!(content["config"]["vector_length"].as_u64().unwrap(), 128);

    let matrix = content["confusion_matrix"].as_array().unwrap();
    let total: u64 = matrix
        .iter()
        .flat_map(|r| r.as_array().unwrap())
        .map(|c| c.as_u64().unwrap())
        .sum();
    assert_eq!(total, 24);
}

#[test]
fn prediction_round_trip() {
    let dir = TempDir::new().unwrap();
    let train = TableReader::new(&write_fixture(dir.path(), "train.csv", 10))
        .read()
        .unwrap();
    let test = TableReader::new(&write_fixture(dir.path(), "test.csv", 3))
        .read()
        .unwrap();

    let mut classifier =
        BatchClassifier::new(spec_for(&train), ClassifierConfig::new(128, 30).unwrap());
    classifier
        .train_rows(&train, &train, 0..train.num_rows())
        .unwrap();
    classifier.close().unwrap();

    let results: Vec<_> = (0..test.num_rows())
        .map(|row| classifier.classify(&test, row).unwrap())
        .collect();
    let outcome = test.column_index("outcome").unwrap();
    let actual: Vec<String> = test.column(outcome).map(String::from).collect();

    let writer =
        ResultWriter::new(dir.path(), ExperimentName::new("pred_rt").unwrap()).unwrap();
    let labels = classifier.specification().label_map().names();
    let path = writer
        .write_predictions(labels, &results, Some(actual.as_slice()))
        .unwrap();

    let content = read_json(&path);
    assert_eq!(content["n_rows"].as_u64().unwrap(), 6);
    let predictions = content["predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), 6);
    for p in predictions {
        let probs = p["probabilities"].as_object().unwrap();
        assert_eq!(probs.len(), 2);
        let sum: f64 = probs.values().map(|v| v.as_f64().unwrap()).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(p["predicted"], p["actual"]);
    }
    assert!((content["accuracy"].as_f64().unwrap() - 1.0).abs() < 1e-12);
}

#[test]
fn predictions_without_truth_omit_accuracy() {
    let dir = TempDir::new().unwrap();
    let train = TableReader::new(&write_fixture(dir.path(), "train.csv", 5))
        .read()
        .unwrap();
    let mut classifier =
        BatchClassifier::new(spec_for(&train), ClassifierConfig::new(64, 5).unwrap());
    classifier
        .train_rows(&train, &train, 0..train.num_rows())
        .unwrap();
    classifier.close().unwrap();
    let results = vec![classifier.classify(&train, 0).unwrap()];

    let writer = ResultWriter::new(dir.path(), ExperimentName::new("bare").unwrap()).unwrap();
    let path = writer
        .write_predictions(classifier.specification().label_map().names(), &results, None)
        .unwrap();
    let content = read_json(&path);
    assert!(content.get("accuracy").is_none());
    assert!(content["predictions"][0].get("actual").is_none());
}
