//! End-to-end behavior of encoding and the batch classifier lifecycle.

use hashforest_classify::{
    BatchClassifier, ClassifierConfig, ClassifierState, ClassifyError, DataSpecification,
    FeatureEncoder, FeatureMetadata, FeatureVector, Operation, TokenHasher,
};
use hashforest_rf::{ForestError, argmax};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn table(cells: &[&[&str]]) -> Vec<Vec<String>> {
    cells
        .iter()
        .map(|r| r.iter().map(|c| (*c).to_string()).collect())
        .collect()
}

fn numeric_spec() -> DataSpecification {
    DataSpecification::new(1, vec![0], vec![FeatureMetadata::numeric("value")]).unwrap()
}

fn tokens(len: usize, items: &[(&str, f64)]) -> FeatureVector {
    let hasher = TokenHasher::new(len, 1).unwrap();
    let mut v = FeatureVector::zeros(len);
    for (token, weight) in items {
        hasher.add_to(token, *weight, &mut v);
    }
    v
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

#[test]
fn encoding_is_deterministic_across_encoders() {
    let spec = DataSpecification::new(0, vec![1, 2, 3], vec![
        FeatureMetadata::numeric("age"),
        FeatureMetadata::categorical("city"),
        FeatureMetadata::numeric("income"),
    ])
    .unwrap();
    let rows = table(&[&["yes", "42", "Zurich", "*"]]);
    let a = FeatureEncoder::new(1000, 2)
        .unwrap()
        .encode_row(&spec, &rows, 0)
        .unwrap();
    let b = FeatureEncoder::new(1000, 2)
        .unwrap()
        .encode_row(&spec, &rows, 0)
        .unwrap();
    assert_eq!(a, b);
    assert!(
        a.as_slice()
            .iter()
            .zip(b.as_slice())
            .all(|(x, y)| x.to_bits() == y.to_bits())
    );
}

#[test]
fn every_vector_has_the_configured_length() {
    let rows = table(&[&["l", "1", "x", "2.5", "y", "z"]]);
    for vector_length in [1, 7, 1000] {
        for n_features in 0..=5 {
            let columns: Vec<usize> = (1..=n_features).collect();
            let metadata = columns
                .iter()
                .map(|c| FeatureMetadata::numeric(format!("f{c}")))
                .collect();
            let spec = DataSpecification::new(0, columns, metadata).unwrap();
            let v = FeatureEncoder::new(vector_length, 1)
                .unwrap()
                .encode_row(&spec, &rows, 0)
                .unwrap();
            assert_eq!(v.len(), vector_length);
        }
    }
}

#[test]
fn no_feature_columns_still_produce_a_nonzero_vector() {
    let spec = DataSpecification::new(0, vec![], vec![]).unwrap();
    let rows = table(&[&["label"]]);
    let v = FeatureEncoder::new(100, 1)
        .unwrap()
        .encode_row(&spec, &rows, 0)
        .unwrap();
    assert!(v.as_slice().iter().any(|&x| x != 0.0));
    assert_eq!(v, tokens(100, &[("intercept", 1.0), ("Feature:1", 1.0)]));
}

#[test]
fn numeric_and_categorical_branches() {
    let spec = DataSpecification::new(0, vec![1, 2], vec![
        FeatureMetadata::numeric("amount"),
        FeatureMetadata::categorical("color"),
    ])
    .unwrap();
    let rows = table(&[
        &["a", "3.25", "red"],
        &["a", "3.25", "blue"],
        &["a", "n/a", "red"],
    ]);
    let encoder = FeatureEncoder::new(1 << 16, 1).unwrap();
    let red = encoder.encode_row(&spec, &rows, 0).unwrap();
    let blue = encoder.encode_row(&spec, &rows, 1).unwrap();
    let unparsed = encoder.encode_row(&spec, &rows, 2).unwrap();

    assert_eq!(
        red,
        tokens(1 << 16, &[
            ("intercept", 1.0),
            ("Attribute-1", 3.25),
            ("Attribute-2:red", 1.0),
        ])
    );
    assert_eq!(
        blue,
        tokens(1 << 16, &[
            ("intercept", 1.0),
            ("Attribute-1", 3.25),
            ("Attribute-2:blue", 1.0),
        ])
    );
    assert_eq!(
        unparsed,
        tokens(1 << 16, &[
            ("intercept", 1.0),
            ("Attribute-1:n/a", 1.0),
            ("Attribute-2:red", 1.0),
        ])
    );

    // The numeric slot carries the same magnitude whatever the categorical value.
    let numeric_slot = TokenHasher::new(1 << 16, 1)
        .unwrap()
        .slots("Attribute-1")
        .next()
        .unwrap();
    assert_eq!(red.get(numeric_slot), blue.get(numeric_slot));
}

#[test]
fn colliding_large_numbers_stay_finite_and_train() {
    let spec = DataSpecification::new(2, vec![0, 1], vec![
        FeatureMetadata::numeric("a"),
        FeatureMetadata::numeric("b"),
    ])
    .unwrap();
    let rows = table(&[&["1e308", "1e308", "x"], &["1", "1", "y"]]);

    let v = FeatureEncoder::new(1, 1)
        .unwrap()
        .encode_row(&spec, &rows, 0)
        .unwrap();
    assert_eq!(v.get(0), f64::MAX);

    let mut classifier = BatchClassifier::new(spec, ClassifierConfig::new(1, 3).unwrap());
    classifier.train_rows(&rows, &rows, 0..2).unwrap();
    classifier.close().unwrap();
    assert_eq!(classifier.state(), ClassifierState::Closed);
    let result = classifier.classify(&rows, 0).unwrap();
    assert_eq!(result.probabilities().len(), 2);
}

#[test]
fn zero_width_encoder_is_rejected() {
    assert!(matches!(
        FeatureEncoder::new(0, 1),
        Err(ClassifyError::InvalidConfig { .. })
    ));
    assert!(matches!(
        FeatureEncoder::new(16, 0),
        Err(ClassifyError::InvalidConfig { .. })
    ));
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

#[test]
fn label_ids_follow_first_occurrence() {
    let mut spec = numeric_spec();
    let ids: Vec<usize> = ["A", "B", "A", "C"]
        .into_iter()
        .map(|l| spec.encode_label(l).unwrap())
        .collect();
    assert_eq!(ids, vec![0, 1, 0, 2]);
    assert_eq!(spec.num_classes(), 3);
}

#[test]
fn unseen_label_after_close_is_rejected() {
    let rows = table(&[&["1.0", "pos"], &["-1.0", "neg"], &["2.0", "pos"], &["-2.0", "neg"]]);
    let mut classifier =
        BatchClassifier::new(numeric_spec(), ClassifierConfig::new(50, 5).unwrap());
    classifier.train_rows(&rows, &rows, 0..4).unwrap();
    classifier.close().unwrap();

    let mut spec = classifier.specification().clone();
    assert!(matches!(
        spec.encode_label("other"),
        Err(ClassifyError::InvalidLabel { .. })
    ));
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn lifecycle_violations() {
    let rows = table(&[&["1.0", "pos"], &["-1.0", "neg"]]);
    let mut classifier =
        BatchClassifier::new(numeric_spec(), ClassifierConfig::new(50, 5).unwrap());

    assert!(matches!(
        classifier.classify(&rows, 0),
        Err(ClassifyError::Lifecycle {
            operation: Operation::Classify,
            state: ClassifierState::Open
        })
    ));

    classifier.train_rows(&rows, &rows, 0..2).unwrap();
    classifier.close().unwrap();

    assert!(matches!(
        classifier.train(&rows, &rows, 0),
        Err(ClassifyError::Lifecycle {
            operation: Operation::Train,
            state: ClassifierState::Closed
        })
    ));
    assert!(matches!(
        classifier.close(),
        Err(ClassifyError::Lifecycle {
            operation: Operation::Close,
            state: ClassifierState::Closed
        })
    ));
    assert!(classifier.classify(&rows, 0).is_ok());
}

#[test]
fn closing_without_rows_fails_and_stays_unusable() {
    let rows = table(&[&["1.0", "pos"]]);
    let mut classifier =
        BatchClassifier::new(numeric_spec(), ClassifierConfig::new(50, 5).unwrap());

    let err = classifier.close().unwrap_err();
    assert!(matches!(
        err,
        ClassifyError::Training {
            source: ForestError::EmptyDataset
        }
    ));
    assert_eq!(classifier.state(), ClassifierState::Failed);
    assert!(matches!(
        classifier.classify(&rows, 0),
        Err(ClassifyError::Lifecycle {
            state: ClassifierState::Failed,
            ..
        })
    ));
    assert!(matches!(
        classifier.train(&rows, &rows, 0),
        Err(ClassifyError::Lifecycle { .. })
    ));
    assert!(matches!(
        classifier.close(),
        Err(ClassifyError::Lifecycle { .. })
    ));
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn positive_and_negative_values() {
    let training = table(&[
        &["1.0", "pos"],
        &["2.0", "pos"],
        &["-1.0", "neg"],
        &["-2.0", "neg"],
    ]);
    let mut classifier =
        BatchClassifier::new(numeric_spec(), ClassifierConfig::new(1000, 50).unwrap());
    classifier.train_rows(&training, &training, 0..4).unwrap();
    classifier.close().unwrap();

    let query = table(&[&["1.5"]]);
    let result = classifier.classify(&query, 0).unwrap();
    assert_eq!(result.predicted_label(), "pos");
    assert_eq!(result.probabilities().len(), 2);
    assert_eq!(argmax(result.probabilities()), result.predicted_class());
    assert!(result.is_correct("pos"));
    let total: f64 = result.probabilities().iter().sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn independent_classifiers_keep_separate_vocabularies() {
    let base = numeric_spec();
    let a_rows = table(&[&["1", "x"], &["2", "y"]]);
    let b_rows = table(&[&["1", "y"], &["2", "x"]]);

    let mut a = BatchClassifier::new(base.clone(), ClassifierConfig::new(16, 3).unwrap());
    let mut b = BatchClassifier::new(base, ClassifierConfig::new(16, 3).unwrap());
    a.train_rows(&a_rows, &a_rows, 0..2).unwrap();
    b.train_rows(&b_rows, &b_rows, 0..2).unwrap();

    assert_eq!(a.specification().label_map().id("x"), Some(0));
    assert_eq!(b.specification().label_map().id("x"), Some(1));
}
