//! Building categorical datasets from polars frames.

use polars::prelude::*;
use rule_explain::prelude::*;
use rule_explain::prelude::Label;

#[test]
fn columns_are_dictionary_encoded_in_first_seen_order() {
    let df = df!(
        "color" => &["red", "blue", "red", "green"],
        "size" => &[Some("s"), None, Some("l"), Some("s")],
        "class" => &["yes", "no", "yes", "no"]
    )
    .unwrap();
    let ds = df.to_categorical_dataset(&["class"]).unwrap();

    assert_eq!(ds.row_count(), 4);
    assert_eq!(ds.features().len(), 2);
    assert_eq!(ds.label_features().len(), 1);

    let color = ds.feature_by_name("color").unwrap();
    assert_eq!(color.kind(), FeatureKind::Categorical);
    assert_eq!(color.domain(), &["red", "blue", "green"]);
    assert_eq!(ds.codes(color).unwrap(), &[0, 1, 0, 2]);

    // Missing cells become their own value
    let size = ds.feature_by_name("size").unwrap();
    assert_eq!(size.domain(), &["s", "None", "l"]);

    let class = ds.feature_by_name("class").unwrap();
    assert_eq!(class.kind(), FeatureKind::Label);
}

#[test]
fn numeric_columns_are_encoded_by_their_string_form() {
    let df = df!(
        "bucket" => &[3_i32, 1, 3],
        "label" => &[true, false, true]
    )
    .unwrap();
    let ds = df.to_categorical_dataset(&["label"]).unwrap();
    let bucket = ds.feature_by_name("bucket").unwrap();
    assert_eq!(bucket.domain(), &["3", "1"]);
    assert_eq!(ds.codes(bucket).unwrap(), &[0, 1, 0]);
}

#[test]
fn frame_backed_dataset_answers_queries() {
    let df = df!(
        "color" => &["red", "blue", "red", "green"],
        "class" => &["yes", "no", "yes", "no"]
    )
    .unwrap();
    let ds = df.to_categorical_dataset(&["class"]).unwrap();
    let calc = IndexCalculator::from_dataset(&ds).unwrap();

    let color = ds.feature_by_name("color").unwrap().clone();
    let class = ds.feature_by_name("class").unwrap().clone();
    let red = Condition::from_values(&color, &["red"]).unwrap();
    let yes = Label::from_value(class, "yes").unwrap();
    assert_eq!(
        calc.confusion(&red, &yes).unwrap(),
        ConfusionMatrix::new(2, 0, 0, 2)
    );
}

#[test]
fn missing_label_column_is_reported() {
    let df = df!("color" => &["red"]).unwrap();
    match df.to_categorical_dataset(&["class"]) {
        Err(Error::FeatureNotFound(name)) => assert_eq!(name, "class"),
        other => panic!("expected FeatureNotFound, got {:?}", other.map(|d| d.row_count())),
    }
}

// ----------------------------------------------------------------------------
// In-memory datasets
// ----------------------------------------------------------------------------

#[test]
fn columns_of_different_lengths_are_a_shape_mismatch() {
    let color = CategoricalColumn::from_values(FeatureKind::Categorical, "color", &["red", "blue"]);
    let class = CategoricalColumn::from_values(FeatureKind::Label, "class", &["yes", "no", "yes"]);
    match CategoricalDataset::new(vec![color, class]) {
        Err(Error::ShapeMismatch {
            column,
            found,
            expected,
        }) => {
            assert_eq!(column, "class");
            assert_eq!(found, 3);
            assert_eq!(expected, 2);
        }
        other => panic!("expected ShapeMismatch, got {:?}", other.map(|d| d.row_count())),
    }
}

#[test]
fn selecting_a_missing_row_is_out_of_range() {
    let color = CategoricalColumn::from_values(FeatureKind::Categorical, "color", &["red", "blue"]);
    let class = CategoricalColumn::from_values(FeatureKind::Label, "class", &["yes", "no"]);
    let ds = CategoricalDataset::new(vec![color, class]).unwrap();

    assert_eq!(ds.select_rows(&[1]).unwrap().row_count(), 1);
    assert!(matches!(
        ds.select_rows(&[0, 5]),
        Err(Error::RowOutOfRange { row: 5, rows: 2 })
    ));
}
