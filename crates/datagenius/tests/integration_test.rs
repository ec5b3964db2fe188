//! Integration tests for datagenius.

use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

use datagenius::input::write_delimited;
use datagenius::stages::{profile_field, CleanseTypos, DetectHeader, RejectIncompleteRows};
use datagenius::{
    supplement, CleaningGuide, Dataset, Genius, GeniusConfig, GeniusError, OutputFormat, Parser,
    PipelinePlan, Stage, SupplementGuide,
};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(suffix).expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

const REPORT_SHEET: &str = "\
Quarterly Sales,,,
Generated 2024-01-05,,,
,,,
Store ID,Owner Name,Region,Amount
001,Mr. Bob Parr,north,1O0
002,Helen & Bob Parr,NORTH,250.5
,,,
003,The Smith Family,south,75
,,,300
";

// =============================================================================
// Parsing
// =============================================================================

#[test]
fn test_parse_report_sheet() {
    let file = create_test_file(REPORT_SHEET, ".csv");
    let (dataset, source) = Parser::new().parse_file(file.path()).expect("Parse failed");

    assert_eq!(source.format, "csv");
    assert_eq!(source.row_count, 9);
    assert_eq!(source.column_count, 4);
    assert!(source.hash.starts_with("sha256:"));
    assert_eq!(dataset.header, vec!["0", "1", "2", "3"]);
    assert_eq!(dataset.get(2, 0), None);
}

#[test]
fn test_parse_tsv_with_config_nulls() {
    let file = create_test_file("id\tvalue\n1\tn/a\n2\t7\n", ".tsv");
    let config = GeniusConfig::default();
    let (dataset, source) = Parser::with_config(config.parser_config())
        .parse_file(file.path())
        .unwrap();
    assert_eq!(source.format, "tsv");
    assert_eq!(dataset.get(1, 1), None);
    assert_eq!(dataset.get(2, 1), Some("7"));
}

#[test]
fn test_parse_missing_file() {
    let err = Parser::new().parse_file("/definitely/not/here.csv").unwrap_err();
    assert!(matches!(err, GeniusError::Io { .. }));
}

// =============================================================================
// Default Pipeline
// =============================================================================

#[test]
fn test_default_pipeline_on_report_sheet() {
    let file = create_test_file(REPORT_SHEET, ".csv");
    let (dataset, _) = Parser::new().parse_file(file.path()).unwrap();
    let outcome = Genius::new().go(dataset).expect("Pipeline failed");

    assert_eq!(outcome.header_idx, Some(3));
    assert_eq!(outcome.dataset.header, vec!["store_id", "owner_name", "region", "amount"]);
    assert_eq!(outcome.dataset.row_count(), 4);
    assert_eq!(outcome.metadata.total_rejected(), 4);

    let types = outcome.metadata.report("types_report").unwrap();
    assert_eq!(
        profile_field(types, "owner_name", "probable_type").and_then(|v| v.as_str()),
        Some("string")
    );
}

#[test]
fn test_subtotal_rows_removed_by_plan() {
    let file = create_test_file(REPORT_SHEET, ".csv");
    let (dataset, _) = Parser::new().parse_file(file.path()).unwrap();
    let plan = PipelinePlan::from_yaml_str("preprocess:\n  cleanse_gaps: {max_missing: 1}\n").unwrap();
    let outcome = Genius::from_plan(&plan).unwrap().go(dataset).unwrap();

    assert_eq!(outcome.dataset.row_count(), 3);
    assert_eq!(outcome.dataset.column("store_id").unwrap(), vec![Some("001"), Some("002"), Some("003")]);
}

// =============================================================================
// Planned Pipeline
// =============================================================================

#[test]
fn test_plan_file_end_to_end() {
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("sales.csv");
    fs::write(&data_path, REPORT_SHEET).unwrap();
    fs::write(
        dir.path().join("schema.yml"),
        "store_id:\n  data_type: zero_numeric\n  required: true\nregion:\n  valid_values: [North, South]\nvalid:\n  valid_values: [\"true\"]\n",
    )
    .unwrap();
    let plan_path = dir.path().join("plan.yml");
    fs::write(
        &plan_path,
        r#"
preprocess:
  cleanse_gaps: {max_missing: 1}
explore:
  uniques_report: false
clean:
  typos:
    region:
      North: [north, NORTH]
      South: south
  numeric_typos: [amount]
  names:
    - column: owner_name
  schema: schema.yml
reformat:
  template: [Store ID, First Name, Last Name, Amount, Region]
  mapping:
    store_id: store_id
    fname: first_name
    lname: last_name
    amount: amount
    region: region
"#,
    )
    .unwrap();

    let plan = PipelinePlan::from_yaml_file(&plan_path).unwrap();
    let (dataset, _) = Parser::new().parse_file(&data_path).unwrap();
    let outcome = Genius::from_plan(&plan).unwrap().go(dataset).unwrap();
    let ds = &outcome.dataset;

    assert_eq!(ds.header, vec!["store_id", "first_name", "last_name", "amount", "region"]);
    assert_eq!(ds.row_count(), 2);
    assert_eq!(ds.rows()[0], vec![
        Some("001".to_string()),
        Some("Bob".to_string()),
        Some("Parr".to_string()),
        Some("10".to_string()),
        Some("North".to_string()),
    ]);
    assert_eq!(ds.get(1, 1), Some("Helen"));

    // "The Smith Family" is not a parseable name.
    let schema = outcome.metadata.report("enforce_schema").unwrap();
    assert_eq!(schema.rejected_rows, 1);

    let out = dir.path().join("out").join("clean.tsv");
    datagenius::write_dataset(ds, &out, OutputFormat::from_path(&out)).unwrap();
    let written = fs::read_to_string(&out).unwrap();
    assert!(written.starts_with("store_id\tfirst_name\tlast_name\tamount\tregion\n001\tBob"));
}

#[test]
fn test_custom_transmutation_errors_are_named() {
    let ds = Parser::new().parse_str("id,name\n1,a\n").unwrap();
    let genius = Genius::empty().with_transmutation(RejectIncompleteRows::new(["nope"]));
    let err = genius.go(ds).unwrap_err();
    assert!(err.to_string().contains("reject_incomplete_rows"));
}

#[test]
fn test_unknown_typo_columns_are_skipped() {
    let ds = Parser::new().parse_str("id,name\n1,a\n").unwrap();
    let guides = [("nope".to_string(), CleaningGuide::new().with_rule(["a"], "A"))]
        .into_iter()
        .collect();
    let outcome = Genius::empty()
        .with_transmutation(CleanseTypos::new(guides))
        .go(ds)
        .unwrap();
    assert_eq!(outcome.dataset.get(1, 1), Some("a"));
}

#[test]
fn test_run_stage_alone() {
    let mut ds = Parser::new().parse_str("id,name\n1,a\n,b\n").unwrap();
    let genius = Genius::new().with_transmutation(RejectIncompleteRows::new(["0"]));
    let reports = genius.run_stage(Stage::Clean, &mut ds).unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(ds.row_count(), 2);
    assert_eq!(reports[0].rejected_rows, 1);
}

// =============================================================================
// Supplement
// =============================================================================

fn with_detected_header(dataset: Dataset) -> Dataset {
    Genius::empty()
        .with_transmutation(DetectHeader::new())
        .go(dataset)
        .expect("Header detection failed")
        .dataset
}

#[test]
fn test_supplement_files() {
    let dir = TempDir::new().unwrap();
    let sales = Parser::new()
        .parse_str("location,region,sales\nBayside Store,Northern,500\nPrecioso Store,Southern,1000\n")
        .unwrap();
    let stores = Parser::new()
        .parse_str("location,budget\nBayside,700\nPrecioso,1200\n")
        .unwrap();

    let sales = with_detected_header(sales);
    let stores = with_detected_header(stores);

    let guide = SupplementGuide::inexact(["location"])
        .with_thresholds(vec![0.7])
        .unwrap();
    let joined = supplement(&sales, &[stores], &[guide], None).unwrap();
    assert_eq!(joined.row_count(), 2);
    assert_eq!(joined.column("budget").unwrap(), vec![Some("700"), Some("1200")]);

    let out = dir.path().join("joined.csv");
    write_delimited(&joined, &out, b',').unwrap();
    assert!(fs::read_to_string(&out).unwrap().contains("Bayside Store"));
}
