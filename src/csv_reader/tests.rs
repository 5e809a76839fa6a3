use std::path::PathBuf;

use crate::csv_reader::{read_transactions, CsvError};

#[test]
fn test_read_statement() {
    let results = read_transactions(&fixture_filename("statement.csv"));
    match results {
        Ok(rows) => {
            // Skip patterns, the empty description, the bad date and the
            // amount-less row are all dropped.
            assert_eq!(rows.len(), 5);

            let netflix: Vec<_> = rows
                .iter()
                .filter(|t| t.description == "NETFLIX.COM")
                .collect();
            assert_eq!(netflix.len(), 3);
            assert!(netflix.iter().all(|t| t.is_charge()));
        }
        Err(e) => panic!("Unexpected results: {}", e),
    }
}

#[test]
fn test_usd_column_used_when_cad_empty() {
    let rows = read_transactions(&fixture_filename("statement.csv")).unwrap();
    let openai = rows
        .iter()
        .find(|t| t.description.starts_with("OPENAI"))
        .unwrap();
    assert!((openai.amount - -20.00).abs() < 1e-6);
}

#[test]
fn test_amount_with_currency_formatting() {
    let rows = read_transactions(&fixture_filename("statement.csv")).unwrap();
    let amazon = rows
        .iter()
        .find(|t| t.description.starts_with("AMAZON"))
        .unwrap();
    assert!((amazon.amount - -1234.56).abs() < 1e-3);
}

#[test]
fn test_fully_malformed_rows_yield_empty_list() {
    let rows = read_transactions(&fixture_filename("garbage.csv")).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_missing_file() {
    let result = read_transactions(&fixture_filename("no-such-file.csv"));
    assert!(matches!(result, Err(CsvError::FileNotFoundError(_))));
}

#[test]
fn test_missing_description_column() {
    let result = read_transactions(&fixture_filename("wrong_header.csv"));
    assert!(matches!(result, Err(CsvError::InvalidFileError(_))));
}

/// Return the path to a file within the test data directory
fn fixture_filename(filename: &str) -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.push("fixture");
    dir.push(filename);
    dir
}
