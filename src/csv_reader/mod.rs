use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;

use crate::transaction::Transaction;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvError {
    FileNotFoundError(String),
    InvalidFileError(String),
}

impl fmt::Display for CsvError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "csv reading error: {}",
            match self {
                CsvError::FileNotFoundError(s) => s,
                CsvError::InvalidFileError(s) => s,
            }
        )
    }
}

impl std::error::Error for CsvError {}

/// Column positions of the statement export, resolved from the header row.
/// The column number uses 0-based index.
struct ColumnInfo {
    date: usize,
    description: usize,
    cad_amount: usize,
    usd_amount: usize,
}

lazy_static! {
    /// Statement lines that are never subscriptions: card payments,
    /// interest and fee entries.
    static ref NON_SUBSCRIPTION: Regex =
        Regex::new(r"PAYMENT - THANK YOU|PURCHASE INTEREST|OVERLIMIT FEE").unwrap();
}

pub(crate) fn read_transactions(file_path: &Path) -> Result<Vec<Transaction>, CsvError> {
    if !file_path.exists() {
        return Err(CsvError::FileNotFoundError(format!(
            "File not found: {}",
            file_path.display()
        )));
    }

    info!("Scanning CSV headers from {:?}", file_path);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(file_path)
        .map_err(|e| CsvError::InvalidFileError(e.to_string()))?;
    let headers = rdr
        .headers()
        .map_err(|e| CsvError::InvalidFileError(e.to_string()))?;
    let columns = parse_columns(headers)?;

    let mut transactions: Vec<Transaction> = vec![];
    for row in rdr.records() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                debug!("Skipping unreadable row: {}", e);
                continue;
            }
        };
        if let Some(t) = parse_row(&row, &columns) {
            transactions.push(t);
        }
    }

    info!("Parsed {} transactions", transactions.len());
    Ok(transactions)
}

fn parse_columns(headers: &StringRecord) -> Result<ColumnInfo, CsvError> {
    let mut date_index: Option<usize> = None;
    let mut description_index: Option<usize> = None;
    let mut cad_index: Option<usize> = None;
    let mut usd_index: Option<usize> = None;

    for (i, s) in headers.iter().enumerate() {
        // The first header cell may carry a UTF-8 byte-order mark.
        match s.trim_start_matches('\u{feff}').trim().to_ascii_lowercase().as_str() {
            "transaction date" => date_index = Some(i),
            "description 1" => description_index = Some(i),
            "cad$" => cad_index = Some(i),
            "usd$" => usd_index = Some(i),
            _ => {}
        }
    }

    let date = date_index.ok_or_else(|| {
        CsvError::InvalidFileError("Unable to locate 'Transaction Date' column".to_string())
    })?;
    let description = description_index.ok_or_else(|| {
        CsvError::InvalidFileError("Unable to locate 'Description 1' column".to_string())
    })?;
    let cad_amount = cad_index.ok_or_else(|| {
        CsvError::InvalidFileError("Unable to locate 'CAD$' column".to_string())
    })?;
    let usd_amount = usd_index.ok_or_else(|| {
        CsvError::InvalidFileError("Unable to locate 'USD$' column".to_string())
    })?;

    Ok(ColumnInfo {
        date,
        description,
        cad_amount,
        usd_amount,
    })
}

/// Parse one statement row. Any missing or malformed piece drops the whole
/// row; bad rows never abort the scan.
fn parse_row(row: &StringRecord, columns: &ColumnInfo) -> Option<Transaction> {
    let description = row.get(columns.description)?.trim();
    if description.is_empty() || NON_SUBSCRIPTION.is_match(description) {
        return None;
    }

    let date_str = row.get(columns.date)?.trim();
    let date = match NaiveDate::parse_from_str(date_str, "%m/%d/%Y") {
        Ok(date) => date,
        Err(_) => {
            debug!("Skipping row with unparseable date: {}", date_str);
            return None;
        }
    };

    // Either currency column may be empty; first non-empty wins.
    let cad = row.get(columns.cad_amount).unwrap_or("").trim();
    let usd = row.get(columns.usd_amount).unwrap_or("").trim();
    let amount_str = if !cad.is_empty() { cad } else { usd };
    if amount_str.is_empty() {
        return None;
    }

    let amount = match amount_str.replace(['$', ','], "").parse::<f32>() {
        Ok(amount) => amount,
        Err(_) => {
            debug!("Skipping row with unparseable amount: {}", amount_str);
            return None;
        }
    };

    Some(Transaction::new(date, description, amount))
}
