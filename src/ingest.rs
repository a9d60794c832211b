use log::{info, warn};

use std::{fs, path::Path};

use crate::error::CoreError;

/// A single data row as read from the file: an ordered list of
/// `(column, value)` string pairs, with column names already trimmed and
/// lowercased.
#[derive(Debug, Clone)]
pub struct RawRow {
    fields: Vec<(String, String)>,
}

impl RawRow {
    #[must_use]
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// Returns the raw value for `column`, if the row has one.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

/// The untyped result of ingestion, consumed by [`crate::schema::validate`].
#[derive(Debug)]
pub struct RawTable {
    /// Header names, trimmed and lowercased, in file order.
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    /// Whether the fallback encoding was needed to decode the file.
    pub used_fallback: bool,
}

/// Reads the CSV file at `path` into a [`RawTable`].
///
/// The file is decoded as UTF-8 first. If that fails on an invalid byte
/// sequence, the same bytes are decoded again with windows-1252, which is
/// total over 8-bit input, and a warning is logged. Header names are trimmed
/// of surrounding whitespace and lowercased before use as column keys.
///
/// # Errors
///
/// Returns [`CoreError::Io`] if the file cannot be read,
/// [`CoreError::Undecodable`] if neither decode attempt succeeds, and
/// [`CoreError::Csv`] for malformed delimited data such as ragged rows.
pub fn read_table(path: impl AsRef<Path>) -> Result<RawTable, CoreError> {
    let path = path.as_ref();
    info!("reading CSV from {}", path.display());
    let bytes = fs::read(path).map_err(|source| CoreError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let (text, used_fallback) = decode(bytes, path)?;

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|name| name.trim().to_lowercase())
        .collect();
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let fields = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        rows.push(RawRow::new(fields));
    }
    info!("CSV read: {} data rows", rows.len());
    Ok(RawTable {
        headers,
        rows,
        used_fallback,
    })
}

fn decode(bytes: Vec<u8>, path: &Path) -> Result<(String, bool), CoreError> {
    match String::from_utf8(bytes) {
        Ok(text) => Ok((text, false)),
        Err(err) => {
            warn!("utf-8 decoding failed; falling back to windows-1252");
            let bytes = err.into_bytes();
            let (decoded, _, had_errors) = encoding_rs::WINDOWS_1252.decode(&bytes);
            if had_errors {
                // windows-1252 is total, so this should be unreachable.
                return Err(CoreError::Undecodable {
                    path: path.display().to_string(),
                });
            }
            Ok((decoded.into_owned(), true))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_table_fn_reads_utf8_file_without_fallback() {
        let table = read_table("testdata/vendas.csv").unwrap();
        assert!(!table.used_fallback);
        assert_eq!(
            table.headers,
            vec!["produto", "quantidade", "preco_unitario", "data"]
        );
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].get("produto"), Some("Caderno"));
        assert_eq!(table.rows[2].get("preco_unitario"), Some("5.0"));
    }

    #[test]
    fn read_table_fn_trims_and_lowercases_headers() {
        let table = read_table("testdata/headers_mixed.csv").unwrap();
        assert_eq!(
            table.headers,
            vec!["produto", "quantidade", "preco_unitario", "data"]
        );
        assert_eq!(table.rows[0].get("quantidade"), Some("2"));
    }

    #[test]
    fn read_table_fn_falls_back_to_windows_1252() {
        let table = read_table("testdata/vendas_latin1.csv").unwrap();
        assert!(table.used_fallback);
        assert_eq!(table.rows[0].get("produto"), Some("Caça-níquel"));
    }

    #[test]
    fn read_table_fn_reports_missing_file() {
        let err = read_table("testdata/no_such_file.csv").unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }

    #[test]
    fn raw_row_get_fn_returns_none_for_unknown_column() {
        let table = read_table("testdata/vendas.csv").unwrap();
        assert_eq!(table.rows[0].get("desconto"), None);
    }
}
