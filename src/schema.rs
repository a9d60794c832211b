use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use std::str::FromStr;

use crate::error::{CoreError, FailureKind, RowFailure};
use crate::ingest::{RawRow, RawTable};

/// Semantic type a raw field must coerce to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldType {
    Text,
    Integer,
    Decimal,
    Date,
}

/// One entry in the declarative schema: the column name, the type its values
/// must coerce to, and whether negative values are rejected.
struct FieldSpec {
    name: &'static str,
    ty: FieldType,
    non_negative: bool,
}

/// The four required columns, in validation order.
const SCHEMA: [FieldSpec; 4] = [
    FieldSpec {
        name: "produto",
        ty: FieldType::Text,
        non_negative: false,
    },
    FieldSpec {
        name: "quantidade",
        ty: FieldType::Integer,
        non_negative: true,
    },
    FieldSpec {
        name: "preco_unitario",
        ty: FieldType::Decimal,
        non_negative: true,
    },
    FieldSpec {
        name: "data",
        ty: FieldType::Date,
        non_negative: false,
    },
];

/// A fully validated sales record.
///
/// Only constructed once every field of the raw row has coerced to its
/// semantic type and passed its constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub produto: String,
    pub quantidade: i64,
    pub preco_unitario: Decimal,
    pub data: NaiveDate,
}

/// Validates a [`RawTable`] against the sales schema, producing typed
/// [`Record`]s.
///
/// If any required column is absent from the header, validation fails
/// immediately with [`CoreError::MissingColumns`] naming every missing column
/// in alphabetical order; row-level checks never run. Otherwise every row is
/// validated independently, and any field-level failure fails the whole batch
/// with [`CoreError::RowFailures`], sorted by `(row, column)`. Extra columns
/// are ignored.
///
/// # Errors
///
/// Returns [`CoreError::MissingColumns`] or [`CoreError::RowFailures`] as
/// described above. No partial table is ever returned.
pub fn validate(table: &RawTable) -> Result<Vec<Record>, CoreError> {
    let mut missing: Vec<String> = SCHEMA
        .iter()
        .filter(|spec| !table.headers.iter().any(|header| header == spec.name))
        .map(|spec| spec.name.to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(CoreError::MissingColumns(missing));
    }

    let mut records = Vec::with_capacity(table.rows.len());
    let mut failures = Vec::new();
    for (index, row) in table.rows.iter().enumerate() {
        if let Some(record) = validate_row(index + 1, row, &mut failures) {
            records.push(record);
        }
    }

    if failures.is_empty() {
        Ok(records)
    } else {
        failures.sort_by_key(|failure| (failure.row, failure.column));
        Err(CoreError::RowFailures(failures))
    }
}

/// Coerces one raw row, pushing a failure per violating field. Returns the
/// typed record only when all four fields passed.
fn validate_row(row_number: usize, row: &RawRow, failures: &mut Vec<RowFailure>) -> Option<Record> {
    let mut produto = None;
    let mut quantidade = None;
    let mut preco_unitario = None;
    let mut data = None;

    for spec in &SCHEMA {
        let raw = row.get(spec.name).unwrap_or("");
        let value = raw.trim();
        if value.is_empty() {
            failures.push(RowFailure::new(
                row_number,
                spec.name,
                raw,
                FailureKind::Missing,
            ));
            continue;
        }
        match spec.ty {
            FieldType::Text => produto = Some(value.to_string()),
            FieldType::Integer => match value.parse::<i64>() {
                Ok(parsed) if spec.non_negative && parsed < 0 => failures.push(
                    RowFailure::new(row_number, spec.name, raw, FailureKind::Negative),
                ),
                Ok(parsed) => quantidade = Some(parsed),
                Err(_) => failures.push(RowFailure::new(
                    row_number,
                    spec.name,
                    raw,
                    FailureKind::TypeMismatch,
                )),
            },
            FieldType::Decimal => match Decimal::from_str(value) {
                Ok(parsed) if spec.non_negative && parsed < Decimal::ZERO => {
                    failures.push(RowFailure::new(
                        row_number,
                        spec.name,
                        raw,
                        FailureKind::Negative,
                    ));
                }
                Ok(parsed) => preco_unitario = Some(parsed),
                Err(_) => failures.push(RowFailure::new(
                    row_number,
                    spec.name,
                    raw,
                    FailureKind::TypeMismatch,
                )),
            },
            FieldType::Date => match parse_date(value) {
                Some(parsed) => data = Some(parsed),
                None => failures.push(RowFailure::new(
                    row_number,
                    spec.name,
                    raw,
                    FailureKind::TypeMismatch,
                )),
            },
        }
    }

    Some(Record {
        produto: produto?,
        quantidade: quantidade?,
        preco_unitario: preco_unitario?,
        data: data?,
    })
}

/// Parses a calendar date. ISO `YYYY-MM-DD` is the guaranteed form; a date
/// part is also taken from unambiguous `YYYY-MM-DD HH:MM:SS` or
/// `YYYY-MM-DDTHH:MM:SS` timestamps.
fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::from_str(value) {
        return Some(date);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }
    None
}
