#![doc = include_str!("../README.md")]

pub mod error;
pub mod ingest;
pub mod output;
pub mod report;
pub mod schema;

pub use error::{CoreError, FailureKind, RowFailure};
pub use output::OutputFormat;
pub use report::{compute_report, totals_by_product, ProductTotal, ReportFilters, SalesSummary};
pub use schema::Record;

use std::path::Path;

/// Reads and validates the sales CSV at `path` in one call.
///
/// This is the library entry point for the whole ingestion half of the
/// pipeline: decode (with encoding fallback), read rows, validate against the
/// sales schema. Pass the result to [`compute_report`].
///
/// # Errors
///
/// Returns any [`CoreError`] raised by ingestion or validation.
pub fn load_sales(path: impl AsRef<Path>) -> Result<Vec<Record>, CoreError> {
    let table = ingest::read_table(path)?;
    schema::validate(&table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_sales_fn_loads_and_validates_csv() {
        let records = load_sales("testdata/vendas.csv").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].produto, "Caneta");
    }

    #[test]
    fn pipeline_produces_summary_from_csv() {
        let records = load_sales("testdata/vendas.csv").unwrap();
        let summary = compute_report(&records, None).unwrap();
        assert_eq!(summary.valor_total, "55.0".parse().unwrap());
        assert_eq!(summary.produto_mais_vendido, "Caderno");
        let names: Vec<&str> = summary
            .totais_por_produto
            .iter()
            .map(|total| total.produto.as_str())
            .collect();
        assert_eq!(names, vec!["Caderno", "Caneta"]);
    }

    #[test]
    fn load_sales_fn_renders_row_failures_listing() {
        let err = load_sales("testdata/bad_rows.csv").unwrap_err();
        assert_eq!(
            err.to_string(),
            "[ERROR] Data validation failed:\n\
             Row 1: invalid value 'dois' in column 'quantidade' — incorrect type.\n\
             Row 2: required field 'produto' is missing or empty.\n\
             Row 3: invalid value '-1.0' in column 'preco_unitario' — negative."
        );
    }

    #[test]
    fn load_sales_fn_reports_missing_columns() {
        let err = load_sales("testdata/missing_column.csv").unwrap_err();
        assert!(matches!(err, CoreError::MissingColumns(_)));
        assert!(err
            .to_string()
            .starts_with("[ERROR] Missing required column(s): data, preco_unitario."));
    }
}
