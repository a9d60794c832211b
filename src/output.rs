use anyhow::Result;
use clap::ValueEnum;
use rust_decimal::Decimal;

use crate::report::SalesSummary;

/// Output rendering mode for the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table on stdout.
    Text,
    /// Structured JSON on stdout.
    Json,
}

const TABLE_HEADER: &str = "PRODUCT                        QTY     TOTAL VALUE";

/// Formats a value as currency with two decimal places, e.g. `199.90`.
#[must_use]
pub fn format_currency(value: Decimal) -> String {
    format!("{value:.2}")
}

/// Renders `summary` in the requested output format.
///
/// JSON mode serializes the summary with an absent `filtros` omitted
/// entirely; text mode produces the fixed-width report table.
///
/// # Errors
///
/// Returns any error from JSON serialization.
pub fn render(summary: &SalesSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(summary)?),
        OutputFormat::Text => Ok(render_text(summary)),
    }
}

fn render_text(summary: &SalesSummary) -> String {
    let mut lines: Vec<String> = Vec::new();

    if summary.totais_por_produto.is_empty() {
        lines.push("NO ITEMS FOUND IN THIS PERIOD".to_string());
    } else {
        lines.push(format!(
            "TOTAL SALES: {}",
            format_currency(summary.valor_total)
        ));
        lines.push(format!("TOP PRODUCT: {}", summary.produto_mais_vendido));
        lines.push(String::new());
        lines.push(TABLE_HEADER.to_string());
        lines.push(format!("{:-<50}", ""));
        for entry in &summary.totais_por_produto {
            lines.push(format!(
                "{:<30}  {:>4}  {:>12}",
                entry.produto,
                entry.quantidade_total,
                format_currency(entry.total_vendas)
            ));
        }
    }

    if let Some(filters) = summary.filtros {
        lines.push(String::new());
        lines.push(format!("FILTER APPLIED: {} : {}", filters.start, filters.end));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ProductTotal, ReportFilters};

    fn summary() -> SalesSummary {
        SalesSummary {
            valor_total: "55.0".parse().unwrap(),
            produto_mais_vendido: "A".to_string(),
            totais_por_produto: vec![
                ProductTotal {
                    produto: "A".to_string(),
                    quantidade_total: 5,
                    total_vendas: "50.0".parse().unwrap(),
                },
                ProductTotal {
                    produto: "B".to_string(),
                    quantidade_total: 1,
                    total_vendas: "5.0".parse().unwrap(),
                },
            ],
            filtros: None,
        }
    }

    fn filters() -> ReportFilters {
        ReportFilters {
            start: "2025-01-16".parse().unwrap(),
            end: "2025-12-31".parse().unwrap(),
        }
    }

    #[test]
    fn format_currency_fn_renders_two_decimal_places() {
        assert_eq!(format_currency("55.0".parse().unwrap()), "55.00");
        assert_eq!(format_currency("199.9".parse().unwrap()), "199.90");
        assert_eq!(format_currency(Decimal::ZERO), "0.00");
    }

    #[test]
    fn render_text_produces_fixed_width_table() {
        let text = render(&summary(), OutputFormat::Text).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "TOTAL SALES: 55.00");
        assert_eq!(lines[1], "TOP PRODUCT: A");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], TABLE_HEADER);
        assert_eq!(lines[4], "-".repeat(50));
        assert_eq!(lines.len(), 7);
        assert!(lines[5].starts_with("A "));
        assert!(lines[5].ends_with("50.00"));
        assert_eq!(lines[5].len(), 50);
        assert!(lines[6].starts_with("B "));
        assert!(lines[6].ends_with("5.00"));
    }

    #[test]
    fn render_text_reports_empty_period() {
        let empty = SalesSummary {
            valor_total: Decimal::ZERO,
            produto_mais_vendido: String::new(),
            totais_por_produto: vec![],
            filtros: None,
        };
        assert_eq!(
            render(&empty, OutputFormat::Text).unwrap(),
            "NO ITEMS FOUND IN THIS PERIOD"
        );
    }

    #[test]
    fn render_text_appends_filter_line_when_applied() {
        let mut with_filters = summary();
        with_filters.filtros = Some(filters());
        let text = render(&with_filters, OutputFormat::Text).unwrap();
        assert!(text.ends_with("\nFILTER APPLIED: 2025-01-16 : 2025-12-31"));
    }

    #[test]
    fn render_json_omits_absent_filters() {
        let json = render(&summary(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["valor_total"], 55.0);
        assert_eq!(value["produto_mais_vendido"], "A");
        assert_eq!(value["totais_por_produto"][0]["quantidade_total"], 5);
        assert!(value.get("filtros").is_none());
    }

    #[test]
    fn render_json_includes_filters_when_applied() {
        let mut with_filters = summary();
        with_filters.filtros = Some(filters());
        let json = render(&with_filters, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["filtros"]["start"], "2025-01-16");
        assert_eq!(value["filtros"]["end"], "2025-12-31");
    }
}
