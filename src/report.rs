use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use serde_with::skip_serializing_none;

use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::schema::Record;

/// Aggregated sales for a single product.
///
/// One instance per distinct product name in the (possibly filtered) dataset;
/// never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductTotal {
    pub produto: String,
    pub quantidade_total: i64,
    /// Sum of `quantidade * preco_unitario` over the group, rounded to two
    /// decimal places with round-half-to-even.
    pub total_vendas: Decimal,
}

/// An inclusive date range restricting which rows participate in aggregation.
///
/// Both bounds travel together; a lone `start` or `end` is rejected at the
/// CLI boundary before the core ever sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportFilters {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportFilters {
    fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The final sales summary, ready for rendering.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummary {
    /// Exact decimal sum of the already-rounded per-product totals.
    pub valor_total: Decimal,
    /// Product with the highest total quantity; empty when there are no rows.
    pub produto_mais_vendido: String,
    /// Per-product breakdown, ascending by product name.
    pub totais_por_produto: Vec<ProductTotal>,
    /// The applied date range, absent when no filter was requested.
    pub filtros: Option<ReportFilters>,
}

/// Groups `records` by exact product-name equality and sums quantity and
/// sale value per product, ascending by product name.
///
/// Per-row value is `quantidade * preco_unitario` in exact decimal; each
/// group's value sum is rounded to two decimal places with
/// round-half-to-even. Empty input yields empty output.
///
/// # Errors
///
/// Returns [`CoreError::Coercion`] if the decimal arithmetic overflows.
pub fn totals_by_product<'a, I>(records: I) -> Result<Vec<ProductTotal>, CoreError>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups: BTreeMap<&str, (i64, Decimal)> = BTreeMap::new();
    for record in records {
        let value = Decimal::from(record.quantidade)
            .checked_mul(record.preco_unitario)
            .ok_or_else(|| overflow(&record.produto))?;
        let (quantidade, total) = groups
            .entry(record.produto.as_str())
            .or_insert((0, Decimal::ZERO));
        *quantidade = quantidade
            .checked_add(record.quantidade)
            .ok_or_else(|| overflow(&record.produto))?;
        *total = total
            .checked_add(value)
            .ok_or_else(|| overflow(&record.produto))?;
    }
    Ok(groups
        .into_iter()
        .map(|(produto, (quantidade_total, total))| ProductTotal {
            produto: produto.to_string(),
            quantidade_total,
            total_vendas: total.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven),
        })
        .collect())
}

/// Computes the full [`SalesSummary`] for `records`, restricted to the
/// filter window first when one is supplied.
///
/// `valor_total` sums the already-rounded per-product totals in exact
/// decimal. `produto_mais_vendido` is the product with the maximum total
/// quantity; ties go to the first such product in name order.
///
/// # Errors
///
/// Returns [`CoreError::Coercion`] if the decimal arithmetic overflows.
pub fn compute_report(
    records: &[Record],
    filters: Option<ReportFilters>,
) -> Result<SalesSummary, CoreError> {
    let totals = match filters {
        Some(window) => {
            totals_by_product(records.iter().filter(|record| window.contains(record.data)))?
        }
        None => totals_by_product(records)?,
    };

    let mut valor_total = Decimal::ZERO;
    for total in &totals {
        valor_total = valor_total
            .checked_add(total.total_vendas)
            .ok_or_else(|| overflow(&total.produto))?;
    }

    // Strictly-greater replacement over the name-sorted totals, so the
    // alphabetically-first product wins ties.
    let mut top: Option<&ProductTotal> = None;
    for total in &totals {
        if top.map_or(true, |best| total.quantidade_total > best.quantidade_total) {
            top = Some(total);
        }
    }
    let produto_mais_vendido = top.map(|total| total.produto.clone()).unwrap_or_default();

    Ok(SalesSummary {
        valor_total,
        produto_mais_vendido,
        totais_por_produto: totals,
        filtros: filters,
    })
}

fn overflow(produto: &str) -> CoreError {
    CoreError::Coercion(format!("value overflow aggregating product '{produto}'"))
}
