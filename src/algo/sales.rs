use std::str::FromStr;

use log::debug;
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;

use super::product::EnrichedProduct;
use super::segments::SegmentTree;

/// Sales rollup for one segment node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSalesData {
    pub name: String,
    pub count: usize,
    pub sales: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    /// Percentage of all units sold across the tree; 0 when nothing sold.
    pub sales_share: f64,
    pub color: String,
}

/// One rollup per node, in node order.
pub fn project(tree: &SegmentTree) -> Vec<SegmentSalesData> {
    let rollups: Vec<(u64, Decimal)> = tree
        .children
        .par_iter()
        .map(|node| rollup(&node.products))
        .collect();

    let total_sales = rollups
        .iter()
        .fold(0u64, |total, (sales, _)| total.saturating_add(*sales));

    tree.children
        .iter()
        .zip(rollups)
        .map(|(node, (sales, revenue))| SegmentSalesData {
            name: node.name.clone(),
            count: node.value,
            sales,
            revenue,
            sales_share: if total_sales > 0 {
                100.0 * sales as f64 / total_sales as f64
            } else {
                0.0
            },
            color: node.color.clone(),
        })
        .collect()
}

/// Units saturate at `u64::MAX` and revenue at `Decimal::MAX`.
fn rollup(products: &[EnrichedProduct]) -> (u64, Decimal) {
    products.iter().fold((0, Decimal::ZERO), |(sales, revenue), p| {
        let price = parse_price(&p.product.price);
        let revenue = Decimal::from(p.product.sales)
            .checked_mul(price)
            .and_then(|line| revenue.checked_add(line))
            .unwrap_or_else(|| {
                debug!("revenue overflow on product '{}', capping", p.product.id);
                Decimal::MAX
            });
        (sales.saturating_add(p.product.sales), revenue)
    })
}

/// Parse a decimal-as-text price. Accepts a comma separator; anything
/// unparsable counts as zero.
pub fn parse_price(text: &str) -> Decimal {
    let normalized = text.trim().replace(',', ".");
    if normalized.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(&normalized).unwrap_or_else(|e| {
        debug!("unparsable price '{text}': {e}");
        Decimal::ZERO
    })
}
