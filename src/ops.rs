//! Shared operation wrappers for all interfaces (CLI, plugin).
//!
//! Each `op_*` function is a pure, synchronous wrapper around one or more
//! `algo` modules. Input and output are `serde_json::Value` — no dependency
//! on clap or nu-plugin.
//!
//! Every operation takes an optional seed. With a seed the output is
//! reproducible; without one the generator is seeded from the OS.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::Value;

use crate::algo::positioning::{self, SegmentType};
use crate::algo::product::{EnrichedProduct, Product, TaxonomyLevel};
use crate::algo::taxonomy::{self, TaxonomyTables};
use crate::algo::{enrich, sales, segments};

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Narrows the product set before aggregation.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    /// Keep only products of this laboratory.
    pub laboratory: Option<String>,
    /// Drill down: keep only products whose value at `within_level` is `within`.
    pub within_level: Option<String>,
    pub within: Option<String>,
}

pub fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Tables from an explicit path, or the default resolution chain.
pub fn resolve_tables(path: Option<&str>) -> Result<TaxonomyTables, String> {
    match path {
        Some(path) => taxonomy::load_tables(path).map_err(|e| e.to_string()),
        None => Ok(taxonomy::default_tables()),
    }
}

pub fn decode_products(rows: &[Value]) -> Result<Vec<Product>, String> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            serde_json::from_value(row.clone()).map_err(|e| format!("Invalid product at row {i}: {e}"))
        })
        .collect()
}

pub fn parse_level(name: &str) -> Result<TaxonomyLevel, String> {
    TaxonomyLevel::from_str(name).ok_or_else(|| {
        format!(
            "Unknown level '{name}'. Use: {}",
            TaxonomyLevel::all_names().join(", ")
        )
    })
}

pub fn parse_segment_type(name: &str) -> Result<SegmentType, String> {
    SegmentType::from_str(name).ok_or_else(|| {
        format!(
            "Unknown segment type '{name}'. Use: {}",
            SegmentType::all_names().join(", ")
        )
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| format!("Failed to serialize result: {e}"))
}

/// Decode, filter and (optionally) enrich the input rows.
///
/// Without `enrich` the rows are taken as already classified.
fn prepare(
    rows: &[Value],
    filter: &Filter,
    enrich_rows: bool,
    tables: &TaxonomyTables,
    rng: &mut StdRng,
) -> Result<Vec<EnrichedProduct>, String> {
    let within = match (&filter.within_level, &filter.within) {
        (Some(level), Some(name)) => Some((parse_level(level)?, name.as_str())),
        (None, None) => None,
        _ => return Err("Drill-down needs both 'within_level' and 'within'".into()),
    };

    let mut products = decode_products(rows)?;
    if let Some(lab) = &filter.laboratory {
        let lab = lab.trim();
        products.retain(|p| p.laboratory.trim().eq_ignore_ascii_case(lab));
    }

    let enriched = if enrich_rows {
        enrich::enrich(&products, tables, rng)
    } else {
        products
            .into_iter()
            .map(EnrichedProduct::from_classified)
            .collect()
    };

    Ok(match within {
        Some((level, name)) => segments::filter_by_segment(&enriched, level, name),
        None => enriched,
    })
}

// ── Operations ───────────────────────────────────────────────────────────────

pub fn op_enrich(
    rows: &[Value],
    tables: &TaxonomyTables,
    seed: Option<u64>,
) -> Result<Value, String> {
    if rows.is_empty() {
        return Ok(Value::Array(vec![]));
    }
    let products = decode_products(rows)?;
    let enriched = enrich::enrich(&products, tables, &mut rng_for(seed));
    to_json(&enriched)
}

pub fn op_aggregate(
    rows: &[Value],
    level: &str,
    filter: &Filter,
    enrich_rows: bool,
    tables: &TaxonomyTables,
    seed: Option<u64>,
) -> Result<Value, String> {
    let level = parse_level(level)?;
    let products = prepare(rows, filter, enrich_rows, tables, &mut rng_for(seed))?;
    to_json(&segments::aggregate(&products, level))
}

pub fn op_sales(
    rows: &[Value],
    level: &str,
    filter: &Filter,
    enrich_rows: bool,
    tables: &TaxonomyTables,
    seed: Option<u64>,
) -> Result<Value, String> {
    let level = parse_level(level)?;
    let products = prepare(rows, filter, enrich_rows, tables, &mut rng_for(seed))?;
    let aggregation = segments::aggregate(&products, level);
    to_json(&sales::project(&aggregation.tree))
}

pub fn op_positioning(
    lab_name: &str,
    segment_type: &str,
    segment_name: &str,
    tables: &TaxonomyTables,
    seed: Option<u64>,
) -> Result<Value, String> {
    let segment_type = parse_segment_type(segment_type)?;
    let data = positioning::generate_positioning(
        lab_name,
        segment_type,
        segment_name,
        tables.competitor_pool(),
        &mut rng_for(seed),
    );
    to_json(&data)
}

/// Position a laboratory in the largest segment of its own catalog.
///
/// Aggregates at `level`, takes the top segment, and generates the
/// positioning there. Returns `null` when the lab has no products.
pub fn op_position_top_segment(
    rows: &[Value],
    lab_name: &str,
    level: &str,
    enrich_rows: bool,
    tables: &TaxonomyTables,
    seed: Option<u64>,
) -> Result<Value, String> {
    let level = parse_level(level)?;
    let segment_type = SegmentType::from_level(level)
        .ok_or_else(|| format!("No positioning at level '{}'", level.name()))?;
    let filter = Filter {
        laboratory: Some(lab_name.to_string()),
        ..Default::default()
    };
    let mut rng = rng_for(seed);
    let products = prepare(rows, &filter, enrich_rows, tables, &mut rng)?;
    let aggregation = segments::aggregate(&products, level);
    if aggregation.stats.total_products == 0 {
        return Ok(Value::Null);
    }
    let data = positioning::generate_positioning(
        lab_name,
        segment_type,
        &aggregation.stats.top_segment.name,
        tables.competitor_pool(),
        &mut rng,
    );
    to_json(&data)
}
