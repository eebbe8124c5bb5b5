use nu_plugin::EvaluatedCall;
use nu_protocol::{LabeledError, PipelineData, Record, Signature, Span, SyntaxShape, Value};

use crate::algo::taxonomy::TaxonomyTables;
use crate::ops::{self, Filter};

/// Collect pipeline input into JSON rows for the ops layer.
///
/// A single record becomes one row; `Nothing` becomes no rows.
pub fn input_rows(input: PipelineData) -> Vec<serde_json::Value> {
    match input {
        PipelineData::Value(Value::List { vals, .. }, _) => vals.iter().map(to_json).collect(),
        PipelineData::Value(Value::Nothing { .. }, _) => vec![],
        PipelineData::Value(value, _) => vec![to_json(&value)],
        other => other.into_iter().map(|v| to_json(&v)).collect(),
    }
}

/// Convert a Nushell value to JSON. Values without a JSON counterpart become null.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool { val, .. } => serde_json::Value::Bool(*val),
        Value::Int { val, .. } => serde_json::json!(*val),
        Value::Float { val, .. } => serde_json::json!(*val),
        Value::String { val, .. } => serde_json::Value::String(val.clone()),
        Value::List { vals, .. } => serde_json::Value::Array(vals.iter().map(to_json).collect()),
        Value::Record { val, .. } => {
            let mut map = serde_json::Map::new();
            for (col, v) in val.iter() {
                map.insert(col.clone(), to_json(v));
            }
            serde_json::Value::Object(map)
        }
        _ => serde_json::Value::Null,
    }
}

/// Convert an ops result back into a Nushell value.
pub fn from_json(value: &serde_json::Value, span: Span) -> Value {
    match value {
        serde_json::Value::Null => Value::nothing(span),
        serde_json::Value::Bool(b) => Value::bool(*b, span),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::int(i, span),
            None => Value::float(n.as_f64().unwrap_or(0.0), span),
        },
        serde_json::Value::String(s) => Value::string(s, span),
        serde_json::Value::Array(items) => {
            Value::list(items.iter().map(|v| from_json(v, span)).collect(), span)
        }
        serde_json::Value::Object(map) => {
            let mut record = Record::new();
            for (col, v) in map {
                record.push(col, from_json(v, span));
            }
            Value::record(record, span)
        }
    }
}

/// Tables from `--taxonomy`, or the default resolution chain.
pub fn tables_flag(path: Option<String>) -> Result<TaxonomyTables, LabeledError> {
    ops::resolve_tables(path.as_deref()).map_err(LabeledError::new)
}

pub fn seed_flag(seed: Option<i64>) -> Option<u64> {
    seed.map(|s| s as u64)
}

/// Flags shared by the commands that aggregate products.
pub fn segment_signature(signature: Signature) -> Signature {
    signature
        .named(
            "level",
            SyntaxShape::String,
            "Taxonomy level: universe, category, family, range (default: category)",
            Some('l'),
        )
        .named(
            "laboratory",
            SyntaxShape::String,
            "Keep only products of this laboratory",
            None,
        )
        .named(
            "within-level",
            SyntaxShape::String,
            "Level of the segment to drill into (use with --within)",
            None,
        )
        .named(
            "within",
            SyntaxShape::String,
            "Segment to drill into (use with --within-level)",
            None,
        )
        .switch(
            "enrich",
            "Enrich products before aggregating instead of using their taxonomy fields as-is",
            Some('e'),
        )
        .named(
            "taxonomy",
            SyntaxShape::String,
            "Path to taxonomy JSON file (default: embedded pharmacy taxonomy)",
            Some('t'),
        )
        .named(
            "seed",
            SyntaxShape::Int,
            "Random seed for reproducible enrichment",
            None,
        )
}

pub fn filter_flags(call: &EvaluatedCall) -> Result<Filter, LabeledError> {
    Ok(Filter {
        laboratory: call.get_flag("laboratory")?,
        within_level: call.get_flag("within-level")?,
        within: call.get_flag("within")?,
    })
}
