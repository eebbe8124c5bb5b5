use std::collections::HashMap;

use serde::Serialize;

use super::product::{EnrichedProduct, Segment, TaxonomyLevel};

/// Chart colors, assigned to nodes by their rank after sorting.
pub const PALETTE: [&str; 12] = [
    "#2563EB", "#16A34A", "#F59E0B", "#DC2626", "#7C3AED", "#0891B2", "#DB2777", "#65A30D",
    "#EA580C", "#4F46E5", "#0D9488", "#9333EA",
];

/// Name of the root of every segment tree.
pub const ROOT_NAME: &str = "Segments";

pub fn palette_color(rank: usize) -> &'static str {
    PALETTE[rank % PALETTE.len()]
}

/// One group of products sharing a value at the aggregated level.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentNode {
    pub name: String,
    pub value: usize,
    pub color: String,
    pub products: Vec<EnrichedProduct>,
    #[serde(skip)]
    pub segment: Segment,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentTree {
    pub name: String,
    pub children: Vec<SegmentNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopSegment {
    pub name: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStats {
    pub total_products: usize,
    pub segment_count: usize,
    pub top_segment: TopSegment,
}

#[derive(Debug, Clone, Serialize)]
pub struct Aggregation {
    pub tree: SegmentTree,
    pub stats: SegmentStats,
}

/// Group products by their value at `level`.
///
/// Every product lands in exactly one node. Nodes are sorted by size,
/// descending; equal sizes keep the order in which their segment was first
/// seen.
pub fn aggregate(products: &[EnrichedProduct], level: TaxonomyLevel) -> Aggregation {
    let mut index: HashMap<&Segment, usize> = HashMap::new();
    let mut groups: Vec<(&Segment, Vec<EnrichedProduct>)> = Vec::new();

    for product in products {
        let segment = product.segment(level);
        match index.get(segment) {
            Some(&i) => groups[i].1.push(product.clone()),
            None => {
                index.insert(segment, groups.len());
                groups.push((segment, vec![product.clone()]));
            }
        }
    }

    // sort_by is stable
    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let children: Vec<SegmentNode> = groups
        .into_iter()
        .enumerate()
        .map(|(rank, (segment, members))| SegmentNode {
            name: segment.label(level).to_string(),
            value: members.len(),
            color: palette_color(rank).to_string(),
            products: members,
            segment: segment.clone(),
        })
        .collect();

    let stats = segment_stats(&children, products.len());

    Aggregation {
        tree: SegmentTree {
            name: ROOT_NAME.to_string(),
            children,
        },
        stats,
    }
}

/// Summary over sorted nodes. The top segment is the first node.
pub fn segment_stats(children: &[SegmentNode], total_products: usize) -> SegmentStats {
    let top_segment = match children.first() {
        Some(top) if total_products > 0 => TopSegment {
            name: top.name.clone(),
            count: top.value,
            percentage: 100.0 * top.value as f64 / total_products as f64,
        },
        _ => TopSegment::default(),
    };

    SegmentStats {
        total_products,
        segment_count: children.len(),
        top_segment,
    }
}

/// Products whose value at `level` renders as `name`. Used to drill down
/// from one level to the next before aggregating again.
pub fn filter_by_segment(
    products: &[EnrichedProduct],
    level: TaxonomyLevel,
    name: &str,
) -> Vec<EnrichedProduct> {
    let name = name.trim();
    products
        .iter()
        .filter(|p| p.label(level) == name)
        .cloned()
        .collect()
}
