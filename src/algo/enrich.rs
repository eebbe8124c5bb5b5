//! Taxonomy enrichment: fills in universe, category, family and range for
//! every product of a catalog.
//!
//! Only a valid, non-placeholder category supplied by the product is kept.
//! Universe follows from the category through the reverse lookup; range and
//! family are drawn from the configured lists. Anything the tables cannot
//! answer falls back to a random valid value or to [`Segment::Unclassified`],
//! so a single inconsistent entry never stops the pass.

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

use super::product::{EnrichedProduct, Product, Segment};
use super::taxonomy::TaxonomyTables;

/// Enrich every product. Output has the same length and order as the input.
pub fn enrich<R: Rng + ?Sized>(
    products: &[Product],
    tables: &TaxonomyTables,
    rng: &mut R,
) -> Vec<EnrichedProduct> {
    let enriched: Vec<EnrichedProduct> = products
        .iter()
        .map(|p| enrich_product(p, tables, rng))
        .collect();
    let drawn = products
        .iter()
        .filter(|p| !Segment::from_field(p.category.as_deref()).is_known())
        .count();
    info!(
        "enriched {} products ({} categories drawn)",
        enriched.len(),
        drawn
    );
    enriched
}

pub fn enrich_product<R: Rng + ?Sized>(
    product: &Product,
    tables: &TaxonomyTables,
    rng: &mut R,
) -> EnrichedProduct {
    let range = pick(tables.ranges_of(product.laboratory.trim()), rng);

    let category = match Segment::from_field(product.category.as_deref()) {
        Segment::Unclassified => pick(tables.categories(), rng),
        known => known,
    };

    let universe = match category.name().and_then(|c| tables.universe_of(c)) {
        Some(universe) => Segment::Known(universe.to_string()),
        None => {
            debug!(
                "product '{}': category {:?} has no universe, drawing one",
                product.id, category
            );
            pick(tables.universes(), rng)
        }
    };

    let families = category
        .name()
        .map(|c| tables.families_of(c))
        .unwrap_or(&[]);
    let family = pick(families, rng);

    EnrichedProduct {
        product: product.clone(),
        universe,
        category,
        family,
        range,
    }
}

fn pick<R: Rng + ?Sized>(choices: &[String], rng: &mut R) -> Segment {
    choices
        .choose(rng)
        .map(|c| Segment::Known(c.clone()))
        .unwrap_or(Segment::Unclassified)
}
