use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nu_plugin_segments::algo::positioning::{self, SegmentType};
use nu_plugin_segments::algo::product::{Product, TaxonomyLevel};
use nu_plugin_segments::algo::taxonomy::embedded_tables;
use nu_plugin_segments::algo::{enrich, sales, segments};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Generate a synthetic catalog, a third of it already categorised.
fn generate_products(n: usize) -> Vec<Product> {
    let labs = ["Sanofi", "Pfizer", "Bayer", "Pierre Fabre", "L'Oréal", "Urgo", "Acme"];
    let categories = ["Douleur & Fièvre", "Beauté", "Digestion", "Solaire"];
    (0..n)
        .map(|i| Product {
            id: i.to_string(),
            name: format!("product-{i}"),
            laboratory: labs[i % labs.len()].to_string(),
            sales: (i % 97) as u64,
            stock: (i % 31) as u64,
            price: format!("{}.{:02}", 1 + i % 40, i % 100),
            margin: "1.20".into(),
            category: (i % 3 == 0).then(|| categories[i % categories.len()].to_string()),
            ..Default::default()
        })
        .collect()
}

fn bench_enrich(c: &mut Criterion) {
    let mut group = c.benchmark_group("enrich");
    for size in [100, 1000, 10000] {
        let products = generate_products(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &products, |b, p| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(42);
                black_box(enrich::enrich(p, embedded_tables(), &mut rng))
            })
        });
    }
    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let products = generate_products(10000);
    let mut rng = StdRng::seed_from_u64(42);
    let enriched = enrich::enrich(&products, embedded_tables(), &mut rng);

    let mut group = c.benchmark_group("aggregate");
    for level in [
        TaxonomyLevel::Universe,
        TaxonomyLevel::Category,
        TaxonomyLevel::Family,
        TaxonomyLevel::Range,
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(level.name()), &level, |b, &l| {
            b.iter(|| black_box(segments::aggregate(&enriched, l)))
        });
    }
    group.finish();
}

fn bench_sales(c: &mut Criterion) {
    let products = generate_products(10000);
    let mut rng = StdRng::seed_from_u64(42);
    let enriched = enrich::enrich(&products, embedded_tables(), &mut rng);
    let aggregation = segments::aggregate(&enriched, TaxonomyLevel::Family);

    c.bench_function("sales/10000_family", |b| {
        b.iter(|| black_box(sales::project(&aggregation.tree)))
    });
}

fn bench_positioning(c: &mut Criterion) {
    let pool = embedded_tables().competitor_pool();
    c.bench_function("positioning/family", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| {
            black_box(positioning::generate_positioning(
                "Acme",
                SegmentType::Family,
                "Antalgiques",
                pool,
                &mut rng,
            ))
        })
    });
}

criterion_group!(
    benches,
    bench_enrich,
    bench_aggregate,
    bench_sales,
    bench_positioning
);
criterion_main!(benches);
