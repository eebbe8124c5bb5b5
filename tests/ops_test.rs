use nu_plugin_segments::algo::taxonomy::{embedded_tables, parse_tables};
use nu_plugin_segments::ops::{self, Filter};
use serde_json::{json, Value};
use std::collections::HashSet;

fn sample_products() -> Vec<Value> {
    vec![
        json!({"id": "1", "name": "Doliprane 1000", "laboratory": "Sanofi", "sales": 10, "stock": 40, "price": "2.18", "margin": "0.45", "category": "Douleur & Fièvre"}),
        json!({"id": "2", "name": "Doliprane 500", "laboratory": "Sanofi", "sales": 5, "stock": 22, "price": "1.95", "margin": "0.40", "category": "Douleur & Fièvre"}),
        json!({"id": "3", "name": "Crème hydratante", "laboratory": "Pfizer", "sales": 3, "stock": 8, "price": "12.90", "margin": "4.10", "category": "Beauté"}),
    ]
}

fn catalog(n: usize) -> Vec<Value> {
    let labs = ["Sanofi", "Pfizer", "Bayer", "Pierre Fabre", "Acme"];
    (0..n)
        .map(|i| {
            json!({
                "id": i.to_string(),
                "name": format!("product {i}"),
                "laboratory": labs[i % labs.len()],
                "sales": (i * 7) % 50,
                "stock": 10,
                "price": format!("{}.{:02}", 1 + i % 20, i % 100),
                "margin": "1.00",
            })
        })
        .collect()
}

#[test]
fn ops_aggregate_concrete_scenario() {
    let result = ops::op_aggregate(
        &sample_products(),
        "category",
        &Filter::default(),
        false,
        embedded_tables(),
        None,
    )
    .unwrap();

    let children = result["tree"]["children"].as_array().unwrap();
    assert_eq!(result["tree"]["name"], "Segments");
    assert_eq!(children.len(), 2);
    assert_eq!(children[0]["name"], "Douleur & Fièvre");
    assert_eq!(children[0]["value"], 2);
    assert_eq!(children[1]["name"], "Beauté");
    assert_eq!(children[1]["value"], 1);

    let stats = &result["stats"];
    assert_eq!(stats["totalProducts"], 3);
    assert_eq!(stats["segmentCount"], 2);
    assert_eq!(stats["topSegment"]["name"], "Douleur & Fièvre");
    assert_eq!(stats["topSegment"]["count"], 2);
    let pct = stats["topSegment"]["percentage"].as_f64().unwrap();
    assert!((pct - 66.67).abs() < 0.01);
}

#[test]
fn ops_aggregate_empty() {
    let result = ops::op_aggregate(
        &[],
        "category",
        &Filter::default(),
        false,
        embedded_tables(),
        None,
    )
    .unwrap();
    assert_eq!(
        result,
        json!({
            "tree": {"name": "Segments", "children": []},
            "stats": {
                "totalProducts": 0,
                "segmentCount": 0,
                "topSegment": {"name": "", "count": 0, "percentage": 0.0}
            }
        })
    );
}

#[test]
fn ops_enrich_fills_every_level() {
    let rows = catalog(30);
    let result = ops::op_enrich(&rows, embedded_tables(), Some(42)).unwrap();
    let arr = result.as_array().unwrap();
    assert_eq!(arr.len(), 30);
    for (row, input) in arr.iter().zip(&rows) {
        assert_eq!(row["id"], input["id"]);
        for field in ["universe", "category", "family", "range_name"] {
            let value = row[field].as_str().unwrap();
            assert!(!value.is_empty(), "{field} is empty");
        }
    }
}

#[test]
fn ops_enrich_is_reproducible_with_seed() {
    let rows = catalog(25);
    let a = ops::op_enrich(&rows, embedded_tables(), Some(7)).unwrap();
    let b = ops::op_enrich(&rows, embedded_tables(), Some(7)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn ops_enrich_empty() {
    let result = ops::op_enrich(&[], embedded_tables(), None).unwrap();
    assert_eq!(result, json!([]));
}

#[test]
fn ops_enrich_rejects_malformed_rows() {
    let rows = vec![json!({"id": "1", "sales": "many"})];
    let err = ops::op_enrich(&rows, embedded_tables(), Some(1)).unwrap_err();
    assert!(err.contains("row 0"));
}

#[test]
fn ops_aggregate_enriched_partition() {
    let rows = catalog(60);
    for level in ["universe", "category", "family", "range"] {
        let result = ops::op_aggregate(
            &rows,
            level,
            &Filter::default(),
            true,
            embedded_tables(),
            Some(3),
        )
        .unwrap();
        let children = result["tree"]["children"].as_array().unwrap();
        let total: u64 = children.iter().map(|c| c["value"].as_u64().unwrap()).sum();
        assert_eq!(total, 60, "level {level}");

        let ids: Vec<&str> = children
            .iter()
            .flat_map(|c| c["products"].as_array().unwrap())
            .map(|p| p["id"].as_str().unwrap())
            .collect();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(ids.len(), 60);
        assert_eq!(unique.len(), 60);

        let values: Vec<u64> = children.iter().map(|c| c["value"].as_u64().unwrap()).collect();
        for w in values.windows(2) {
            assert!(w[0] >= w[1]);
        }
    }
}

#[test]
fn ops_aggregate_laboratory_filter() {
    let filter = Filter {
        laboratory: Some("sanofi".into()),
        ..Default::default()
    };
    let result = ops::op_aggregate(
        &sample_products(),
        "category",
        &filter,
        false,
        embedded_tables(),
        None,
    )
    .unwrap();
    assert_eq!(result["stats"]["totalProducts"], 2);
    assert_eq!(result["stats"]["segmentCount"], 1);
}

#[test]
fn ops_aggregate_drill_down() {
    let rows = catalog(80);
    let filter = Filter {
        within_level: Some("universe".into()),
        within: Some("Médicaments".into()),
        ..Default::default()
    };
    let result =
        ops::op_aggregate(&rows, "category", &filter, true, embedded_tables(), Some(5)).unwrap();
    let medicines = embedded_tables().categories_of("Médicaments");
    for child in result["tree"]["children"].as_array().unwrap() {
        let name = child["name"].as_str().unwrap();
        assert!(medicines.iter().any(|c| c == name), "{name} is not a medicine");
    }
}

#[test]
fn ops_aggregate_half_drill_down_is_an_error() {
    let filter = Filter {
        within: Some("Médicaments".into()),
        ..Default::default()
    };
    let result = ops::op_aggregate(
        &sample_products(),
        "category",
        &filter,
        false,
        embedded_tables(),
        None,
    );
    assert!(result.is_err());
}

#[test]
fn ops_aggregate_invalid_level() {
    let result = ops::op_aggregate(
        &sample_products(),
        "brand",
        &Filter::default(),
        false,
        embedded_tables(),
        None,
    );
    let err = result.unwrap_err();
    assert!(err.contains("universe, category, family, range"));
}

#[test]
fn ops_sales_rollup() {
    let result = ops::op_sales(
        &sample_products(),
        "category",
        &Filter::default(),
        false,
        embedded_tables(),
        None,
    )
    .unwrap();
    let arr = result.as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["name"], "Douleur & Fièvre");
    assert_eq!(arr[0]["count"], 2);
    assert_eq!(arr[0]["sales"], 15);
    let revenue = arr[0]["revenue"].as_f64().unwrap();
    assert!((revenue - 31.55).abs() < 1e-9);
    assert_eq!(arr[1]["sales"], 3);
    assert!(arr[0]["color"].as_str().unwrap().starts_with('#'));
}

#[test]
fn ops_positioning_family() {
    let result =
        ops::op_positioning("Acme", "family", "Antalgiques", embedded_tables(), None).unwrap();
    let competitors = result["competitors"].as_array().unwrap();
    assert_eq!(competitors.len(), 5);
    let total: u64 = competitors.iter().map(|c| c["share"].as_u64().unwrap()).sum();
    assert_eq!(total, 100);
    let rank = result["rank"].as_u64().unwrap();
    assert!((1..=5).contains(&rank));
    assert_eq!(competitors[(rank - 1) as usize]["isMain"], true);
    assert_eq!(result["segment"], "Antalgiques");
    assert_eq!(result["segmentType"], "family");
}

#[test]
fn ops_positioning_invalid_type() {
    let result = ops::op_positioning("Acme", "range", "x", embedded_tables(), Some(1));
    assert!(result.is_err());
}

#[test]
fn ops_position_top_segment() {
    let result = ops::op_position_top_segment(
        &sample_products(),
        "Sanofi",
        "category",
        false,
        embedded_tables(),
        Some(9),
    )
    .unwrap();
    assert_eq!(result["segment"], "Douleur & Fièvre");
    assert_eq!(result["segmentType"], "category");
    assert_eq!(result["competitors"].as_array().unwrap().len(), 5);
}

#[test]
fn ops_position_top_segment_without_products() {
    let result = ops::op_position_top_segment(
        &sample_products(),
        "Acme",
        "category",
        false,
        embedded_tables(),
        Some(9),
    )
    .unwrap();
    assert!(result.is_null());
}

#[test]
fn ops_position_top_segment_rejects_range() {
    let result = ops::op_position_top_segment(
        &sample_products(),
        "Sanofi",
        "range",
        false,
        embedded_tables(),
        None,
    );
    assert!(result.is_err());
}

#[test]
fn ops_position_top_segment_is_reproducible_with_seed() {
    let rows = catalog(40);
    let run = || {
        ops::op_position_top_segment(&rows, "Sanofi", "family", true, embedded_tables(), Some(11))
            .unwrap()
    };
    let a = run();
    assert!(!a.is_null());
    assert_eq!(a, run());
}

#[test]
fn ops_position_top_segment_matches_direct_positioning() {
    let top = ops::op_position_top_segment(
        &sample_products(),
        "Sanofi",
        "category",
        false,
        embedded_tables(),
        Some(21),
    )
    .unwrap();
    let direct = ops::op_positioning(
        "Sanofi",
        "category",
        "Douleur & Fièvre",
        embedded_tables(),
        Some(21),
    )
    .unwrap();
    assert_eq!(top, direct);
}

#[test]
fn ops_positioning_without_competitor_pool() {
    let tables = parse_tables(
        r#"{"name": "bare", "version": "1",
            "universes": [{"name": "U", "categories": [{"name": "C"}]}]}"#,
    )
    .unwrap();
    let result = ops::op_positioning("Acme", "category", "C", &tables, Some(4)).unwrap();
    let competitors = result["competitors"].as_array().unwrap();
    assert_eq!(competitors.len(), 5);
    let total: u64 = competitors.iter().map(|c| c["share"].as_u64().unwrap()).sum();
    assert_eq!(total, 100);
    let names: HashSet<&str> = competitors.iter().map(|c| c["name"].as_str().unwrap()).collect();
    assert_eq!(names.len(), 5);
    assert!(names.contains("Concurrent 1"));
}
