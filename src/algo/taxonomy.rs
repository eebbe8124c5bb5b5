use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::OnceLock;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::product::is_placeholder;

/// Embedded default taxonomy — compiled from `taxonomies/pharma.json`.
/// Users override by placing a file at `$XDG_DATA_HOME/segments/taxonomy.json`
/// or `$SEGMENTS_TAXONOMY` env var, or passing `--taxonomy <path>`.
const EMBEDDED_DEFAULT: &str = include_str!("../../taxonomies/pharma.json");

/// Smallest pool that always leaves four competitors once the main lab is
/// excluded. Shorter pools are accepted; positioning tops them up.
pub const MIN_COMPETITOR_POOL: usize = 5;

/// A category with the families it may contain. An empty list means the
/// category has no explicit families.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    #[serde(default)]
    pub families: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseDef {
    pub name: String,
    #[serde(default)]
    pub categories: Vec<CategoryDef>,
}

/// The taxonomy document as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Taxonomy {
    pub name: String,
    pub version: String,
    pub universes: Vec<UniverseDef>,
    #[serde(default)]
    pub laboratory_ranges: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub competitor_pool: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse taxonomy: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Category '{category}' is listed under both '{first}' and '{second}'")]
    DuplicateCategory {
        category: String,
        first: String,
        second: String,
    },
    #[error("Family '{family}' is listed under both '{first}' and '{second}'")]
    DuplicateFamily {
        family: String,
        first: String,
        second: String,
    },
}

/// Validated lookup tables with the reverse indexes precomputed.
///
/// Every category resolves to exactly one universe and every family to
/// exactly one category; [`TaxonomyTables::build`] rejects documents where
/// that does not hold. Blank and placeholder names ("Non défini",
/// "Standard Family", ...) are skipped at every level.
#[derive(Debug, Clone)]
pub struct TaxonomyTables {
    universes: Vec<String>,
    categories: Vec<String>,
    categories_by_universe: HashMap<String, Vec<String>>,
    families_by_category: HashMap<String, Vec<String>>,
    ranges_by_laboratory: HashMap<String, Vec<String>>,
    universe_of_category: HashMap<String, String>,
    category_of_family: HashMap<String, String>,
    competitor_pool: Vec<String>,
}

impl TaxonomyTables {
    pub fn build(taxonomy: &Taxonomy) -> Result<Self, TaxonomyError> {
        let mut universes = Vec::with_capacity(taxonomy.universes.len());
        let mut categories = Vec::new();
        let mut categories_by_universe: HashMap<String, Vec<String>> = HashMap::new();
        let mut families_by_category: HashMap<String, Vec<String>> = HashMap::new();
        let mut universe_of_category: HashMap<String, String> = HashMap::new();
        let mut category_of_family: HashMap<String, String> = HashMap::new();

        for universe in &taxonomy.universes {
            let universe_name = universe.name.trim();
            if is_placeholder(universe_name) {
                debug!("skipping universe '{universe_name}'");
                continue;
            }
            universes.push(universe_name.to_string());
            let listed = categories_by_universe
                .entry(universe_name.to_string())
                .or_default();

            for category in &universe.categories {
                let category_name = category.name.trim();
                if is_placeholder(category_name) {
                    debug!("skipping category '{category_name}' in '{universe_name}'");
                    continue;
                }
                if let Some(first) = universe_of_category.get(category_name) {
                    return Err(TaxonomyError::DuplicateCategory {
                        category: category_name.to_string(),
                        first: first.clone(),
                        second: universe_name.to_string(),
                    });
                }
                universe_of_category.insert(category_name.to_string(), universe_name.to_string());
                listed.push(category_name.to_string());
                categories.push(category_name.to_string());

                let mut families = Vec::with_capacity(category.families.len());
                for family in &category.families {
                    let family_name = family.trim();
                    if is_placeholder(family_name) {
                        debug!("skipping family '{family_name}' in '{category_name}'");
                        continue;
                    }
                    if let Some(first) = category_of_family.get(family_name) {
                        return Err(TaxonomyError::DuplicateFamily {
                            family: family_name.to_string(),
                            first: first.clone(),
                            second: category_name.to_string(),
                        });
                    }
                    category_of_family.insert(family_name.to_string(), category_name.to_string());
                    families.push(family_name.to_string());
                }
                if !families.is_empty() {
                    families_by_category.insert(category_name.to_string(), families);
                }
            }
        }

        let ranges_by_laboratory = taxonomy
            .laboratory_ranges
            .iter()
            .map(|(lab, ranges)| {
                let ranges: Vec<String> = ranges
                    .iter()
                    .map(|r| r.trim().to_string())
                    .filter(|r| !is_placeholder(r))
                    .collect();
                (lab.trim().to_string(), ranges)
            })
            .filter(|(_, ranges)| !ranges.is_empty())
            .collect();

        let mut seen = HashSet::new();
        let competitor_pool: Vec<String> = taxonomy
            .competitor_pool
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty() && seen.insert(c.clone()))
            .collect();
        if competitor_pool.len() < MIN_COMPETITOR_POOL {
            warn!(
                "competitor pool has {} distinct names, fewer than {MIN_COMPETITOR_POOL}; \
                 positioning will add generic competitors",
                competitor_pool.len()
            );
        }

        Ok(Self {
            universes,
            categories,
            categories_by_universe,
            families_by_category,
            ranges_by_laboratory,
            universe_of_category,
            category_of_family,
            competitor_pool,
        })
    }

    pub fn universes(&self) -> &[String] {
        &self.universes
    }

    /// Every configured category across all universes, in document order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn categories_of(&self, universe: &str) -> &[String] {
        self.categories_by_universe
            .get(universe)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn families_of(&self, category: &str) -> &[String] {
        self.families_by_category
            .get(category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn ranges_of(&self, laboratory: &str) -> &[String] {
        self.ranges_by_laboratory
            .get(laboratory)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn universe_of(&self, category: &str) -> Option<&str> {
        self.universe_of_category.get(category).map(|s| s.as_str())
    }

    pub fn category_of(&self, family: &str) -> Option<&str> {
        self.category_of_family.get(family).map(|s| s.as_str())
    }

    pub fn competitor_pool(&self) -> &[String] {
        &self.competitor_pool
    }
}

/// Load the default tables using this resolution order:
///
/// 1. `$SEGMENTS_TAXONOMY` env var (path to JSON file)
/// 2. `$XDG_DATA_HOME/segments/taxonomy.json` (user override)
/// 3. `~/.local/share/segments/taxonomy.json` (fallback XDG path)
/// 4. Embedded compile-time default from `taxonomies/pharma.json`
///
/// Any resolution step that fails is logged and falls through to the next.
pub fn default_tables() -> TaxonomyTables {
    if let Ok(path) = std::env::var("SEGMENTS_TAXONOMY") {
        match load_tables(&path) {
            Ok(tables) => return tables,
            Err(e) => warn!("ignoring $SEGMENTS_TAXONOMY: {e}"),
        }
    }

    if let Some(path) = xdg_taxonomy_path() {
        if path.exists() {
            match load_tables(&path.to_string_lossy()) {
                Ok(tables) => return tables,
                Err(e) => warn!("ignoring {}: {e}", path.display()),
            }
        }
    }

    embedded_tables().clone()
}

/// The embedded default, built once per process.
pub fn embedded_tables() -> &'static TaxonomyTables {
    static TABLES: OnceLock<TaxonomyTables> = OnceLock::new();
    TABLES.get_or_init(|| {
        parse_tables(EMBEDDED_DEFAULT).expect("embedded default taxonomy is invalid")
    })
}

pub fn parse_taxonomy(json: &str) -> Result<Taxonomy, TaxonomyError> {
    Ok(serde_json::from_str(json)?)
}

/// Parse and validate tables from a JSON string.
pub fn parse_tables(json: &str) -> Result<TaxonomyTables, TaxonomyError> {
    TaxonomyTables::build(&parse_taxonomy(json)?)
}

/// Load and validate tables from a file path.
pub fn load_tables(path: &str) -> Result<TaxonomyTables, TaxonomyError> {
    let json = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Read {
        path: path.to_string(),
        source,
    })?;
    parse_tables(&json)
}

fn xdg_taxonomy_path() -> Option<PathBuf> {
    let data_home = std::env::var("XDG_DATA_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".local/share"))
        })?;
    Some(data_home.join("segments/taxonomy.json"))
}

/// Return the embedded default taxonomy as a JSON string.
/// Useful for exporting/seeding user-customizable files.
pub fn embedded_default_json() -> &'static str {
    EMBEDDED_DEFAULT
}
