use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Display label for an unclassified universe or category.
pub const UNDEFINED: &str = "Non défini";
/// Display label for an unclassified family.
pub const STANDARD_FAMILY: &str = "Standard Family";
/// Display label for an unclassified range.
pub const STANDARD_RANGE: &str = "Standard Range";

/// Every string that means "no value" when it shows up in a taxonomy field.
const PLACEHOLDERS: &[&str] = &[UNDEFINED, "Undefined", STANDARD_FAMILY, STANDARD_RANGE];

/// Returns true for empty strings and the placeholder labels above.
pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || PLACEHOLDERS.iter().any(|p| p.eq_ignore_ascii_case(trimmed))
}

/// One of the four classification axes of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxonomyLevel {
    Universe,
    Category,
    Family,
    Range,
}

impl TaxonomyLevel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "universe" => Some(Self::Universe),
            "category" => Some(Self::Category),
            "family" => Some(Self::Family),
            "range" | "range_name" => Some(Self::Range),
            _ => None,
        }
    }

    pub fn all_names() -> &'static [&'static str] {
        &["universe", "category", "family", "range"]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Universe => "universe",
            Self::Category => "category",
            Self::Family => "family",
            Self::Range => "range",
        }
    }

    /// Label rendered for [`Segment::Unclassified`] at this level.
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Universe | Self::Category => UNDEFINED,
            Self::Family => STANDARD_FAMILY,
            Self::Range => STANDARD_RANGE,
        }
    }
}

/// A taxonomy value: either a real segment name or the absence of one.
///
/// Placeholders only become strings when rendered with [`Segment::label`], so
/// grouping and lookups never confuse "Non défini" with a real segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Known(String),
    Unclassified,
}

impl Segment {
    /// Parse a raw field. Missing, blank and placeholder values are unclassified.
    pub fn from_field(value: Option<&str>) -> Self {
        match value {
            Some(v) if !is_placeholder(v) => Self::Known(v.trim().to_string()),
            _ => Self::Unclassified,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Known(name) => Some(name),
            Self::Unclassified => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn label(&self, level: TaxonomyLevel) -> &str {
        match self {
            Self::Known(name) => name,
            Self::Unclassified => level.placeholder(),
        }
    }
}

/// A catalog entry as supplied by the product source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "text_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub laboratory: String,
    #[serde(default)]
    pub sales: u64,
    #[serde(default)]
    pub stock: u64,
    #[serde(default, deserialize_with = "text_or_number")]
    pub price: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub margin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub universe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
    Null(()),
}

/// Decimal-as-text fields also accept JSON numbers.
fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(s) => s,
        TextOrNumber::Number(n) => n.to_string(),
        TextOrNumber::Null(()) => String::new(),
    })
}

/// A product with all four taxonomy levels resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedProduct {
    pub product: Product,
    pub universe: Segment,
    pub category: Segment,
    pub family: Segment,
    pub range: Segment,
}

impl EnrichedProduct {
    /// Take the taxonomy fields as the product already carries them.
    /// Used for rows that were enriched upstream.
    pub fn from_classified(product: Product) -> Self {
        Self {
            universe: Segment::from_field(product.universe.as_deref()),
            category: Segment::from_field(product.category.as_deref()),
            family: Segment::from_field(product.family.as_deref()),
            range: Segment::from_field(product.range_name.as_deref()),
            product,
        }
    }

    pub fn segment(&self, level: TaxonomyLevel) -> &Segment {
        match level {
            TaxonomyLevel::Universe => &self.universe,
            TaxonomyLevel::Category => &self.category,
            TaxonomyLevel::Family => &self.family,
            TaxonomyLevel::Range => &self.range,
        }
    }

    pub fn label(&self, level: TaxonomyLevel) -> &str {
        self.segment(level).label(level)
    }
}

impl Serialize for EnrichedProduct {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let p = &self.product;
        let mut s = serializer.serialize_struct("EnrichedProduct", 11)?;
        s.serialize_field("id", &p.id)?;
        s.serialize_field("name", &p.name)?;
        s.serialize_field("laboratory", &p.laboratory)?;
        s.serialize_field("sales", &p.sales)?;
        s.serialize_field("stock", &p.stock)?;
        s.serialize_field("price", &p.price)?;
        s.serialize_field("margin", &p.margin)?;
        s.serialize_field("universe", self.label(TaxonomyLevel::Universe))?;
        s.serialize_field("category", self.label(TaxonomyLevel::Category))?;
        s.serialize_field("family", self.label(TaxonomyLevel::Family))?;
        s.serialize_field("range_name", self.label(TaxonomyLevel::Range))?;
        s.end()
    }
}
