//! Synthetic competitive positioning of a laboratory within one segment.
//!
//! The main lab draws a share from a range that depends on how broad the
//! segment is. Four competitors split the rest: each one but the last draws
//! a bounded share while leaving at least one point for every competitor
//! still to come, and the last takes whatever remains. Shares therefore
//! always sum to exactly 100 and are never negative.

use std::collections::HashSet;
use std::ops::Range;

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::product::TaxonomyLevel;

/// Competitors drawn for every positioning.
pub const COMPETITOR_COUNT: usize = 4;

/// Smallest share a non-final competitor draws when the budget allows it.
pub const COMPETITOR_FLOOR: u32 = 5;

/// Total of all shares in a positioning.
pub const TOTAL_SHARE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentType {
    Universe,
    Category,
    Family,
}

impl SegmentType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "universe" => Some(Self::Universe),
            "category" => Some(Self::Category),
            "family" => Some(Self::Family),
            _ => None,
        }
    }

    pub fn all_names() -> &'static [&'static str] {
        &["universe", "category", "family"]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Universe => "universe",
            Self::Category => "category",
            Self::Family => "family",
        }
    }

    /// Ranges have no positioning.
    pub fn from_level(level: TaxonomyLevel) -> Option<Self> {
        match level {
            TaxonomyLevel::Universe => Some(Self::Universe),
            TaxonomyLevel::Category => Some(Self::Category),
            TaxonomyLevel::Family => Some(Self::Family),
            TaxonomyLevel::Range => None,
        }
    }

    /// Half-open range the main lab's share is drawn from.
    pub fn main_share_range(self) -> Range<u32> {
        match self {
            Self::Universe => 15..25,
            Self::Category => 20..35,
            Self::Family => 25..45,
        }
    }

    /// Upper bound for any non-final competitor's share.
    pub fn max_competitor_share(self) -> u32 {
        match self {
            Self::Universe => 25,
            Self::Category => 20,
            Self::Family => 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub name: String,
    pub share: u32,
    pub is_main: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositioningData {
    pub segment: String,
    pub segment_type: SegmentType,
    pub rank: usize,
    pub total_competitors: usize,
    pub market_share: u32,
    pub leading_competitor: String,
    pub leading_competitor_share: u32,
    /// Main lab and competitors, sorted by share descending.
    pub competitors: Vec<Competitor>,
}

/// Rank `lab_name` against four competitors drawn from `pool`.
pub fn generate_positioning<R: Rng + ?Sized>(
    lab_name: &str,
    segment_type: SegmentType,
    segment_name: &str,
    pool: &[String],
    rng: &mut R,
) -> PositioningData {
    let rivals = pick_competitors(lab_name, pool, rng);

    let main_share = rng.gen_range(segment_type.main_share_range());
    let shares = distribute_shares(
        TOTAL_SHARE - main_share,
        rivals.len(),
        segment_type.max_competitor_share(),
        rng,
    );

    let mut competitors = Vec::with_capacity(rivals.len() + 1);
    competitors.push(Competitor {
        name: lab_name.to_string(),
        share: main_share,
        is_main: true,
    });
    competitors.extend(rivals.into_iter().zip(shares).map(|(name, share)| Competitor {
        name,
        share,
        is_main: false,
    }));

    // stable: on a tie the main lab stays ahead
    competitors.sort_by(|a, b| b.share.cmp(&a.share));

    let rank = competitors
        .iter()
        .position(|c| c.is_main)
        .map(|i| i + 1)
        .unwrap_or(1);
    let (leading_competitor, leading_competitor_share) = competitors
        .first()
        .map(|c| (c.name.clone(), c.share))
        .unwrap_or_default();

    info!(
        "positioned '{lab_name}' in {} '{segment_name}': rank {rank}/{} with {main_share}%",
        segment_type.name(),
        competitors.len()
    );

    PositioningData {
        segment: segment_name.to_string(),
        segment_type,
        rank,
        total_competitors: competitors.len(),
        market_share: main_share,
        leading_competitor,
        leading_competitor_share,
        competitors,
    }
}

/// Exactly [`COMPETITOR_COUNT`] distinct names from `pool`, none equal to
/// `lab_name`. A pool too small to supply them is topped up with generic names.
pub fn pick_competitors<R: Rng + ?Sized>(
    lab_name: &str,
    pool: &[String],
    rng: &mut R,
) -> Vec<String> {
    let lab = lab_name.trim();
    let mut seen = HashSet::new();
    let candidates: Vec<&str> = pool
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(lab) && seen.insert(*c))
        .collect();

    let mut picked: Vec<String> = candidates
        .choose_multiple(rng, COMPETITOR_COUNT)
        .map(|c| c.to_string())
        .collect();

    let mut n = 1;
    while picked.len() < COMPETITOR_COUNT {
        let name = format!("Concurrent {n}");
        n += 1;
        if !name.eq_ignore_ascii_case(lab) && !picked.contains(&name) {
            debug!("competitor pool too small, adding '{name}'");
            picked.push(name);
        }
    }
    picked
}

/// Split `budget` points across `count` competitors.
///
/// Every share but the last is drawn from
/// `[min(floor, upper), upper]` with
/// `upper = min(remaining - competitors_left_after, max_share)`, so at least
/// one point stays available per competitor still to be served. The last
/// share is the remainder. The result always sums to `budget`.
pub fn distribute_shares<R: Rng + ?Sized>(
    budget: u32,
    count: usize,
    max_share: u32,
    rng: &mut R,
) -> Vec<u32> {
    let mut remaining = budget;
    let mut shares = Vec::with_capacity(count);

    for i in 0..count {
        let left_after = (count - i - 1) as u32;
        let share = if left_after == 0 {
            remaining
        } else {
            let upper = remaining.saturating_sub(left_after).min(max_share);
            let floor = COMPETITOR_FLOOR.min(upper);
            rng.gen_range(floor..=upper)
        };
        remaining -= share;
        shares.push(share);
    }

    shares
}
