//! Vessel structural layout: LCG/TCG reference tables and tier metadata.
//!
//! The layout is read once from a JSON document shaped like
//!
//! ```json
//! {
//!   "LCG": { "01": 120.4, "03": 114.3 },
//!   "TCG": { "general": { "01": 1.27, "02": -1.27 }, "bay01": { "01": 1.3 } },
//!   "TCG_bay_mapping": { "01": "bay01" },
//!   "Rows_Tiers_per_Bay": [ { "bay": "01", "tier_start": 2 } ]
//! }
//! ```
//!
//! and never mutated afterwards.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::LayoutError;
use crate::record::parse_slot_number;

/// Name of the TCG table used for bays without an override
const GENERAL_TCG: &str = "general";

/// Tier metadata of one bay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierRange {
    /// Lowest tier number physically present in the bay
    pub tier_start: u32,
}

#[derive(Debug, Deserialize)]
struct LayoutDocument {
    #[serde(rename = "LCG", default)]
    lcg: BTreeMap<String, f32>,
    #[serde(rename = "TCG", default)]
    tcg: BTreeMap<String, BTreeMap<String, f32>>,
    #[serde(rename = "TCG_bay_mapping", default)]
    tcg_bay_mapping: BTreeMap<String, String>,
    #[serde(rename = "Rows_Tiers_per_Bay", default)]
    rows_tiers_per_bay: Vec<TierEntry>,
}

#[derive(Debug, Deserialize)]
struct TierEntry {
    bay: Value,
    tier_start: Value,
}

/// Immutable per-vessel reference tables
#[derive(Debug, Clone, Default)]
pub struct StructuralLayout {
    lcg_by_bay: BTreeMap<u32, f32>,
    lcg_center: f32,
    tcg_general: BTreeMap<u32, f32>,
    tcg_by_bay_override: BTreeMap<u32, BTreeMap<u32, f32>>,
    tier_range_by_bay: BTreeMap<u32, TierRange>,
}

impl StructuralLayout {
    pub fn new(
        lcg_by_bay: BTreeMap<u32, f32>,
        tcg_general: BTreeMap<u32, f32>,
        tcg_by_bay_override: BTreeMap<u32, BTreeMap<u32, f32>>,
        tier_range_by_bay: BTreeMap<u32, TierRange>,
    ) -> Self {
        let lcg_center = midpoint(lcg_by_bay.values().copied());
        Self {
            lcg_by_bay,
            lcg_center,
            tcg_general,
            tcg_by_bay_override,
            tier_range_by_bay,
        }
    }

    /// Parse a layout document from JSON text
    pub fn from_json(text: &str) -> Result<Self, LayoutError> {
        let document: LayoutDocument = serde_json::from_str(text)?;
        Self::from_document(document)
    }

    /// Parse a layout document from raw bytes
    pub fn from_slice(data: &[u8]) -> Result<Self, LayoutError> {
        let document: LayoutDocument = serde_json::from_slice(data)?;
        Self::from_document(document)
    }

    fn from_document(document: LayoutDocument) -> Result<Self, LayoutError> {
        let LayoutDocument {
            lcg,
            mut tcg,
            tcg_bay_mapping,
            rows_tiers_per_bay,
        } = document;

        let lcg_by_bay = keyed_by_number("LCG", lcg)?;
        if lcg_by_bay.is_empty() {
            log::warn!("layout has no LCG entries, every container will sit at x = 0");
        }

        let tcg_general = match tcg.remove(GENERAL_TCG) {
            Some(table) => keyed_by_number("TCG.general", table)?,
            None => {
                log::warn!("layout has no TCG.general table");
                BTreeMap::new()
            }
        };

        let mut tcg_by_bay_override = BTreeMap::new();
        for (bay_key, table_name) in tcg_bay_mapping {
            let bay = parse_key("TCG_bay_mapping", &bay_key)?;
            if table_name == GENERAL_TCG {
                continue;
            }
            match tcg.get(&table_name) {
                Some(table) => {
                    let rows = keyed_by_number("TCG", table.clone())?;
                    tcg_by_bay_override.insert(bay, rows);
                }
                None => log::warn!(
                    "bay {} maps to missing TCG table `{}`, using TCG.general",
                    bay,
                    table_name
                ),
            }
        }

        let mut tier_range_by_bay = BTreeMap::new();
        for entry in rows_tiers_per_bay {
            let bay = value_as_number(&entry.bay)
                .ok_or_else(|| LayoutError::InvalidTierRange(format!("bay {}", entry.bay)))?;
            let tier_start = value_as_number(&entry.tier_start).ok_or_else(|| {
                LayoutError::InvalidTierRange(format!("tier_start {}", entry.tier_start))
            })?;
            if tier_range_by_bay
                .insert(bay, TierRange { tier_start })
                .is_some()
            {
                log::warn!("bay {} listed twice in Rows_Tiers_per_Bay, keeping the last", bay);
            }
        }

        let layout = Self::new(lcg_by_bay, tcg_general, tcg_by_bay_override, tier_range_by_bay);
        log::info!(
            "layout loaded: {} LCG bays, {} general rows, {} TCG overrides, {} tier ranges",
            layout.lcg_by_bay.len(),
            layout.tcg_general.len(),
            layout.tcg_by_bay_override.len(),
            layout.tier_range_by_bay.len()
        );
        Ok(layout)
    }

    /// Raw LCG of a bay, before centering
    pub fn lcg(&self, bay: u32) -> Option<f32> {
        self.lcg_by_bay.get(&bay).copied()
    }

    /// Midpoint of the smallest and largest LCG; subtracting it centers the ship on x = 0
    pub fn lcg_center(&self) -> f32 {
        self.lcg_center
    }

    /// LCG of a bay shifted so the whole layout straddles x = 0
    pub fn centered_lcg(&self, bay: u32) -> Option<f32> {
        self.lcg(bay).map(|lcg| lcg - self.lcg_center)
    }

    /// TCG of a row, taken from the bay's override table when the bay has one
    pub fn tcg(&self, bay: u32, row: u32) -> Option<f32> {
        self.tcg_table(bay).get(&row).copied()
    }

    /// Whether the bay uses its own TCG table instead of the general one
    pub fn has_tcg_override(&self, bay: u32) -> bool {
        self.tcg_by_bay_override.contains_key(&bay)
    }

    fn tcg_table(&self, bay: u32) -> &BTreeMap<u32, f32> {
        self.tcg_by_bay_override
            .get(&bay)
            .unwrap_or(&self.tcg_general)
    }

    pub fn tier_range(&self, bay: u32) -> Option<TierRange> {
        self.tier_range_by_bay.get(&bay).copied()
    }

    /// Bays with an LCG entry, in ascending order
    pub fn bays(&self) -> impl Iterator<Item = u32> + '_ {
        self.lcg_by_bay.keys().copied()
    }
}

fn midpoint(values: impl Iterator<Item = f32>) -> f32 {
    let (min, max) = values.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min.is_finite() && max.is_finite() {
        (min + max) / 2.0
    } else {
        0.0
    }
}

fn parse_key(table: &'static str, key: &str) -> Result<u32, LayoutError> {
    parse_slot_number(key).ok_or_else(|| LayoutError::InvalidKey {
        table,
        key: key.to_string(),
    })
}

fn keyed_by_number(
    table: &'static str,
    entries: BTreeMap<String, f32>,
) -> Result<BTreeMap<u32, f32>, LayoutError> {
    entries
        .into_iter()
        .map(|(key, value)| Ok((parse_key(table, &key)?, value)))
        .collect()
}

fn value_as_number(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => parse_slot_number(s),
        _ => None,
    }
}
