//! Stowage coordinates to world positions.
//!
//! Axes: x runs along the ship (LCG), y is up from the waterline reference,
//! z runs across the ship (TCG). Positions are box centers.

use std::fmt;

use nalgebra::Point3;

use crate::dims::{
    is_below_deck, ContainerSize, DECK_BASELINE, HEIGHT_20FT, HOLD_BASELINE, WATERLINE_OFFSET,
};
use crate::layout::StructuralLayout;

/// A lookup that found nothing and was replaced by a default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupFallback {
    /// Bay absent from the LCG table, x = 0
    MissingLcg { bay: u32 },
    /// Row absent from the bay's TCG table, z = 0. `overridden` tells
    /// whether that table was the bay's own or the general one.
    MissingTcg { bay: u32, row: u32, overridden: bool },
    /// Bay without tier metadata, y follows the uniform stacking curve
    MissingTierRange { bay: u32 },
}

impl fmt::Display for LookupFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLcg { bay } => write!(f, "no LCG for bay {bay}, using x = 0"),
            Self::MissingTcg { bay, row, overridden } => {
                let table = if *overridden { "bay override" } else { "general" };
                write!(f, "no TCG for bay {bay} row {row} in the {table} table, using z = 0")
            }
            Self::MissingTierRange { bay } => {
                write!(f, "no tier range for bay {bay}, using default stacking")
            }
        }
    }
}

/// Result of mapping one slot
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    pub position: Point3<f32>,
    pub below_deck: bool,
    pub fallbacks: Vec<LookupFallback>,
}

/// Pure mapping from (bay, row, tier, size) to a box center
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper<'a> {
    layout: &'a StructuralLayout,
}

impl<'a> CoordinateMapper<'a> {
    pub fn new(layout: &'a StructuralLayout) -> Self {
        Self { layout }
    }

    pub fn map(&self, bay: u32, row: u32, tier: u32, size: ContainerSize) -> Mapping {
        let mut fallbacks = Vec::new();

        let x = self.layout.centered_lcg(bay).unwrap_or_else(|| {
            fallbacks.push(LookupFallback::MissingLcg { bay });
            0.0
        });

        let z = self.layout.tcg(bay, row).unwrap_or_else(|| {
            fallbacks.push(LookupFallback::MissingTcg {
                bay,
                row,
                overridden: self.layout.has_tcg_override(bay),
            });
            0.0
        });

        let y = match self.layout.tier_range(bay) {
            Some(range) => {
                let steps = relative_tier(tier, range.tier_start) as f32;
                tier_baseline(tier) + steps * HEIGHT_20FT + size.height() / 2.0
            }
            None => {
                fallbacks.push(LookupFallback::MissingTierRange { bay });
                default_stack_height(tier)
            }
        };

        for fallback in &fallbacks {
            log::warn!("{}", fallback);
        }

        Mapping {
            position: Point3::new(x, y, z),
            below_deck: is_below_deck(tier),
            fallbacks,
        }
    }
}

/// Tier steps above the lowest tier of the bay, never negative
pub fn relative_tier(tier: u32, tier_start: u32) -> u32 {
    tier.saturating_sub(tier_start)
}

/// Bottom edge of the lowest tier in the section (hold or deck) the tier belongs to
pub fn tier_baseline(tier: u32) -> f32 {
    if is_below_deck(tier) {
        HOLD_BASELINE
    } else {
        DECK_BASELINE
    }
}

/// Center height for bays without tier metadata: every tier is one 20ft
/// height above the previous one, whatever the box size. Boxes of different
/// unlisted bays land on the same curve and may overlap.
pub fn default_stack_height(tier: u32) -> f32 {
    (WATERLINE_OFFSET + HEIGHT_20FT / 2.0) + tier as f32 * HEIGHT_20FT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dims::HEIGHT_45FT;
    use crate::layout::TierRange;
    use std::collections::BTreeMap;

    fn layout() -> StructuralLayout {
        let lcg = BTreeMap::from([(1, 150.0), (3, 144.0), (41, 10.0)]);
        let tcg = BTreeMap::from([(1, 1.25), (2, -1.25)]);
        let overrides = BTreeMap::from([(41, BTreeMap::from([(1, 1.1)]))]);
        let tiers = BTreeMap::from([
            (1, TierRange { tier_start: 2 }),
            (41, TierRange { tier_start: 82 }),
        ]);
        StructuralLayout::new(lcg, tcg, overrides, tiers)
    }

    #[test]
    fn test_longitudinal_centering() {
        let layout = layout();
        let mapper = CoordinateMapper::new(&layout);
        let fore = mapper.map(1, 1, 2, ContainerSize::Twenty).position.x;
        let aft = mapper.map(41, 1, 82, ContainerSize::Twenty).position.x;
        assert!((fore - 70.0).abs() < 1e-4);
        assert!((fore + aft).abs() < 1e-4);
    }

    #[test]
    fn test_transverse_override() {
        let layout = layout();
        let mapper = CoordinateMapper::new(&layout);
        assert_eq!(mapper.map(1, 2, 2, ContainerSize::Twenty).position.z, -1.25);
        assert_eq!(mapper.map(41, 1, 82, ContainerSize::Twenty).position.z, 1.1);

        let mapping = mapper.map(41, 2, 82, ContainerSize::Twenty);
        assert_eq!(mapping.position.z, 0.0);
        assert_eq!(
            mapping.fallbacks,
            vec![LookupFallback::MissingTcg {
                bay: 41,
                row: 2,
                overridden: true
            }]
        );
        assert!(mapping.fallbacks[0].to_string().contains("bay override"));

        let general = mapper.map(1, 3, 2, ContainerSize::Twenty);
        assert_eq!(
            general.fallbacks,
            vec![LookupFallback::MissingTcg {
                bay: 1,
                row: 3,
                overridden: false
            }]
        );
    }

    #[test]
    fn test_hold_stacking() {
        let layout = layout();
        let mapper = CoordinateMapper::new(&layout);
        let bottom = mapper.map(1, 1, 2, ContainerSize::Twenty);
        assert!(bottom.below_deck);
        assert!(bottom.fallbacks.is_empty());
        assert!((bottom.position.y - (HOLD_BASELINE + HEIGHT_20FT / 2.0)).abs() < 1e-5);

        let third = mapper.map(1, 1, 4, ContainerSize::Twenty);
        assert!((third.position.y - bottom.position.y - 2.0 * HEIGHT_20FT).abs() < 1e-5);
    }

    #[test]
    fn test_tier_below_start_is_clamped() {
        assert_eq!(relative_tier(2, 2), 0);
        assert_eq!(relative_tier(1, 2), 0);
        assert_eq!(relative_tier(6, 2), 4);

        let layout = layout();
        let mapper = CoordinateMapper::new(&layout);
        let at_start = mapper.map(41, 1, 82, ContainerSize::Forty).position.y;
        let below_start = mapper.map(41, 1, 80, ContainerSize::Forty).position.y;
        assert_eq!(at_start, below_start);
    }

    #[test]
    fn test_deck_baseline_and_threshold() {
        let layout = layout();
        let mapper = CoordinateMapper::new(&layout);
        let on_deck = mapper.map(41, 1, 82, ContainerSize::Twenty);
        assert!(!on_deck.below_deck);
        assert!((on_deck.position.y - (DECK_BASELINE + HEIGHT_20FT / 2.0)).abs() < 1e-5);

        assert!(mapper.map(1, 1, 71, ContainerSize::Twenty).below_deck);
        assert!(!mapper.map(1, 1, 72, ContainerSize::Twenty).below_deck);
        assert!(DECK_BASELINE > HOLD_BASELINE);
    }

    #[test]
    fn test_high_cube_center_uses_own_height() {
        let layout = layout();
        let mapper = CoordinateMapper::new(&layout);
        let standard = mapper.map(1, 1, 3, ContainerSize::Forty).position.y;
        let high_cube = mapper.map(1, 1, 3, ContainerSize::FortyFive).position.y;
        assert!((high_cube - standard - (HEIGHT_45FT - HEIGHT_20FT) / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_unknown_bay_defaults() {
        let layout = layout();
        let mapper = CoordinateMapper::new(&layout);
        let mapping = mapper.map(99, 1, 3, ContainerSize::FortyFive);
        assert_eq!(mapping.position.x, 0.0);
        assert!((mapping.position.y - default_stack_height(3)).abs() < 1e-5);
        assert_eq!(
            mapping.fallbacks,
            vec![
                LookupFallback::MissingLcg { bay: 99 },
                LookupFallback::MissingTierRange { bay: 99 },
            ]
        );
    }

    #[test]
    fn test_default_stack_stays_above_waterline() {
        assert!(default_stack_height(0) - HEIGHT_20FT / 2.0 >= WATERLINE_OFFSET - 1e-6);
        assert!((default_stack_height(1) - default_stack_height(0) - HEIGHT_20FT).abs() < 1e-5);
    }
}
