/// Container sizes and the fixed vertical constants of the stowage grid
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Outside height of a standard 20ft box, also the vertical pitch of one tier (m)
pub const HEIGHT_20FT: f32 = 2.591;

/// Outside height of a 45ft high-cube box (m)
pub const HEIGHT_45FT: f32 = 2.896;

/// Outside width shared by all ISO sizes (m)
pub const CONTAINER_WIDTH: f32 = 2.438;

/// Lowest tier number counted as on-deck
pub const ON_DECK_TIER: u32 = 72;

/// Height of the waterline reference above the scene origin, used by the
/// fallback stacking curve for bays without tier metadata
pub const WATERLINE_OFFSET: f32 = 0.5;

/// Bottom edge of the lowest below-deck tier
pub const HOLD_BASELINE: f32 = 0.5;

/// Bottom edge of the lowest on-deck tier; the gap to the hold stands in for
/// the hatch covers and deck structure
pub const DECK_BASELINE: f32 = 3.5;

/// Opacity applied to containers that do not match a search
pub const DIMMED_OPACITY: f32 = 0.05;

/// Opacity of below-deck containers in their normal treatment
pub const BELOW_DECK_OPACITY: f32 = 0.35;

/// ISO container length class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerSize {
    #[serde(rename = "20ft")]
    Twenty,
    #[serde(rename = "40ft")]
    Forty,
    #[serde(rename = "45ft")]
    FortyFive,
}

impl ContainerSize {
    pub const ALL: [ContainerSize; 3] = [Self::Twenty, Self::Forty, Self::FortyFive];

    /// Nominal length in feet
    pub fn feet(self) -> u32 {
        match self {
            Self::Twenty => 20,
            Self::Forty => 40,
            Self::FortyFive => 45,
        }
    }

    /// Outside length (m)
    pub fn length(self) -> f32 {
        match self {
            Self::Twenty => 6.058,
            Self::Forty => 12.192,
            Self::FortyFive => 13.716,
        }
    }

    /// Outside height (m)
    pub fn height(self) -> f32 {
        match self {
            Self::Twenty | Self::Forty => HEIGHT_20FT,
            Self::FortyFive => HEIGHT_45FT,
        }
    }

    pub fn width(self) -> f32 {
        CONTAINER_WIDTH
    }
}

impl fmt::Display for ContainerSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ft", self.feet())
    }
}

/// Error returned when a size label is not one of 20ft, 40ft or 45ft
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported container size `{0}`")]
pub struct UnknownSize(pub String);

impl FromStr for ContainerSize {
    type Err = UnknownSize;

    /// Accepts `20`, `20ft`, `20FT`, `20'` and the same for 40 and 45
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let digits = lower
            .strip_suffix("ft")
            .or_else(|| lower.strip_suffix('\''))
            .unwrap_or(&lower)
            .trim();

        match digits {
            "20" => Ok(Self::Twenty),
            "40" => Ok(Self::Forty),
            "45" => Ok(Self::FortyFive),
            _ => Err(UnknownSize(trimmed.to_string())),
        }
    }
}

/// Whether a tier number lies below the on-deck threshold
pub fn is_below_deck(tier: u32) -> bool {
    tier < ON_DECK_TIER
}
