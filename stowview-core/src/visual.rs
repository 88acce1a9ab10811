/// Display treatments and the seam between search logic and a renderer
use serde::Serialize;

use crate::dims::{ContainerSize, BELOW_DECK_OPACITY, DIMMED_OPACITY};
use crate::placer::PlacedContainer;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    pub fn to_hex(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

const TWENTY_COLOR: Color = Color::from_hex(0x2f6fb0);
const FORTY_COLOR: Color = Color::from_hex(0xe07b28);
const FORTY_FIVE_COLOR: Color = Color::from_hex(0x3a9a4a);
const BELOW_DECK_COLOR: Color = Color::from_hex(0x8899aa);
const HIGHLIGHT_COLOR: Color = Color::from_hex(0xffd400);

/// Color and opacity a renderer should give one container
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Treatment {
    pub color: Color,
    pub opacity: f32,
}

impl Treatment {
    /// Treatment assigned when a container is placed: translucent in the
    /// hold, opaque and colored by size on deck
    pub fn base(size: ContainerSize, below_deck: bool) -> Self {
        if below_deck {
            return Self {
                color: BELOW_DECK_COLOR,
                opacity: BELOW_DECK_OPACITY,
            };
        }
        let color = match size {
            ContainerSize::Twenty => TWENTY_COLOR,
            ContainerSize::Forty => FORTY_COLOR,
            ContainerSize::FortyFive => FORTY_FIVE_COLOR,
        };
        Self { color, opacity: 1.0 }
    }

    pub fn highlighted() -> Self {
        Self {
            color: HIGHLIGHT_COLOR,
            opacity: 1.0,
        }
    }

    /// Keeps the color family of `base`, nearly invisible
    pub fn dimmed(base: Treatment) -> Self {
        Self {
            color: base.color,
            opacity: DIMMED_OPACITY,
        }
    }

    pub fn is_translucent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// Current display state of a placed container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualState {
    #[default]
    Normal,
    Highlighted,
    Dimmed,
}

impl VisualState {
    /// Treatment for this state given the container's base treatment
    pub fn apply(self, base: Treatment) -> Treatment {
        match self {
            VisualState::Normal => base,
            VisualState::Highlighted => Treatment::highlighted(),
            VisualState::Dimmed => Treatment::dimmed(base),
        }
    }
}

/// Receiver of visual state changes, implemented by whatever draws the containers
///
/// `index` is the container's position in the placed set. The container
/// already carries the new state when the sink is called.
pub trait VisualSink {
    fn set_visual_state(&mut self, index: usize, container: &PlacedContainer, state: VisualState);
}

/// Discards all updates, for callers without a renderer
impl VisualSink for () {
    fn set_visual_state(&mut self, _index: usize, _container: &PlacedContainer, _state: VisualState) {}
}

/// Records every update in call order
impl VisualSink for Vec<(usize, VisualState)> {
    fn set_visual_state(&mut self, index: usize, _container: &PlacedContainer, state: VisualState) {
        self.push((index, state));
    }
}
