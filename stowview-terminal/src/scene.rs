/// Box meshes and terminal styles for the placed containers
use crossterm::style::Color;
use stowview_core::{Mesh, PlacedContainer, Treatment, VisualSink, VisualState};

/// Treatments at or below this opacity are drawn as a faint outline fill
const FAINT_OPACITY: f32 = 0.1;

/// How densely a box covers the cells behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Solid,
    Ghost,
    Faint,
}

/// How one container box is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStyle {
    pub color: Color,
    pub fill: Fill,
}

impl From<Treatment> for BoxStyle {
    fn from(treatment: Treatment) -> Self {
        let stowview_core::Color { r, g, b } = treatment.color;
        let fill = if treatment.opacity <= FAINT_OPACITY {
            Fill::Faint
        } else if treatment.is_translucent() {
            Fill::Ghost
        } else {
            Fill::Solid
        };
        BoxStyle {
            color: Color::Rgb { r, g, b },
            fill,
        }
    }
}

/// Renderable copy of the plan's containers, kept in placement order
#[derive(Debug, Default)]
pub struct ContainerScene {
    meshes: Vec<Mesh>,
    styles: Vec<BoxStyle>,
}

impl ContainerScene {
    pub fn build(containers: &[PlacedContainer]) -> Self {
        Self {
            meshes: containers.iter().map(Mesh::container).collect(),
            styles: containers
                .iter()
                .map(|c| BoxStyle::from(c.treatment()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn style(&self, index: usize) -> Option<BoxStyle> {
        self.styles.get(index).copied()
    }

    /// Solid boxes first, then ghosts, then faint boxes, so each pass can
    /// tell what is already in front of it
    pub fn draw_order(&self) -> impl Iterator<Item = (&Mesh, BoxStyle)> {
        [Fill::Solid, Fill::Ghost, Fill::Faint]
            .into_iter()
            .flat_map(move |fill| {
                self.meshes
                    .iter()
                    .zip(self.styles.iter().copied())
                    .filter(move |(_, style)| style.fill == fill)
            })
    }
}

impl VisualSink for ContainerScene {
    fn set_visual_state(&mut self, index: usize, container: &PlacedContainer, _state: VisualState) {
        if let Some(style) = self.styles.get_mut(index) {
            *style = BoxStyle::from(container.treatment());
        }
    }
}
