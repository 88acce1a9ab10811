//! Turns validated manifest records into placed container boxes.

use nalgebra::{Point3, Vector3};
use serde::Serialize;

use crate::dims::ContainerSize;
use crate::layout::StructuralLayout;
use crate::mapper::{CoordinateMapper, LookupFallback};
use crate::record::{ContainerRecord, SkipReason};
use crate::visual::{Treatment, VisualState};

/// A container with its world position and display state
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedContainer {
    pub record: ContainerRecord,
    /// Box center
    pub position: Point3<f32>,
    pub below_deck: bool,
    /// Treatment assigned at placement, restored by a search reset
    pub base: Treatment,
    pub state: VisualState,
}

impl PlacedContainer {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn size(&self) -> ContainerSize {
        self.record.size
    }

    /// Outside dimensions along x (length), y (height) and z (width)
    pub fn dimensions(&self) -> Vector3<f32> {
        let size = self.record.size;
        Vector3::new(size.length(), size.height(), size.width())
    }

    /// Axis-aligned box corners (min, max)
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        let half = self.dimensions() / 2.0;
        (self.position - half, self.position + half)
    }

    /// What the container should look like right now
    pub fn treatment(&self) -> Treatment {
        self.state.apply(self.base)
    }
}

/// A manifest entry that was not placed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Position of the entry in the manifest
    pub index: usize,
    pub reason: SkipReason,
}

/// Outcome of placing one manifest
#[derive(Debug, Clone, Default)]
pub struct PlacementReport {
    /// Placed containers in manifest order
    pub placed: Vec<PlacedContainer>,
    pub skipped: Vec<SkippedRecord>,
    /// Every default substituted for a missing layout lookup
    pub fallbacks: Vec<LookupFallback>,
}

impl PlacementReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Serializable numbers describing a placement, for front ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlacementSummary {
    pub placed: usize,
    pub skipped: usize,
    pub below_deck: usize,
    pub on_deck: usize,
    pub fallbacks: usize,
}

impl From<&PlacementReport> for PlacementSummary {
    fn from(report: &PlacementReport) -> Self {
        let below_deck = report.placed.iter().filter(|c| c.below_deck).count();
        Self {
            placed: report.placed.len(),
            skipped: report.skipped.len(),
            below_deck,
            on_deck: report.placed.len() - below_deck,
            fallbacks: report.fallbacks.len(),
        }
    }
}

/// Places records against one structural layout
pub struct ContainerPlacer<'a> {
    mapper: CoordinateMapper<'a>,
}

impl<'a> ContainerPlacer<'a> {
    pub fn new(layout: &'a StructuralLayout) -> Self {
        Self {
            mapper: CoordinateMapper::new(layout),
        }
    }

    /// Place a single validated record
    pub fn place_record(&self, record: ContainerRecord) -> (PlacedContainer, Vec<LookupFallback>) {
        let mapping = self
            .mapper
            .map(record.bay, record.row, record.tier, record.size);
        let placed = PlacedContainer {
            base: Treatment::base(record.size, mapping.below_deck),
            record,
            position: mapping.position,
            below_deck: mapping.below_deck,
            state: VisualState::Normal,
        };
        (placed, mapping.fallbacks)
    }

    /// Place a whole manifest. Rejected entries are skipped and reported;
    /// order of the rest is preserved and duplicate ids are kept.
    pub fn place<I>(&self, entries: I) -> PlacementReport
    where
        I: IntoIterator<Item = Result<ContainerRecord, SkipReason>>,
    {
        let mut report = PlacementReport::default();

        for (index, entry) in entries.into_iter().enumerate() {
            match entry {
                Ok(record) => {
                    log::debug!(
                        "placing {} at bay {} row {} tier {}",
                        record.id,
                        record.bay,
                        record.row,
                        record.tier
                    );
                    let (placed, fallbacks) = self.place_record(record);
                    report.placed.push(placed);
                    report.fallbacks.extend(fallbacks);
                }
                Err(reason) => {
                    log::warn!("skipping manifest entry {}: {}", index, reason);
                    report.skipped.push(SkippedRecord { index, reason });
                }
            }
        }

        log::info!(
            "placed {} containers, skipped {}, {} layout fallbacks",
            report.placed.len(),
            report.skipped.len(),
            report.fallbacks.len()
        );
        report
    }
}
