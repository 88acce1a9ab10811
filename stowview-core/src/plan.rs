//! Application state: the loaded layout, the placed containers and the
//! active search.

use nalgebra::Point3;

use crate::error::{LayoutError, Result, StowageError};
use crate::layout::StructuralLayout;
use crate::manifest::Manifest;
use crate::placer::{ContainerPlacer, PlacedContainer, PlacementSummary, SkippedRecord};
use crate::search::{SearchCriteria, SearchFilter, SearchOutcome};
use crate::visual::VisualSink;

/// Where the structural layout stands
#[derive(Debug, Clone, Default)]
pub enum LayoutStatus {
    #[default]
    NotLoaded,
    Loaded(StructuralLayout),
    /// Load failed; the plan stays usable but cannot place containers
    Failed(String),
}

/// Owner of everything a viewer displays
#[derive(Debug, Default)]
pub struct StowagePlan {
    layout: LayoutStatus,
    containers: Vec<PlacedContainer>,
    skipped: Vec<SkippedRecord>,
    criteria: SearchCriteria,
}

impl StowagePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(layout: StructuralLayout) -> Self {
        Self {
            layout: LayoutStatus::Loaded(layout),
            ..Self::default()
        }
    }

    /// Record the outcome of the one-shot layout load. A failure is kept as
    /// the degraded state and handed back for the caller to show.
    pub fn set_layout(
        &mut self,
        layout: std::result::Result<StructuralLayout, LayoutError>,
    ) -> Result<()> {
        match layout {
            Ok(layout) => {
                self.layout = LayoutStatus::Loaded(layout);
                Ok(())
            }
            Err(err) => {
                log::error!("structural layout failed to load: {}", err);
                self.layout = LayoutStatus::Failed(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Mark the layout as unavailable for a reason outside parsing (fetch failure, missing file)
    pub fn fail_layout(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::error!("structural layout unavailable: {}", reason);
        self.layout = LayoutStatus::Failed(reason);
    }

    pub fn layout_status(&self) -> &LayoutStatus {
        &self.layout
    }

    pub fn layout(&self) -> Option<&StructuralLayout> {
        match &self.layout {
            LayoutStatus::Loaded(layout) => Some(layout),
            _ => None,
        }
    }

    /// Parse and place a manifest document, replacing the current batch.
    /// On any error the current containers are left untouched.
    pub fn load_manifest(&mut self, text: &str) -> Result<PlacementSummary> {
        let manifest = Manifest::parse(text)?;
        self.place_manifest(&manifest)
    }

    /// Place an already parsed manifest, replacing the current batch
    pub fn place_manifest(&mut self, manifest: &Manifest) -> Result<PlacementSummary> {
        let layout = match &self.layout {
            LayoutStatus::Loaded(layout) => layout,
            LayoutStatus::NotLoaded => {
                return Err(StowageError::LayoutUnavailable("not loaded yet".to_string()))
            }
            LayoutStatus::Failed(reason) => {
                return Err(StowageError::LayoutUnavailable(reason.clone()))
            }
        };

        let report = ContainerPlacer::new(layout).place(manifest.records());
        let summary = PlacementSummary::from(&report);

        self.containers = report.placed;
        self.skipped = report.skipped;
        self.criteria = SearchCriteria::default();
        Ok(summary)
    }

    pub fn containers(&self) -> &[PlacedContainer] {
        &self.containers
    }

    /// Entries of the last manifest that were not placed
    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    /// Criteria of the last search, empty after a reset or a new manifest
    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn search<S: VisualSink + ?Sized>(
        &mut self,
        criteria: SearchCriteria,
        sink: &mut S,
    ) -> SearchOutcome {
        let outcome = SearchFilter::apply(&mut self.containers, &criteria, sink);
        self.criteria = criteria;
        outcome
    }

    pub fn reset<S: VisualSink + ?Sized>(&mut self, sink: &mut S) {
        SearchFilter::reset(&mut self.containers, sink);
        self.criteria = SearchCriteria::default();
    }

    /// Box enclosing every placed container
    pub fn bounds(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        self.containers
            .iter()
            .map(PlacedContainer::bounds)
            .reduce(|(min_a, max_a), (min_b, max_b)| (min_a.inf(&min_b), max_a.sup(&max_b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::VisualState;

    const LAYOUT: &str = r#"{
        "LCG": { "1": 50.0, "3": 44.0 },
        "TCG": { "general": { "1": 1.25, "2": -1.25 } },
        "Rows_Tiers_per_Bay": [ { "bay": 1, "tier_start": 2 }, { "bay": 3, "tier_start": 2 } ]
    }"#;

    fn loaded_plan() -> StowagePlan {
        let mut plan = StowagePlan::new();
        plan.set_layout(StructuralLayout::from_json(LAYOUT)).unwrap();
        plan
    }

    #[test]
    fn test_manifest_replaces_batch() {
        let mut plan = loaded_plan();
        plan.load_manifest("A,1,1,2,20\nB,3,2,82,40\n").unwrap();
        assert_eq!(plan.containers().len(), 2);

        plan.search(SearchCriteria::default().with_id("A"), &mut ());
        let summary = plan.load_manifest("C,1,2,4,45\n").unwrap();
        assert_eq!(summary.placed, 1);
        assert_eq!(plan.containers()[0].id(), "C");
        assert_eq!(plan.containers()[0].state, VisualState::Normal);
        assert!(plan.criteria().is_empty());
    }

    #[test]
    fn test_parse_failure_keeps_containers() {
        let mut plan = loaded_plan();
        plan.load_manifest("A,1,1,2,20\n").unwrap();
        let err = plan.load_manifest("[ not json").unwrap_err();
        assert!(matches!(err, StowageError::Manifest(_)));
        assert_eq!(plan.containers().len(), 1);
    }

    #[test]
    fn test_degraded_layout() {
        let mut plan = StowagePlan::new();
        assert!(matches!(
            plan.load_manifest("A,1,1,2,20"),
            Err(StowageError::LayoutUnavailable(_))
        ));

        assert!(plan.set_layout(StructuralLayout::from_json("{ broken")).is_err());
        assert!(matches!(plan.layout_status(), LayoutStatus::Failed(_)));
        assert!(plan.layout().is_none());
        assert!(matches!(
            plan.load_manifest("A,1,1,2,20"),
            Err(StowageError::LayoutUnavailable(_))
        ));
        assert!(plan.containers().is_empty());
    }

    #[test]
    fn test_search_then_reset() {
        let mut plan = loaded_plan();
        plan.load_manifest("A,1,1,2,20\nB,3,2,82,40\nC,3,1,82,40\n").unwrap();

        let outcome = plan.search(SearchCriteria::default().with_bay(3), &mut ());
        assert_eq!(outcome.matched, 2);
        assert_eq!(plan.criteria().bay, Some(3));

        plan.reset(&mut ());
        assert!(plan.criteria().is_empty());
        assert!(plan
            .containers()
            .iter()
            .all(|c| c.state == VisualState::Normal && c.treatment() == c.base));
    }

    #[test]
    fn test_bounds_cover_all_containers() {
        let mut plan = loaded_plan();
        assert!(plan.bounds().is_none());
        plan.load_manifest("A,1,1,2,20\nB,3,2,82,40\n").unwrap();
        let (min, max) = plan.bounds().unwrap();
        for container in plan.containers() {
            let (lo, hi) = container.bounds();
            assert!(lo.x >= min.x && lo.y >= min.y && lo.z >= min.z);
            assert!(hi.x <= max.x && hi.y <= max.y && hi.z <= max.z);
        }
    }
}
