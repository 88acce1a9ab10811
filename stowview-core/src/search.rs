/// Search criteria and highlight/dim assignment over placed containers
use serde::Serialize;

use crate::dims::ContainerSize;
use crate::error::StowageError;
use crate::placer::PlacedContainer;
use crate::record::{parse_slot_number, ContainerRecord};
use crate::visual::{VisualSink, VisualState};

/// Optional per-field match values; `None` matches anything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchCriteria {
    pub id: Option<String>,
    pub bay: Option<u32>,
    pub row: Option<u32>,
    pub tier: Option<u32>,
    pub size: Option<ContainerSize>,
}

impl SearchCriteria {
    /// Build criteria from raw text inputs; blank inputs are wildcards
    pub fn from_inputs(
        id: &str,
        bay: &str,
        row: &str,
        tier: &str,
        size: &str,
    ) -> Result<Self, StowageError> {
        let size = match size.trim() {
            "" => None,
            text => Some(text.parse().map_err(|_| StowageError::InvalidCriterion {
                field: "size",
                value: text.to_string(),
            })?),
        };

        Ok(Self {
            id: Some(id.trim()).filter(|s| !s.is_empty()).map(str::to_string),
            bay: number_input("bay", bay)?,
            row: number_input("row", row)?,
            tier: number_input("tier", tier)?,
            size,
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_bay(mut self, bay: u32) -> Self {
        self.bay = Some(bay);
        self
    }

    pub fn with_row(mut self, row: u32) -> Self {
        self.row = Some(row);
        self
    }

    pub fn with_tier(mut self, tier: u32) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn with_size(mut self, size: ContainerSize) -> Self {
        self.size = Some(size);
        self
    }

    /// True when no field is constrained
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Exact match on every provided field
    pub fn matches(&self, record: &ContainerRecord) -> bool {
        self.id.as_deref().map_or(true, |id| id == record.id)
            && self.bay.map_or(true, |bay| bay == record.bay)
            && self.row.map_or(true, |row| row == record.row)
            && self.tier.map_or(true, |tier| tier == record.tier)
            && self.size.map_or(true, |size| size == record.size)
    }
}

fn number_input(field: &'static str, text: &str) -> Result<Option<u32>, StowageError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    parse_slot_number(text)
        .map(Some)
        .ok_or_else(|| StowageError::InvalidCriterion {
            field,
            value: text.to_string(),
        })
}

/// Counts from one search pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    pub matched: usize,
    pub dimmed: usize,
}

/// Assigns visual states for a search and undoes them
pub struct SearchFilter;

impl SearchFilter {
    /// Highlight every container matching `criteria` and dim the rest
    pub fn apply<S: VisualSink + ?Sized>(
        containers: &mut [PlacedContainer],
        criteria: &SearchCriteria,
        sink: &mut S,
    ) -> SearchOutcome {
        let mut outcome = SearchOutcome::default();
        for (index, container) in containers.iter_mut().enumerate() {
            let state = if criteria.matches(&container.record) {
                outcome.matched += 1;
                VisualState::Highlighted
            } else {
                outcome.dimmed += 1;
                VisualState::Dimmed
            };
            container.state = state;
            sink.set_visual_state(index, container, state);
        }
        log::info!(
            "search matched {} of {} containers",
            outcome.matched,
            containers.len()
        );
        outcome
    }

    /// Put every container back to its placement treatment
    pub fn reset<S: VisualSink + ?Sized>(containers: &mut [PlacedContainer], sink: &mut S) {
        for (index, container) in containers.iter_mut().enumerate() {
            container.state = VisualState::Normal;
            sink.set_visual_state(index, container, VisualState::Normal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StructuralLayout;
    use crate::placer::ContainerPlacer;

    fn containers() -> Vec<PlacedContainer> {
        let layout = StructuralLayout::default();
        let placer = ContainerPlacer::new(&layout);
        placer
            .place(vec![
                Ok(ContainerRecord::new("A", 1, 1, 2, ContainerSize::Twenty)),
                Ok(ContainerRecord::new("B", 1, 2, 82, ContainerSize::Forty)),
                Ok(ContainerRecord::new("C", 3, 2, 82, ContainerSize::FortyFive)),
            ])
            .placed
    }

    #[test]
    fn test_empty_criteria_match_all() {
        let mut containers = containers();
        let mut sink: Vec<(usize, VisualState)> = Vec::new();
        let outcome = SearchFilter::apply(&mut containers, &SearchCriteria::default(), &mut sink);
        assert_eq!(outcome, SearchOutcome { matched: 3, dimmed: 0 });
        assert!(containers.iter().all(|c| c.state == VisualState::Highlighted));
        assert_eq!(sink.len(), 3);
    }

    #[test]
    fn test_combined_criteria() {
        let mut containers = containers();
        let criteria = SearchCriteria::default().with_row(2).with_size(ContainerSize::Forty);
        let outcome = SearchFilter::apply(&mut containers, &criteria, &mut ());
        assert_eq!(outcome.matched, 1);
        assert_eq!(containers[1].state, VisualState::Highlighted);
        assert_eq!(containers[0].state, VisualState::Dimmed);
        assert_eq!(containers[2].state, VisualState::Dimmed);
    }

    #[test]
    fn test_no_match_dims_everything() {
        let mut containers = containers();
        let criteria = SearchCriteria::default().with_bay(3).with_tier(2);
        let outcome = SearchFilter::apply(&mut containers, &criteria, &mut ());
        assert_eq!(outcome, SearchOutcome { matched: 0, dimmed: 3 });
        assert!(containers.iter().all(|c| c.treatment().opacity < 0.1));
    }

    #[test]
    fn test_reset_restores_base() {
        let mut containers = containers();
        let before: Vec<_> = containers.iter().map(|c| c.treatment()).collect();
        SearchFilter::apply(&mut containers, &SearchCriteria::default().with_id("B"), &mut ());

        let mut sink: Vec<(usize, VisualState)> = Vec::new();
        SearchFilter::reset(&mut containers, &mut sink);
        let after: Vec<_> = containers.iter().map(|c| c.treatment()).collect();
        assert_eq!(before, after);
        assert_eq!(
            sink,
            vec![
                (0, VisualState::Normal),
                (1, VisualState::Normal),
                (2, VisualState::Normal),
            ]
        );
    }

    #[test]
    fn test_criteria_from_inputs() {
        let criteria = SearchCriteria::from_inputs(" B ", "", "02", "", "40ft").unwrap();
        assert_eq!(
            criteria,
            SearchCriteria::default()
                .with_id("B")
                .with_row(2)
                .with_size(ContainerSize::Forty)
        );
        assert!(SearchCriteria::from_inputs("", "", "", "", "").unwrap().is_empty());
        assert!(matches!(
            SearchCriteria::from_inputs("", "x1", "", "", ""),
            Err(StowageError::InvalidCriterion { field: "bay", .. })
        ));
        assert!(matches!(
            SearchCriteria::from_inputs("", "", "", "", "10ft"),
            Err(StowageError::InvalidCriterion { field: "size", .. })
        ));
    }
}
