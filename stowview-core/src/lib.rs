/// stowview core library - stowage-plan geometry and search
///
/// Maps bay/row/tier slots of a container vessel onto 3D box positions
/// using the vessel's structural layout, and assigns highlight/dim states
/// for container searches. Rendering is left to the front-end crates.

pub mod dims;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod manifest;
pub mod mapper;
pub mod placer;
pub mod plan;
pub mod projection;
pub mod record;
pub mod search;
pub mod transform;
pub mod visual;

// Re-export commonly used types
pub use dims::ContainerSize;
pub use error::{LayoutError, ManifestError, Result, StowageError};
pub use geometry::{Mesh, Triangle, Vertex};
pub use layout::{StructuralLayout, TierRange};
pub use manifest::Manifest;
pub use mapper::{CoordinateMapper, LookupFallback, Mapping};
pub use placer::{ContainerPlacer, PlacedContainer, PlacementReport, PlacementSummary, SkippedRecord};
pub use plan::{LayoutStatus, StowagePlan};
pub use projection::{Camera, ProjectionMode};
pub use record::{ContainerRecord, ManifestRecord, SkipReason};
pub use search::{SearchCriteria, SearchFilter, SearchOutcome};
pub use transform::{RotationState, Transform};
pub use visual::{Color, Treatment, VisualSink, VisualState};
