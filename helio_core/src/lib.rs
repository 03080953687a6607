//! Heliotrail Core - Cyclic Keyframe Interpolation and Trail Engine
//!
//! This library animates independent "light direction" vectors over a
//! repeating 24-hour cycle. It solves three problems that every
//! visualization variant otherwise reimplements:
//! 1. **Sparse Keyframes**: cyclic bracketing + spherical interpolation
//!    turns a handful of time-stamped angles into a continuously
//!    queryable unit direction
//! 2. **Fading Trails**: bounded, dual-evicted position history with
//!    normalized ages for fade-out rendering
//! 3. **Alternate Targets**: closed-form stereographic plane, torus and
//!    cylinder placements of the same direction data

pub mod helio_arc;
pub mod helio_project;
pub mod helio_timeline;
pub mod helio_trail;
pub mod orchestrator;
pub mod registry;
pub mod vecmath;

// Re-export key types for convenience
pub use helio_arc::{interpolate_direction, sample_path};
pub use helio_project::{ProjectionGeometry, RenderTarget};
pub use helio_timeline::{Bracket, Keyframe, Timeline, TimelineError};
pub use helio_trail::{TrailBuffer, TrailPoint, TrailSample};
pub use orchestrator::{CycleClock, Orchestrator, Segment, SegmentFrame, SessionState, VariantConfig};
pub use registry::{combine, CombinedDataset, PathRegistry, RawPath};
pub use vecmath::Direction;
