//! Pipeline module wiring the core analysis components to external
//! collaborators.
//!
//! Frame acquisition, calibration input and rendering live outside the
//! crate; this module provides the trait for plugging in a frame producer
//! and a pull-based driver running the per-frame analysis chain.

mod analysis;
mod builder;
mod source;

pub use analysis::{BallPipeline, FrameAnalysis, PipelineError};
pub use builder::PipelineBuilder;
pub use source::FrameSource;
