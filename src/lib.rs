pub mod batch;
pub mod compose;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod refine;
pub mod segmenter;

pub use batch::{refine_many, BatchRunner, ImageJob, JobReport};
pub use config::{RefinementConfig, RefinementConfigBuilder};
pub use error::{Degradation, RefineError, Result};
pub use models::{BinaryMask, BorderEdge, FinalMask, ProbabilityGrid, Region, Strategy};
pub use pipeline::{
    DebugConfig, MaskState, Pipeline, PipelineContext, RefineStep, RefinementOutcome,
};
pub use segmenter::{FnSegmenter, FocusCrop, Segmenter};
