#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from maskrefine for tests
pub use maskrefine::{
    BinaryMask, BorderEdge, Degradation, FinalMask, Pipeline, ProbabilityGrid, RefineError,
    RefinementConfig, Strategy,
};
