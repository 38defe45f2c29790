//! Epoch-deterministic index sampling for distributed training.

mod weighted;

pub use weighted::*;
