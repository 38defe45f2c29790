//! Ingestion toolkit for frame-level spatiotemporal-action annotations.

mod common;
pub mod config;
pub mod dataset;
pub mod sampler;
