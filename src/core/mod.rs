//! Core domain models for the partner pipelines
//!
//! This module defines the stage graph, features and their execution state,
//! steps, and the per-partner pipeline configuration.

pub mod catalog;
pub mod config;
pub mod feature;
pub mod pipeline;
pub mod state;
pub mod step;
pub mod topology;

pub use catalog::*;
pub use feature::*;
pub use pipeline::*;
pub use state::*;
pub use step::*;
pub use topology::*;
