//! Heuristic document-outline extraction for comparing text extraction backends.
//!
//! Raw backend text is segmented into leveled sections, nested into a tree,
//! stripped of boilerplate, and scored so backends can be ranked.

pub mod config;
pub mod error;
pub mod parser;
pub mod report;

pub use error::{OutlineError, Result};
pub use parser::{
    build_tree, build_tree_from_bytes, compute_metrics, filter_noise, NoiseRules, QualityMetrics,
    Section, Tree,
};
