pub mod lines;
pub mod metrics;
pub mod noise;
pub mod sections;
pub mod tree;

pub use metrics::{compute_metrics, QualityMetrics};
pub use noise::{filter_noise, NoiseRules};
pub use sections::strip_report_header;
pub use tree::{Section, Tree};

use crate::error::{OutlineError, Result};

/// Two-pass pipeline: raw text → flat sections → nested tree.
/// Always returns at least one root.
pub fn build_tree(raw_text: &str, default_title: &str) -> Tree {
    let flat = sections::segment(raw_text, default_title);
    tree::build_from_sections(flat)
}

/// `build_tree` for undecoded input; fails if the bytes are not UTF-8 text.
pub fn build_tree_from_bytes(raw: &[u8], default_title: &str) -> Result<Tree> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| OutlineError::InvalidInput(format!("backend output is not UTF-8: {}", e)))?;
    Ok(build_tree(text, default_title))
}

/// One backend's output, processed end to end.
#[derive(Debug, Clone)]
pub struct ProcessedOutput {
    pub tree: Tree,
    pub metrics: QualityMetrics,
}

/// Strip the report preamble, build the tree, optionally filter noise, and score it.
pub fn process_backend(raw_report: &str, default_title: &str, rules: Option<&NoiseRules>) -> ProcessedOutput {
    let mut tree = build_tree(strip_report_header(raw_report), default_title);
    if let Some(rules) = rules {
        tree = filter_noise(tree, rules);
    }
    let metrics = compute_metrics(&tree);
    ProcessedOutput { tree, metrics }
}

// ── Tests ──
