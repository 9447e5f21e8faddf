use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::DisplayConfig;
use crate::error::Result;
use crate::parser::{self, NoiseRules, QualityMetrics, Tree};

/// Backend output files are named `<backend>_output.txt`.
const OUTPUT_SUFFIX: &str = "_output.txt";

/// Raw text produced by one extraction backend.
#[derive(Debug, Clone)]
pub struct BackendOutput {
    pub name: String,
    pub text: String,
}

impl BackendOutput {
    /// Title given to the single section of an output without any header.
    pub fn default_title(&self) -> String {
        format!("{} Content", self.name.to_uppercase())
    }
}

/// Backend name for a `<backend>_output.txt` path.
pub fn backend_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let name = file_name.strip_suffix(OUTPUT_SUFFIX)?;
    (!name.is_empty()).then(|| name.to_string())
}

/// All `*_output.txt` files directly inside `dir`, sorted by backend name.
pub fn discover_outputs(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = backend_name(&path) {
            found.push((name, path));
        }
    }
    found.sort();
    Ok(found)
}

/// Read every discovered output. Unreadable or non-UTF-8 files are skipped with a warning.
pub fn load_outputs(dir: &Path) -> Result<Vec<BackendOutput>> {
    let mut outputs = Vec::new();
    for (name, path) in discover_outputs(dir)? {
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        match String::from_utf8(bytes) {
            Ok(text) => outputs.push(BackendOutput { name, text }),
            Err(_) => warn!("Skipping {}: not UTF-8 text", path.display()),
        }
    }
    info!("Found {} backend outputs in {}", outputs.len(), dir.display());
    Ok(outputs)
}

#[derive(Debug, Clone, Serialize)]
pub struct BackendReport {
    pub name: String,
    pub tree: Tree,
    pub metrics: QualityMetrics,
}

/// Backends ranked best first.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub rows: Vec<BackendReport>,
}

impl Comparison {
    pub fn recommendation(&self) -> Option<&str> {
        self.rows.first().map(|r| r.name.as_str())
    }

    pub fn to_json(&self, generated_at: DateTime<Utc>) -> Result<String> {
        #[derive(Serialize)]
        struct ComparisonFile<'a> {
            generated_at: DateTime<Utc>,
            trees: BTreeMap<&'a str, &'a Tree>,
            analyses: BTreeMap<&'a str, &'a QualityMetrics>,
            recommendation: Option<&'a str>,
        }

        let file = ComparisonFile {
            generated_at,
            trees: self.rows.iter().map(|r| (r.name.as_str(), &r.tree)).collect(),
            analyses: self.rows.iter().map(|r| (r.name.as_str(), &r.metrics)).collect(),
            recommendation: self.recommendation(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }
}

/// Process every output independently (in parallel) and rank the results by
/// quality score, then meaningful sections, then name. `on_done` runs once per
/// finished backend.
pub fn compare(
    outputs: &[BackendOutput],
    rules: Option<&NoiseRules>,
    on_done: impl Fn() + Sync,
) -> Comparison {
    let mut rows: Vec<BackendReport> = outputs
        .par_iter()
        .map(|output| {
            let processed = parser::process_backend(&output.text, &output.default_title(), rules);
            on_done();
            BackendReport {
                name: output.name.clone(),
                tree: processed.tree,
                metrics: processed.metrics,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.metrics
            .quality_score
            .cmp(&a.metrics.quality_score)
            .then(b.metrics.meaningful_nodes.cmp(&a.metrics.meaningful_nodes))
            .then(a.name.cmp(&b.name))
    });
    Comparison { rows }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

/// Indented text outline, one line per section:
/// `├─ [H2] Title (12 words)`, optionally followed by a content preview.
pub fn render_outline(tree: &Tree, display: &DisplayConfig, detailed: bool) -> String {
    let mut out = String::new();
    for (depth, section) in tree.walk() {
        if display.max_depth.is_some_and(|max| depth > max) {
            continue;
        }
        let prefix = "  ".repeat(depth);
        let words = section.content_words();
        let word_info = if words > 0 {
            format!(" ({} words)", words)
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "{}├─ [H{}] {}{}",
            prefix,
            section.level(),
            truncate(section.title(), display.title_width),
            word_info
        );
        if detailed && words > 0 {
            let flat = section.content().replace('\n', " ");
            let _ = writeln!(out, "{}│  {}", prefix, truncate(flat.trim(), display.preview_chars));
        }
    }
    out
}

/// Per-backend summary table, best first.
pub fn render_table(comparison: &Comparison) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<15} | {:>6} | {:>4} | {:>4} | {:>4} | {:>7} | {:>10} | {:>7}",
        "Backend", "Nodes", "H1", "H2", "H3+", "Words", "Meaningful", "Quality"
    );
    let _ = writeln!(out, "{}", "-".repeat(84));
    for row in &comparison.rows {
        let m = &row.metrics;
        let _ = writeln!(
            out,
            "{:<15} | {:>6} | {:>4} | {:>4} | {:>4} | {:>7} | {:>10} | {:>3}/100",
            truncate(&row.name, 15),
            m.total_nodes,
            m.count_at(1),
            m.count_at(2),
            m.deep_count(),
            m.total_content_words,
            m.meaningful_nodes,
            m.quality_score
        );
    }
    out
}

/// Which backends found a section whose title contains each key.
pub fn render_key_sections(comparison: &Comparison, keys: &[String]) -> String {
    let mut out = String::new();
    for key in keys {
        let _ = writeln!(out, "Section: {}", key);
        for row in &comparison.rows {
            match row.tree.find(key) {
                Some(s) => {
                    let _ = writeln!(out, "  {:<15} found ({} words)", row.name, s.content_words());
                }
                None => {
                    let _ = writeln!(out, "  {:<15} not found", row.name);
                }
            }
        }
    }
    out
}
