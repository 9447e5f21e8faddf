use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::tree::Tree;

/// Content-word count above which a section counts as meaningful.
const MEANINGFUL_WORDS: usize = 10;
const MAX_SCORE: u32 = 100;
const MAX_CONTENT_BONUS: u32 = 30;

/// Aggregate statistics of one tree, used to rank extraction backends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub total_nodes: usize,
    /// Level → number of sections at that level.
    pub level_counts: BTreeMap<u8, usize>,
    pub total_content_words: usize,
    /// Sections with more than ten content words.
    pub meaningful_nodes: usize,
    /// Sections with any content at all.
    pub nodes_with_content: usize,
    pub avg_words_per_node: f64,
    /// Deepest nesting, roots counting as 1. Zero for an empty tree.
    pub max_depth: usize,
    pub quality_score: u32,
}

impl QualityMetrics {
    pub fn count_at(&self, level: u8) -> usize {
        self.level_counts.get(&level).copied().unwrap_or(0)
    }

    /// Sections at level 3 or deeper.
    pub fn deep_count(&self) -> usize {
        self.level_counts.range(3u8..).map(|(_, n)| n).sum()
    }
}

pub fn compute_metrics(tree: &Tree) -> QualityMetrics {
    let mut m = QualityMetrics::default();

    for (depth, section) in tree.walk() {
        m.total_nodes += 1;
        *m.level_counts.entry(section.level()).or_insert(0) += 1;
        let words = section.content_words();
        m.total_content_words += words;
        if words > 0 {
            m.nodes_with_content += 1;
        }
        if words > MEANINGFUL_WORDS {
            m.meaningful_nodes += 1;
        }
        m.max_depth = m.max_depth.max(depth + 1);
    }

    m.avg_words_per_node = m.total_content_words as f64 / m.nodes_with_content.max(1) as f64;
    m.quality_score = quality_score(&m);
    m
}

/// 10 per node, +5 per H1, +3 per H2, +2 per H3+, +1 per 100 content words
/// (at most 30), capped at 100.
fn quality_score(m: &QualityMetrics) -> u32 {
    let words_bonus = (m.total_content_words / 100).min(MAX_CONTENT_BONUS as usize);
    let raw = m
        .total_nodes
        .saturating_mul(10)
        .saturating_add(m.count_at(1).saturating_mul(5))
        .saturating_add(m.count_at(2).saturating_mul(3))
        .saturating_add(m.deep_count().saturating_mul(2))
        .saturating_add(words_bonus);
    raw.min(MAX_SCORE as usize) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tree::Section;

    fn words(n: usize) -> String {
        vec!["w"; n].join(" ")
    }

    #[test]
    fn empty_tree_is_all_zero() {
        let m = compute_metrics(&Tree::default());
        assert_eq!(m, QualityMetrics::default());
        assert_eq!(m.quality_score, 0);
    }

    #[test]
    fn counts_levels_and_words() {
        let tree = Tree::new(vec![
            Section::new(1, "A", words(12)).with_children(vec![
                Section::new(2, "B", words(3)),
                Section::new(4, "C", "").with_children(vec![Section::new(5, "D", words(20))]),
            ]),
            Section::new(1, "E", ""),
        ]);
        let m = compute_metrics(&tree);
        assert_eq!(m.total_nodes, 5);
        assert_eq!(m.count_at(1), 2);
        assert_eq!(m.count_at(2), 1);
        assert_eq!(m.deep_count(), 2);
        assert_eq!(m.total_content_words, 35);
        assert_eq!(m.nodes_with_content, 3);
        assert_eq!(m.meaningful_nodes, 2);
        assert_eq!(m.max_depth, 3);
        assert!((m.avg_words_per_node - 35.0 / 3.0).abs() < 1e-9);
        // 50 + 10 + 3 + 4 + 0
        assert_eq!(m.quality_score, 67);
    }

    #[test]
    fn score_formula_single_root() {
        let tree = Tree::new(vec![Section::new(1, "A", words(250))]);
        // 10 + 5 + 2
        assert_eq!(compute_metrics(&tree).quality_score, 17);
    }

    #[test]
    fn content_bonus_is_capped_at_30() {
        let tree = Tree::new(vec![Section::new(3, "A", words(10_000))]);
        // 10 + 2 + min(100, 30)
        assert_eq!(compute_metrics(&tree).quality_score, 42);
    }

    #[test]
    fn score_is_capped_at_100() {
        let roots = (0..20).map(|i| Section::new(1, format!("S{}", i), "")).collect();
        assert_eq!(compute_metrics(&Tree::new(roots)).quality_score, 100);
    }

    #[test]
    fn score_non_decreasing_in_node_count() {
        let mut last = 0;
        for n in 0..15 {
            let roots = (0..n).map(|i| Section::new(2, format!("S{}", i), "")).collect();
            let score = compute_metrics(&Tree::new(roots)).quality_score;
            assert!(score >= last);
            last = score;
        }
    }
}
