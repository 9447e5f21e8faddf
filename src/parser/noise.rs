use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::tree::{Section, Tree};

pub const DEFAULT_MIN_TITLE_LEN: usize = 3;
pub const DEFAULT_MIN_CONTENT_WORDS: usize = 5;

/// Title patterns and thresholds that mark a section as presentation noise
/// (watermarks, end-of-page markers, legal footers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseRules {
    /// Titles removed on exact (trimmed) match.
    pub exact: BTreeSet<String>,
    /// Titles removed when they start with any of these.
    pub prefix: Vec<String>,
    /// Titles shorter than this many characters are noise.
    pub min_title_len: usize,
    /// A kept leaf needs strictly more content words than this.
    pub min_content_words: usize,
}

impl Default for NoiseRules {
    fn default() -> Self {
        Self {
            exact: BTreeSet::new(),
            prefix: Vec::new(),
            min_title_len: DEFAULT_MIN_TITLE_LEN,
            min_content_words: DEFAULT_MIN_CONTENT_WORDS,
        }
    }
}

impl NoiseRules {
    pub fn new(
        exact: impl IntoIterator<Item = impl Into<String>>,
        prefix: impl IntoIterator<Item = impl Into<String>>,
        min_title_len: usize,
        min_content_words: usize,
    ) -> Self {
        Self {
            exact: exact.into_iter().map(Into::into).collect(),
            prefix: prefix.into_iter().map(Into::into).collect(),
            min_title_len,
            min_content_words,
        }
    }

    pub fn is_noise_title(&self, title: &str) -> bool {
        let title = title.trim();
        title.chars().count() < self.min_title_len
            || self.exact.contains(title)
            || self.prefix.iter().any(|p| title.starts_with(p.as_str()))
    }
}

/// A section being filtered: its children are consumed from `remaining`
/// and their survivors collected in `kept`.
struct Frame {
    section: Section,
    noise: bool,
    remaining: std::vec::IntoIter<Section>,
    kept: Vec<Section>,
}

impl Frame {
    fn open(mut section: Section, rules: &NoiseRules) -> Self {
        let children = section.take_children();
        let noise = rules.is_noise_title(section.title());
        Self {
            section,
            noise,
            remaining: children.into_iter(),
            kept: Vec::new(),
        }
    }

    /// What replaces this section in its parent's child list.
    fn resolve(self, rules: &NoiseRules) -> Vec<Section> {
        if self.noise {
            debug!(
                "removing noise section {:?}, hoisting {} children",
                self.section.title(),
                self.kept.len()
            );
            return self.kept;
        }
        if self.section.content_words() > rules.min_content_words || !self.kept.is_empty() {
            vec![self.section.with_children(self.kept)]
        } else {
            debug!("dropping low-content section {:?}", self.section.title());
            Vec::new()
        }
    }
}

/// Remove noise sections from `tree`, preserving sibling order.
///
/// Noise sections are replaced in place by their (filtered) children. Other
/// sections survive only with enough content words or a surviving child.
/// Uses an explicit work list, so arbitrarily deep trees do not recurse.
pub fn filter_noise(tree: Tree, rules: &NoiseRules) -> Tree {
    let mut top_level = tree.into_roots().into_iter();
    let mut roots = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        let next = match stack.last_mut() {
            Some(frame) => frame.remaining.next(),
            None => top_level.next(),
        };
        if let Some(section) = next {
            stack.push(Frame::open(section, rules));
            continue;
        }
        let Some(done) = stack.pop() else { break };
        let replacement = done.resolve(rules);
        match stack.last_mut() {
            Some(parent) => parent.kept.extend(replacement),
            None => roots.extend(replacement),
        }
    }

    Tree::new(roots)
}
