use serde::{Deserialize, Serialize};

use crate::error::{OutlineError, Result};

/// A titled, leveled span of a document. Level 1 is the most significant.
///
/// `title` and `level` are fixed at construction; `content` is supplied once,
/// when the section is closed by the segmenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    title: String,
    level: u8,
    #[serde(default)]
    content: String,
    #[serde(default)]
    children: Vec<Section>,
}

impl Section {
    pub fn new(level: u8, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            level,
            content: content.into(),
            children: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn children(&self) -> &[Section] {
        &self.children
    }

    /// Whitespace-separated word count of `content`.
    pub fn content_words(&self) -> usize {
        self.content.split_whitespace().count()
    }

    pub(crate) fn push_child(&mut self, child: Section) {
        self.children.push(child);
    }

    pub(crate) fn take_children(&mut self) -> Vec<Section> {
        std::mem::take(&mut self.children)
    }

    pub(crate) fn with_children(mut self, children: Vec<Section>) -> Self {
        self.children = children;
        self
    }
}

/// Ordered forest of root sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    roots: Vec<Section>,
}

impl Tree {
    pub fn new(roots: Vec<Section>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[Section] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub(crate) fn into_roots(self) -> Vec<Section> {
        self.roots
    }

    /// Depth-first, document-order walk yielding `(depth, section)`; roots are depth 0.
    pub fn walk(&self) -> impl Iterator<Item = (usize, &Section)> {
        let mut stack: Vec<(usize, &Section)> = self.roots.iter().rev().map(|s| (0, s)).collect();
        std::iter::from_fn(move || {
            let (depth, section) = stack.pop()?;
            stack.extend(section.children.iter().rev().map(|c| (depth + 1, c)));
            Some((depth, section))
        })
    }

    /// First section (document order) whose title contains `needle`, ignoring case.
    pub fn find(&self, needle: &str) -> Option<&Section> {
        let needle = needle.to_lowercase();
        self.walk()
            .map(|(_, s)| s)
            .find(|s| s.title.to_lowercase().contains(&needle))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Re-import an exported tree, rejecting records no segmenter could produce.
    pub fn from_json(json: &str) -> Result<Self> {
        let tree: Tree = serde_json::from_str(json)?;
        tree.validate()?;
        Ok(tree)
    }

    fn validate(&self) -> Result<()> {
        for (_, section) in self.walk() {
            if section.title.trim().is_empty() {
                return Err(OutlineError::InvalidInput("section with empty title".into()));
            }
            if section.level == 0 {
                return Err(OutlineError::InvalidInput(format!(
                    "section {:?} has level 0",
                    section.title
                )));
            }
        }
        Ok(())
    }
}

/// Nest a flat, document-ordered section list.
///
/// The stack holds the chain of open ancestors, each owning the children
/// collected so far. A section closes (and is attached to the entry below it,
/// or to the roots) once a section of the same or lower level arrives.
pub fn build_from_sections(sections: Vec<Section>) -> Tree {
    let mut roots = Vec::new();
    let mut open: Vec<Section> = Vec::new();

    for section in sections {
        while open.last().is_some_and(|top| top.level >= section.level) {
            close_top(&mut open, &mut roots);
        }
        open.push(section);
    }
    while !open.is_empty() {
        close_top(&mut open, &mut roots);
    }

    Tree { roots }
}

fn close_top(open: &mut Vec<Section>, roots: &mut Vec<Section>) {
    let Some(done) = open.pop() else { return };
    match open.last_mut() {
        Some(parent) => parent.push_child(done),
        None => roots.push(done),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(levels: &[u8]) -> Vec<Section> {
        levels
            .iter()
            .enumerate()
            .map(|(i, &l)| Section::new(l, format!("s{}", i), ""))
            .collect()
    }

    fn shape(section: &Section) -> String {
        if section.children.is_empty() {
            section.title.clone()
        } else {
            let kids: Vec<String> = section.children.iter().map(shape).collect();
            format!("{}({})", section.title, kids.join(","))
        }
    }

    fn tree_shape(tree: &Tree) -> String {
        tree.roots.iter().map(shape).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn nests_by_level() {
        let tree = build_from_sections(flat(&[1, 2, 3, 2, 1]));
        assert_eq!(tree_shape(&tree), "s0(s1(s2),s3) s4");
    }

    #[test]
    fn level_sequence_1_1_4_2() {
        // The level-2 section pops the level-4 one but not the second level-1 root.
        let tree = build_from_sections(flat(&[1, 1, 4, 2]));
        assert_eq!(tree.roots.len(), 2);
        assert_eq!(tree_shape(&tree), "s0 s1(s2,s3)");
        assert_eq!(tree.roots[1].children[0].level, 4);
        assert_eq!(tree.roots[1].children[1].level, 2);
    }

    #[test]
    fn level_jump_skips_intermediate_levels() {
        let tree = build_from_sections(flat(&[1, 4]));
        assert_eq!(tree_shape(&tree), "s0(s1)");
    }

    #[test]
    fn leading_deep_section_becomes_root() {
        let tree = build_from_sections(flat(&[3, 1, 2]));
        assert_eq!(tree_shape(&tree), "s0 s1(s2)");
    }

    #[test]
    fn parent_level_strictly_less_and_nearest() {
        let levels = [2, 3, 3, 1, 4, 2, 5, 3, 2, 6];
        let tree = build_from_sections(flat(&levels));

        fn check(section: &Section, levels: &[u8]) {
            let parent_idx: usize = section.title[1..].parse().unwrap();
            for child in &section.children {
                let idx: usize = child.title[1..].parse().unwrap();
                assert!(section.level < child.level);
                // Nothing between parent and child may be a closer candidate.
                assert!(levels[parent_idx + 1..idx].iter().all(|&l| l >= child.level));
                check(child, levels);
            }
        }
        for root in &tree.roots {
            check(root, &levels);
        }
        assert_eq!(tree.walk().count(), levels.len());
    }

    #[test]
    fn walk_is_document_order() {
        let tree = build_from_sections(flat(&[1, 2, 3, 2, 1]));
        let titles: Vec<(usize, &str)> = tree.walk().map(|(d, s)| (d, s.title())).collect();
        assert_eq!(titles, vec![(0, "s0"), (1, "s1"), (2, "s2"), (1, "s3"), (0, "s4")]);
    }

    #[test]
    fn find_is_case_insensitive() {
        let tree = Tree::new(vec![Section::new(1, "GENERAL PROVISIONS", "")
            .with_children(vec![Section::new(2, "Death Benefit", "paid on death")])]);
        assert_eq!(tree.find("death benefit").map(|s| s.content()), Some("paid on death"));
        assert!(tree.find("premium").is_none());
    }

    #[test]
    fn json_round_trip() {
        let mut sections = flat(&[1, 2, 2, 1, 3]);
        sections[1] = Section::new(2, "Cover", "What is covered.\nAnd what is not.");
        let tree = build_from_sections(sections);
        let json = tree.to_json().unwrap();
        assert_eq!(Tree::from_json(&json).unwrap(), tree);
    }

    #[test]
    fn json_is_plain_nested_records() {
        let tree = Tree::new(vec![Section::new(1, "A", "x")]);
        let value = tree.to_value().unwrap();
        assert_eq!(
            value,
            serde_json::json!([{ "title": "A", "level": 1, "content": "x", "children": [] }])
        );
    }

    #[test]
    fn import_rejects_invalid_records() {
        let empty_title = r#"[{"title": "  ", "level": 1, "content": "", "children": []}]"#;
        assert!(matches!(Tree::from_json(empty_title), Err(OutlineError::InvalidInput(_))));
        let level_zero = r#"[{"title": "A", "level": 0}]"#;
        assert!(matches!(Tree::from_json(level_zero), Err(OutlineError::InvalidInput(_))));
        assert!(matches!(Tree::from_json("{"), Err(OutlineError::Json(_))));
    }
}
