use std::sync::LazyLock;

use regex::Regex;

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());
static ALL_CAPS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z\s]{3,50}$").unwrap());
static TITLE_LIKE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z][A-Za-z\s]+:?\s*$").unwrap());
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\*\*(.+)\*\*$").unwrap());
static PAGE_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^--- Page \d+ ---$").unwrap());

/// Lowercase connectors allowed inside an otherwise Title Case line.
const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "for", "from", "in", "into", "nor", "of", "on",
    "or", "per", "the", "to", "upon", "vs", "with",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Header { level: u8, title: String },
    /// Pagination marker emitted by some backends; never content, never a section.
    PageBreak,
    Blank,
    Text,
}

/// One detection rule: returns `Some` when the line matches.
struct Rule {
    name: &'static str,
    apply: fn(raw: &str, trimmed: &str) -> Option<LineKind>,
}

/// Priority order matters: the first matching rule wins.
const RULES: &[Rule] = &[
    Rule { name: "markdown_heading", apply: markdown_heading },
    Rule { name: "all_caps", apply: all_caps },
    Rule { name: "title_case", apply: title_case },
    Rule { name: "bold", apply: bold },
    Rule { name: "page_marker", apply: page_marker },
];

/// Classify a single line. Pure: the result depends on nothing but `line`.
pub fn classify_line(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    RULES
        .iter()
        .find_map(|rule| (rule.apply)(line, trimmed))
        .unwrap_or(LineKind::Text)
}

/// Name of the rule that fired for `line`, if any. Used for debug logging.
pub fn matching_rule(line: &str) -> Option<&'static str> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    RULES
        .iter()
        .find(|rule| (rule.apply)(line, trimmed).is_some())
        .map(|rule| rule.name)
}

fn header(level: u8, title: &str) -> Option<LineKind> {
    let title = title.trim();
    if title.is_empty() {
        return None;
    }
    Some(LineKind::Header {
        level,
        title: title.to_string(),
    })
}

// ── # Heading ──
fn markdown_heading(raw: &str, _trimmed: &str) -> Option<LineKind> {
    let caps = HEADING_RE.captures(raw)?;
    let level = caps[1].len().clamp(1, 6) as u8;
    header(level, &caps[2])
}

// ── BASIC DEFINITIONS ──
fn all_caps(_raw: &str, trimmed: &str) -> Option<LineKind> {
    if ALL_CAPS_RE.is_match(trimmed) {
        header(1, trimmed)
    } else {
        None
    }
}

// ── Premium Provisions: ──
fn title_case(_raw: &str, trimmed: &str) -> Option<LineKind> {
    let len = trimmed.chars().count();
    if len <= 5 || len >= 80 || !TITLE_LIKE_RE.is_match(trimmed) {
        return None;
    }
    let title = trimmed.trim_end_matches(':');
    let title_cased = title.split_whitespace().all(|word| {
        word.starts_with(|c: char| c.is_ascii_uppercase()) || MINOR_WORDS.contains(&word)
    });
    if title_cased {
        header(2, title)
    } else {
        None
    }
}

// ── **Bold heading** ──
fn bold(_raw: &str, trimmed: &str) -> Option<LineKind> {
    let caps = BOLD_RE.captures(trimmed)?;
    header(2, &caps[1])
}

// ── --- Page 3 --- ──
fn page_marker(_raw: &str, trimmed: &str) -> Option<LineKind> {
    PAGE_MARKER_RE.is_match(trimmed).then_some(LineKind::PageBreak)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_of(line: &str) -> Option<(u8, String)> {
        match classify_line(line) {
            LineKind::Header { level, title } => Some((level, title)),
            _ => None,
        }
    }

    #[test]
    fn markdown_heading_levels() {
        assert_eq!(header_of("# Intro"), Some((1, "Intro".into())));
        assert_eq!(header_of("### Some heading text  "), Some((3, "Some heading text".into())));
        assert_eq!(header_of("###### deep"), Some((6, "deep".into())));
    }

    #[test]
    fn seven_hashes_is_not_markdown_heading() {
        assert_eq!(classify_line("####### too deep"), LineKind::Text);
    }

    #[test]
    fn heading_needs_whitespace_and_text() {
        assert_eq!(classify_line("#hashtag"), LineKind::Text);
        assert_eq!(classify_line("##   "), LineKind::Text);
    }

    #[test]
    fn all_caps_is_level_one() {
        assert_eq!(header_of("BASIC DEFINITIONS"), Some((1, "BASIC DEFINITIONS".into())));
        assert_eq!(header_of("  DEATH BENEFIT  "), Some((1, "DEATH BENEFIT".into())));
    }

    #[test]
    fn all_caps_length_bounds() {
        assert_eq!(classify_line("AB"), LineKind::Text);
        let long = "A".repeat(51);
        // Too long for the all-caps rule, still a title-case line.
        assert_eq!(header_of(&long), Some((2, long.clone())));
    }

    #[test]
    fn title_case_is_level_two() {
        assert_eq!(header_of("Premium Provisions:"), Some((2, "Premium Provisions".into())));
        assert_eq!(header_of("Terms and Conditions"), Some((2, "Terms and Conditions".into())));
    }

    #[test]
    fn sentences_are_not_title_case() {
        assert_eq!(classify_line("Hello world this has six words"), LineKind::Text);
        assert_eq!(classify_line("The policy ends on 1 May."), LineKind::Text);
        assert_eq!(classify_line("Short"), LineKind::Text);
    }

    #[test]
    fn bold_is_level_two() {
        assert_eq!(header_of("**Exclusions apply here.**"), Some((2, "Exclusions apply here.".into())));
        assert_eq!(header_of("** **"), None);
    }

    #[test]
    fn page_marker_is_page_break() {
        assert_eq!(classify_line("--- Page 12 ---"), LineKind::PageBreak);
        assert_eq!(matching_rule("--- Page 12 ---"), Some("page_marker"));
    }

    #[test]
    fn blank_lines_are_never_headers() {
        assert_eq!(classify_line(""), LineKind::Blank);
        assert_eq!(classify_line(" \t "), LineKind::Blank);
        assert_eq!(matching_rule("   "), None);
    }

    #[test]
    fn explicit_wins_over_implicit() {
        assert_eq!(header_of("## ALL CAPS"), Some((2, "ALL CAPS".into())));
        assert_eq!(matching_rule("## ALL CAPS"), Some("markdown_heading"));
    }
}
