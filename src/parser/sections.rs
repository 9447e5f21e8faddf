use tracing::{debug, trace};

use super::lines::{classify_line, matching_rule, LineKind};
use super::tree::Section;

/// Title used when a caller supplies a blank default title.
pub const FALLBACK_TITLE: &str = "Untitled";

/// Minimum run of `=` that terminates a backend report's metadata preamble.
const PREAMBLE_RULE_LEN: usize = 50;

/// Drop the metadata block backend report files start with (everything up to
/// and including the first line of 50+ `=`). Text without such a line is
/// returned unchanged.
pub fn strip_report_header(text: &str) -> &str {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        offset += line.len();
        let rule = line.trim();
        if rule.len() >= PREAMBLE_RULE_LEN && rule.chars().all(|c| c == '=') {
            return &text[offset..];
        }
    }
    text
}

/// Header currently collecting content lines.
struct OpenSection<'a> {
    level: u8,
    title: String,
    lines: Vec<&'a str>,
}

impl OpenSection<'_> {
    fn close(self) -> Section {
        let content = self.lines.join("\n");
        Section::new(self.level, self.title, content.trim())
    }
}

/// Cut raw backend text into a flat, document-ordered list of sections.
///
/// Never returns an empty list: text without any header yields one level-1
/// section titled `default_title` holding the whole trimmed input.
pub fn segment(text: &str, default_title: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<OpenSection> = None;
    let mut preamble_lines = 0usize;

    for line in text.lines() {
        match classify_line(line) {
            LineKind::Header { level, title } => {
                trace!(level, rule = ?matching_rule(line), "header {:?}", title);
                if let Some(open) = current.take() {
                    sections.push(open.close());
                }
                current = Some(OpenSection {
                    level,
                    title,
                    lines: Vec::new(),
                });
            }
            LineKind::PageBreak => debug!("skipping page marker {:?}", line.trim()),
            LineKind::Blank => {}
            LineKind::Text => match current.as_mut() {
                Some(open) => open.lines.push(line),
                None => preamble_lines += 1,
            },
        }
    }

    if let Some(open) = current.take() {
        sections.push(open.close());
    }

    if sections.is_empty() {
        let title = match default_title.trim() {
            "" => FALLBACK_TITLE,
            t => t,
        };
        debug!("no headers found, emitting single section {:?}", title);
        return vec![Section::new(1, title, text.trim())];
    }

    if preamble_lines > 0 {
        debug!("dropped {} text lines before the first header", preamble_lines);
    }
    sections
}

// ── Tests ──
