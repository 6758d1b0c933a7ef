//! Locating and rewriting the mermaid block inside a Markdown document.
//!
//! A [`Document`] keeps every raw line of the source text so that a rewrite
//! only ever inserts lines into the mermaid block. Text around the block,
//! comments and blank lines inside it are left untouched.

use std::ops::Range;

pub const FENCE_OPEN: &str = "```mermaid";
pub const FENCE: &str = "```";
pub const DONE_CLASS: &str = "done";
pub const DONE_CLASS_DEF: &str = "classDef done fill:#8250df,color:#fff";

/// Whether `text` carries a mermaid block at all.
pub fn has_mermaid(text: &str) -> bool {
    text.contains(FENCE_OPEN)
}

/// Cleaned lines of the first mermaid block in `text`, or `None` when the
/// text has no block.
pub fn extract_mermaid(text: &str) -> Option<Vec<String>> {
    Document::parse(text).map(|doc| doc.diagram_lines())
}

/// Normalise one raw diagram line. Returns `None` for blank and comment lines.
fn clean_line(raw: &str) -> Option<String> {
    let line = raw.replace('\r', "");
    let line = line.trim();
    if line.is_empty() || line.contains("%%") {
        return None;
    }
    Some(line.to_string())
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

pub fn link_line(key: &str, url: &str) -> String {
    format!("click {key} href \"{url}\" _blank")
}

pub fn done_line(key: &str) -> String {
    format!("class {key} {DONE_CLASS}")
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
    newline: &'static str,
    /// Raw line indices of the block body, fences excluded.
    block: Range<usize>,
}

impl Document {
    /// Split `text` into lines and locate its first mermaid block.
    pub fn parse(text: &str) -> Option<Self> {
        let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
        let lines: Vec<String> = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();

        let open = lines.iter().position(|l| l.contains(FENCE_OPEN))?;
        let start = open + 1;

        // An unterminated block runs to the end of the text, short of the
        // empty element left behind by a trailing newline.
        let tail = if lines.len() > start && lines.last().is_some_and(|l| l.is_empty()) {
            lines.len() - 1
        } else {
            lines.len()
        };
        let end = lines[start..tail]
            .iter()
            .position(|l| l.trim_start().starts_with(FENCE))
            .map(|i| start + i)
            .unwrap_or(tail);

        Some(Self {
            lines,
            newline,
            block: start..end,
        })
    }

    /// The block with carriage returns stripped, lines trimmed, and blank
    /// and `%%` comment lines dropped.
    pub fn diagram_lines(&self) -> Vec<String> {
        self.lines[self.block.clone()]
            .iter()
            .filter_map(|l| clean_line(l))
            .collect()
    }

    pub fn contains_line(&self, line: &str) -> bool {
        self.lines[self.block.clone()]
            .iter()
            .filter_map(|l| clean_line(l))
            .any(|l| l == line)
    }

    pub fn render(&self) -> String {
        self.lines.join(self.newline)
    }

    fn header_index(&self) -> Option<usize> {
        self.block
            .clone()
            .find(|&i| clean_line(&self.lines[i]).is_some())
    }

    /// Indentation used for inserted lines: that of the last statement in
    /// the block, falling back to the header's.
    fn indent(&self) -> String {
        let header = self.header_index();
        self.block
            .clone()
            .rev()
            .find(|&i| Some(i) != header && clean_line(&self.lines[i]).is_some())
            .or(header)
            .map(|i| leading_whitespace(&self.lines[i]).to_string())
            .unwrap_or_default()
    }

    fn insert(&mut self, at: usize, line: &str) {
        let raw = format!("{}{}", self.indent(), line);
        self.lines.insert(at, raw);
        self.block.end += 1;
    }

    fn append(&mut self, line: &str) {
        self.insert(self.block.end, line);
    }

    /// Insert the `done` class definition right after the diagram header.
    /// Returns `false` when the definition is already present.
    pub fn ensure_class_def(&mut self) -> bool {
        if self.contains_line(DONE_CLASS_DEF) {
            return false;
        }
        let at = self
            .header_index()
            .map(|i| i + 1)
            .unwrap_or(self.block.start);
        self.insert(at, DONE_CLASS_DEF);
        true
    }

    pub fn add_link(&mut self, key: &str, url: &str) {
        self.append(&link_line(key, url));
    }

    /// Append `class KEY done`. Returns `false` when the exact line exists.
    pub fn mark_done(&mut self, key: &str) -> bool {
        let line = done_line(key);
        if self.contains_line(&line) {
            return false;
        }
        self.append(&line);
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
