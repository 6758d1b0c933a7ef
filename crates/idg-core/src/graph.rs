//! Node, edge, and link records parsed from cleaned mermaid lines.

use crate::diagram::DONE_CLASS;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Leading words of lines that are never node declarations.
const DIRECTIVES: &[&str] = &[
    "graph",
    "flowchart",
    "classDef",
    "class",
    "click",
    "style",
    "linkStyle",
    "subgraph",
    "end",
    "direction",
];

static ARROW_RE: OnceLock<Regex> = OnceLock::new();
static CLICK_RE: OnceLock<Regex> = OnceLock::new();

fn arrow_re() -> &'static Regex {
    ARROW_RE.get_or_init(|| {
        Regex::new(r"\s*(?:-{2,}>|-{3,}|-\.+->|={2,}>)(?:\|[^|]*\|)?\s*").unwrap()
    })
}

fn click_re() -> &'static Regex {
    CLICK_RE.get_or_init(|| Regex::new(r#"^click\s+(\S+)\s+href\s+"?([^"\s]+)"?"#).unwrap())
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRecord {
    pub key: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub done: bool,
}

impl NodeRecord {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            link: None,
            done: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// Split a `KEY(Title)` token. Returns the key and, when the token declares
/// one, the title. Nested shape parentheses such as `A((Title))` are peeled.
fn parse_node_token(token: &str) -> Option<(String, Option<String>)> {
    let token = token.trim();
    match (token.find('('), token.find(')')) {
        (Some(open), Some(close)) if open < close => {
            let key = token[..open].trim();
            if key.is_empty() || key.contains(char::is_whitespace) {
                return None;
            }
            let name = token[open + 1..close]
                .trim_matches(|c: char| c == '(' || c.is_whitespace())
                .to_string();
            Some((key.to_string(), Some(name)))
        }
        (None, None) if !token.is_empty() && !token.contains(char::is_whitespace) => {
            Some((token.to_string(), None))
        }
        _ => None,
    }
}

/// Split a statement on its arrows. Arrow text inside a parenthesised title
/// belongs to the title.
fn split_hops(line: &str) -> Vec<&str> {
    let mut depth = 0usize;
    let mut masked = String::with_capacity(line.len());
    for c in line.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth > 0 && c != '(' {
            masked.extend(std::iter::repeat('_').take(c.len_utf8()));
        } else {
            masked.push(c);
        }
    }

    let mut hops = Vec::new();
    let mut start = 0;
    for arrow in arrow_re().find_iter(&masked) {
        // Masked and original lines share byte offsets outside parentheses.
        hops.push(&line[start..arrow.start()]);
        start = arrow.end();
    }
    hops.push(&line[start..]);
    hops
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Graph {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Build node, edge, link and style records from cleaned diagram lines.
    ///
    /// Nodes are collected first so that `click` and `class` lines may appear
    /// anywhere in the block. The first declaration of a key wins.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut graph = Graph::default();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut clicks = Vec::new();
        let mut classes = Vec::new();

        for line in lines {
            let line: &str = line.as_ref();
            let first = line.split_whitespace().next().unwrap_or("");
            match first {
                "click" => {
                    clicks.push(line);
                    continue;
                }
                "class" => {
                    classes.push(line);
                    continue;
                }
                w if DIRECTIVES.contains(&w) => continue,
                _ => {}
            }

            let hops = split_hops(line);
            if hops.len() == 1 {
                if let Some((key, Some(name))) = parse_node_token(line) {
                    graph.declare(&mut index, key, name);
                }
                continue;
            }

            let keys: Vec<Option<String>> = hops
                .iter()
                .map(|hop| {
                    parse_node_token(hop).map(|(key, name)| {
                        if let Some(name) = name {
                            graph.declare(&mut index, key.clone(), name);
                        }
                        key
                    })
                })
                .collect();
            for pair in keys.windows(2) {
                if let (Some(from), Some(to)) = (&pair[0], &pair[1]) {
                    graph.edges.push(Edge {
                        from: from.clone(),
                        to: to.clone(),
                    });
                }
            }
        }

        for line in clicks {
            let Some(caps) = click_re().captures(line) else {
                debug!(line, "click line without href, skipping");
                continue;
            };
            let key = &caps[1];
            match index.get(key) {
                Some(&i) => graph.nodes[i].link = Some(caps[2].to_string()),
                None => warn!(key, "link for undeclared node ignored"),
            }
        }

        for line in classes {
            let mut words = line.split_whitespace().skip(1);
            let (Some(keys), Some(class)) = (words.next(), words.next()) else {
                continue;
            };
            if class != DONE_CLASS {
                continue;
            }
            for key in keys.split(',') {
                if let Some(&i) = index.get(key.trim()) {
                    graph.nodes[i].done = true;
                }
            }
        }

        graph
    }

    fn declare(&mut self, index: &mut HashMap<String, usize>, key: String, name: String) {
        if index.contains_key(&key) {
            debug!(key = %key, name = %name, "duplicate node declaration ignored");
            return;
        }
        index.insert(key.clone(), self.nodes.len());
        self.nodes.push(NodeRecord::new(key, name));
    }

    pub fn node(&self, key: &str) -> Option<&NodeRecord> {
        self.nodes.iter().find(|n| n.key == key)
    }

    /// Node names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
