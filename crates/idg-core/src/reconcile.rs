//! Comparisons between a parsed graph and the tracker's issue list.
//!
//! Nodes and issues are matched on exact title equality. Every function here
//! is pure; the sync layer decides what to write.

use crate::graph::Graph;
use crate::tracker::Issue;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkAnnotation {
    pub key: String,
    pub url: String,
}

/// The single issue in `issues` titled `name`, if exactly one exists.
fn unique_match<'a, I>(issues: I, name: &str) -> Option<&'a Issue>
where
    I: IntoIterator<Item = &'a Issue>,
{
    let mut matches = issues.into_iter().filter(|i| i.title == name);
    let first = matches.next()?;
    match matches.next() {
        Some(_) => None,
        None => Some(first),
    }
}

/// Node names with no issue of the same title, in diagram order.
pub fn missing_issues(graph: &Graph, issues: &[Issue]) -> Vec<String> {
    let titles: HashSet<&str> = issues.iter().map(|i| i.title.as_str()).collect();
    let mut seen = HashSet::new();
    graph
        .nodes
        .iter()
        .map(|n| n.name.as_str())
        .filter(|name| !titles.contains(name) && seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Links to add for nodes that have none and match exactly one issue.
pub fn pending_links(graph: &Graph, issues: &[Issue]) -> Vec<LinkAnnotation> {
    graph
        .nodes
        .iter()
        .filter(|n| n.link.is_none())
        .filter_map(|n| {
            unique_match(issues, &n.name).map(|issue| LinkAnnotation {
                key: n.key.clone(),
                url: issue.html_url.clone(),
            })
        })
        .collect()
}

/// Keys of nodes matching exactly one closed issue.
pub fn closed_keys(graph: &Graph, issues: &[Issue]) -> Vec<String> {
    graph
        .nodes
        .iter()
        .filter(|n| unique_match(issues.iter().filter(|i| i.is_closed()), &n.name).is_some())
        .map(|n| n.key.clone())
        .collect()
}

/// Numbers of issues named in the graph that carry no milestone yet.
pub fn milestone_candidates(graph: &Graph, issues: &[Issue]) -> Vec<u64> {
    let names: HashSet<&str> = graph.names().into_iter().collect();
    issues
        .iter()
        .filter(|i| i.milestone.is_none() && names.contains(i.title.as_str()))
        .map(|i| i.number)
        .collect()
}
