use crate::output::{print_json, print_table};
use crate::settings::Settings;
use anyhow::{bail, Context};
use idg_core::diagram::Document;
use idg_core::graph::Graph;
use std::path::Path;

pub fn run(settings: &Settings, local: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let graph = match local {
        Some(path) => {
            let path = if path.is_relative() {
                settings.root.join(path)
            } else {
                path.to_path_buf()
            };
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let Some(document) = Document::parse(&text) else {
                bail!("no mermaid graph in {}", path.display());
            };
            Graph::parse(&document.diagram_lines())
        }
        None => settings
            .syncer()?
            .load()
            .context("failed to load the graph")?
            .graph(),
    };

    if json {
        return print_json(&graph);
    }

    if graph.nodes.is_empty() {
        println!("No nodes.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = graph
        .nodes
        .iter()
        .map(|n| {
            vec![
                n.key.clone(),
                n.name.clone(),
                if n.done { "done" } else { "open" }.to_string(),
                n.link.clone().unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    print_table(&["KEY", "TITLE", "STATUS", "LINK"], rows);

    if !graph.edges.is_empty() {
        println!();
        for edge in &graph.edges {
            println!("{} → {}", edge.from, edge.to);
        }
    }
    Ok(())
}
