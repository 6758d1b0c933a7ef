use crate::output::print_json;
use crate::settings::Settings;
use anyhow::Context;
use idg_core::sync::{AnnotateReport, DocumentLocation};

pub fn run(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let report = settings.syncer()?.sync().context("sync failed")?;

    if json {
        return print_json(&report);
    }
    print_annotated(&report.annotate);
    print_written(&report.location, &report.annotate, report.written);
    print_created(&report.created, settings.dry_run);
    Ok(())
}

pub fn annotate(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let syncer = settings.syncer()?;
    let mut snapshot = syncer.load().context("failed to load the graph")?;
    let report = syncer.annotate(&mut snapshot);
    let written = syncer
        .save(&mut snapshot)
        .context("failed to write the graph")?;

    if json {
        return print_json(&serde_json::json!({
            "location": snapshot.location,
            "annotate": report,
            "written": written,
        }));
    }
    print_annotated(&report);
    print_written(&snapshot.location, &report, written);
    Ok(())
}

pub fn create_missing(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let syncer = settings.syncer()?;
    let mut snapshot = syncer.load().context("failed to load the graph")?;
    let created = syncer
        .create_missing(&mut snapshot)
        .context("failed to create issues")?;

    if json {
        return print_json(&serde_json::json!({ "created": created }));
    }
    print_created(&created, settings.dry_run);
    Ok(())
}

fn print_annotated(report: &AnnotateReport) {
    if report.class_def_inserted {
        println!("Added the done style to the graph.");
    }
    for link in &report.links {
        println!("🔗 Linked {} → {}", link.key, link.url);
    }
    for key in &report.done {
        println!("✔ Marked {key} done");
    }
}

fn print_written(location: &DocumentLocation, report: &AnnotateReport, written: bool) {
    let target = match location {
        DocumentLocation::Issue { number } => format!("issue #{number}"),
        DocumentLocation::File { path, .. } => path.clone(),
    };
    if written {
        println!("Updated the graph in {target}.");
    } else if !report.is_empty() {
        println!("Dry run: graph in {target} not written.");
    } else {
        println!("Graph in {target} is up to date.");
    }
}

fn print_created(created: &[String], dry_run: bool) {
    if created.is_empty() {
        println!("✅ All nodes in graph have issues on GitHub");
        return;
    }
    for title in created {
        if dry_run {
            println!("🚧 Would create issue with title {title}");
        } else {
            println!("🚧 Creating issue with title {title}");
        }
    }
}
