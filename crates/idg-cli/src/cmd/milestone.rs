use crate::output::print_json;
use crate::settings::Settings;
use anyhow::Context;

pub fn run(settings: &Settings, milestone: Option<&str>, json: bool) -> anyhow::Result<()> {
    let report = settings
        .syncer()?
        .set_milestone(milestone)
        .context("failed to set milestone")?;

    if json {
        return print_json(&report);
    }
    if report.issues.is_empty() {
        println!(
            "Every graph issue already has a milestone ('{}' not applied).",
            report.milestone.title
        );
        return Ok(());
    }
    let verb = if settings.dry_run { "Would set" } else { "Set" };
    let numbers: Vec<String> = report.issues.iter().map(|n| format!("#{n}")).collect();
    println!(
        "{verb} milestone '{}' on {}",
        report.milestone.title,
        numbers.join(", ")
    );
    Ok(())
}
