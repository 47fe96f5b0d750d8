use anyhow::{Result, bail};
use colored::Colorize;

use crate::Context;
use crate::cli::ExportArgs;
use crate::engine::{Exporter, load_resources};
use crate::ui;

pub fn run(ctx: &Context, args: ExportArgs) -> Result<()> {
    let resources = load_resources(&args.input)?;
    if resources.is_empty() {
        ui::warn("No resources to export");
        return Ok(());
    }

    let mut exporter = Exporter::new(&ctx.config, &args.out_dir);
    let entries = exporter.plan(resources)?;

    if !ctx.quiet {
        ui::header(&format!("Export to {}", args.out_dir.display()));
        for entry in &entries {
            println!(
                "  {} {}/{}",
                if args.dry_run { "○".dimmed() } else { "→".cyan() },
                entry.resource_type.dimmed(),
                entry.name
            );
        }
        println!();
    }

    let summary = exporter.write(&entries, args.jobs, args.dry_run)?;

    if args.dry_run {
        ui::info(&format!(
            "Dry run: {} planned",
            ui::count(summary.total(), "document")
        ));
        return Ok(());
    }

    for (path, error) in &summary.failed {
        ui::error(&format!("{path}: {error}"));
    }
    if !summary.is_success() {
        bail!(
            "{} of {} failed",
            ui::count(summary.failed.len(), "document"),
            summary.total()
        );
    }

    ui::success(&format!("Wrote {}", ui::count(summary.written, "document")));
    Ok(())
}
