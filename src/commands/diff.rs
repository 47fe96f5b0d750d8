use anyhow::{Result, bail};

use crate::Context;
use crate::cli::DiffArgs;
use crate::engine::{DiffSummary, compute_diffs, display_diff};

pub fn run(ctx: &Context, args: DiffArgs) -> Result<()> {
    let mut config = ctx.config.clone();
    for key in args.ignore {
        if !config.ignore_keys.contains(&key) {
            config.ignore_keys.push(key);
        }
    }
    config.validate()?;

    let diffs = compute_diffs(&config.comparator(), &args.local, &args.remote, args.jobs)?;
    let summary = DiffSummary::from_diffs(&diffs);

    if !ctx.quiet || summary.has_changes() {
        display_diff(&diffs, args.show_text);
    }

    if summary.has_changes() {
        bail!(
            "{} out of sync",
            crate::ui::count(summary.total_changes(), "document")
        );
    }
    Ok(())
}
