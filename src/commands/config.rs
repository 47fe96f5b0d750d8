use anyhow::Result;

use crate::Context;
use crate::config::{LOCAL_CONFIG_FILE, config_dir};
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    if !ctx.quiet {
        ui::header("Configuration");
        println!();
        match &ctx.config_path {
            Some(path) => ui::kv("Config file", &path.display().to_string()),
            None => ui::kv("Config file", "(defaults)"),
        }
        ui::dim(&format!(
            "Search order: --config, ./{LOCAL_CONFIG_FILE}, {}",
            config_dir()?.join("config.toml").display()
        ));
        println!();
    }

    print!("{}", ctx.config.to_toml()?);
    Ok(())
}
