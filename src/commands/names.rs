use anyhow::{Context as AnyhowContext, Result};
use naming::{NameAllocator, default_replace, resource_name};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::Context;
use crate::cli::NamesArgs;
use crate::config::NameStyle;

pub fn run(ctx: &Context, args: NamesArgs) -> Result<()> {
    let input = match &args.file {
        Some(path) => read_file(path)?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Could not read names from stdin")?;
            buf
        }
    };
    let blocked = match &args.block {
        Some(path) => read_file(path)?,
        None => String::new(),
    };

    let mut allocator = ctx.config.allocator();
    if let Some(style) = args.style {
        match style {
            NameStyle::Paren => allocator.set_replace(default_replace),
            NameStyle::Underscore => allocator.set_replace(resource_name),
        };
    }
    for name in allocate(&allocator, &input, &blocked, args.sanitize)? {
        println!("{name}");
    }
    log::info!("{} names reserved", allocator.len());
    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))
}

fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Block every name in `blocked`, then allocate one name per input line
fn allocate(
    allocator: &NameAllocator,
    input: &str,
    blocked: &str,
    sanitize: bool,
) -> Result<Vec<String>> {
    for name in lines(blocked) {
        allocator.block(name);
    }

    lines(input)
        .map(|line| {
            let candidate = if sanitize {
                naming::sanitize(line)
            } else {
                line.to_string()
            };
            allocator
                .next(&candidate)
                .with_context(|| format!("Could not allocate a name for '{line}'"))
        })
        .collect()
}
