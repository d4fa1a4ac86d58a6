mod renderer;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use heatmap_cat_core::{Grid, HeatmapSelector};

/// Pick a time range on a subsecond-offset heatmap.
///
/// Prints the selected `<start> <end>` offsets (seconds, 3 decimals) on
/// stdout. Exits with status 1 if the heatmap is closed without a selection.
#[derive(Debug, Parser)]
#[command(name = "heatmap-cat", version)]
struct Args {
    /// Grid document: `{"background": "bkg", "cells": [...]}`.
    grid: PathBuf,

    /// Id of the background cell, overriding the document.
    #[arg(long)]
    background: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let data = std::fs::read(&args.grid)
        .with_context(|| format!("reading {}", args.grid.display()))?;
    let mut grid = Grid::from_json(&data)
        .with_context(|| format!("loading grid from {}", args.grid.display()))?;
    if let Some(background) = args.background {
        grid.options.background = background.into();
    }
    log::info!("loaded {} cells from {}", grid.cells.len(), args.grid.display());

    let selector = HeatmapSelector::new(grid, renderer::Picked::default())?;
    match renderer::run(selector)? {
        Some(range) => {
            writeln!(std::io::stdout().lock(), "{range}")?;
            Ok(())
        }
        None => std::process::exit(1),
    }
}
