use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use slidekit::{export, init_logging_with, summarize, Config, BUILD_DATE, VERSION};

fn usage() -> String {
    format!(
        "slidekit {} ({})\n\nUsage: slidekit <export.geojson> [config.toml|config.json]",
        VERSION, BUILD_DATE
    )
}

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args_os().skip(1);
    let Some(export_path) = args.next().map(PathBuf::from) else {
        bail!(usage());
    };

    let config_path = match args.next() {
        Some(path) => PathBuf::from(path),
        None => Config::default_path()?,
    };
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;

    init_logging_with(&config.logging)?;
    tracing::info!(
        "slidekit {} ({}), diagnostic mode {}",
        VERSION,
        BUILD_DATE,
        if config.measurement.diagnostic_mode { "on" } else { "off" }
    );

    run(&export_path)
}

fn run(path: &Path) -> anyhow::Result<()> {
    let measurements = export::read_geojson(path)
        .with_context(|| format!("reading measurements from {}", path.display()))?;

    if measurements.is_empty() {
        println!("No measurements in {}", path.display());
        return Ok(());
    }

    for line in summarize(&measurements) {
        println!("{}", line);
    }
    Ok(())
}
