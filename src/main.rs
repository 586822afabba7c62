mod config;
mod data;
mod report;
mod shell;

use std::io;

use anyhow::{Context, Result};
use env_logger::{Env, Target};

use config::Args;
use data::columns::ColumnResolver;
use data::loader::{LoadReport, PriceLoader};
use data::model::Catalog;
use shell::Shell;

fn log_summary(args: &Args, report: &LoadReport) {
    let files: Vec<&str> = report
        .loaded
        .iter()
        .map(|f| f.file_name.as_str())
        .collect();
    log::info!(
        "{} records from {} price lists in {}: {}",
        report.record_count(),
        files.len(),
        args.dir.display(),
        files.join(", ")
    );
    for skipped in &report.skipped {
        log::warn!("not loaded: {} ({})", skipped.file_name, skipped.error);
    }
}

fn main() -> Result<()> {
    // Load diagnostics go to stdout next to the prompt.
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stdout)
        .init();

    let args: Args = argh::from_env();

    let loader = PriceLoader::new(ColumnResolver::default());
    let mut catalog = Catalog::new();
    let loaded = loader
        .load_directory(&args.dir, &mut catalog)
        .with_context(|| format!("scanning {}", args.dir.display()))?;
    log_summary(&args, &loaded);

    let state = Shell::new(&catalog)
        .run(io::stdin().lock(), io::stdout().lock())
        .context("interactive session")?;
    log::debug!("session ended: {state:?}");

    report::export(&catalog, &args.output)?;
    println!("Данные экспортированы в {}", args.output.display());
    Ok(())
}
