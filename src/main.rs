use std::io;

use anyhow::{Context, Result};
use housing_regression::{AppConfig, pipeline};
use log::info;

fn main() -> Result<()> {
    env_logger::init();

    let config = AppConfig::from_env().context("reading configuration")?;
    info!("config: {config:?}");

    let report = pipeline::run(&config)
        .with_context(|| format!("running on {}", config.data_path.display()))?;

    report.print(&mut io::stdout().lock())?;

    if let Some(path) = &config.report_path {
        report
            .write_json(path)
            .with_context(|| format!("writing report to {}", path.display()))?;
    }

    Ok(())
}
