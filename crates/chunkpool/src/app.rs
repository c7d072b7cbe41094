//! Application entry point.

use std::io::{self, Write};

use anyhow::{Context, Result};

use chunkpool_cli::output::write_to_file;
use chunkpool_cli::presenter::{JsonPresenter, StatsPresenter, TextPresenter};
use chunkpool_core::Pool;

use crate::config::AppConfig;

/// Run the application.
pub fn run(config: &AppConfig) -> Result<()> {
    // Handle shell completion
    if let Some(shell) = config.completion {
        let mut cmd = <AppConfig as clap::CommandFactory>::command();
        chunkpool_cli::completion::generate_completion(&mut cmd, shell, &mut io::stdout());
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with_output(config, &mut out)
}

/// Run the acquire/release sequence, writing the report to `out`.
pub fn run_with_output(config: &AppConfig, out: &mut dyn Write) -> Result<()> {
    let table = config.size_class_table()?;
    let mut pool = Pool::new(table).context("failed to initialize chunk pool")?;

    let presenter: Box<dyn StatsPresenter> = if config.json {
        Box::new(JsonPresenter)
    } else {
        Box::new(TextPresenter::new(config.verbose, config.quiet))
    };

    let mut held = Vec::new();
    for &size in &config.sizes {
        let handle = pool
            .acquire(size)
            .with_context(|| format!("acquire of {size} bytes failed"))?;
        presenter.present_acquire(out, &pool, size, handle)?;
        if config.hold {
            held.push(handle);
        } else {
            pool.release(handle)?;
        }
    }
    for handle in held {
        pool.release(handle)?;
    }

    presenter.present_pool(out, &pool, config.details)?;

    if let Some(ref path) = config.output {
        write_to_file(path, &pool.snapshot())
            .with_context(|| format!("failed to write snapshot to {path}"))?;
    }

    Ok(())
}
