use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use board::config::{Config, LOG_FILE};
use board::error::{Chainable, Result};
use board::{logger, Builder, BuildReport};

fn build() -> Result<BuildReport> {
    let root = std::env::current_dir()
        .chain(board::error!("failed to determine the current working directory"))?;

    let config = Config::load(&root)?;
    logger::init(config.log_level, &root.join(LOG_FILE))?;

    let start = Instant::now();
    let report = Builder::new(Arc::new(config))?.run()?;
    log::debug!("build time: {}ms", start.elapsed().as_millis());
    Ok(report)
}

pub fn main() -> ExitCode {
    match build() {
        Ok(report) => {
            log::info!("Built {} pages ({} skipped)",
                report.pages_written(), report.pages_skipped());

            ExitCode::SUCCESS
        }
        Err(e) => {
            match log::max_level() {
                log::LevelFilter::Off => eprintln!("error: {e}"),
                _ => log::error!("error: {e}"),
            }

            ExitCode::FAILURE
        }
    }
}
