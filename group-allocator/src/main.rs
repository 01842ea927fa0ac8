use std::fs::File;
use std::io::{self, BufWriter};
use std::sync::Arc;

use envconfig::Envconfig;
use eyre::{Result, WrapErr};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use group_allocator::allocator::Allocator;
use group_allocator::config::Config;
use group_allocator::roster::{write_outcome, Roster};
use group_allocator::strategy::GreedyExclusiveStrategy;

fn main() -> Result<()> {
    // stdout carries the distribution, logs go to stderr
    let log_layer = fmt::layer()
        .with_target(true)
        .with_writer(io::stderr)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        );
    tracing_subscriber::registry().with(log_layer).init();

    let config = Config::init_from_env().wrap_err("invalid configuration")?;

    let roster_path = config.roster_path();
    let roster = Roster::from_path(&roster_path)
        .wrap_err_with(|| format!("failed to load roster from {}", roster_path.display()))?;
    tracing::info!(
        members = roster.members.len(),
        groups = roster.groups.len(),
        locked = roster.locked_member_ids.len(),
        "loaded roster"
    );

    let allocator = Allocator::new(
        config.allocation_config(),
        Arc::new(GreedyExclusiveStrategy::default()),
    );
    let outcome = allocator.run(&roster.request());

    match config.output_path() {
        Some(path) => {
            let file = File::create(&path)
                .wrap_err_with(|| format!("failed to create {}", path.display()))?;
            write_outcome(&outcome, BufWriter::new(file))?;
            tracing::info!(path = %path.display(), "wrote distribution");
        }
        None => write_outcome(&outcome, io::stdout().lock())?,
    }

    Ok(())
}
