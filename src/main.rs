//! Forest Explainer - Main Entry Point
//!
//! Interactive launcher by default; `run` and `info` for scripted use.

use clap::Parser;
use forest_explainer::cli::{cmd_info, cmd_interactive, cmd_run, Cli, Commands};
use forest_explainer::data::DatasetCache;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the drawn tables.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forest_explainer=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let source = cli.source();
    let config = cli.session_config()?;

    match cli.command {
        Some(Commands::Run { seed, select, trees, json }) => {
            cmd_run(source, config, seed, select, trees, json)?;
        }
        Some(Commands::Info) => {
            cmd_info(&DatasetCache::new(), &source)?;
        }
        None => {
            cmd_interactive(source, config)?;
        }
    }

    Ok(())
}
