//! Forest Explainer CLI Module
//!
//! Interactive launcher plus scripted `run` and `info` commands.

use clap::{Parser, Subcommand};
use colored::*;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::SessionConfig;
use crate::data::{DatasetCache, DatasetSource, SAMPLE_SIZE};
use crate::display::style::{
    accent, box_bottom, box_center, box_line, box_sep, box_top, dim, kv, muted, ok, section,
};
use crate::display::{Renderer, TerminalDisplay};
use crate::error::ExplainerError;
use crate::explainability::LocalExplanation;
use crate::session::{run_pipeline, RunOutput, Session};

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "forest-explainer")]
#[command(author = "KolosalAI")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train a random forest on a seeded sample and explain its predictions")]
#[command(long_about = None)]
pub struct Cli {
    /// CSV dataset to use instead of the built-in diabetes table
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    /// Target column of the CSV dataset
    #[arg(short, long, global = true, default_value = "target")]
    pub target: String,

    /// Session configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train, predict and explain once
    Run {
        /// Seed for the sample draw, the forest and the explainer
        #[arg(short, long, allow_hyphen_values = true)]
        seed: Option<String>,

        /// Table row to draw a waterfall plot for
        #[arg(long)]
        select: Option<usize>,

        /// Number of trees
        #[arg(long)]
        trees: Option<usize>,

        /// Print the run as JSON instead of drawing it
        #[arg(long)]
        json: bool,
    },

    /// Show dataset information
    Info,
}

impl Cli {
    pub fn source(&self) -> DatasetSource {
        match &self.data {
            Some(path) => DatasetSource::Csv {
                path: path.clone(),
                target: self.target.clone(),
            },
            None => DatasetSource::Diabetes,
        }
    }

    /// Defaults, overlaid by `--config` when given
    pub fn session_config(&self) -> anyhow::Result<SessionConfig> {
        let config = match &self.config {
            Some(path) => SessionConfig::from_json_file(path)?,
            None => SessionConfig::default(),
        };
        Ok(config)
    }
}

// ─── Run ───────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct RunReport<'a> {
    #[serde(flatten)]
    run: &'a RunOutput,
    selected: Option<LocalExplanation>,
}

pub fn cmd_run(
    source: DatasetSource,
    mut config: SessionConfig,
    seed: Option<String>,
    select: Option<usize>,
    trees: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    if let Some(n) = trees {
        config = config.with_n_estimators(n);
    }
    let seed = seed.unwrap_or_else(|| config.default_seed.clone());
    let cache = DatasetCache::new();

    if json {
        let run = run_pipeline(&cache, &source, &seed, &config)?;
        let selected = select.map(|row| run.explanation(row)).transpose()?;
        let report = RunReport { run: &run, selected };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut display = TerminalDisplay::new(std::io::stdout()).with_plot(config.plot.clone());
    let mut session = Session::new(source, config);
    session.edit_seed(seed, &mut display)?;

    let start = Instant::now();
    session.trigger(&cache, &mut display)?;
    if select.is_some() {
        session.select_row(select, &mut display)?;
    }

    println!();
    println!(
        "  {} {}",
        ok("✓"),
        dim(&format!("seed {} · {:.2}s", session.seed(), start.elapsed().as_secs_f64()))
    );
    println!();
    Ok(())
}

// ─── Info ──────────────────────────────────────────────────────────────────────

pub fn cmd_info(cache: &DatasetCache, source: &DatasetSource) -> anyhow::Result<()> {
    println!("{}", section("Data Info"));

    let dataset = cache.load(source)?;

    println!("  {:<12} {}", muted("Source"), source);
    println!("  {:<12} {}", muted("Rows"), dataset.n_rows());
    println!("  {:<12} {}", muted("Features"), dataset.n_features());
    println!("  {:<12} {}", muted("Target"), dataset.target_name());
    println!("  {:<12} {}", muted("Sample"), SAMPLE_SIZE);
    println!();

    println!(
        "  {:<20} {:>10} {:>10} {:>10} {:>10}",
        muted("Column"),
        muted("Mean"),
        muted("Std"),
        muted("Min"),
        muted("Max")
    );
    println!("  {}", dim(&"─".repeat(64)));

    for summary in dataset.describe() {
        println!(
            "  {:<20} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
            summary.name, summary.mean, summary.std, summary.min, summary.max
        );
    }

    println!();
    Ok(())
}

// ─── Interactive mode ──────────────────────────────────────────────────────────

fn print_banner(source: &DatasetSource) {
    println!();
    println!("{}", box_top());
    println!("{}", box_line(""));
    println!("{}", box_center(&format!("{}", "Forest Explainer".white().bold())));
    println!("{}", box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION"))))));
    println!("{}", box_line(""));
    println!("{}", box_sep());
    println!("{}", box_line(""));
    println!("{}", box_line(&kv("Dataset", &source.to_string())));
    println!("{}", box_line(&kv("Sample ", &format!("{} rows per run", SAMPLE_SIZE))));
    println!("{}", box_line(""));
    println!("{}", box_bottom());
}

fn status_line(session: &Session) -> String {
    let state = match (session.output(), session.selection()) {
        (None, _) => dim("idle").to_string(),
        (Some(_), None) => ok("rendered").to_string(),
        (Some(_), Some(row)) => ok(&format!("rendered · row {} selected", row)).to_string(),
    };
    format!("  {} {}   {}", muted("seed"), accent(session.seed()), state)
}

pub fn cmd_interactive(source: DatasetSource, config: SessionConfig) -> anyhow::Result<()> {
    use dialoguer::{theme::ColorfulTheme, Input, Select};

    print_banner(&source);

    let theme = ColorfulTheme {
        active_item_prefix: dialoguer::console::style("  ›".to_string()).for_stderr().cyan(),
        active_item_style: dialoguer::console::Style::new().for_stderr().white().bold(),
        inactive_item_prefix: dialoguer::console::style("   ".to_string()).for_stderr(),
        inactive_item_style: dialoguer::console::Style::new().for_stderr().color256(245),
        prompt_prefix: dialoguer::console::style("  ?".to_string()).for_stderr().color256(111),
        prompt_style: dialoguer::console::Style::new().for_stderr().white().bold(),
        ..ColorfulTheme::default()
    };

    let cache = DatasetCache::new();
    let mut display = TerminalDisplay::stdout().with_plot(config.plot.clone());
    let mut session = Session::new(source, config);

    loop {
        let items = &[
            "Edit seed             change the sample seed",
            "Send request          train, predict and explain",
            "Select row            waterfall plot for one prediction",
            "Clear selection",
            "Dataset info",
            "Exit",
        ];

        println!();
        println!("{}", status_line(&session));
        let sel = Select::with_theme(&theme)
            .with_prompt("What would you like to do")
            .items(items)
            .default(1)
            .interact_opt()?;

        let outcome = match sel {
            Some(0) => {
                let seed: String = Input::with_theme(&theme)
                    .with_prompt("Seed")
                    .with_initial_text(session.seed())
                    .allow_empty(true)
                    .interact_text()?;
                session.edit_seed(seed, &mut display)
            }
            Some(1) => session.trigger(&cache, &mut display),
            Some(2) => match session.output() {
                None => Err(ExplainerError::NotRendered),
                Some(out) => {
                    let rows: Vec<String> = out
                        .predictions()
                        .iter()
                        .zip(out.table.source_rows())
                        .enumerate()
                        .map(|(i, (p, src))| format!("row {}   prediction {:>8.2}   dataset row {}", i, p, src))
                        .collect();
                    let row = Select::with_theme(&theme)
                        .with_prompt("Row")
                        .items(&rows)
                        .default(session.selection().unwrap_or(0))
                        .interact_opt()?;
                    match row {
                        Some(row) => session.select_row(Some(row), &mut display),
                        None => Ok(()),
                    }
                }
            },
            Some(3) => session.select_row(None, &mut display),
            Some(4) => cmd_info(&cache, session.source()).map_err(|e| {
                e.downcast::<ExplainerError>()
                    .unwrap_or_else(|e| ExplainerError::DataUnavailable(e.to_string()))
            }),
            Some(5) | None => {
                println!();
                println!("  {}", dim("goodbye"));
                println!();
                break;
            }
            _ => Ok(()),
        };

        if let Err(err) = outcome {
            display.show_error(&err)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_reads_through_shared_cache() {
        let cache = DatasetCache::new();
        cache.load(&DatasetSource::Diabetes).unwrap();

        cmd_info(&cache, &DatasetSource::Diabetes).unwrap();
        cmd_info(&cache, &DatasetSource::Diabetes).unwrap();

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
    }

    #[test]
    fn test_info_missing_csv_keeps_data_category() {
        let source = DatasetSource::Csv {
            path: "/nonexistent/forest.csv".into(),
            target: "y".to_string(),
        };
        let err = cmd_info(&DatasetCache::new(), &source).unwrap_err();
        let err = err.downcast::<ExplainerError>().unwrap();
        assert_eq!(err.kind(), crate::error::ErrorKind::DataUnavailable);
    }
}
