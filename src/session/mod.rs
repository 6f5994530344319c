//! Interactive session
//!
//! A session owns the seed field, the run state and the row selection. A run
//! happens only when [`Session::trigger`] is called; editing the seed drops the
//! previous result so stale output is never shown under a new seed.

pub mod pipeline;

pub use pipeline::{run_pipeline, RunOutput};

use crate::config::SessionConfig;
use crate::data::{DatasetCache, DatasetSource};
use crate::display::{Renderer, TableHandle};
use crate::error::{ExplainerError, Result};
use tracing::{debug, warn};

/// Whether a run is on screen
#[derive(Debug, Clone, Default)]
pub enum RunState {
    /// Nothing shown; waiting for a trigger
    #[default]
    Idle,
    /// The output of the last successful trigger
    Rendered(Box<RunOutput>),
}

impl RunState {
    pub fn is_idle(&self) -> bool {
        matches!(self, RunState::Idle)
    }
}

pub struct Session {
    source: DatasetSource,
    config: SessionConfig,
    seed: String,
    state: RunState,
    selection: Option<usize>,
    handle: Option<TableHandle>,
}

impl Session {
    pub fn new(source: DatasetSource, config: SessionConfig) -> Self {
        Self {
            seed: config.default_seed.clone(),
            source,
            config,
            state: RunState::Idle,
            selection: None,
            handle: None,
        }
    }

    /// Current text of the seed field
    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn source(&self) -> &DatasetSource {
        &self.source
    }

    /// Output of the run on screen, if any
    pub fn output(&self) -> Option<&RunOutput> {
        match &self.state {
            RunState::Rendered(out) => Some(out),
            RunState::Idle => None,
        }
    }

    /// Replace the seed text. Any shown result is dropped and the display cleared.
    pub fn edit_seed<R: Renderer + ?Sized>(&mut self, seed: impl Into<String>, display: &mut R) -> Result<()> {
        self.seed = seed.into();
        self.reset();
        debug!(seed = %self.seed, "seed edited");
        self.render(display)
    }

    /// Run the pipeline with the current seed and show the result.
    ///
    /// On failure the session is left idle, the display cleared, and the error
    /// returned for the caller to report.
    pub fn trigger<R: Renderer + ?Sized>(&mut self, cache: &DatasetCache, display: &mut R) -> Result<()> {
        self.reset();
        match run_pipeline(cache, &self.source, &self.seed, &self.config) {
            Ok(out) => {
                self.state = RunState::Rendered(Box::new(out));
                self.render(display)
            }
            Err(err) => {
                warn!(seed = %self.seed, error = %err, "run failed");
                display.clear()?;
                Err(err)
            }
        }
    }

    /// Select a table row, or clear the selection with `None`, and redraw.
    pub fn select_row<R: Renderer + ?Sized>(&mut self, row: Option<usize>, display: &mut R) -> Result<()> {
        if self.state.is_idle() {
            return Err(ExplainerError::NotRendered);
        }
        self.selection = match (row, &self.handle) {
            (Some(index), Some(handle)) => Some(handle.select(index)?),
            (Some(_), None) => return Err(ExplainerError::NotRendered),
            (None, _) => None,
        };
        debug!(selection = ?self.selection, "selection changed");
        self.render(display)
    }

    /// Draw the current state: nothing when idle; otherwise the heading, the
    /// grid, the waterfall of the selected row if any, and the beeswarm.
    pub fn render<R: Renderer + ?Sized>(&mut self, display: &mut R) -> Result<()> {
        display.clear()?;
        let RunState::Rendered(out) = &self.state else {
            self.handle = None;
            return Ok(());
        };

        display.write_text("Prediction dataframe:")?;
        let handle = display.render_table(&out.table, &out.grid, self.selection)?;
        if let Some(row) = self.selection {
            display.render_waterfall(&out.explanation(row)?)?;
        }
        display.render_beeswarm(&out.attributions)?;
        self.handle = Some(handle);
        Ok(())
    }

    fn reset(&mut self) {
        self.state = RunState::Idle;
        self.selection = None;
        self.handle = None;
    }
}
