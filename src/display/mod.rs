//! Display module
//!
//! What the user sees after a run:
//! - [`table`] - the prediction table (image, prediction, features)
//! - [`grid`] - grid options and row selection
//! - [`terminal`] - colored terminal rendering of the grid and SHAP plots
//! - [`style`] - shared color and layout helpers

pub mod grid;
pub mod style;
pub mod table;
pub mod terminal;

pub use grid::{CellRenderer, ColumnDef, GridOptions, GridOptionsBuilder, SelectionMode, TableHandle};
pub use table::{CellValue, ColumnKind, DisplayTable, TableColumn};
pub use terminal::TerminalDisplay;

use crate::error::{ExplainerError, Result};
use crate::explainability::{AttributionSet, LocalExplanation};

/// A surface that can show a run: text, the prediction grid and both plots.
pub trait Renderer {
    /// Remove everything shown so far
    fn clear(&mut self) -> Result<()>;

    fn write_text(&mut self, text: &str) -> Result<()>;

    /// Draw the grid. `selected` marks the currently selected row, if any.
    fn render_table(
        &mut self,
        table: &DisplayTable,
        options: &GridOptions,
        selected: Option<usize>,
    ) -> Result<TableHandle>;

    /// Per-feature contributions for one row, from base value to prediction
    fn render_waterfall(&mut self, explanation: &LocalExplanation) -> Result<()>;

    /// Every row's contributions, one line per feature
    fn render_beeswarm(&mut self, attributions: &AttributionSet) -> Result<()>;

    /// Show a run failure inline
    fn show_error(&mut self, error: &ExplainerError) -> Result<()>;
}
