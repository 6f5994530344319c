//! Grid presentation options and the handle returned by a rendered grid

use super::table::{ColumnKind, DisplayTable};
use crate::config::GridConfig;
use crate::error::{ExplainerError, Result};
use serde::{Deserialize, Serialize};

/// Row selection behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// At most one row selected at a time
    Single,
    /// Rows cannot be selected
    Disabled,
}

/// How a column's cells are drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellRenderer {
    Text,
    Number { decimals: usize },
    /// Inline image drawn as a thumbnail of the given size
    Thumbnail { width: u32, height: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub field: String,
    pub renderer: CellRenderer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridOptions {
    pub auto_height: bool,
    pub row_height: u32,
    pub selection_mode: SelectionMode,
    pub use_checkbox: bool,
    pub column_defs: Vec<ColumnDef>,
}

impl GridOptions {
    pub fn column_def(&self, field: &str) -> Option<&ColumnDef> {
        self.column_defs.iter().find(|d| d.field == field)
    }

    /// Columns drawn as inline images
    pub fn image_columns(&self) -> Vec<&str> {
        self.column_defs
            .iter()
            .filter(|d| matches!(d.renderer, CellRenderer::Thumbnail { .. }))
            .map(|d| d.field.as_str())
            .collect()
    }
}

/// Builds [`GridOptions`] for a table
pub struct GridOptionsBuilder {
    options: GridOptions,
}

impl GridOptionsBuilder {
    /// Default definitions for every column: numbers for numeric columns,
    /// plain text for image references until a renderer is configured
    pub fn from_table(table: &DisplayTable) -> Self {
        let column_defs = table
            .columns()
            .iter()
            .map(|c| ColumnDef {
                field: c.name.clone(),
                renderer: match c.kind {
                    ColumnKind::Image => CellRenderer::Text,
                    ColumnKind::Prediction => CellRenderer::Number { decimals: 2 },
                    ColumnKind::Feature => CellRenderer::Number { decimals: 4 },
                },
            })
            .collect();

        Self {
            options: GridOptions {
                auto_height: false,
                row_height: 25,
                selection_mode: SelectionMode::Disabled,
                use_checkbox: false,
                column_defs,
            },
        }
    }

    pub fn configure_auto_height(mut self, auto_height: bool) -> Self {
        self.options.auto_height = auto_height;
        self
    }

    pub fn configure_row_height(mut self, row_height: u32) -> Self {
        self.options.row_height = row_height;
        self
    }

    pub fn configure_selection(mut self, mode: SelectionMode, use_checkbox: bool) -> Self {
        self.options.selection_mode = mode;
        self.options.use_checkbox = use_checkbox;
        self
    }

    /// Set the renderer for one column. Unknown columns are reported by [`build`](Self::build).
    pub fn configure_column(mut self, field: &str, renderer: CellRenderer) -> Self {
        match self.options.column_defs.iter_mut().find(|d| d.field == field) {
            Some(def) => def.renderer = renderer,
            None => self.options.column_defs.push(ColumnDef {
                field: field.to_string(),
                renderer,
            }),
        }
        self
    }

    /// Options for the prediction grid: auto height, configured row height,
    /// single selection with checkbox, thumbnail image column
    pub fn prediction_grid(table: &DisplayTable, image_column: &str, config: &GridConfig) -> Result<GridOptions> {
        Self::from_table(table)
            .configure_auto_height(config.auto_height)
            .configure_row_height(config.row_height)
            .configure_selection(SelectionMode::Single, true)
            .configure_column(
                image_column,
                CellRenderer::Thumbnail {
                    width: config.thumbnail_size,
                    height: config.thumbnail_size,
                },
            )
            .build_for(table)
    }

    /// Finish, checking that every definition names a column of `table`
    pub fn build_for(self, table: &DisplayTable) -> Result<GridOptions> {
        if let Some(def) = self
            .options
            .column_defs
            .iter()
            .find(|d| table.column_index(&d.field).is_none())
        {
            return Err(ExplainerError::ConfigurationError(format!(
                "grid column `{}` is not in the table",
                def.field
            )));
        }
        if self.options.row_height == 0 {
            return Err(ExplainerError::ConfigurationError(
                "grid row height must be positive".to_string(),
            ));
        }
        Ok(self.options)
    }
}

/// A rendered grid. Turns user clicks into validated row selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableHandle {
    rows: usize,
    selection_mode: SelectionMode,
}

impl TableHandle {
    pub fn new(rows: usize, selection_mode: SelectionMode) -> Self {
        Self { rows, selection_mode }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Validate a selection of the row at `index`
    pub fn select(&self, index: usize) -> Result<usize> {
        if self.selection_mode == SelectionMode::Disabled {
            return Err(ExplainerError::ConfigurationError(
                "row selection is disabled for this grid".to_string(),
            ));
        }
        if index >= self.rows {
            return Err(ExplainerError::InvalidSelection {
                index,
                rows: self.rows,
            });
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn table() -> DisplayTable {
        DisplayTable::from_features(&["x".to_string()], &array![[1.0], [2.0]], &[0, 1])
            .unwrap()
            .with_prediction("prediction", &array![3.0, 4.0])
            .unwrap()
            .with_image("photo", "https://example.com/p.jpg")
            .unwrap()
            .move_to_front(&["photo", "prediction"])
            .unwrap()
    }

    #[test]
    fn test_prediction_grid_options() {
        let t = table();
        let options = GridOptionsBuilder::prediction_grid(&t, "photo", &GridConfig::default()).unwrap();
        assert!(options.auto_height);
        assert_eq!(options.row_height, 50);
        assert_eq!(options.selection_mode, SelectionMode::Single);
        assert!(options.use_checkbox);
        assert_eq!(options.image_columns(), vec!["photo"]);
        assert_eq!(
            options.column_def("prediction").map(|d| d.renderer.clone()),
            Some(CellRenderer::Number { decimals: 2 })
        );
    }

    #[test]
    fn test_unknown_renderer_column() {
        let t = table();
        let err = GridOptionsBuilder::prediction_grid(&t, "picture", &GridConfig::default()).unwrap_err();
        assert!(matches!(err, ExplainerError::ConfigurationError(_)));
    }

    #[test]
    fn test_handle_selection() {
        let handle = TableHandle::new(5, SelectionMode::Single);
        assert_eq!(handle.select(4).unwrap(), 4);
        assert!(matches!(
            handle.select(5).unwrap_err(),
            ExplainerError::InvalidSelection { index: 5, rows: 5 }
        ));

        let disabled = TableHandle::new(5, SelectionMode::Disabled);
        assert!(disabled.select(0).is_err());
    }
}
