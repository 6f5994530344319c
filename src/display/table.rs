//! The prediction table shown to the user

use crate::error::{ExplainerError, Result};
use ndarray::{Array1, Array2};
use serde::Serialize;

/// What a column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Decorative image reference
    Image,
    /// Model output
    Prediction,
    /// Input feature
    Feature,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableColumn {
    pub name: String,
    pub kind: ColumnKind,
}

/// One cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    ImageRef(String),
    Number(f64),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            CellValue::ImageRef(_) => None,
        }
    }
}

/// Sample rows with their predictions, ready for the grid.
///
/// Built in the same steps a dataframe user would take: start from the feature
/// columns, append the prediction and the image reference, then move those two
/// to the front.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayTable {
    columns: Vec<TableColumn>,
    rows: Vec<Vec<CellValue>>,
    /// Dataset row index behind each table row
    source_rows: Vec<usize>,
}

impl DisplayTable {
    /// Table of feature columns only
    pub fn from_features(
        feature_names: &[String],
        features: &Array2<f64>,
        source_rows: &[usize],
    ) -> Result<Self> {
        if features.ncols() != feature_names.len() || features.nrows() != source_rows.len() {
            return Err(ExplainerError::ShapeError {
                expected: format!("{} x {}", source_rows.len(), feature_names.len()),
                actual: format!("{} x {}", features.nrows(), features.ncols()),
            });
        }

        let columns = feature_names
            .iter()
            .map(|name| TableColumn {
                name: name.clone(),
                kind: ColumnKind::Feature,
            })
            .collect();
        let rows = features
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|&v| CellValue::Number(v)).collect())
            .collect();

        Ok(Self {
            columns,
            rows,
            source_rows: source_rows.to_vec(),
        })
    }

    fn push_column(&mut self, name: &str, kind: ColumnKind, cells: Vec<CellValue>) -> Result<()> {
        if self.column_index(name).is_some() {
            return Err(ExplainerError::ConfigurationError(format!(
                "column `{}` already exists in the table",
                name
            )));
        }
        if cells.len() != self.rows.len() {
            return Err(ExplainerError::ShapeError {
                expected: format!("{} values for column `{}`", self.rows.len(), name),
                actual: format!("{} values", cells.len()),
            });
        }
        self.columns.push(TableColumn {
            name: name.to_string(),
            kind,
        });
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.push(cell);
        }
        Ok(())
    }

    /// Append the prediction column
    pub fn with_prediction(mut self, name: &str, predictions: &Array1<f64>) -> Result<Self> {
        let cells = predictions.iter().map(|&p| CellValue::Number(p)).collect();
        self.push_column(name, ColumnKind::Prediction, cells)?;
        Ok(self)
    }

    /// Append a column holding the same image reference in every row
    pub fn with_image(mut self, name: &str, url: &str) -> Result<Self> {
        let cells = vec![CellValue::ImageRef(url.to_string()); self.rows.len()];
        self.push_column(name, ColumnKind::Image, cells)?;
        Ok(self)
    }

    /// Move the named columns to the front, in the given order. Other columns
    /// keep their relative order.
    pub fn move_to_front(mut self, names: &[&str]) -> Result<Self> {
        let mut order = Vec::with_capacity(self.columns.len());
        for name in names {
            let idx = self.column_index(name).ok_or_else(|| {
                ExplainerError::ConfigurationError(format!("no column named `{}`", name))
            })?;
            if !order.contains(&idx) {
                order.push(idx);
            }
        }
        order.extend((0..self.columns.len()).filter(|i| !order.contains(i)).collect::<Vec<_>>());

        self.columns = order.iter().map(|&i| self.columns[i].clone()).collect();
        self.rows = self
            .rows
            .iter()
            .map(|row| order.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(self)
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn source_rows(&self) -> &[usize] {
        &self.source_rows
    }

    /// Values of the column of the given kind, if it is numeric
    pub fn numeric_column(&self, kind: ColumnKind) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c.kind == kind)?;
        self.rows.iter().map(|row| row[idx].as_number()).collect()
    }

    /// Names of the feature columns, in table order
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Feature)
            .map(|c| c.name.clone())
            .collect()
    }

    /// Feature columns only, as a matrix: the explainer input. Image and
    /// prediction columns are dropped.
    pub fn feature_matrix(&self) -> Result<Array2<f64>> {
        let feature_idx: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.kind == ColumnKind::Feature)
            .map(|(i, _)| i)
            .collect();

        let mut values = Vec::with_capacity(self.rows.len() * feature_idx.len());
        for row in &self.rows {
            for &i in &feature_idx {
                let v = row[i].as_number().ok_or_else(|| {
                    ExplainerError::ModelError(format!(
                        "feature column `{}` holds a non-numeric cell",
                        self.columns[i].name
                    ))
                })?;
                values.push(v);
            }
        }

        Ok(Array2::from_shape_vec((self.rows.len(), feature_idx.len()), values)?)
    }
}
