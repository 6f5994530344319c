//! Colored terminal renderer
//!
//! Draws the grid as an aligned table and both SHAP plots as text charts on a
//! shared horizontal axis.

use super::grid::{CellRenderer, GridOptions, SelectionMode, TableHandle};
use super::style::{
    accent, dim, fail, gradient, muted, negative, ok, pad_left, pad_right, positive, section,
    truncate,
};
use super::table::{CellValue, ColumnKind, DisplayTable};
use super::Renderer;
use crate::config::PlotConfig;
use crate::error::{ErrorKind, ExplainerError, Result};
use crate::explainability::{AttributionSet, LocalExplanation, ShapSummary};
use colored::*;
use std::io::{Stdout, Write};

const LABEL_WIDTH: usize = 24;
const THUMBNAIL_TEXT: usize = 20;

/// Renders to any writer
pub struct TerminalDisplay<W: Write> {
    out: W,
    plot: PlotConfig,
    clear_screen: bool,
}

impl TerminalDisplay<Stdout> {
    /// Standard output, clearing the screen on [`Renderer::clear`]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout()).with_clear_screen(true)
    }
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            plot: PlotConfig::default(),
            clear_screen: false,
        }
    }

    pub fn with_plot(mut self, plot: PlotConfig) -> Self {
        self.plot = plot;
        self
    }

    pub fn with_clear_screen(mut self, clear_screen: bool) -> Self {
        self.clear_screen = clear_screen;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            writeln!(self.out, "{}", line)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Maps values in `[lo, hi]` to columns `0..width`
struct Axis {
    lo: f64,
    hi: f64,
    width: usize,
}

impl Axis {
    fn spanning(values: impl IntoIterator<Item = f64>, width: usize) -> Self {
        let (mut lo, mut hi) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if !lo.is_finite() || !hi.is_finite() {
            lo = 0.0;
            hi = 0.0;
        }
        if hi - lo < 1e-12 {
            lo -= 0.5;
            hi += 0.5;
        }
        Self { lo, hi, width: width.max(2) }
    }

    fn column(&self, v: f64) -> usize {
        let t = ((v - self.lo) / (self.hi - self.lo)).clamp(0.0, 1.0);
        (t * (self.width - 1) as f64).round() as usize
    }

    /// `lo` under the first column, `hi` under the last
    fn scale_line(&self) -> String {
        let lo = format!("{:.2}", self.lo);
        let hi = format!("{:.2}", self.hi);
        let gap = self.width.saturating_sub(lo.chars().count() + hi.chars().count()).max(1);
        format!("{}{}{}", lo, " ".repeat(gap), hi)
    }
}

fn signed(v: f64) -> String {
    if v >= 0.0 {
        format!("+{:.2}", v)
    } else {
        format!("{:.2}", v)
    }
}

fn image_text(url: &str, renderer: &CellRenderer) -> String {
    let bare = url
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    match renderer {
        CellRenderer::Thumbnail { .. } => format!("▣ {}", truncate(bare, THUMBNAIL_TEXT - 2)),
        _ => truncate(bare, THUMBNAIL_TEXT),
    }
}

fn cell_text(cell: &CellValue, renderer: Option<&CellRenderer>) -> String {
    match (cell, renderer) {
        (CellValue::ImageRef(url), Some(r)) => image_text(url, r),
        (CellValue::ImageRef(url), None) => image_text(url, &CellRenderer::Text),
        (CellValue::Number(v), Some(CellRenderer::Number { decimals })) => {
            format!("{:.*}", *decimals, v)
        }
        (CellValue::Number(v), _) => format!("{}", v),
    }
}

fn error_heading(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Configuration => "check the seed or configuration",
        ErrorKind::DataUnavailable => "the dataset could not be loaded",
        ErrorKind::Model => "training or explanation failed",
        ErrorKind::Render => "the display failed",
    }
}

impl<W: Write> TerminalDisplay<W> {
    fn table_lines(
        &self,
        table: &DisplayTable,
        options: &GridOptions,
        selected: Option<usize>,
    ) -> Vec<String> {
        let renderers: Vec<Option<&CellRenderer>> = table
            .columns()
            .iter()
            .map(|c| options.column_def(&c.name).map(|d| &d.renderer))
            .collect();

        let texts: Vec<Vec<String>> = table
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&renderers)
                    .map(|(cell, r)| cell_text(cell, *r))
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = table
            .columns()
            .iter()
            .enumerate()
            .map(|(j, c)| {
                texts
                    .iter()
                    .map(|row| row[j].chars().count())
                    .chain(std::iter::once(c.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let numeric: Vec<bool> = (0..table.n_columns())
            .map(|j| table.rows().first().map_or(false, |r| r[j].as_number().is_some()))
            .collect();

        let gutter = if options.use_checkbox { "    " } else { "" };
        let mut lines = Vec::with_capacity(table.n_rows() + 4);

        let header: Vec<String> = table
            .columns()
            .iter()
            .enumerate()
            .map(|(j, c)| {
                let name = if numeric[j] {
                    pad_left(&c.name, widths[j])
                } else {
                    pad_right(&c.name, widths[j])
                };
                muted(&name).to_string()
            })
            .collect();
        lines.push(format!("  {}{}", gutter, header.join("  ")));

        let rule_len = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1) + gutter.len();
        lines.push(format!("  {}", dim(&"─".repeat(rule_len))));

        for (i, row) in texts.iter().enumerate() {
            let is_selected = selected == Some(i);
            let checkbox = match (options.use_checkbox, is_selected) {
                (false, _) => String::new(),
                (true, true) => format!("{} ", ok("[x]")),
                (true, false) => format!("{} ", dim("[ ]")),
            };
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(j, text)| {
                    let padded = if numeric[j] {
                        pad_left(text, widths[j])
                    } else {
                        pad_right(text, widths[j])
                    };
                    if is_selected {
                        padded.as_str().white().bold().to_string()
                    } else if table.columns()[j].kind == ColumnKind::Image {
                        accent(&padded).to_string()
                    } else {
                        padded
                    }
                })
                .collect();
            lines.push(format!("  {}{}", checkbox, cells.join("  ")));
        }

        let mut footer = vec![format!("{} rows", table.n_rows())];
        if options.auto_height {
            footer.push("auto height".to_string());
        }
        footer.push(format!("row height {}px", options.row_height));
        footer.push(
            match options.selection_mode {
                SelectionMode::Single => "single select",
                SelectionMode::Disabled => "no selection",
            }
            .to_string(),
        );
        lines.push(format!("  {}", dim(&footer.join(" · "))));
        lines
    }

    fn waterfall_lines(&self, explanation: &LocalExplanation) -> Vec<String> {
        let max_display = self.plot.max_display.max(1);
        let sorted = explanation.sorted_contributions();

        // (label, contribution), most influential first
        let mut rows: Vec<(String, f64)> = Vec::new();
        if sorted.len() > max_display {
            let (shown, rest) = sorted.split_at(max_display - 1);
            rows.extend(
                shown
                    .iter()
                    .map(|c| (format!("{:.3} = {}", c.feature_value, c.feature_name), c.contribution)),
            );
            rows.push((
                format!("{} other features", rest.len()),
                rest.iter().map(|c| c.contribution).sum(),
            ));
        } else {
            rows.extend(
                sorted
                    .iter()
                    .map(|c| (format!("{:.3} = {}", c.feature_value, c.feature_name), c.contribution)),
            );
        }

        // accumulate from the base value upward, least influential first
        let mut spans = vec![(0.0, 0.0); rows.len()];
        let mut level = explanation.base_value;
        for (i, (_, phi)) in rows.iter().enumerate().rev() {
            spans[i] = (level, level + phi);
            level += phi;
        }

        let axis = Axis::spanning(
            spans
                .iter()
                .flat_map(|&(a, b)| [a, b])
                .chain([explanation.base_value, explanation.prediction]),
            self.plot.width,
        );

        let mut lines = vec![section(&format!("Waterfall · row {}", explanation.instance_index))];
        lines.push(format!(
            "  {} {}",
            pad_right("", LABEL_WIDTH),
            muted(&format!("f(x) = {:.3}", explanation.prediction))
        ));

        for ((label, phi), &(start, end)) in rows.iter().zip(&spans) {
            let a = axis.column(start.min(end));
            let b = axis.column(start.max(end));
            let len = b - a + 1;
            let bar = if *phi >= 0.0 {
                format!("{}▶", "█".repeat(len - 1))
            } else {
                format!("◀{}", "█".repeat(len - 1))
            };
            let painted = if *phi >= 0.0 { positive(&bar) } else { negative(&bar) };
            let value = if *phi >= 0.0 { positive(&signed(*phi)) } else { negative(&signed(*phi)) };
            lines.push(format!(
                "  {} {}{}{} {}",
                pad_left(&truncate(label, LABEL_WIDTH), LABEL_WIDTH),
                " ".repeat(a),
                painted,
                " ".repeat(axis.width.saturating_sub(b + 1)),
                value
            ));
        }

        lines.push(format!(
            "  {} {}",
            pad_right("", LABEL_WIDTH),
            dim(&"─".repeat(axis.width))
        ));
        lines.push(format!("  {} {}", pad_right("", LABEL_WIDTH), dim(&axis.scale_line())));
        lines.push(format!(
            "  {} {}",
            pad_right("", LABEL_WIDTH),
            muted(&format!("E[f(X)] = {:.3}", explanation.base_value))
        ));
        lines
    }

    fn beeswarm_lines(&self, attributions: &AttributionSet) -> Vec<String> {
        let max_display = self.plot.max_display.max(1);
        let ranking = ShapSummary::from_attributions(attributions).feature_ranking();
        let n_rows = attributions.n_rows();

        // (label, shap per row, color position per row)
        let mut series: Vec<(String, Vec<f64>, Vec<Option<f64>>)> = Vec::new();
        let push_feature = |series: &mut Vec<_>, j: usize| {
            let values = attributions.values.column(j).to_vec();
            let data = attributions.data.column(j);
            let (lo, hi) = data
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
            let colors = data
                .iter()
                .map(|&v| Some(if hi > lo { (v - lo) / (hi - lo) } else { 0.5 }))
                .collect();
            series.push((attributions.feature_names[j].clone(), values, colors));
        };

        if ranking.len() > max_display {
            let (shown, rest) = ranking.split_at(max_display - 1);
            for &(j, _) in shown {
                push_feature(&mut series, j);
            }
            let sums = (0..n_rows)
                .map(|i| rest.iter().map(|&(j, _)| attributions.values[[i, j]]).sum())
                .collect();
            series.push((format!("Sum of {} other features", rest.len()), sums, vec![None; n_rows]));
        } else {
            for &(j, _) in &ranking {
                push_feature(&mut series, j);
            }
        }

        let axis = Axis::spanning(
            series
                .iter()
                .flat_map(|(_, values, _)| values.iter().copied())
                .chain(std::iter::once(0.0)),
            self.plot.width,
        );
        let zero = axis.column(0.0);

        let mut lines = vec![section(&format!("Beeswarm · {} rows", n_rows))];
        for (label, values, colors) in &series {
            let mut slots: Vec<Option<Option<f64>>> = vec![None; axis.width];
            for (&v, &color) in values.iter().zip(colors) {
                let c = axis.column(v);
                // nudge overlapping dots sideways so each row stays visible
                let slot = [c, c + 1, c.wrapping_sub(1), c + 2, c.wrapping_sub(2)]
                    .into_iter()
                    .find(|&s| s < axis.width && slots[s].is_none())
                    .unwrap_or(c);
                slots[slot] = Some(color);
            }

            let strip: String = slots
                .iter()
                .enumerate()
                .map(|(s, slot)| match slot {
                    Some(Some(t)) => gradient("●", *t).to_string(),
                    Some(None) => muted("●").to_string(),
                    None if s == zero => dim("│").to_string(),
                    None => dim("·").to_string(),
                })
                .collect();

            lines.push(format!(
                "  {} {}",
                pad_left(&truncate(label, LABEL_WIDTH), LABEL_WIDTH),
                strip
            ));
        }

        lines.push(format!("  {} {}", pad_right("", LABEL_WIDTH), dim(&axis.scale_line())));
        lines.push(format!(
            "  {} {}",
            pad_right("", LABEL_WIDTH),
            muted("SHAP value (impact on model output)")
        ));
        lines.push(format!(
            "  {} {} {}{}{}{}{}",
            pad_right("", LABEL_WIDTH),
            muted("feature value"),
            gradient("low ", 0.0),
            gradient("●", 0.0),
            gradient("●", 0.5),
            gradient("●", 1.0),
            gradient(" high", 1.0)
        ));
        lines
    }
}

impl<W: Write> Renderer for TerminalDisplay<W> {
    fn clear(&mut self) -> Result<()> {
        if self.clear_screen {
            write!(self.out, "\x1b[2J\x1b[H")?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.emit(&[String::new(), format!("  {}", text.white().bold())])
    }

    fn render_table(
        &mut self,
        table: &DisplayTable,
        options: &GridOptions,
        selected: Option<usize>,
    ) -> Result<TableHandle> {
        let lines = self.table_lines(table, options, selected);
        self.emit(&lines)?;
        Ok(TableHandle::new(table.n_rows(), options.selection_mode))
    }

    fn render_waterfall(&mut self, explanation: &LocalExplanation) -> Result<()> {
        let lines = self.waterfall_lines(explanation);
        self.emit(&lines)
    }

    fn render_beeswarm(&mut self, attributions: &AttributionSet) -> Result<()> {
        let lines = self.beeswarm_lines(attributions);
        self.emit(&lines)
    }

    fn show_error(&mut self, error: &ExplainerError) -> Result<()> {
        self.emit(&[
            String::new(),
            format!("  {} {}", fail("✗"), error),
            format!("    {}", dim(error_heading(error.kind()))),
        ])
    }
}
