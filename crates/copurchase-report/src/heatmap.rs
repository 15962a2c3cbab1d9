//! Annotated similarity heatmaps.

use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use copurchase_core::ranking::rank_among;
use copurchase_core::similarity::SimilarityTable;
use copurchase_core::taxonomy::Taxonomy;
use copurchase_core::types::ItemName;

use crate::chart;

const CELL_W: u32 = 72;
const CELL_H: u32 = 44;
const LABEL_SIZE: f64 = 13.0;

/// A labelled grid of percentages, rows on the y axis and columns on the x axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub rows: Vec<ItemName>,
    pub cols: Vec<ItemName>,
    pub values: Vec<Vec<f64>>,
}

impl Heatmap {
    /// Drinks × food, in taxonomy order. `None` when either side has no items
    /// in the table.
    pub fn drink_food(table: &SimilarityTable, taxonomy: &Taxonomy) -> Option<Self> {
        let rows = taxonomy.drinks_in(table);
        let cols = taxonomy.food_in(table);
        if rows.is_empty() || cols.is_empty() { return None; }
        let values = rows
            .iter()
            .map(|d| cols.iter().map(|f| table.score(d, f).map_or(0.0, |s| s * 100.0)).collect())
            .collect();
        Some(Self {
            title: "Co-purchase Similarity between Drinks and Food Items (%)".to_string(),
            x_label: "Food Items".to_string(),
            y_label: "Drinks".to_string(),
            rows,
            cols,
            values,
        })
    }

    /// Per drink, itself plus its `n` most similar other drinks; every other
    /// cell is 0. Columns no drink selected are dropped. Axes follow table order.
    pub fn top_n_drinks(table: &SimilarityTable, taxonomy: &Taxonomy, n: usize) -> Option<Self> {
        let drinks: Vec<ItemName> = table.items().iter().filter(|i| taxonomy.is_drink(i)).cloned().collect();
        if drinks.is_empty() { return None; }

        let mut selected = vec![vec![None; drinks.len()]; drinks.len()];
        for (r, drink) in drinks.iter().enumerate() {
            let Ok(ranking) = rank_among(table, drink, &drinks) else { continue };
            let picks = std::iter::once(drink.as_str()).chain(ranking.top(n).iter().map(|e| e.item.as_str()));
            for pick in picks {
                if let (Some(c), Ok(score)) = (drinks.iter().position(|d| d == pick), table.score(drink, pick)) {
                    selected[r][c] = Some(score * 100.0);
                }
            }
        }

        let keep: Vec<usize> = (0..drinks.len()).filter(|&c| selected.iter().any(|row| row[c].is_some())).collect();
        let cols = keep.iter().map(|&c| drinks[c].clone()).collect();
        let values = selected.iter().map(|row| keep.iter().map(|&c| row[c].unwrap_or(0.0)).collect()).collect();
        Some(Self {
            title: format!("Top {} Most Similar Drinks (Co-purchase Similarity %)", n),
            x_label: "Similar Drinks".to_string(),
            y_label: "Base Drink".to_string(),
            rows: drinks,
            cols,
            values,
        })
    }

    /// Draws the grid with one annotated cell per value and writes a PNG.
    pub fn render(&self, path: &Path) -> Result<()> {
        chart::ensure_parent(path)?;
        let n_rows = u32::try_from(self.rows.len())?;
        let n_cols = u32::try_from(self.cols.len())?;
        let row_label_w = chart::max_label_width(&self.rows, LABEL_SIZE, FontStyle::Normal) + 50;
        let col_label_h = chart::max_label_width(&self.cols, LABEL_SIZE, FontStyle::Normal) + 50;
        let size = (row_label_w + CELL_W * n_cols + 60, col_label_h + CELL_H * n_rows + 100);

        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;
        let mut plot = ChartBuilder::on(&root)
            .caption(&self.title, (chart::FONT, 20).into_font().style(FontStyle::Bold))
            .margin(20)
            .x_label_area_size(col_label_h)
            .y_label_area_size(row_label_w)
            .build_cartesian_2d((0..n_cols).into_segmented(), (0..n_rows).into_segmented())?;

        // row 0 is drawn at the top
        let row_at = |y: u32| n_rows.checked_sub(y + 1).and_then(|r| self.rows.get(r as usize));
        let x_fmt = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(c) => self.cols.get(*c as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        };
        let y_fmt = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(y) => row_at(*y).cloned().unwrap_or_default(),
            _ => String::new(),
        };
        plot
            .configure_mesh()
            .disable_mesh()
            .x_labels(self.cols.len() + 1)
            .y_labels(self.rows.len() + 1)
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .x_label_style((chart::FONT, LABEL_SIZE).into_font().transform(FontTransform::Rotate90))
            .y_label_style((chart::FONT, LABEL_SIZE))
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .axis_desc_style((chart::FONT, 15))
            .draw()?;

        let scale = chart::yl_gn_bu();
        let (lo, hi) = self.value_range();
        let cells: Vec<(u32, u32, f64)> = self
            .values
            .iter()
            .zip((0..n_rows).rev())
            .flat_map(|(row, y)| row.iter().zip(0..n_cols).map(move |(&v, x)| (x, y, v)))
            .collect();

        plot.draw_series(cells.iter().map(|&(x, y, v)| {
            Rectangle::new(
                [(SegmentValue::Exact(x), SegmentValue::Exact(y)), (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1))],
                chart::shade(&scale, v, lo, hi).filled(),
            )
        }))?;
        plot.draw_series(cells.iter().map(|&(x, y, v)| {
            let dark = hi > lo && (v - lo) / (hi - lo) > 0.6;
            let ink = if dark { &WHITE } else { &BLACK };
            Text::new(
                format!("{:.0}", v),
                (SegmentValue::CenterOf(x), SegmentValue::CenterOf(y)),
                (chart::FONT, LABEL_SIZE).into_font().color(ink).pos(Pos::new(HPos::Center, VPos::Center)),
            )
        }))?;
        root.present()?;
        Ok(())
    }

    fn value_range(&self) -> (f64, f64) {
        self.values.iter().flatten().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }
}
