//! User × item purchase table rendered as an image.

use std::cmp::Reverse;
use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use copurchase_core::matrix::InteractionMatrix;
use copurchase_core::users::UserDirectory;

use crate::chart;

const TITLE: &str = "User-Item Purchase Matrix (1 = Purchased)";
/// lightgrey
const HEADER_FILL: RGBColor = RGBColor(0xD3, 0xD3, 0xD3);
const CELL_W: i32 = 52;
const CELL_H: i32 = 40;
const BODY_SIZE: f64 = 16.0;
const LABEL_SIZE: f64 = 14.0;
const MARGIN: i32 = 30;
const TITLE_H: i32 = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserItemTable {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub cells: Vec<Vec<u8>>,
}

impl UserItemTable {
    /// Items by popularity descending, users by engagement descending; ties
    /// fall back to label order.
    pub fn build(matrix: &InteractionMatrix, users: &UserDirectory) -> Self {
        let mut cols: Vec<usize> = (0..matrix.n_items()).collect();
        cols.sort_by_key(|&c| (Reverse(matrix.item_popularity(c)), matrix.items()[c].clone()));

        let label = |row: usize| users.display_name(&matrix.users()[row]).to_string();
        let mut rows: Vec<usize> = (0..matrix.n_users()).collect();
        rows.sort_by_key(|&r| (Reverse(matrix.user_engagement(r)), label(r)));

        Self {
            row_labels: rows.iter().map(|&r| label(r)).collect(),
            col_labels: cols.iter().map(|&c| matrix.items()[c].clone()).collect(),
            cells: rows.iter().map(|&r| cols.iter().map(|&c| matrix.cell(r, c)).collect()).collect(),
        }
    }

    /// Draws the table with grey bold header cells and writes a PNG.
    pub fn render(&self, path: &Path) -> Result<()> {
        chart::ensure_parent(path)?;
        let n_rows = i32::try_from(self.row_labels.len())?;
        let n_cols = i32::try_from(self.col_labels.len())?;
        let row_label_w = i32::try_from(chart::max_label_width(&self.row_labels, LABEL_SIZE, FontStyle::Bold))? + 24;
        let header_h = i32::try_from(chart::max_label_width(&self.col_labels, LABEL_SIZE, FontStyle::Bold))? + 24;
        let grid_x = MARGIN + row_label_w;
        let grid_y = TITLE_H + header_h;
        let width = u32::try_from(grid_x + CELL_W * n_cols + MARGIN)?;
        let height = u32::try_from(grid_y + CELL_H * n_rows + MARGIN)?;

        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;
        let centered = Pos::new(HPos::Center, VPos::Center);
        root.draw(&Text::new(
            TITLE,
            (i32::try_from(width)? / 2, TITLE_H / 2),
            (chart::FONT, 22).into_font().color(&BLACK).pos(centered),
        ))?;

        let header = (chart::FONT, LABEL_SIZE).into_font().style(FontStyle::Bold);
        let cell = |x: i32, y: i32, w: i32, h: i32, fill: &RGBColor| -> Result<()> {
            root.draw(&Rectangle::new([(x, y), (x + w, y + h)], fill.filled()))?;
            root.draw(&Rectangle::new([(x, y), (x + w, y + h)], BLACK.stroke_width(1)))?;
            Ok(())
        };

        for (c, label) in (0..n_cols).zip(&self.col_labels) {
            let x = grid_x + CELL_W * c;
            cell(x, TITLE_H, CELL_W, header_h, &HEADER_FILL)?;
            root.draw(&Text::new(
                label.as_str(),
                (x + CELL_W / 2, grid_y - 12),
                header.transform(FontTransform::Rotate270).color(&BLACK).pos(Pos::new(HPos::Left, VPos::Center)),
            ))?;
        }

        for ((r, label), values) in (0..n_rows).zip(&self.row_labels).zip(&self.cells) {
            let y = grid_y + CELL_H * r;
            cell(MARGIN, y, row_label_w, CELL_H, &HEADER_FILL)?;
            root.draw(&Text::new(
                label.as_str(),
                (MARGIN + row_label_w - 12, y + CELL_H / 2),
                header.color(&BLACK).pos(Pos::new(HPos::Right, VPos::Center)),
            ))?;
            for (c, value) in (0..n_cols).zip(values) {
                let x = grid_x + CELL_W * c;
                cell(x, y, CELL_W, CELL_H, &WHITE)?;
                root.draw(&Text::new(
                    value.to_string(),
                    (x + CELL_W / 2, y + CELL_H / 2),
                    (chart::FONT, BODY_SIZE).into_font().color(&BLACK).pos(centered),
                ))?;
            }
        }
        root.present()?;
        Ok(())
    }
}
