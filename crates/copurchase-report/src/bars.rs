//! Per-drink horizontal bar charts of the most similar food items.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

use copurchase_core::ranking::rank_among;
use copurchase_core::similarity::SimilarityTable;
use copurchase_core::taxonomy::Taxonomy;
use copurchase_core::types::ItemName;

use crate::chart;

const BAR_H: u32 = 48;
const PLOT_W: u32 = 560;

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// `(label, percent)` from top to bottom.
    pub bars: Vec<(ItemName, f64)>,
}

impl BarChart {
    /// Top `n` food items for `drink`. `None` when the drink is unknown or
    /// there is no food to rank.
    pub fn food_for_drink(table: &SimilarityTable, drink: &str, food: &[ItemName], n: usize) -> Option<Self> {
        let ranking = rank_among(table, drink, food).ok()?;
        let bars: Vec<(ItemName, f64)> = ranking.top(n).iter().map(|e| (e.item.clone(), e.percent())).collect();
        if bars.is_empty() { return None; }
        Some(Self {
            title: format!("Top {} Food Recommendations for \"{}\"", n, drink),
            x_label: "Recommendation Strength (%)".to_string(),
            y_label: "Food Item".to_string(),
            bars,
        })
    }

    /// Axis upper bound: at least 100, with headroom above the longest bar.
    pub fn x_max(&self) -> f64 {
        let longest = self.bars.iter().map(|(_, v)| *v).fold(0.0, f64::max);
        f64::max(100.0, longest * 1.1)
    }

    /// Draws horizontal bars, strongest on top and darkest, and writes a PNG.
    pub fn render(&self, path: &Path) -> Result<()> {
        chart::ensure_parent(path)?;
        let n = u32::try_from(self.bars.len())?;
        let labels: Vec<&String> = self.bars.iter().map(|(l, _)| l).collect();
        let label_w = chart::max_label_width(labels.iter().copied(), 13.0, FontStyle::Normal) + 30;
        let size = (label_w + PLOT_W + 80, BAR_H * n + 150);

        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;
        let mut plot = ChartBuilder::on(&root)
            .caption(&self.title, (chart::FONT, 18).into_font().style(FontStyle::Bold))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(label_w)
            .build_cartesian_2d(0.0..self.x_max(), (0..n).into_segmented())?;

        // bar 0 is drawn at the top
        let y_fmt = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(y) => {
                n.checked_sub(y + 1).and_then(|i| self.bars.get(i as usize)).map(|(l, _)| l.clone()).unwrap_or_default()
            }
            _ => String::new(),
        };
        plot.configure_mesh()
            .disable_y_mesh()
            .y_labels(self.bars.len() + 1)
            .y_label_formatter(&y_fmt)
            .x_label_formatter(&|x: &f64| format!("{:.0}", x))
            .label_style((chart::FONT, 13))
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .axis_desc_style((chart::FONT, 15))
            .draw()?;

        let scale = chart::greens();
        let bars: Vec<(u32, f64, RGBColor)> = self
            .bars
            .iter()
            .zip((0..n).rev())
            .enumerate()
            .map(|(i, ((_, value), y))| (y, *value, chart::shade(&scale, 0.9 - 0.7 * i as f64 / f64::from(n.max(1)), 0.0, 1.0)))
            .collect();

        plot.draw_series(bars.iter().map(|&(y, value, colour)| {
            let mut bar = Rectangle::new(
                [(0.0, SegmentValue::Exact(y)), (value, SegmentValue::Exact(y + 1))],
                colour.filled(),
            );
            bar.set_margin(6, 6, 0, 0);
            bar
        }))?;
        plot.draw_series(bars.iter().map(|&(y, value, _)| {
            Text::new(
                format!(" {:.1}", value),
                (value, SegmentValue::CenterOf(y)),
                (chart::FONT, 12).into_font().color(&BLACK).pos(Pos::new(HPos::Left, VPos::Center)),
            )
        }))?;
        root.present()?;
        Ok(())
    }
}

/// Keeps alphanumerics and spaces, then trims trailing whitespace.
pub fn safe_file_stem(name: &str) -> String {
    let kept: String = name.chars().filter(|c| c.is_alphanumeric() || *c == ' ').collect();
    kept.trim_end().to_string()
}

pub fn chart_path(dir: &Path, drink: &str) -> PathBuf {
    dir.join(format!("{}_food_recommendations.png", safe_file_stem(drink)))
}

/// Writes one chart per drink into `dir`. Returns the files written; an empty
/// list means there was nothing to chart.
pub fn render_food_bar_charts(table: &SimilarityTable, taxonomy: &Taxonomy, n: usize, dir: &Path) -> Result<Vec<PathBuf>> {
    let drinks = taxonomy.drinks_in(table);
    let food = taxonomy.food_in(table);
    if drinks.is_empty() || food.is_empty() { return Ok(vec![]); }

    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let pb = ProgressBar::new(drinks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} charts {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut written = Vec::new();
    for drink in &drinks {
        pb.set_message(drink.clone());
        if let Some(chart) = BarChart::food_for_drink(table, drink, &food, n) {
            let path = chart_path(dir, drink);
            chart.render(&path)?;
            debug!(drink = %drink, path = %path.display(), "wrote bar chart");
            written.push(path);
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stem_drops_punctuation() {
        assert_eq!(safe_file_stem("S'mores & Co. "), "Smores  Co");
        assert_eq!(safe_file_stem("Cloud Matcha"), "Cloud Matcha");
    }

    #[test]
    fn x_max_has_floor_of_100() {
        let chart = BarChart { title: String::new(), x_label: String::new(), y_label: String::new(), bars: vec![("a".into(), 40.0)] };
        assert_eq!(chart.x_max(), 100.0);
        let chart = BarChart { bars: vec![("a".into(), 100.0)], ..chart };
        assert!((chart.x_max() - 110.0).abs() < 1e-9);
    }
}
