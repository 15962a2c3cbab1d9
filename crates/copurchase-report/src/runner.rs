//! Runs every report stage in order. A failing stage is logged and the
//! remaining stages still run.

use std::fmt;
use std::io;
use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, warn};

use copurchase_core::config::Settings;
use copurchase_core::pipeline::Analysis;
use copurchase_core::taxonomy::Taxonomy;
use copurchase_core::users::UserDirectory;

use crate::bars::render_food_bar_charts;
use crate::console::write_console_summary;
use crate::export::export_knn_data;
use crate::heatmap::Heatmap;
use crate::table::UserItemTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Export,
    DrinkFoodHeatmap,
    TopDrinksHeatmap,
    FoodBarCharts,
    UserMatrixImage,
    ConsoleSummary,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Export,
        Stage::DrinkFoodHeatmap,
        Stage::TopDrinksHeatmap,
        Stage::FoodBarCharts,
        Stage::UserMatrixImage,
        Stage::ConsoleSummary,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Export => "export",
            Stage::DrinkFoodHeatmap => "drink-food heatmap",
            Stage::TopDrinksHeatmap => "top drinks heatmap",
            Stage::FoodBarCharts => "food bar charts",
            Stage::UserMatrixImage => "user-item matrix image",
            Stage::ConsoleSummary => "console summary",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    Written(Vec<PathBuf>),
    Printed,
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub export: PathBuf,
    pub drink_food_heatmap: PathBuf,
    pub top_drinks_heatmap: PathBuf,
    pub bar_chart_dir: PathBuf,
    pub user_matrix_image: PathBuf,
}

impl From<&Settings> for ReportPaths {
    fn from(settings: &Settings) -> Self {
        Self {
            export: settings.export_path(),
            drink_food_heatmap: settings.drink_food_heatmap_path(),
            top_drinks_heatmap: settings.top_drinks_heatmap_path(),
            bar_chart_dir: settings.bar_chart_dir(),
            user_matrix_image: settings.user_matrix_image_path(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub stages: Vec<(Stage, StageStatus)>,
}

impl ReportSummary {
    pub fn files_written(&self) -> Vec<&PathBuf> {
        self.stages
            .iter()
            .filter_map(|(_, status)| match status {
                StageStatus::Written(paths) => Some(paths),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn failures(&self) -> Vec<Stage> {
        self.stages.iter().filter(|(_, s)| matches!(s, StageStatus::Failed(_))).map(|(stage, _)| *stage).collect()
    }

    pub fn status(&self, stage: Stage) -> Option<&StageStatus> {
        self.stages.iter().find(|(s, _)| *s == stage).map(|(_, status)| status)
    }
}

pub struct ReportRunner<'a> {
    analysis: &'a Analysis,
    taxonomy: &'a Taxonomy,
    users: &'a UserDirectory,
    paths: ReportPaths,
    top_n: usize,
    console_top_n: usize,
    print_console: bool,
}

impl<'a> ReportRunner<'a> {
    pub fn new(analysis: &'a Analysis, taxonomy: &'a Taxonomy, users: &'a UserDirectory, paths: ReportPaths) -> Self {
        Self { analysis, taxonomy, users, paths, top_n: 5, console_top_n: 5, print_console: true }
    }

    pub fn with_top_n(mut self, top_n: usize, console_top_n: usize) -> Self {
        self.top_n = top_n;
        self.console_top_n = console_top_n;
        self
    }

    /// Skips the stdout summary, e.g. when rendering from tests.
    pub fn quiet(mut self) -> Self { self.print_console = false; self }

    pub fn run_all(&self) -> ReportSummary {
        let mut summary = ReportSummary::default();
        for stage in Stage::ALL {
            let status = match self.run_stage(stage) {
                Ok(status) => status,
                Err(e) => StageStatus::Failed(format!("{:#}", e)),
            };
            match &status {
                StageStatus::Written(paths) => info!(stage = %stage, files = paths.len(), "stage complete"),
                StageStatus::Printed => info!(stage = %stage, "stage complete"),
                StageStatus::Skipped(reason) => {
                    println!("{}", reason);
                    warn!(stage = %stage, reason = %reason, "stage skipped");
                }
                StageStatus::Failed(error) => warn!(stage = %stage, error = %error, "stage failed"),
            }
            summary.stages.push((stage, status));
        }
        summary
    }

    pub fn run_stage(&self, stage: Stage) -> Result<StageStatus> {
        let matrix = &self.analysis.matrix;
        let table = &self.analysis.similarity;
        match stage {
            Stage::Export => {
                export_knn_data(&self.paths.export, matrix, table, self.taxonomy)?;
                println!("{} updated with full data.", file_label(&self.paths.export));
                Ok(StageStatus::Written(vec![self.paths.export.clone()]))
            }
            Stage::DrinkFoodHeatmap => match Heatmap::drink_food(table, self.taxonomy) {
                Some(heatmap) => {
                    heatmap.render(&self.paths.drink_food_heatmap)?;
                    println!("{} updated.", file_label(&self.paths.drink_food_heatmap));
                    Ok(StageStatus::Written(vec![self.paths.drink_food_heatmap.clone()]))
                }
                None => Ok(StageStatus::Skipped(
                    "Not enough drink or food items to generate a drink-food heatmap.".to_string(),
                )),
            },
            Stage::TopDrinksHeatmap => match Heatmap::top_n_drinks(table, self.taxonomy, self.top_n) {
                Some(heatmap) => {
                    heatmap.render(&self.paths.top_drinks_heatmap)?;
                    println!("{} generated.", file_label(&self.paths.top_drinks_heatmap));
                    Ok(StageStatus::Written(vec![self.paths.top_drinks_heatmap.clone()]))
                }
                None => Ok(StageStatus::Skipped("Not enough drink items to generate a top drinks heatmap.".to_string())),
            },
            Stage::FoodBarCharts => {
                let written = render_food_bar_charts(table, self.taxonomy, self.top_n, &self.paths.bar_chart_dir)?;
                if written.is_empty() {
                    return Ok(StageStatus::Skipped(
                        "Not enough drink or food items to generate similarity bar charts.".to_string(),
                    ));
                }
                println!(
                    "Food recommendation bar charts generated in '{}' directory.",
                    self.paths.bar_chart_dir.display()
                );
                Ok(StageStatus::Written(written))
            }
            Stage::UserMatrixImage => {
                UserItemTable::build(matrix, self.users).render(&self.paths.user_matrix_image)?;
                println!("{} generated as a table.", file_label(&self.paths.user_matrix_image));
                Ok(StageStatus::Written(vec![self.paths.user_matrix_image.clone()]))
            }
            Stage::ConsoleSummary => {
                if !self.print_console {
                    return Ok(StageStatus::Skipped("console summary disabled".to_string()));
                }
                let stdout = io::stdout();
                let mut out = stdout.lock();
                write_console_summary(&mut out, matrix, table, self.taxonomy, self.console_top_n)?;
                Ok(StageStatus::Printed)
            }
        }
    }
}

fn file_label(path: &std::path::Path) -> String {
    path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string())
}
