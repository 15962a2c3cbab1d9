//! Renderers that turn an [`Analysis`](copurchase_core::pipeline::Analysis)
//! into the text export, PNG charts and the console summary.

pub mod bars;
pub mod chart;
pub mod console;
pub mod export;
pub mod heatmap;
pub mod runner;
pub mod table;

pub use runner::{ReportPaths, ReportRunner, ReportSummary, Stage, StageStatus};
