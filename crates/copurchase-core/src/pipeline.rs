//! Ingestion → matrix → similarity, stopping early when there is nothing to analyze.

use tracing::{info, warn};

use crate::ingest::IngestReport;
use crate::matrix::InteractionMatrix;
use crate::similarity::SimilarityTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    NoPurchaseEvents,
    EmptyMatrix,
}

impl HaltReason {
    pub fn message(self) -> &'static str {
        match self {
            HaltReason::NoPurchaseEvents => "No valid item data could be extracted from orders.",
            HaltReason::EmptyMatrix => "Interaction matrix is empty; similarity was not computed.",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub matrix: InteractionMatrix,
    pub similarity: SimilarityTable,
}

#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Completed(Analysis),
    Halted(HaltReason),
}

/// Builds the matrix and similarity table. Halting is a normal outcome, not an error.
pub fn analyze(report: &IngestReport) -> PipelineOutcome {
    if report.is_empty() {
        warn!(records = report.records_seen, skipped = report.skip_count(), "no purchase events, halting");
        return PipelineOutcome::Halted(HaltReason::NoPurchaseEvents);
    }
    let matrix = InteractionMatrix::from_events(&report.events);
    info!(users = matrix.n_users(), items = matrix.n_items(), "built interaction matrix");
    match SimilarityTable::compute(&matrix) {
        Ok(similarity) => PipelineOutcome::Completed(Analysis { matrix, similarity }),
        Err(e) => {
            warn!(error = %e, "similarity not computed, halting");
            PipelineOutcome::Halted(HaltReason::EmptyMatrix)
        }
    }
}
