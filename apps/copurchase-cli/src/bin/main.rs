use anyhow::Context;
use tracing::{info, warn};

use copurchase_core::config::Config;
use copurchase_core::ingest::ingest_path;
use copurchase_core::pipeline::{analyze, PipelineOutcome};
use copurchase_core::users::UserDirectory;
use copurchase_core::Error;
use copurchase_report::{ReportPaths, ReportRunner};

fn init_tracing() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("COPURCHASE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let taxonomy = settings.taxonomy().context("building item taxonomy")?;

    let orders_path = settings.orders_path();
    let report = match ingest_path(&orders_path) {
        Ok(report) => report,
        Err(Error::MissingInput { path }) => {
            println!("{} not found.", path.display());
            return Ok(());
        }
        Err(e) => return Err(e).with_context(|| format!("reading orders from {}", orders_path.display())),
    };
    if report.skip_count() > 0 {
        warn!(skipped = report.skip_count(), records = report.records_seen, "some order records were skipped");
    }

    let analysis = match analyze(&report) {
        PipelineOutcome::Completed(analysis) => analysis,
        PipelineOutcome::Halted(reason) => {
            println!("{}", reason.message());
            return Ok(());
        }
    };

    let users = UserDirectory::load_or_empty(&settings.users_path());
    let summary = ReportRunner::new(&analysis, &taxonomy, &users, ReportPaths::from(&settings))
        .with_top_n(settings.report.top_n, settings.report.console_top_n)
        .run_all();

    let failures = summary.failures();
    if failures.is_empty() {
        println!("\nAll KNN data and visuals have been updated.");
    } else {
        for stage in &failures { eprintln!("⚠️  {} stage failed, see log for details", stage); }
    }
    info!(files = summary.files_written().len(), failed = failures.len(), "report run finished");
    Ok(())
}
