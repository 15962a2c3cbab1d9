//! Text export: interaction matrix, similarity matrix and per-drink rankings.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use copurchase_core::matrix::InteractionMatrix;
use copurchase_core::ranking::rank;
use copurchase_core::similarity::SimilarityTable;
use copurchase_core::taxonomy::Taxonomy;

fn csv_writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().terminator(csv::Terminator::Any(b'\n')).from_writer(out)
}

/// Writes every section to `out`. Drinks missing from the table get no section.
pub fn write_export<W: Write>(
    out: &mut W,
    matrix: &InteractionMatrix,
    table: &SimilarityTable,
    taxonomy: &Taxonomy,
) -> Result<()> {
    writeln!(out, "--- Raw User-Item Interaction Matrix ---")?;
    writeln!(out, "This matrix shows which users (columns) purchased which items (rows). 1 means a purchase was made.")?;
    writeln!(out)?;
    {
        let mut wtr = csv_writer(&mut *out);
        wtr.write_record(std::iter::once("item").chain(matrix.users().iter().map(String::as_str)))?;
        for (col, item) in matrix.items().iter().enumerate() {
            let cells = (0..matrix.n_users()).map(|row| matrix.cell(row, col).to_string());
            wtr.write_record(std::iter::once(item.clone()).chain(cells))?;
        }
        wtr.flush()?;
    }

    write!(out, "\n\n--- Full Raw Item-to-Item Similarity Matrix (%) ---\n")?;
    writeln!(out, "This matrix shows the co-purchase similarity between every pair of items.")?;
    writeln!(out)?;
    {
        let mut wtr = csv_writer(&mut *out);
        wtr.write_record(std::iter::once("item").chain(table.items().iter().map(String::as_str)))?;
        for (i, item) in table.items().iter().enumerate() {
            let cells = (0..table.len()).map(|j| format!("{:.2}", table.at(i, j) * 100.0));
            wtr.write_record(std::iter::once(item.clone()).chain(cells))?;
        }
        wtr.flush()?;
    }

    write!(out, "\n\n--- Top Similar Items for Each Drink (Raw Scores) ---\n")?;
    writeln!(out, "For each drink, this section lists all other items sorted by similarity score in descending order.")?;
    writeln!(out)?;
    for drink in taxonomy.drinks_in(table) {
        let ranking = rank(table, &drink)?;
        writeln!(out, "\"{}\" Similarities:", drink)?;
        {
            let mut wtr = csv_writer(&mut *out);
            wtr.write_record(["Item", "Similarity"])?;
            for entry in &ranking.entries {
                wtr.write_record([entry.item.clone(), format!("{:.4}", entry.score)])?;
            }
            wtr.flush()?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Overwrites `path` with the full export.
pub fn export_knn_data(path: &Path, matrix: &InteractionMatrix, table: &SimilarityTable, taxonomy: &Taxonomy) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_export(&mut out, matrix, table, taxonomy)?;
    out.flush().with_context(|| format!("writing {}", path.display()))
}
