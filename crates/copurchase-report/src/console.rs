//! Plain-text summary printed at the end of a run.

use std::io::Write;

use anyhow::Result;
use prettytable::{format, Cell, Row, Table};

use copurchase_core::matrix::InteractionMatrix;
use copurchase_core::ranking::rank_among;
use copurchase_core::similarity::SimilarityTable;
use copurchase_core::taxonomy::Taxonomy;

const RULE_WIDTH: usize = 50;

fn banner<W: Write>(out: &mut W, title: &str) -> Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    write!(out, "\n\n{}\n{:^width$}\n{}\n", rule, title, rule, width = RULE_WIDTH)?;
    Ok(())
}

/// Users × items table, limited to users and items with at least one purchase.
pub fn matrix_table(matrix: &InteractionMatrix) -> Table {
    let cols: Vec<usize> = (0..matrix.n_items()).filter(|&c| matrix.item_popularity(c) > 0).collect();
    let rows = (0..matrix.n_users()).filter(|&r| cols.iter().any(|&c| matrix.cell(r, c) == 1));

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    let titles = std::iter::once(Cell::new("user")).chain(cols.iter().map(|&c| Cell::new(&matrix.items()[c])));
    table.set_titles(Row::new(titles.collect()));
    for r in rows {
        let cells = std::iter::once(Cell::new(&matrix.users()[r]))
            .chain(cols.iter().map(|&c| Cell::new_align(&matrix.cell(r, c).to_string(), format::Alignment::RIGHT)));
        table.add_row(Row::new(cells.collect()));
    }
    table
}

pub fn write_matrix<W: Write>(out: &mut W, matrix: &InteractionMatrix) -> Result<()> {
    matrix_table(matrix).print(out)?;
    Ok(())
}

/// Top `k` food items per drink present in the table, as whole percentages.
pub fn write_recommendations<W: Write>(out: &mut W, table: &SimilarityTable, taxonomy: &Taxonomy, k: usize) -> Result<()> {
    let food = taxonomy.food_in(table);
    for drink in taxonomy.drinks_in(table) {
        writeln!(out, "\n--- {} ---", drink)?;
        let ranking = rank_among(table, &drink, &food)?;
        let top = ranking.top(k);
        if top.is_empty() {
            writeln!(out, "No food recommendations available.")?;
            continue;
        }
        for entry in top {
            writeln!(out, "  - {} (Similarity: {:.0}%)", entry.item, entry.percent())?;
        }
    }
    Ok(())
}

pub fn write_console_summary<W: Write>(
    out: &mut W,
    matrix: &InteractionMatrix,
    table: &SimilarityTable,
    taxonomy: &Taxonomy,
    k: usize,
) -> Result<()> {
    banner(out, "Raw User-Item Purchase Matrix")?;
    write_matrix(out, matrix)?;
    banner(out, &format!("Top {} Food Recommendations for Each Drink", k))?;
    write_recommendations(out, table, taxonomy, k)?;
    writeln!(out, "\n{}", "=".repeat(RULE_WIDTH))?;
    Ok(())
}
