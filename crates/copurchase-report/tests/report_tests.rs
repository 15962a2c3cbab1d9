use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use copurchase_core::matrix::InteractionMatrix;
use copurchase_core::pipeline::Analysis;
use copurchase_core::similarity::SimilarityTable;
use copurchase_core::taxonomy::Taxonomy;
use copurchase_core::types::PurchaseEvent;
use copurchase_core::users::UserDirectory;
use copurchase_report::bars::{chart_path, BarChart};
use copurchase_report::console::{write_console_summary, write_matrix};
use copurchase_report::export::write_export;
use copurchase_report::heatmap::Heatmap;
use copurchase_report::table::UserItemTable;
use copurchase_report::{ReportPaths, ReportRunner, Stage, StageStatus};

fn analysis(pairs: &[(&str, &str)]) -> Analysis {
    let events: Vec<PurchaseEvent> = pairs.iter().map(|(u, i)| PurchaseEvent::new(*u, *i)).collect();
    let matrix = InteractionMatrix::from_events(&events);
    let similarity = SimilarityTable::compute(&matrix).expect("similarity");
    Analysis { matrix, similarity }
}

fn cafe() -> Analysis {
    analysis(&[
        ("u1", "Matcha"), ("u1", "Croissant"), ("u1", "Okinawa"),
        ("u2", "Matcha"), ("u2", "Pancake"),
        ("u3", "Okinawa"), ("u3", "Croissant"), ("u3", "Croissant"),
    ])
}

fn taxonomy() -> Taxonomy {
    Taxonomy::new(
        vec!["Okinawa".into(), "Matcha".into(), "Vanilla Latte".into()],
        vec!["Croissant".into(), "Pancake".into(), "S'mores".into()],
    )
    .expect("taxonomy")
}

fn is_png(path: &Path) -> bool {
    fs::read(path).map(|bytes| bytes.starts_with(b"\x89PNG\r\n\x1a\n")).unwrap_or(false)
}

fn paths(dir: &Path) -> ReportPaths {
    ReportPaths {
        export: dir.join("knn_visual_data.csv"),
        drink_food_heatmap: dir.join("knn_full_similarity_heatmap.png"),
        top_drinks_heatmap: dir.join("knn_top_5_drinks_heatmap.png"),
        bar_chart_dir: dir.join("similarity_bar_charts"),
        user_matrix_image: dir.join("user_item_matrix.png"),
    }
}

#[test]
fn export_has_all_sections_in_order() {
    let a = analysis(&[("u1", "X"), ("u1", "Y"), ("u2", "X")]);
    let tax = Taxonomy::new(vec!["X".into()], vec!["Y".into()]).unwrap();
    let mut buf = Vec::new();
    write_export(&mut buf, &a.matrix, &a.similarity, &tax).expect("export");
    let text = String::from_utf8(buf).unwrap();

    let expected = "\
--- Raw User-Item Interaction Matrix ---
This matrix shows which users (columns) purchased which items (rows). 1 means a purchase was made.

item,u1,u2
X,1,1
Y,1,0


--- Full Raw Item-to-Item Similarity Matrix (%) ---
This matrix shows the co-purchase similarity between every pair of items.

item,X,Y
X,100.00,70.71
Y,70.71,100.00


--- Top Similar Items for Each Drink (Raw Scores) ---
For each drink, this section lists all other items sorted by similarity score in descending order.

\"X\" Similarities:
Item,Similarity
Y,0.7071

";
    assert_eq!(text, expected);
}

#[test]
fn export_quotes_names_with_commas() {
    let a = analysis(&[("u1", "Egg, Bacon"), ("u1", "Matcha")]);
    let mut buf = Vec::new();
    write_export(&mut buf, &a.matrix, &a.similarity, &taxonomy()).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("\"Egg, Bacon\",1"));
    assert!(text.contains("\"Matcha\" Similarities:\nItem,Similarity\n\"Egg, Bacon\",1.0000\n"));
}

#[test]
fn drink_food_heatmap_uses_taxonomy_order() {
    let a = cafe();
    let heatmap = Heatmap::drink_food(&a.similarity, &taxonomy()).expect("heatmap");
    assert_eq!(heatmap.rows, vec!["Okinawa".to_string(), "Matcha".to_string()]);
    assert_eq!(heatmap.cols, vec!["Croissant".to_string(), "Pancake".to_string()]);
    // Okinawa and Croissant share both buyers.
    assert!((heatmap.values[0][0] - 100.0).abs() < 1e-9);
    assert_eq!(heatmap.values[0][1], 0.0);
    assert_eq!(heatmap.title, "Co-purchase Similarity between Drinks and Food Items (%)");

    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("nested").join("heatmap.png");
    heatmap.render(&out).expect("render");
    assert!(is_png(&out));
}

#[test]
fn drink_food_heatmap_needs_both_sides() {
    let a = analysis(&[("u1", "Matcha"), ("u1", "Okinawa")]);
    assert!(Heatmap::drink_food(&a.similarity, &taxonomy()).is_none());
}

#[test]
fn top_n_drinks_keeps_self_and_zero_fills() {
    let a = analysis(&[
        ("u1", "A"), ("u1", "B"),
        ("u2", "A"), ("u2", "C"),
        ("u3", "D"),
    ]);
    let tax = Taxonomy::new(vec!["A".into(), "B".into(), "C".into(), "D".into()], vec![]).unwrap();
    let heatmap = Heatmap::top_n_drinks(&a.similarity, &tax, 1).expect("heatmap");
    assert_eq!(heatmap.title, "Top 1 Most Similar Drinks (Co-purchase Similarity %)");
    assert_eq!(heatmap.rows.len(), 4);
    let col = |name: &str| heatmap.cols.iter().position(|c| c == name).unwrap();
    let row = |name: &str| heatmap.rows.iter().position(|r| r == name).unwrap();
    assert_eq!(heatmap.values[row("A")][col("A")], 100.0);
    // A's single pick is B (tie with C broken by name); C stays zero.
    assert!(heatmap.values[row("A")][col("B")] > 0.0);
    assert_eq!(heatmap.values[row("A")][col("C")], 0.0);
    assert_eq!(heatmap.values[row("D")][col("D")], 100.0);
}

#[test]
fn single_drink_heatmap_renders_flat_scale() {
    let a = analysis(&[("u1", "Matcha"), ("u1", "Croissant")]);
    let heatmap = Heatmap::top_n_drinks(&a.similarity, &taxonomy(), 5).expect("heatmap");
    assert_eq!(heatmap.values, vec![vec![100.0]]);

    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("top.png");
    heatmap.render(&out).expect("render");
    assert!(is_png(&out));
}

#[test]
fn bar_chart_ranks_food_for_drink() {
    let a = cafe();
    let tax = taxonomy();
    let food = tax.food_in(&a.similarity);
    let chart = BarChart::food_for_drink(&a.similarity, "Matcha", &food, 5).expect("chart");
    assert_eq!(chart.title, "Top 5 Food Recommendations for \"Matcha\"");
    let labels: Vec<&str> = chart.bars.iter().map(|(l, _)| l.as_str()).collect();
    assert_eq!(labels, vec!["Pancake", "Croissant"]);
    assert!(BarChart::food_for_drink(&a.similarity, "Ghost", &food, 5).is_none());

    let tmp = TempDir::new().unwrap();
    let out = chart_path(tmp.path(), "Matcha");
    chart.render(&out).expect("render");
    assert!(is_png(&out));
}

#[test]
fn user_table_sorts_by_popularity_and_engagement() {
    let a = cafe();
    let users = UserDirectory::from_reader("__id__,email,name\nu2,,Bea\n".as_bytes(), Path::new("users.csv")).unwrap();
    let table = UserItemTable::build(&a.matrix, &users);
    assert_eq!(table.col_labels, vec!["Croissant", "Matcha", "Okinawa", "Pancake"]);
    assert_eq!(table.row_labels, vec!["u1", "Bea", "u3"]);
    assert_eq!(table.cells[0], vec![1, 1, 1, 0]);

    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("user_item_matrix.png");
    table.render(&out).expect("render");
    assert!(is_png(&out));
}

#[test]
fn console_summary_formats_percentages() {
    let a = cafe();
    let mut buf = Vec::new();
    write_console_summary(&mut buf, &a.matrix, &a.similarity, &taxonomy(), 5).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("Raw User-Item Purchase Matrix"));
    assert!(text.contains("Top 5 Food Recommendations for Each Drink"));
    assert!(text.contains("--- Okinawa ---\n  - Croissant (Similarity: 100%)\n  - Pancake (Similarity: 0%)\n"));
    assert!(text.contains("--- Matcha ---\n  - Pancake (Similarity: 71%)\n  - Croissant (Similarity: 50%)\n"));
    assert!(!text.contains("Vanilla Latte"));
}

#[test]
fn console_matrix_lists_purchasing_users() {
    let a = analysis(&[("alice", "X"), ("bob", "Y")]);
    let mut buf = Vec::new();
    write_matrix(&mut buf, &a.matrix).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let rows: Vec<Vec<&str>> = text.lines().map(|l| l.split_whitespace().collect()).collect();
    assert_eq!(rows, vec![vec!["user", "X", "Y"], vec!["alice", "1", "0"], vec!["bob", "0", "1"]]);
    assert!(text.lines().all(|l| !l.contains('|')));
}

#[test]
fn runner_writes_every_output() {
    let tmp = TempDir::new().unwrap();
    let a = cafe();
    let tax = taxonomy();
    let users = UserDirectory::default();
    let summary = ReportRunner::new(&a, &tax, &users, paths(tmp.path())).quiet().run_all();

    assert!(summary.failures().is_empty());
    let p = paths(tmp.path());
    assert!(p.export.is_file());
    for image in [&p.drink_food_heatmap, &p.top_drinks_heatmap, &p.user_matrix_image] {
        assert!(is_png(image), "{} is not a png", image.display());
    }
    assert!(is_png(&chart_path(&p.bar_chart_dir, "Okinawa")));
    assert!(is_png(&chart_path(&p.bar_chart_dir, "Matcha")));
    assert!(!chart_path(&p.bar_chart_dir, "Vanilla Latte").exists());
    assert_eq!(summary.files_written().len(), 6);
    assert!(matches!(summary.status(Stage::ConsoleSummary), Some(StageStatus::Skipped(_))));

    let export = fs::read_to_string(&p.export).unwrap();
    assert!(export.starts_with("--- Raw User-Item Interaction Matrix ---"));
}

#[test]
fn runner_skips_taxonomy_views_without_matches() {
    let tmp = TempDir::new().unwrap();
    let a = analysis(&[("u1", "Tea"), ("u1", "Scone")]);
    let tax = taxonomy();
    let users = UserDirectory::default();
    let summary = ReportRunner::new(&a, &tax, &users, paths(tmp.path())).quiet().run_all();

    assert!(summary.failures().is_empty());
    assert!(matches!(summary.status(Stage::DrinkFoodHeatmap), Some(StageStatus::Skipped(_))));
    assert!(matches!(summary.status(Stage::TopDrinksHeatmap), Some(StageStatus::Skipped(_))));
    assert!(matches!(summary.status(Stage::FoodBarCharts), Some(StageStatus::Skipped(_))));
    assert!(matches!(summary.status(Stage::Export), Some(StageStatus::Written(_))));
    assert!(matches!(summary.status(Stage::UserMatrixImage), Some(StageStatus::Written(_))));
}

#[test]
fn runner_reports_failed_stage_and_continues() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();
    let mut p = paths(tmp.path());
    p.export = blocker.join("knn_visual_data.csv");

    let a = cafe();
    let tax = taxonomy();
    let users = UserDirectory::default();
    let summary = ReportRunner::new(&a, &tax, &users, p.clone()).quiet().run_all();

    assert_eq!(summary.failures(), vec![Stage::Export]);
    assert!(p.drink_food_heatmap.is_file());
    assert!(p.user_matrix_image.is_file());
}
