use std::fs;
use std::path::Path;

use tempfile::TempDir;

use copurchase_core::config::{resolve_with_base, Config, Settings};
use copurchase_core::taxonomy::Taxonomy;
use copurchase_core::users::UserDirectory;
use copurchase_core::Error;

#[test]
fn defaults_carry_cafe_taxonomy() {
    let settings = Settings::default();
    assert_eq!(settings.report.top_n, 5);
    assert_eq!(settings.taxonomy.drinks.len(), 10);
    assert_eq!(settings.taxonomy.food.len(), 11);
    assert!(settings.taxonomy.food.iter().any(|f| f == "S'mores"));
    settings.validate().expect("defaults are valid");
}

#[test]
fn toml_file_overrides_defaults() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "[report]\ntop_n = 3\n\n[output]\ndir = \"out\"\n",
    )
    .unwrap();
    let config = Config::load_in(tmp.path(), "dev").expect("load");
    let settings = config.settings().expect("settings");
    assert_eq!(settings.report.top_n, 3);
    assert_eq!(settings.report.console_top_n, 5);
    assert_eq!(settings.export_path(), Path::new("out").join("knn_visual_data.csv"));
}

#[test]
fn env_specific_file_is_merged() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[report]\ntop_n = 3\n").unwrap();
    fs::write(tmp.path().join("config.test.toml"), "[report]\ntop_n = 2\n").unwrap();
    let settings = Config::load_in(tmp.path(), "test").unwrap().settings().unwrap();
    assert_eq!(settings.report.top_n, 2);
}

#[test]
fn zero_top_n_is_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[report]\ntop_n = 0\n").unwrap();
    assert!(Config::load_in(tmp.path(), "dev").is_err());
}

#[test]
fn overlapping_taxonomy_is_invalid() {
    let err = Taxonomy::new(vec!["Matcha".into()], vec!["Croissant".into(), "Matcha".into()]).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));

    let mut settings = Settings::default();
    settings.taxonomy.food.push("Okinawa".to_string());
    assert!(matches!(settings.validate(), Err(Error::InvalidConfig(_))));

    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[taxonomy]\ndrinks = [\"Matcha\"]\nfood = [\"Matcha\"]\n").unwrap();
    assert!(Config::load_in(tmp.path(), "dev").is_err());
}

#[test]
fn absolute_paths_are_kept() {
    let abs = std::env::temp_dir().join("report.csv");
    let resolved = resolve_with_base(Path::new("out"), abs.to_string_lossy());
    assert_eq!(resolved, abs);
}

#[test]
fn user_directory_maps_ids_with_email_fallback() {
    let csv = "__id__,email,name\nu1,a@x.io,Ana\n,b@x.io,Ben\n,,Nobody\nu4,d@x.io,\n";
    let directory = UserDirectory::from_reader(csv.as_bytes(), Path::new("users.csv")).expect("users");
    assert_eq!(directory.len(), 2);
    assert_eq!(directory.display_name("u1"), "Ana");
    assert_eq!(directory.display_name("b@x.io"), "Ben");
    assert_eq!(directory.display_name("u4"), "u4");
}

#[test]
fn missing_user_file_degrades_to_raw_ids() {
    let tmp = TempDir::new().unwrap();
    let directory = UserDirectory::load_or_empty(&tmp.path().join("users.csv"));
    assert!(directory.is_empty());
    assert_eq!(directory.display_name("u9"), "u9");
}
