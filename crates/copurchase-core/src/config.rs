//! Layered configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (`__` separates nested keys, e.g. `APP_REPORT__TOP_N=3`).
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::taxonomy::Taxonomy;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub report: ReportConfig,
    pub taxonomy: TaxonomyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    pub orders_path: String,
    pub users_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: String,
    pub export_file: String,
    pub drink_food_heatmap: String,
    pub top_drinks_heatmap: String,
    pub bar_chart_dir: String,
    pub user_matrix_image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub top_n: usize,
    pub console_top_n: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    pub drinks: Vec<String>,
    pub food: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: InputConfig {
                orders_path: "Collections/orders-1764772405.csv".to_string(),
                users_path: "Collections/users-1764584967.csv".to_string(),
            },
            output: OutputConfig {
                dir: ".".to_string(),
                export_file: "knn_visual_data.csv".to_string(),
                drink_food_heatmap: "knn_full_similarity_heatmap.png".to_string(),
                top_drinks_heatmap: "knn_top_5_drinks_heatmap.png".to_string(),
                bar_chart_dir: "similarity_bar_charts".to_string(),
                user_matrix_image: "user_item_matrix.png".to_string(),
            },
            report: ReportConfig { top_n: 5, console_top_n: 5 },
            taxonomy: TaxonomyConfig {
                drinks: [
                    "Caramel Macchiato", "Cloud Biscoff", "Cloud Matcha", "Cloud Strawberry", "Kaffi Mocha",
                    "Matcha", "Okinawa", "Signature Chocolate", "Sweet Iced Americano", "Vanilla Latte",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                food: [
                    "Affogato Caramel", "Basque Burnt Cheesecake", "Butter Toast", "Chicken Alfredo",
                    "Chocolate Mouse", "Croissant", "Egg & Bacon Sandwich", "Egg & Bacono", "Ham & Cheese",
                    "Pancake", "S'mores",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            },
        }
    }
}

impl Settings {
    pub fn orders_path(&self) -> PathBuf { expand_path(&self.input.orders_path) }

    pub fn users_path(&self) -> PathBuf { expand_path(&self.input.users_path) }

    pub fn output_dir(&self) -> PathBuf { expand_path(&self.output.dir) }

    pub fn export_path(&self) -> PathBuf { resolve_with_base(&self.output_dir(), &self.output.export_file) }

    pub fn drink_food_heatmap_path(&self) -> PathBuf {
        resolve_with_base(&self.output_dir(), &self.output.drink_food_heatmap)
    }

    pub fn top_drinks_heatmap_path(&self) -> PathBuf {
        resolve_with_base(&self.output_dir(), &self.output.top_drinks_heatmap)
    }

    pub fn bar_chart_dir(&self) -> PathBuf { resolve_with_base(&self.output_dir(), &self.output.bar_chart_dir) }

    pub fn user_matrix_image_path(&self) -> PathBuf {
        resolve_with_base(&self.output_dir(), &self.output.user_matrix_image)
    }

    /// Builds the display taxonomy, rejecting overlapping drink/food lists.
    pub fn taxonomy(&self) -> Result<Taxonomy> {
        Taxonomy::new(self.taxonomy.drinks.clone(), self.taxonomy.food.clone())
    }

    pub fn validate(&self) -> Result<()> {
        if self.report.top_n == 0 {
            return Err(Error::InvalidConfig("report.top_n must be greater than zero".to_string()));
        }
        if self.report.console_top_n == 0 {
            return Err(Error::InvalidConfig("report.console_top_n must be greater than zero".to_string()));
        }
        self.taxonomy().map(|_| ())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_in(Path::new("."), &env_name)
    }

    /// Loads `config.toml` and `config.<env>.toml` from `dir` on top of the defaults.
    pub fn load_in(dir: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file(dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?.validate()?;
        Ok(config)
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
