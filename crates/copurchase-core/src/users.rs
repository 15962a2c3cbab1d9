//! Optional user id → display name lookup.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{info, warn};

use crate::{Error, Result};

pub const ID_COLUMN: &str = "__id__";
pub const EMAIL_COLUMN: &str = "email";
pub const NAME_COLUMN: &str = "name";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDirectory {
    names: HashMap<String, String>,
}

impl UserDirectory {
    /// Rows are keyed by `__id__`, falling back to `email` when the id is blank.
    /// Rows with neither key nor a name are ignored.
    pub fn from_reader<R: Read>(reader: R, source: &Path) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).flexible(true).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let name_idx = find(NAME_COLUMN).ok_or_else(|| Error::MissingColumn {
            path: source.to_path_buf(),
            column: NAME_COLUMN.to_string(),
        })?;
        let id_idx = find(ID_COLUMN);
        let email_idx = find(EMAIL_COLUMN);

        let mut names = HashMap::new();
        for record in rdr.records().filter_map(std::result::Result::ok) {
            let field = |idx: Option<usize>| {
                idx.and_then(|i| record.get(i)).map(str::trim).filter(|v| !v.is_empty())
            };
            let Some(key) = field(id_idx).or_else(|| field(email_idx)) else { continue };
            let Some(name) = field(Some(name_idx)) else { continue };
            names.insert(key.to_string(), name.to_string());
        }
        info!(users = names.len(), source = %source.display(), "loaded user names");
        Ok(Self { names })
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() { return Err(Error::MissingInput { path: path.to_path_buf() }); }
        Self::from_reader(File::open(path)?, path)
    }

    /// A missing or unreadable file degrades to an empty directory, so every
    /// user is shown by raw id.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(directory) => directory,
            Err(Error::MissingInput { .. }) => {
                println!("Users CSV not found. Cannot map IDs to names.");
                warn!(path = %path.display(), "user directory missing, showing raw ids");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "user directory unreadable, showing raw ids");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize { self.names.len() }

    pub fn is_empty(&self) -> bool { self.names.is_empty() }

    pub fn display_name<'a>(&'a self, user_id: &'a str) -> &'a str {
        self.names.get(user_id).map_or(user_id, String::as_str)
    }
}
