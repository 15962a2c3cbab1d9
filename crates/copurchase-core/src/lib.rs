#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod ingest;
pub mod matrix;
pub mod pipeline;
pub mod ranking;
pub mod similarity;
pub mod taxonomy;
pub mod types;
pub mod users;

pub use error::{Error, Result};
