//! Medições converter library.
//!
//! Reads the measurement spreadsheet, groups its rows by project, execution
//! date and sheet number, and writes the records the dashboard loads from
//! `public/medicoes.json`.

pub mod cell;
pub mod config;
pub mod dates;
pub mod error;
pub mod grouping;
pub mod loader;
pub mod model;
pub mod output;

pub use crate::cell::CellValue;
pub use crate::config::Config;
pub use crate::error::ConvertError;
pub use crate::grouping::{group_rows, GroupOptions, Summary};
pub use crate::loader::{load_rows, Row};
pub use crate::model::{LineItem, Measurement, Status};
pub use crate::output::write_json;
