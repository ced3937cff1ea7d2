//! CSV reading and writing.

mod reader;
mod writer;

pub use reader::{INFER_SCHEMA_ROWS, check_readable, read_csv_table};
pub use writer::write_csv_table;
