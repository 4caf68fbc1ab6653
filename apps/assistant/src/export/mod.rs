// Deterministic post-processing of finished output: tracker CSV, downloadable
// documents and their filenames. No I/O happens here.

pub mod csv;
pub mod document;
pub mod filename;

pub use self::csv::{applications_to_csv, csv_row, escape_field};
pub use document::{Block, Document, RunStyle, TextRun};
pub use filename::download_filename;
