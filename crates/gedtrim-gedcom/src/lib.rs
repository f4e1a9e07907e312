//! Gedtrim GEDCOM - file boundary for the kinship graph
//!
//! Reads GEDCOM text files into a [`gedtrim_core::Graph`], repairing the
//! continuation-level damage some exporters produce, and re-emits a
//! reconciled subset graph as a structurally valid GEDCOM file, optionally
//! relocating referenced photos.

pub mod error;
pub mod line;
pub mod reader;
pub mod repair;
pub mod writer;

pub use error::{GedcomError, GedcomResult};
pub use line::Line;
pub use reader::{parse_str, read_file, ReaderOptions};
pub use writer::{render, write_file};
