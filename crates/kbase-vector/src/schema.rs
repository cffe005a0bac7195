//! On-disk layout of an index directory.
//!
//! ```text
//! <dir>/semantic.idx    bincode: magic, format version, dim, row-major f32 vectors
//! <dir>/metadata.json   IndexMetadata, diagnostics only
//! ```

use serde::{Deserialize, Serialize};

pub const INDEX_FILE: &str = "semantic.idx";
pub const METADATA_FILE: &str = "metadata.json";

pub const INDEX_MAGIC: [u8; 4] = *b"KBIP";
/// Bump whenever `IndexFile` changes shape.
pub const INDEX_FORMAT_VERSION: u16 = 1;

#[derive(Serialize)]
pub(crate) struct IndexFileRef<'a> {
	pub magic: [u8; 4],
	pub format_version: u16,
	pub dim: u32,
	pub vectors: &'a [f32],
}

#[derive(Deserialize)]
pub(crate) struct IndexFile {
	pub magic: [u8; 4],
	pub format_version: u16,
	pub dim: u32,
	pub vectors: Vec<f32>,
}
