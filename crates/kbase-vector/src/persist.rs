use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use bincode::config;
use tempfile::NamedTempFile;

use crate::flat::FlatIpIndex;
use crate::schema::{IndexFile, IndexFileRef, INDEX_FORMAT_VERSION, INDEX_MAGIC};

/// Serialize `index` to `path`. The file is written next to its destination
/// and renamed into place, so readers never observe a partial index.
pub fn write_index(index: &FlatIpIndex, path: &Path) -> Result<()> {
	let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
	fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

	let file = IndexFileRef {
		magic: INDEX_MAGIC,
		format_version: INDEX_FORMAT_VERSION,
		dim: u32::try_from(index.dim()).context("index dimension exceeds u32")?,
		vectors: index.raw(),
	};
	let bytes = bincode::serde::encode_to_vec(&file, config::standard())?;

	let mut tmp = NamedTempFile::new_in(dir)?;
	tmp.write_all(&bytes)?;
	tmp.as_file().sync_all()?;
	tmp.persist(path).with_context(|| format!("renaming into {}", path.display()))?;

	tracing::debug!(path = %path.display(), rows = index.len(), dim = index.dim(), bytes = bytes.len(), "semantic index written");
	Ok(())
}

pub fn read_index(path: &Path) -> Result<FlatIpIndex> {
	let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
	let (file, consumed): (IndexFile, usize) = bincode::serde::decode_from_slice(&bytes, config::standard())
		.with_context(|| format!("decoding {}", path.display()))?;
	if file.magic != INDEX_MAGIC {
		bail!("{} is not a semantic index file", path.display());
	}
	if file.format_version != INDEX_FORMAT_VERSION {
		bail!("unsupported index format version {} (expected {})", file.format_version, INDEX_FORMAT_VERSION);
	}
	if consumed != bytes.len() {
		bail!("{} has {} trailing bytes", path.display(), bytes.len() - consumed);
	}
	FlatIpIndex::from_raw(file.dim as usize, file.vectors)
}
