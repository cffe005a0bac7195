//! kbase-vector
//!
//! Exhaustive inner-product index over unit vectors, plus its on-disk form:
//! a bincode index file and a JSON metadata sidecar in one directory.

pub mod flat;
pub mod meta;
pub mod persist;
pub mod schema;
pub mod search;

use std::path::{Path, PathBuf};

pub use flat::{l2_normalize, FlatIpIndex};
pub use meta::IndexMetadata;
pub use persist::{read_index, write_index};
pub use schema::{INDEX_FILE, METADATA_FILE};
pub use search::Neighbor;

/// Paths of the two artifacts inside an index directory.
#[derive(Debug, Clone)]
pub struct IndexDir {
    root: PathBuf,
}

impl IndexDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }

    /// Both artifacts present.
    pub fn is_complete(&self) -> bool {
        self.index_path().is_file() && self.metadata_path().is_file()
    }
}
