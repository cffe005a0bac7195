//! kbase-hybrid
//!
//! The retrieval engine: builds the semantic and BM25 indices in one pass,
//! persists and restores them, and answers queries with fused, keyword-boosted
//! scores. `InitGate` wraps engine start-up for callers that must not block.

pub mod builder;
pub mod engine;
pub mod fusion;
pub mod gate;
pub mod render;

pub use builder::{BuiltIndices, IndexBuilder, DEFAULT_BATCH_SIZE};
pub use engine::{EngineStats, HybridEngine, SearchParams, DEFAULT_MIN_SCORE, DEFAULT_TOP_K};
pub use gate::{InitGate, Readiness};
pub use render::{render_context, render_sources};
