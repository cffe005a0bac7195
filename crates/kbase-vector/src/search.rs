use anyhow::{bail, Result};

use crate::flat::FlatIpIndex;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
	pub position: usize,
	/// Inner product with the query; cosine similarity for unit vectors.
	pub score: f32,
}

impl FlatIpIndex {
	/// The `k` rows with the largest inner product, best first. Equal scores
	/// keep insertion order, so results are deterministic.
	pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
		if query.len() != self.dim() {
			bail!("query has {} components, index dimension is {}", query.len(), self.dim());
		}
		if k == 0 || self.is_empty() { return Ok(Vec::new()); }

		let mut hits: Vec<Neighbor> = self
			.rows()
			.enumerate()
			.map(|(position, row)| {
				let score: f32 = row.iter().zip(query).map(|(a, b)| a * b).sum();
				Neighbor { position, score: if score.is_nan() { f32::NEG_INFINITY } else { score } }
			})
			.collect();
		hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.position.cmp(&b.position)));
		hits.truncate(k);
		Ok(hits)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn index() -> FlatIpIndex {
		let mut idx = FlatIpIndex::new(2);
		for v in [[1.0, 0.0], [0.6, 0.8], [0.0, 1.0], [0.6, 0.8]] { idx.add(&v).unwrap(); }
		idx
	}

	#[test]
	fn ranks_by_inner_product() {
		let hits = index().search(&[0.0, 1.0], 2).unwrap();
		assert_eq!(hits[0].position, 2);
		assert!((hits[0].score - 1.0).abs() < 1e-6);
		assert_eq!(hits[1].position, 1);
		assert_eq!(hits.len(), 2);
	}

	#[test]
	fn ties_keep_insertion_order() {
		let hits = index().search(&[0.6, 0.8], 4).unwrap();
		assert_eq!(hits[0].position, 1);
		assert_eq!(hits[1].position, 3);
	}

	#[test]
	fn k_larger_than_index_returns_everything() {
		assert_eq!(index().search(&[1.0, 0.0], 50).unwrap().len(), 4);
		assert!(index().search(&[1.0, 0.0], 0).unwrap().is_empty());
		assert!(index().search(&[1.0], 1).is_err());
	}
}
