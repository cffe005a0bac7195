use anyhow::{bail, Result};

/// Exhaustive inner-product index. Vectors are stored row-major in insertion
/// order; row `i` belongs to document `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIpIndex {
	dim: usize,
	data: Vec<f32>,
}

impl FlatIpIndex {
	pub fn new(dim: usize) -> Self {
		Self { dim, data: Vec::new() }
	}

	pub fn with_capacity(dim: usize, rows: usize) -> Self {
		Self { dim, data: Vec::with_capacity(dim * rows) }
	}

	pub(crate) fn from_raw(dim: usize, data: Vec<f32>) -> Result<Self> {
		if dim == 0 {
			if !data.is_empty() { bail!("dimension 0 with {} values", data.len()); }
		} else if data.len() % dim != 0 {
			bail!("{} values do not divide into rows of {}", data.len(), dim);
		}
		Ok(Self { dim, data })
	}

	pub fn dim(&self) -> usize {
		self.dim
	}

	pub fn len(&self) -> usize {
		if self.dim == 0 { 0 } else { self.data.len() / self.dim }
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Append one vector; returns its row.
	pub fn add(&mut self, vector: &[f32]) -> Result<usize> {
		if vector.len() != self.dim {
			bail!("vector has {} components, index dimension is {}", vector.len(), self.dim);
		}
		self.data.extend_from_slice(vector);
		Ok(self.len() - 1)
	}

	pub fn row(&self, position: usize) -> Option<&[f32]> {
		if self.dim == 0 { return None; }
		self.data.get(position * self.dim..(position + 1) * self.dim)
	}

	pub(crate) fn rows(&self) -> impl Iterator<Item = &[f32]> {
		self.data.chunks_exact(self.dim.max(1))
	}

	pub(crate) fn raw(&self) -> &[f32] {
		&self.data
	}
}

/// Scale `v` to unit length in place. Zero vectors are left untouched.
pub fn l2_normalize(v: &mut [f32]) {
	let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
	if norm > 0.0 {
		for x in v.iter_mut() { *x /= norm; }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn add_assigns_sequential_rows_and_checks_dim() {
		let mut idx = FlatIpIndex::new(2);
		assert_eq!(idx.add(&[1.0, 0.0]).unwrap(), 0);
		assert_eq!(idx.add(&[0.0, 1.0]).unwrap(), 1);
		assert!(idx.add(&[1.0, 0.0, 0.0]).is_err());
		assert_eq!(idx.len(), 2);
		assert_eq!(idx.row(1), Some(&[0.0f32, 1.0][..]));
		assert_eq!(idx.row(2), None);
	}

	#[test]
	fn normalize_handles_zero_vector() {
		let mut v = [3.0f32, 4.0];
		l2_normalize(&mut v);
		assert!((v[0] - 0.6).abs() < 1e-6 && (v[1] - 0.8).abs() < 1e-6);
		let mut z = [0.0f32; 3];
		l2_normalize(&mut z);
		assert_eq!(z, [0.0; 3]);
	}

	#[test]
	fn raw_rows_must_divide_evenly() {
		assert!(FlatIpIndex::from_raw(3, vec![0.0; 7]).is_err());
		assert_eq!(FlatIpIndex::from_raw(3, vec![0.0; 6]).unwrap().len(), 2);
	}
}
