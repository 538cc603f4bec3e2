//! Flat in-memory vector storage
//!
//! Vectors are kept row-major in a single `Vec<f32>` so that a 100M x 128
//! dataset costs exactly N * D * 4 bytes with no per-vector allocation.

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct VectorSet {
    dimension: usize,
    data: Vec<f32>,
}

impl VectorSet {
    /// Wrap a row-major buffer. `data.len()` must be a multiple of `dimension`.
    pub fn new(dimension: usize, data: Vec<f32>) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::InvalidParameter("dimension must be positive".into()));
        }
        if data.len() % dimension != 0 {
            return Err(Error::InvalidParameter(format!(
                "buffer of {} values is not a whole number of {}-d vectors",
                data.len(),
                dimension
            )));
        }
        Ok(Self { dimension, data })
    }

    /// Build from individual rows, all of which must share one dimension
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let dimension = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * dimension);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dimension {
                return Err(Error::InvalidParameter(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    dimension
                )));
            }
            data.extend_from_slice(row);
        }
        Self::new(dimension, data)
    }

    /// Gather the given rows, in the given order
    pub fn select(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(indices.len() * self.dimension);
        for &i in indices {
            data.extend_from_slice(self.get(i));
        }
        Self {
            dimension: self.dimension,
            data,
        }
    }

    #[inline]
    pub fn get(&self, idx: usize) -> &[f32] {
        let start = idx * self.dimension;
        &self.data[start..start + self.dimension]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }

    pub fn iter(&self) -> std::slice::ChunksExact<'_, f32> {
        self.data.chunks_exact(self.dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let set = VectorSet::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.dimension(), 2);
        assert_eq!(set.get(1), &[3.0, 4.0]);
        assert_eq!(set.iter().count(), 2);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = VectorSet::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn test_partial_row_rejected() {
        assert!(VectorSet::new(3, vec![0.0; 4]).is_err());
    }

    #[test]
    fn test_select_keeps_order() {
        let set = VectorSet::new(1, vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let picked = set.select(&[3, 1]);
        assert_eq!(picked.as_slice(), &[3.0, 1.0]);
    }
}
