//! `.npy` persistence for the intermediate centroid and assignment arrays
//!
//! Centroids are stored as a `float32` `(C, D)` array and assignments as an
//! `int64` `(N, 1)` array, the shapes a nearest-centroid search returns.

use crate::error::Result;
use ndarray::Array2;
use ndarray_npy::{ReadNpyExt, WriteNpyExt};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub fn save_centroids<P: AsRef<Path>>(path: P, centroids: &Array2<f32>) -> Result<()> {
    save(path, centroids)
}

pub fn load_centroids<P: AsRef<Path>>(path: P) -> Result<Array2<f32>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(Array2::<f32>::read_npy(reader)?)
}

pub fn save_assignments<P: AsRef<Path>>(path: P, assignments: &Array2<i64>) -> Result<()> {
    save(path, assignments)
}

pub fn load_assignments<P: AsRef<Path>>(path: P) -> Result<Array2<i64>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(Array2::<i64>::read_npy(reader)?)
}

fn save<P: AsRef<Path>, A: WriteNpyExt>(path: P, array: &A) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    array.write_npy(&mut writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_centroids_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("centroids.npy");
        let centroids = array![[1.0f32, 2.0], [3.5, -4.0]];

        save_centroids(&path, &centroids).unwrap();
        assert_eq!(load_centroids(&path).unwrap(), centroids);
    }

    #[test]
    fn test_wrong_dtype_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.npy");
        save_assignments(&path, &array![[0i64], [1]]).unwrap();

        assert!(load_centroids(&path).is_err());
        assert_eq!(load_assignments(&path).unwrap().shape(), &[2, 1]);
    }
}
