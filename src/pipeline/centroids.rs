//! Centroid serializer stage: centroid `.npy` -> `.fvecs`

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::storage::{npy, VecsWriter};
use ndarray::ArrayView2;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::info;

/// Write one `f32` record per centroid row. The record length is the
/// array's column count. Returns the number of records written.
pub fn write_centroids<W: Write>(writer: W, centroids: ArrayView2<'_, f32>) -> Result<usize> {
    let dimension = centroids.ncols();
    let mut out = VecsWriter::<_, f32>::new(writer, dimension)?;
    let mut row_buf = Vec::with_capacity(dimension);
    for row in centroids.rows() {
        row_buf.clear();
        row_buf.extend(row.iter().copied());
        out.write_record(&row_buf)?;
    }
    let written = out.records();
    out.finish()?;
    Ok(written)
}

pub fn run(config: &PipelineConfig) -> Result<usize> {
    let paths = &config.paths;
    let centroids = npy::load_centroids(&paths.centroids_npy)?;
    info!(
        "loaded centroids {:?} from {}",
        centroids.shape(),
        paths.centroids_npy.display()
    );
    if centroids.ncols() != config.clustering.dimension {
        return Err(Error::InvalidParameter(format!(
            "centroids have {} columns, configured dimension is {}",
            centroids.ncols(),
            config.clustering.dimension
        )));
    }

    let file = File::create(&paths.centroids_vecs)?;
    let written = write_centroids(BufWriter::new(file), centroids.view())?;
    info!("wrote {} centroids to {}", written, paths.centroids_vecs.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_single_centroid_bytes() {
        let mut out = Vec::new();
        let written = write_centroids(&mut out, array![[1.0f32, 2.0]].view()).unwrap();
        assert_eq!(written, 1);
        assert_eq!(
            out,
            vec![0x02, 0, 0, 0, 0x00, 0x00, 0x80, 0x3F, 0x00, 0x00, 0x00, 0x40]
        );
    }

    #[test]
    fn test_rows_in_order() {
        let mut out = Vec::new();
        write_centroids(&mut out, array![[1.0f32], [2.0], [3.0]].view()).unwrap();
        let values: Vec<f32> = out
            .chunks_exact(8)
            .map(|r| f32::from_le_bytes([r[4], r[5], r[6], r[7]]))
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_column_major_view() {
        // A transposed view is not contiguous; rows must still come out right
        let base = array![[1.0f32, 3.0], [2.0, 4.0]];
        let mut out = Vec::new();
        write_centroids(&mut out, base.t()).unwrap();
        assert_eq!(&out[4..8], &1.0f32.to_le_bytes());
        assert_eq!(&out[8..12], &2.0f32.to_le_bytes());
    }
}
