//! Assignment serializer stage: assignment `.npy` -> `.ivecs`
//!
//! Each row of the `(N, K)` array becomes one record of K `u32` values. The
//! clustering stage writes K = 1, so every record is `[1][cluster id]`.

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::storage::{npy, VecsWriter};
use ndarray::ArrayView2;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::info;

/// Write one `u32` record per row. Returns the number of records written.
pub fn write_assignments<W: Write>(writer: W, ids: ArrayView2<'_, i64>) -> Result<usize> {
    let mut out = VecsWriter::<_, u32>::new(writer, ids.ncols())?;
    let mut row_buf = Vec::with_capacity(ids.ncols());
    for (i, row) in ids.rows().into_iter().enumerate() {
        row_buf.clear();
        for &id in row.iter() {
            let id = u32::try_from(id).map_err(|_| {
                Error::InvalidParameter(format!("row {} holds id {} outside u32 range", i, id))
            })?;
            row_buf.push(id);
        }
        out.write_record(&row_buf)?;
    }
    let written = out.records();
    out.finish()?;
    Ok(written)
}

pub fn run(config: &PipelineConfig) -> Result<usize> {
    let paths = &config.paths;
    let ids = npy::load_assignments(&paths.assignments_npy)?;
    info!(
        "loaded assignments {:?} from {}",
        ids.shape(),
        paths.assignments_npy.display()
    );

    let file = File::create(&paths.assignments_vecs)?;
    let written = write_assignments(BufWriter::new(file), ids.view())?;
    info!(
        "wrote {} assignments to {}",
        written,
        paths.assignments_vecs.display()
    );
    Ok(written)
}
