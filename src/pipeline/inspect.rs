//! Validate a vecs file end to end and report what it holds

use crate::error::{Error, Result};
use crate::storage::{summarize, VecsKind, VecsSummary};
use std::path::Path;
use tracing::info;

/// Scan `path`. The element kind comes from `kind` or else the file extension.
pub fn run<P: AsRef<Path>>(
    path: P,
    kind: Option<VecsKind>,
    dimension: Option<usize>,
) -> Result<VecsSummary> {
    let path = path.as_ref();
    let kind = kind
        .or_else(|| VecsKind::from_path(path))
        .ok_or_else(|| {
            Error::InvalidParameter(format!(
                "cannot tell element type of {}; pass --kind",
                path.display()
            ))
        })?;

    let summary = match kind {
        VecsKind::Bytes => summarize::<u8, _>(path, dimension)?,
        VecsKind::Floats => summarize::<f32, _>(path, dimension)?,
        VecsKind::Ints => summarize::<u32, _>(path, dimension)?,
    };

    info!(
        records = summary.records,
        dimension = summary.dimension,
        min = summary.min,
        max = summary.max,
        non_finite = summary.non_finite,
        "{} is well formed",
        path.display()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_kind_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.ivecs");
        fs::write(&path, [1u8, 0, 0, 0, 5, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0]).unwrap();

        let summary = run(&path, None, Some(1)).unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.dimension, 1);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 5.0);
    }

    #[test]
    fn test_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.bin");
        fs::write(&path, [1u8, 0, 0, 0, 5]).unwrap();

        assert!(matches!(run(&path, None, None), Err(Error::InvalidParameter(_))));
        assert_eq!(run(&path, Some(VecsKind::Bytes), None).unwrap().records, 1);
    }

    #[test]
    fn test_non_finite_counted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.fvecs");
        let mut bytes = 2u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&f32::NAN.to_le_bytes());
        bytes.extend_from_slice(&1.5f32.to_le_bytes());
        fs::write(&path, bytes).unwrap();

        let summary = run(&path, None, None).unwrap();
        assert_eq!(summary.non_finite, 1);
        assert_eq!(summary.min, 1.5);
    }
}
