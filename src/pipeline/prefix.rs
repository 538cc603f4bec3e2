//! Cut a smaller `.bvecs` dataset from the first N records of a larger one

use crate::error::Result;
use crate::storage::BvecsFile;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// Copy the first `count` records of `input` to `output`.
///
/// With `count == 0` nothing is written and no file is created. Returns the
/// number of records copied, which is less than `count` when the input is
/// shorter.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    count: usize,
    dimension: Option<usize>,
) -> Result<usize> {
    let file = BvecsFile::open(&input, dimension)?;
    info!(
        "dataset {}: {} vectors, {} dims",
        file.path().display(),
        file.len(),
        file.dimension()
    );

    if count == 0 {
        return Ok(0);
    }

    info!("copying the first {} vectors", count);
    let mut writer = BufWriter::new(File::create(&output)?);
    let copied = file.copy_prefix(count, &mut writer)?;
    info!("wrote {} vectors to {}", copied, output.as_ref().display());
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("big.bvecs");
        let output = dir.path().join("small.bvecs");
        fs::write(&input, [2u8, 0, 0, 0, 1, 2, 2, 0, 0, 0, 3, 4, 2, 0, 0, 0, 5, 6]).unwrap();

        assert_eq!(run(&input, &output, 2, Some(2)).unwrap(), 2);
        assert_eq!(fs::read(&output).unwrap(), vec![2, 0, 0, 0, 1, 2, 2, 0, 0, 0, 3, 4]);

        // Asking for more than exists copies everything
        assert_eq!(run(&input, &output, 10, None).unwrap(), 3);
    }

    #[test]
    fn test_zero_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("big.bvecs");
        let output = dir.path().join("none.bvecs");
        fs::write(&input, [1u8, 0, 0, 0, 7]).unwrap();

        assert_eq!(run(&input, &output, 0, None).unwrap(), 0);
        assert!(!output.exists());
    }
}
