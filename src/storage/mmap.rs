//! Memory-mapped `.bvecs` dataset
//!
//! The raw dataset is mapped rather than read so that truncating to the
//! first N records, copying a prefix, or converting to `f32` only touches
//! the pages actually needed. The record count comes from the file size.

use crate::error::{Error, Result};
use crate::vectors::VectorSet;
use memmap2::{Mmap, MmapOptions};
use rayon::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const COUNT_BYTES: usize = 4;

/// Read-only view of a `.bvecs` file
pub struct BvecsFile {
    mmap: Mmap,
    path: PathBuf,
    dimension: usize,
    count: usize,
}

impl BvecsFile {
    /// Map a `.bvecs` file.
    ///
    /// The dimension is the first record's count. If `expected` is given the
    /// first record must declare exactly that many elements, and the file
    /// length must be a whole number of records.
    pub fn open<P: AsRef<Path>>(path: P, expected: Option<usize>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let file_len = file.metadata()?.len() as usize;

        if file_len == 0 {
            return Err(Error::InvalidParameter(format!(
                "{} is empty",
                path.display()
            )));
        }
        if file_len < COUNT_BYTES {
            return Err(Error::Truncated { path, record: 0 });
        }

        // Memory map the file
        let mmap = unsafe { MmapOptions::new().map(&file)? };

        let dimension = read_count(&mmap, 0);
        if let Some(expected) = expected {
            if dimension != expected {
                return Err(Error::Format {
                    path,
                    record: 0,
                    expected,
                    found: dimension,
                });
            }
        }
        if dimension == 0 {
            return Err(Error::InvalidParameter(format!(
                "{}: first record declares zero elements",
                path.display()
            )));
        }

        let record_size = COUNT_BYTES + dimension;
        if file_len % record_size != 0 {
            return Err(Error::Truncated {
                path,
                record: file_len / record_size,
            });
        }

        Ok(Self {
            mmap,
            path,
            dimension,
            count: file_len / record_size,
        })
    }

    #[inline]
    fn record_size(&self) -> usize {
        COUNT_BYTES + self.dimension
    }

    /// Validate the count prefix of record `idx`
    fn check_record(&self, idx: usize) -> Result<()> {
        let found = read_count(&self.mmap, idx * self.record_size());
        if found != self.dimension {
            return Err(Error::Format {
                path: self.path.clone(),
                record: idx,
                expected: self.dimension,
                found,
            });
        }
        Ok(())
    }

    /// Raw bytes of record `idx`, count prefix included
    fn raw_record(&self, idx: usize) -> &[u8] {
        let start = idx * self.record_size();
        &self.mmap[start..start + self.record_size()]
    }

    /// Payload of record `idx` after validating its count
    pub fn get(&self, idx: usize) -> Result<&[u8]> {
        if idx >= self.count {
            return Err(Error::InvalidParameter(format!(
                "record {} out of bounds ({} records)",
                idx, self.count
            )));
        }
        self.check_record(idx)?;
        Ok(&self.raw_record(idx)[COUNT_BYTES..])
    }

    /// Convert the first `limit` records (all if `None`) into `f32` vectors.
    ///
    /// Every prefix is validated before any conversion happens.
    pub fn to_vector_set(&self, limit: Option<usize>) -> Result<VectorSet> {
        let n = limit.map_or(self.count, |l| l.min(self.count));
        for idx in 0..n {
            self.check_record(idx)?;
            if idx > 0 && idx % 10_000_000 == 0 {
                debug!("validated {} / {} records", idx, n);
            }
        }

        let mut data = vec![0.0f32; n * self.dimension];
        data.par_chunks_mut(self.dimension)
            .enumerate()
            .for_each(|(idx, out)| {
                let payload = &self.raw_record(idx)[COUNT_BYTES..];
                for (o, &b) in out.iter_mut().zip(payload) {
                    *o = b as f32;
                }
            });

        VectorSet::new(self.dimension, data)
    }

    /// Copy the first `n` records verbatim to `writer`, validating each one.
    /// Returns the number of records copied.
    pub fn copy_prefix<W: Write>(&self, n: usize, writer: &mut W) -> Result<usize> {
        let n = n.min(self.count);
        for idx in 0..n {
            self.check_record(idx)?;
            writer.write_all(self.raw_record(idx))?;
        }
        writer.flush()?;
        Ok(n)
    }

    /// Number of records in the file
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get size in bytes
    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.mmap.len()
    }
}

#[inline]
fn read_count(bytes: &[u8], offset: usize) -> usize {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ]) as usize
}
