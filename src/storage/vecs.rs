//! The `.bvecs` / `.fvecs` / `.ivecs` record format
//!
//! Format: [count: u32 LE][element x count] repeated, no header.
//! Every record in a file carries the same count. Readers check each
//! record's count against the expected dimension and stop at the first
//! mismatch instead of misaligning the rest of the file.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Fixed-width little-endian element of a vecs record
pub trait VecElement: Copy + Send + Sync + 'static {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Decode from exactly `SIZE` bytes
    fn from_le(bytes: &[u8]) -> Self;

    fn write_le<W: Write>(self, writer: &mut W) -> io::Result<()>;

    fn to_f64(self) -> f64;
}

impl VecElement for u8 {
    const SIZE: usize = 1;

    #[inline]
    fn from_le(bytes: &[u8]) -> Self {
        bytes[0]
    }

    #[inline]
    fn write_le<W: Write>(self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&[self])
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl VecElement for f32 {
    const SIZE: usize = 4;

    #[inline]
    fn from_le(bytes: &[u8]) -> Self {
        f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    #[inline]
    fn write_le<W: Write>(self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_le_bytes())
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl VecElement for u32 {
    const SIZE: usize = 4;

    #[inline]
    fn from_le(bytes: &[u8]) -> Self {
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    #[inline]
    fn write_le<W: Write>(self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_le_bytes())
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

/// Element type of a vecs file, named after its extension letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum VecsKind {
    /// `u8` elements (`.bvecs`)
    #[value(name = "b")]
    Bytes,
    /// `f32` elements (`.fvecs`)
    #[value(name = "f")]
    Floats,
    /// `u32` elements (`.ivecs`)
    #[value(name = "i")]
    Ints,
}

impl VecsKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "bvecs" => Some(Self::Bytes),
            "fvecs" => Some(Self::Floats),
            "ivecs" => Some(Self::Ints),
            _ => None,
        }
    }
}

/// Writes records that all share one element count
pub struct VecsWriter<W: Write, T: VecElement> {
    inner: W,
    dimension: usize,
    records: usize,
    _element: PhantomData<T>,
}

impl<W: Write, T: VecElement> VecsWriter<W, T> {
    pub fn new(inner: W, dimension: usize) -> Result<Self> {
        if dimension == 0 || u32::try_from(dimension).is_err() {
            return Err(Error::InvalidParameter(format!(
                "record length {} does not fit a u32 count",
                dimension
            )));
        }
        Ok(Self {
            inner,
            dimension,
            records: 0,
            _element: PhantomData,
        })
    }

    /// Append one record. Its length must equal the writer's dimension.
    pub fn write_record(&mut self, values: &[T]) -> Result<()> {
        if values.len() != self.dimension {
            return Err(Error::InvalidParameter(format!(
                "record {} has {} elements, expected {}",
                self.records,
                values.len(),
                self.dimension
            )));
        }
        self.inner.write_all(&(self.dimension as u32).to_le_bytes())?;
        for &value in values {
            value.write_le(&mut self.inner)?;
        }
        self.records += 1;
        Ok(())
    }

    pub fn records(&self) -> usize {
        self.records
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<T: VecElement> VecsWriter<BufWriter<File>, T> {
    pub fn create<P: AsRef<Path>>(path: P, dimension: usize) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file), dimension)
    }
}

/// Streams records, validating each count
pub struct VecsReader<R: Read, T: VecElement> {
    inner: R,
    path: PathBuf,
    dimension: Option<usize>,
    records: usize,
    buf: Vec<u8>,
    _element: PhantomData<T>,
}

impl<R: Read, T: VecElement> VecsReader<R, T> {
    /// `expected` fixes the record length; with `None` the first record's
    /// count is taken as the file's dimension. `path` is only used in errors.
    pub fn new(inner: R, path: impl Into<PathBuf>, expected: Option<usize>) -> Self {
        Self {
            inner,
            path: path.into(),
            dimension: expected,
            records: 0,
            buf: Vec::new(),
            _element: PhantomData,
        }
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn records(&self) -> usize {
        self.records
    }

    /// Next record, or `None` at a clean end of file
    pub fn next_record(&mut self) -> Result<Option<Vec<T>>> {
        if !self.fill_record()? {
            return Ok(None);
        }
        Ok(Some(self.buf.chunks_exact(T::SIZE).map(T::from_le).collect()))
    }

    /// Like `next_record` but appends into `out`
    pub fn read_into(&mut self, out: &mut Vec<T>) -> Result<bool> {
        if !self.fill_record()? {
            return Ok(false);
        }
        out.extend(self.buf.chunks_exact(T::SIZE).map(T::from_le));
        Ok(true)
    }

    fn fill_record(&mut self) -> Result<bool> {
        let mut count_bytes = [0u8; 4];
        let filled = read_full(&mut self.inner, &mut count_bytes)?;
        if filled == 0 {
            return Ok(false);
        }
        if filled < count_bytes.len() {
            return Err(self.truncated());
        }

        let found = u32::from_le_bytes(count_bytes) as usize;
        if found == 0 && self.dimension.is_none() {
            return Err(Error::InvalidParameter(format!(
                "{}: first record declares zero elements",
                self.path.display()
            )));
        }
        let expected = *self.dimension.get_or_insert(found);
        if found != expected {
            return Err(Error::Format {
                path: self.path.clone(),
                record: self.records,
                expected,
                found,
            });
        }

        // Grow with the bytes actually present, not the declared count
        let want = found * T::SIZE;
        self.buf.clear();
        let filled = (&mut self.inner).take(want as u64).read_to_end(&mut self.buf)?;
        if filled < want {
            return Err(self.truncated());
        }
        self.records += 1;
        Ok(true)
    }

    fn truncated(&self) -> Error {
        Error::Truncated {
            path: self.path.clone(),
            record: self.records,
        }
    }
}

impl<T: VecElement> VecsReader<BufReader<File>, T> {
    pub fn open<P: AsRef<Path>>(path: P, expected: Option<usize>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), path, expected))
    }
}

/// Read until `buf` is full or EOF; returns the number of bytes read
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Read a whole vecs file into a flat row-major buffer.
///
/// Returns `(values, dimension, records)`. Dimension is 0 for an empty file
/// opened without an expected dimension.
pub fn read_vecs<T: VecElement, P: AsRef<Path>>(
    path: P,
    expected: Option<usize>,
) -> Result<(Vec<T>, usize, usize)> {
    let mut reader = VecsReader::<_, T>::open(path, expected)?;
    let mut values = Vec::new();
    while reader.read_into(&mut values)? {}
    Ok((values, reader.dimension().unwrap_or(0), reader.records()))
}

/// Write a flat row-major buffer as `values.len() / dimension` records
pub fn write_vecs<T: VecElement, P: AsRef<Path>>(
    path: P,
    values: &[T],
    dimension: usize,
) -> Result<usize> {
    if dimension == 0 || values.len() % dimension != 0 {
        return Err(Error::InvalidParameter(format!(
            "{} values is not a whole number of {}-element records",
            values.len(),
            dimension
        )));
    }
    let mut writer = VecsWriter::<_, T>::create(path, dimension)?;
    for row in values.chunks_exact(dimension) {
        writer.write_record(row)?;
    }
    let records = writer.records();
    writer.finish()?;
    Ok(records)
}

/// Summary of a scanned vecs file
#[derive(Debug, Clone, PartialEq)]
pub struct VecsSummary {
    pub records: usize,
    pub dimension: usize,
    pub min: f64,
    pub max: f64,
    pub non_finite: usize,
}

/// Scan every record of a vecs file, validating framing and collecting
/// value statistics
pub fn summarize<T: VecElement, P: AsRef<Path>>(
    path: P,
    expected: Option<usize>,
) -> Result<VecsSummary> {
    let mut reader = VecsReader::<_, T>::open(path, expected)?;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut non_finite = 0;

    while let Some(record) = reader.next_record()? {
        for value in record {
            let v = value.to_f64();
            if !v.is_finite() {
                non_finite += 1;
                continue;
            }
            min = min.min(v);
            max = max.max(v);
        }
    }

    Ok(VecsSummary {
        records: reader.records(),
        dimension: reader.dimension().unwrap_or(0),
        min,
        max,
        non_finite,
    })
}
