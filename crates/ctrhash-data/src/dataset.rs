//! Dataset trait and combinators for raw record sources.
//!
//! A [`Dataset`] yields raw records, numbered from 1 in source order. Items are
//! `Result`s: a source may fail to read (an I/O error, fatal to the run) or may
//! produce a line that cannot be a record at all (a record error, which only
//! rejects that line).
//!
//! # Example
//!
//! ```
//! use ctrhash_data::{Dataset, VecDataset};
//!
//! let dataset = VecDataset::from_strs(&["label,c1,c2", "1,a,b", "0,c,d"])
//!     .skip(1)
//!     .filter(|record| !record.text().is_empty());
//!
//! let records = dataset.collect_records().unwrap();
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[0].line(), 2);
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ctrhash_core::HashingError;

use crate::batch::BatchedDataset;
use crate::error::{DataError, RecordError, Result};

/// A raw, unparsed record and its position in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    line: u64,
    text: String,
}

impl RawRecord {
    /// Creates a record.
    ///
    /// # Arguments
    ///
    /// * `line` - 1-based position of the record in its source
    /// * `text` - The record text, without line terminator
    pub fn new(line: u64, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }

    /// Returns the 1-based position of the record.
    #[inline]
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Returns the record text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consumes the record and returns its text.
    pub fn into_text(self) -> String {
        self.text
    }
}

/// A source of raw records.
pub trait Dataset: Sized {
    /// The iterator type returned by this dataset.
    type Iter: Iterator<Item = Result<RawRecord>>;

    /// Returns an iterator over records in this dataset.
    fn iter(self) -> Self::Iter;

    /// Groups records into batches of `batch_size`.
    ///
    /// # Arguments
    ///
    /// * `batch_size` - The number of records per batch
    fn batch(self, batch_size: usize) -> BatchedDataset<Self::Iter> {
        BatchedDataset::new(self.iter(), batch_size)
    }

    /// Keeps only records for which `predicate` returns `true`.
    ///
    /// Errors are never filtered out.
    fn filter<F>(self, predicate: F) -> FilteredDataset<Self::Iter, F>
    where
        F: FnMut(&RawRecord) -> bool,
    {
        FilteredDataset::new(self.iter(), predicate)
    }

    /// Skips the first `n` items (e.g. a header line).
    fn skip(self, n: usize) -> IterDataset<std::iter::Skip<Self::Iter>> {
        IterDataset::new(self.iter().skip(n))
    }

    /// Takes at most `n` items.
    fn take(self, n: usize) -> IterDataset<std::iter::Take<Self::Iter>> {
        IterDataset::new(self.iter().take(n))
    }

    /// Collects every record, stopping at the first error.
    fn collect_records(self) -> Result<Vec<RawRecord>> {
        self.iter().collect()
    }

    /// Counts the items in the dataset, errors included.
    ///
    /// Note: This consumes the dataset.
    fn count(self) -> usize {
        self.iter().count()
    }
}

/// A dataset backed by in-memory records.
///
/// This is useful for testing and for inputs that fit in memory.
#[derive(Debug, Clone, Default)]
pub struct VecDataset {
    records: Vec<RawRecord>,
}

impl VecDataset {
    /// Creates a dataset from record texts, numbering them from 1.
    pub fn new(texts: Vec<String>) -> Self {
        texts.into_iter().collect()
    }

    /// Creates a dataset from string slices.
    pub fn from_strs(texts: &[&str]) -> Self {
        texts.iter().map(|t| t.to_string()).collect()
    }

    /// Creates an empty dataset.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the number of records in the dataset.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<String> for VecDataset {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            records: iter
                .into_iter()
                .zip(1u64..)
                .map(|(text, line)| RawRecord::new(line, text))
                .collect(),
        }
    }
}

impl Dataset for VecDataset {
    type Iter = std::iter::Map<std::vec::IntoIter<RawRecord>, fn(RawRecord) -> Result<RawRecord>>;

    fn iter(self) -> Self::Iter {
        self.records
            .into_iter()
            .map(Ok as fn(RawRecord) -> Result<RawRecord>)
    }
}

/// A dataset reading one record per line from a buffered reader.
///
/// Lines end at `\n`; a trailing `\r` is dropped as well. Lines that are not
/// valid UTF-8 are reported as record errors.
#[derive(Debug)]
pub struct LineDataset<R> {
    reader: R,
}

impl<R: BufRead> LineDataset<R> {
    /// Creates a dataset over a reader.
    pub fn from_reader(reader: R) -> Self {
        Self { reader }
    }
}

impl LineDataset<BufReader<File>> {
    /// Opens a file as a line dataset.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> Dataset for LineDataset<R> {
    type Iter = LineIterator<R>;

    fn iter(self) -> Self::Iter {
        LineIterator {
            reader: self.reader,
            line: 0,
            buf: Vec::new(),
            done: false,
        }
    }
}

/// Iterator over the lines of a [`LineDataset`].
pub struct LineIterator<R> {
    reader: R,
    line: u64,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> Iterator for LineIterator<R> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                self.line += 1;
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                let bytes = std::mem::take(&mut self.buf);
                Some(match String::from_utf8(bytes) {
                    Ok(text) => Ok(RawRecord::new(self.line, text)),
                    Err(_) => Err(DataError::Record(RecordError::new(
                        self.line,
                        HashingError::format("record is not valid UTF-8"),
                    ))),
                })
            }
            Err(e) => {
                self.done = true;
                Some(Err(DataError::Io(e)))
            }
        }
    }
}

/// Wraps any iterator of records as a dataset.
pub struct IterDataset<I> {
    inner: I,
}

impl<I> IterDataset<I>
where
    I: Iterator<Item = Result<RawRecord>>,
{
    /// Creates a new iterator-backed dataset.
    pub fn new(inner: I) -> Self {
        Self { inner }
    }
}

impl<I> Dataset for IterDataset<I>
where
    I: Iterator<Item = Result<RawRecord>>,
{
    type Iter = I;

    fn iter(self) -> Self::Iter {
        self.inner
    }
}

/// A dataset that filters records based on a predicate.
pub struct FilteredDataset<I, F> {
    inner: I,
    predicate: F,
}

impl<I, F> FilteredDataset<I, F>
where
    I: Iterator<Item = Result<RawRecord>>,
    F: FnMut(&RawRecord) -> bool,
{
    /// Creates a new filtered dataset.
    pub fn new(inner: I, predicate: F) -> Self {
        Self { inner, predicate }
    }
}

/// Iterator that filters records.
pub struct FilterIterator<I, F> {
    inner: I,
    predicate: F,
}

impl<I, F> Iterator for FilterIterator<I, F>
where
    I: Iterator<Item = Result<RawRecord>>,
    F: FnMut(&RawRecord) -> bool,
{
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(record) if !(self.predicate)(&record) => continue,
                item => return Some(item),
            }
        }
    }
}

impl<I, F> Dataset for FilteredDataset<I, F>
where
    I: Iterator<Item = Result<RawRecord>>,
    F: FnMut(&RawRecord) -> bool,
{
    type Iter = FilterIterator<I, F>;

    fn iter(self) -> Self::Iter {
        FilterIterator {
            inner: self.inner,
            predicate: self.predicate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    #[test]
    fn test_vec_dataset_numbers_records() {
        let dataset = VecDataset::from_strs(&["1,a", "0,b", "1,c"]);
        assert_eq!(dataset.len(), 3);

        let records = dataset.collect_records().unwrap();
        let lines: Vec<_> = records.iter().map(|r| r.line()).collect();
        assert_eq!(lines, vec![1, 2, 3]);
        assert_eq!(records[1].text(), "0,b");
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = VecDataset::empty();
        assert!(dataset.is_empty());
        assert_eq!(dataset.count(), 0);
    }

    #[test]
    fn test_skip_take_filter() {
        let dataset = VecDataset::from_strs(&["header", "1,a", "", "0,b", "1,c"]);
        let records = dataset
            .skip(1)
            .filter(|r| !r.text().is_empty())
            .take(2)
            .collect_records()
            .unwrap();

        let texts: Vec<_> = records.iter().map(|r| r.text()).collect();
        assert_eq!(texts, vec!["1,a", "0,b"]);
        assert_eq!(records[1].line(), 4);
    }

    #[test]
    fn test_line_dataset_strips_terminators() {
        let input = "1,a,b\r\n0,,c\n\n1,d";
        let records = LineDataset::from_reader(Cursor::new(input))
            .collect_records()
            .unwrap();

        let texts: Vec<_> = records.iter().map(|r| r.text().to_string()).collect();
        assert_eq!(texts, vec!["1,a,b", "0,,c", "", "1,d"]);
        assert_eq!(records[3].line(), 4);
    }

    #[test]
    fn test_line_dataset_invalid_utf8_is_record_error() {
        let input: &[u8] = b"1,a\n0,\xff\xfe\n1,b\n";
        let items: Vec<_> = LineDataset::from_reader(input).iter().collect();
        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        match &items[1] {
            Err(DataError::Record(e)) => assert_eq!(e.line, 2),
            other => panic!("expected record error, got {:?}", other),
        }
        assert_eq!(items[2].as_ref().unwrap().text(), "1,b");
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn test_line_dataset_io_error_ends_iteration() {
        let mut iter = LineDataset::from_reader(BufReader::new(FailingReader)).iter();
        assert!(matches!(iter.next(), Some(Err(DataError::Io(_)))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_line_dataset_open() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1,a").unwrap();
        writeln!(file, "0,b").unwrap();

        let dataset = LineDataset::open(file.path()).unwrap();
        assert_eq!(dataset.count(), 2);

        assert!(matches!(
            LineDataset::open("/nonexistent/records.csv"),
            Err(DataError::Io(_))
        ));
    }

    #[test]
    fn test_filter_passes_errors_through() {
        let items = vec![
            Ok(RawRecord::new(1, "keep")),
            Err(DataError::Record(RecordError::new(
                2,
                HashingError::format("bad"),
            ))),
            Ok(RawRecord::new(3, "drop")),
        ];
        let out: Vec<_> = IterDataset::new(items.into_iter())
            .filter(|r| r.text() == "keep")
            .iter()
            .collect();
        assert_eq!(out.len(), 2);
        assert!(out[1].is_err());
    }
}
