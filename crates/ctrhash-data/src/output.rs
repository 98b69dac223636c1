//! Output encodings for labeled sparse vectors.
//!
//! Two line-oriented encodings are supported:
//!
//! - **LibSVM**: `<label> <bucket>:<count> ...` with 0-based buckets in
//!   ascending order, e.g. `1 0:1 2:2 3:1`.
//! - **JSON Lines**: one object per vector,
//!   `{"label":1.0,"dimension":4,"indices":[0,2,3],"values":[1.0,2.0,1.0]}`.
//!   Non-finite labels are written as the strings `"NaN"`, `"inf"` and `"-inf"`.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use ctrhash_core::LabeledSparseVector;
use serde::{Serialize, Serializer};

use crate::error::Result;

/// Line encoding for output vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// LibSVM / SVMlight text format.
    #[default]
    LibSvm,
    /// One JSON object per line.
    JsonLines,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::LibSvm => write!(f, "libsvm"),
            OutputFormat::JsonLines => write!(f, "jsonl"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "libsvm" | "svmlight" => Ok(OutputFormat::LibSvm),
            "jsonl" | "json-lines" | "ndjson" => Ok(OutputFormat::JsonLines),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// JSON shape of one output line.
#[derive(Serialize)]
struct JsonVector {
    #[serde(serialize_with = "serialize_label")]
    label: f64,
    dimension: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl From<&LabeledSparseVector> for JsonVector {
    fn from(vector: &LabeledSparseVector) -> Self {
        Self {
            label: vector.label(),
            dimension: vector.dimension(),
            indices: vector.indices(),
            values: vector.values(),
        }
    }
}

/// Writes finite labels as JSON numbers and `NaN`, `inf` and `-inf` as strings.
fn serialize_label<S>(label: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if label.is_finite() {
        serializer.serialize_f64(*label)
    } else {
        serializer.collect_str(label)
    }
}

/// Formats a vector as a LibSVM line (without the trailing newline).
pub fn to_libsvm_line(vector: &LabeledSparseVector) -> String {
    let mut fields = vec![vector.label().to_string()];
    fields.extend(
        vector
            .entries()
            .iter()
            .map(|(bucket, count)| format!("{bucket}:{count}")),
    );
    fields.join(" ")
}

/// Formats a vector as a JSON object (without the trailing newline).
pub fn to_json_line(vector: &LabeledSparseVector) -> Result<String> {
    Ok(serde_json::to_string(&JsonVector::from(vector))?)
}

/// Destination for hashed vectors.
pub trait VectorSink {
    /// Accepts the vector hashed from record `line`.
    fn write_vector(&mut self, line: u64, vector: &LabeledSparseVector) -> Result<()>;

    /// Flushes buffered output.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl VectorSink for Vec<LabeledSparseVector> {
    fn write_vector(&mut self, _line: u64, vector: &LabeledSparseVector) -> Result<()> {
        self.push(vector.clone());
        Ok(())
    }
}

/// Writes vectors to an [`io::Write`](std::io::Write) in a chosen format.
pub struct VectorWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    written: u64,
}

impl<W: Write> VectorWriter<W> {
    /// Creates a writer.
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            written: 0,
        }
    }

    /// Returns the output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Returns the number of vectors written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Writes one vector followed by a newline.
    pub fn write(&mut self, vector: &LabeledSparseVector) -> Result<()> {
        let line = match self.format {
            OutputFormat::LibSvm => to_libsvm_line(vector),
            OutputFormat::JsonLines => to_json_line(vector)?,
        };
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Flushes and returns the inner writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> VectorSink for VectorWriter<W> {
    fn write_vector(&mut self, _line: u64, vector: &LabeledSparseVector) -> Result<()> {
        self.write(vector)
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
