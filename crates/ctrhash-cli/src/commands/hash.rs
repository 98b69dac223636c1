//! Hash Command Implementation
//!
//! Streams records from a file or stdin through the hashing pipeline and
//! writes one vector per accepted record.

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use ctrhash_core::{FeatureHasher, HashedPair, HashingConfig};
use ctrhash_data::{
    Dataset, ErrorPolicy, HashPipeline, HashingTransform, LineDataset, OutputFormat, RunSummary,
    VectorWriter, DEFAULT_BATCH_SIZE,
};
use tracing::{info, warn};

/// Output encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FormatArg {
    /// `<label> <bucket>:<count> ...`
    #[default]
    Libsvm,
    /// One JSON object per line
    Jsonl,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Libsvm => OutputFormat::LibSvm,
            FormatArg::Jsonl => OutputFormat::JsonLines,
        }
    }
}

impl std::fmt::Display for FormatArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", OutputFormat::from(*self))
    }
}

/// Hash a stream of records into sparse vectors
///
/// Each input line is one record: a label followed by comma-separated feature
/// values. Rejected records are logged and skipped unless `--fail-fast` is
/// set.
///
/// # Example
///
/// ```bash
/// ctrhash hash \
///     --input train.csv \
///     --output train.svm \
///     --num-buckets 1048576 \
///     --skip-header
/// ```
#[derive(Args, Debug, Clone)]
pub struct HashCommand {
    /// Input file, or `-` for stdin
    #[arg(long, short = 'i', default_value = "-")]
    pub input: PathBuf,

    /// Output file, or `-` for stdout
    #[arg(long, short = 'o', default_value = "-")]
    pub output: PathBuf,

    /// Number of hash buckets (output dimension); overrides --config
    #[arg(long, short = 'n', env = "CTRHASH_NUM_BUCKETS", allow_negative_numbers = true)]
    pub num_buckets: Option<i64>,

    /// Hashing configuration file (JSON, e.g. `{"num_buckets": 1024}`)
    #[arg(long, short = 'c', env = "CTRHASH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "libsvm")]
    pub format: FormatArg,

    /// Records hashed per parallel batch
    #[arg(long, short = 'b', default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Skip the first input line
    #[arg(long)]
    pub skip_header: bool,

    /// Stop at the first rejected record
    #[arg(long)]
    pub fail_fast: bool,

    /// Log every feature-to-bucket mapping
    #[arg(long)]
    pub print_mapping: bool,
}

impl HashCommand {
    /// Builds the hashing configuration from the flags and config file.
    pub fn resolve_config(&self) -> Result<HashingConfig> {
        let from_file = match &self.config {
            Some(path) => Some(
                HashingConfig::from_file(path)
                    .with_context(|| format!("Failed to load config from {:?}", path))?,
            ),
            None => None,
        };

        match (self.num_buckets, from_file) {
            (Some(n), file) => {
                let config = HashingConfig::from_signed(n).context("Invalid --num-buckets")?;
                if let Some(file) = file {
                    if file != config {
                        warn!(
                            file = file.num_buckets(),
                            flag = config.num_buckets(),
                            "--num-buckets overrides the config file"
                        );
                    }
                }
                Ok(config)
            }
            (None, Some(file)) => Ok(file),
            (None, None) => bail!("Either --num-buckets or --config must be given"),
        }
    }

    /// Execute the hash command
    pub fn run(&self) -> Result<RunSummary> {
        let config = self.resolve_config()?;
        info!(
            num_buckets = config.num_buckets(),
            format = %self.format,
            input = ?self.input,
            output = ?self.output,
            "Hashing records"
        );

        let mut hasher = FeatureHasher::new(config);
        if self.print_mapping {
            hasher = hasher.with_observer(|mapping: &HashedPair| {
                info!(
                    index = mapping.index,
                    key = %mapping.key,
                    bucket = mapping.bucket,
                    "feature mapping"
                );
            });
        }

        let policy = if self.fail_fast {
            ErrorPolicy::FailFast
        } else {
            ErrorPolicy::Skip
        };
        let pipeline = HashPipeline::new(HashingTransform::from_hasher(hasher))
            .with_batch_size(self.batch_size)
            .with_error_policy(policy);

        let sink: Box<dyn Write> = if is_stdio(&self.output) {
            Box::new(BufWriter::new(io::stdout().lock()))
        } else {
            let file = File::create(&self.output)
                .with_context(|| format!("Failed to create output file {:?}", self.output))?;
            Box::new(BufWriter::new(file))
        };
        let mut writer = VectorWriter::new(sink, self.format.into());

        let summary = if is_stdio(&self.input) {
            self.hash_from(LineDataset::from_reader(io::stdin().lock()), &pipeline, &mut writer)?
        } else {
            let dataset = LineDataset::open(&self.input)
                .with_context(|| format!("Failed to open input file {:?}", self.input))?;
            self.hash_from(dataset, &pipeline, &mut writer)?
        };
        writer.into_inner().context("Failed to flush output")?;

        if summary.rejected > 0 {
            warn!(
                rejected = summary.rejected,
                records = summary.records,
                "Some records were rejected"
            );
        }
        Ok(summary)
    }

    fn hash_from<R: BufRead>(
        &self,
        dataset: LineDataset<R>,
        pipeline: &HashPipeline<HashingTransform>,
        writer: &mut VectorWriter<Box<dyn Write>>,
    ) -> Result<RunSummary> {
        let dataset = dataset.skip(usize::from(self.skip_header));
        pipeline.run(dataset, writer).context("Hashing stopped")
    }
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}
