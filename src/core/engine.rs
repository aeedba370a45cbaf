use crate::core::io::{self, RecordReader};
use crate::core::metrics::SummaryAccumulator;
use crate::core::model::{RecordFormat, Summary};
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const AUTO_DETECT_READS: usize = 50_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PhredOffsetConfig {
    Auto,
    Fixed(u8),
}

impl Default for PhredOffsetConfig {
    fn default() -> Self {
        PhredOffsetConfig::Fixed(33)
    }
}

#[derive(Clone, Debug)]
pub struct RunConfig {
    pub input: PathBuf,
    pub sample_id: String,
    pub batch: String,
    pub phred_offset: PhredOffsetConfig,
}

pub struct RunContext {
    pub file_name: String,
    pub sample_id: String,
    pub batch: String,
    pub format: RecordFormat,
    /// Resolved offset; `None` for FASTA input.
    pub phred_offset: Option<u8>,
    pub skipped_records: u64,
}

pub struct RunOutput {
    pub summary: Summary,
    pub ctx: RunContext,
}

pub fn run(cfg: RunConfig) -> Result<RunOutput> {
    let t_total = Instant::now();
    let format = io::detect_format(&cfg.input)?;

    let file_name = cfg
        .input
        .file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .context("failed to determine input filename")?;

    let t_phred = Instant::now();
    let phred_offset = match (format, cfg.phred_offset) {
        (RecordFormat::Fasta, _) => None,
        (RecordFormat::Fastq, PhredOffsetConfig::Fixed(v)) => Some(v),
        (RecordFormat::Fastq, PhredOffsetConfig::Auto) => Some(
            detect_phred_offset(&cfg.input)
                .with_context(|| "failed to auto-detect phred offset")?,
        ),
    };
    log_stage("engine.phred_detect", t_phred);

    let t_scan = Instant::now();
    let mut reader = RecordReader::open(&cfg.input, format, phred_offset.unwrap_or(33))?;
    let mut acc = SummaryAccumulator::new();
    for record in reader.by_ref() {
        let record =
            record.with_context(|| format!("failed to read {}", cfg.input.display()))?;
        acc.push(&record)
            .with_context(|| format!("invalid record in {}", cfg.input.display()))?;
    }
    let skipped_records = reader.skipped();
    log_stage("engine.scan", t_scan);

    let summary = acc.finish();
    info!(
        "{}: {} {} records, {} bases ({} skipped)",
        file_name,
        summary.n_seqs_or_reads,
        format.as_str(),
        summary.total_bases,
        skipped_records
    );
    log_stage("engine.total", t_total);

    Ok(RunOutput {
        summary,
        ctx: RunContext {
            file_name,
            sample_id: cfg.sample_id,
            batch: cfg.batch,
            format,
            phred_offset,
            skipped_records,
        },
    })
}

pub(crate) fn log_stage(name: &str, t: Instant) {
    debug!("stage={} time={}", name, fmt_dur(t.elapsed()));
}

pub(crate) fn fmt_dur(d: Duration) -> String {
    if d.as_secs_f64() < 1.0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.3}s", d.as_secs_f64())
    }
}

fn detect_phred_offset(path: &Path) -> Result<u8> {
    let reader = io::open_input(path)?;
    let Some((min_q, max_q)) = io::scan_qual_range(reader, AUTO_DETECT_READS)? else {
        return Ok(33);
    };
    // Heuristic: phred33 typically has low ASCII (<59); phred64 clusters higher.
    let offset = if min_q < 59 {
        33
    } else if min_q >= 64 {
        64
    } else if max_q <= 74 {
        33
    } else {
        64
    };
    debug!(
        "phred offset {} from quality range {}..={}",
        offset, min_q, max_q
    );
    Ok(offset)
}
