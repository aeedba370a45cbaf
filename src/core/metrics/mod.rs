use crate::core::error::{MetricsError, Result};
use crate::core::model::{QualitySummary, Record, Summary};
use std::borrow::Borrow;

mod quality;
mod sequence;
mod validate;

pub use quality::{mean_quality, q30_fraction};
pub use sequence::{gc_fraction, n_fraction, seq_length};
pub use validate::{Alphabet, ValidSequence, validate_sequence};

/// Running sums for one pass over a record stream.
///
/// Holds no per-record state, so memory stays constant however many records
/// are pushed.
#[derive(Clone, Debug, Default)]
pub struct SummaryAccumulator {
    n: u64,
    total_bases: u64,
    sum_gc: f64,
    sum_n: f64,
    sum_mean_qual: f64,
    sum_q30: f64,
    has_qual: bool,
}

impl SummaryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: &Record) -> Result<()> {
        self.update(record)
            .map_err(|e| e.in_record(&record.seq_id))
    }

    fn update(&mut self, record: &Record) -> Result<()> {
        let seq = Alphabet::ACGTN.validate(record.sequence.as_str())?;
        let gc = seq.gc_fraction();
        let n_frac = seq.n_fraction();

        let qual = match record.qualities.as_deref() {
            Some(q) => Some((mean_quality(q)?, q30_fraction(q)?)),
            None => None,
        };

        self.n += 1;
        self.total_bases += seq.len() as u64;
        self.sum_gc += gc;
        self.sum_n += n_frac;
        if let Some((mean_q, q30)) = qual {
            self.has_qual = true;
            self.sum_mean_qual += mean_q;
            self.sum_q30 += q30;
        }
        Ok(())
    }

    pub fn finish(self) -> Summary {
        if self.n == 0 {
            return Summary::empty();
        }
        let n = self.n as f64;
        let quality = self.has_qual.then(|| QualitySummary {
            mean_qual: self.sum_mean_qual / n,
            q30_fraction: self.sum_q30 / n,
        });
        Summary {
            n_seqs_or_reads: self.n,
            total_bases: self.total_bases,
            mean_len: self.total_bases as f64 / n,
            gc_fraction: self.sum_gc / n,
            n_fraction: self.sum_n / n,
            quality,
        }
    }
}

/// Reduce `records` to one [`Summary`] in a single forward pass.
///
/// The first invalid record aborts the whole summary.
pub fn summarise_records<I>(records: I) -> Result<Summary>
where
    I: IntoIterator,
    I::Item: Borrow<Record>,
{
    let mut acc = SummaryAccumulator::new();
    for record in records {
        acc.push(record.borrow())?;
    }
    Ok(acc.finish())
}

/// Like [`summarise_records`] for a fallible record source, such as a file
/// reader. Reader errors and metric errors both stop the pass.
pub fn try_summarise_records<I, E>(records: I) -> std::result::Result<Summary, E>
where
    I: IntoIterator<Item = std::result::Result<Record, E>>,
    E: From<MetricsError>,
{
    let mut acc = SummaryAccumulator::new();
    for record in records {
        acc.push(&record?)?;
    }
    Ok(acc.finish())
}
