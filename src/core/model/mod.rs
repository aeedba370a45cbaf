/// One sequence as produced by a FASTA or FASTQ reader.
///
/// `qualities` is `Some` only for FASTQ records, in which case the reader has
/// already checked that it is as long as `sequence`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    pub seq_id: String,
    pub sequence: String,
    pub qualities: Option<Vec<u8>>,
}

impl Record {
    pub fn new(
        seq_id: impl Into<String>,
        sequence: impl Into<String>,
        qualities: Option<Vec<u8>>,
    ) -> Self {
        Self {
            seq_id: seq_id.into(),
            sequence: sequence.into(),
            qualities,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordFormat {
    Fasta,
    Fastq,
}

impl RecordFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordFormat::Fasta => "fasta",
            RecordFormat::Fastq => "fastq",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualitySummary {
    pub mean_qual: f64,
    pub q30_fraction: f64,
}

/// Result of a single aggregation pass over a record stream.
///
/// Every mean and fraction is the mean of the per-record values, not a ratio
/// pooled over all bases.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub n_seqs_or_reads: u64,
    pub total_bases: u64,
    pub mean_len: f64,
    pub gc_fraction: f64,
    pub n_fraction: f64,
    pub quality: Option<QualitySummary>,
}

impl Summary {
    pub fn empty() -> Self {
        Self {
            n_seqs_or_reads: 0,
            total_bases: 0,
            mean_len: 0.0,
            gc_fraction: 0.0,
            n_fraction: 0.0,
            quality: None,
        }
    }
}

pub const Q30: u8 = 30;
pub const MAX_Q: u8 = 93;
