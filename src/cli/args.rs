use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "seq-qc", version, about = "Basic QC summary for FASTA/FASTQ files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// QC a single FASTA/FASTQ file
    Run(RunArgs),
    /// QC every sample listed in a samples.tsv manifest
    Batch(BatchArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Input FASTA/FASTQ file, optionally gzipped
    pub input: PathBuf,

    #[arg(long, default_value = "result")]
    pub outdir: PathBuf,

    /// Defaults to the input file stem
    #[arg(long)]
    pub sample_id: Option<String>,

    #[arg(long, default_value = "NA")]
    pub batch: String,

    #[arg(long, value_enum, default_value_t = PhredOffsetArg::P33)]
    pub phred_offset: PhredOffsetArg,
}

#[derive(Parser)]
pub struct BatchArgs {
    /// TSV with sample_id, path and batch columns
    pub samples: PathBuf,

    #[arg(long, default_value = "result")]
    pub outdir: PathBuf,

    #[arg(long, value_enum, default_value_t = PhredOffsetArg::P33)]
    pub phred_offset: PhredOffsetArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PhredOffsetArg {
    #[value(name = "auto")]
    Auto,
    #[value(name = "33")]
    P33,
    #[value(name = "64")]
    P64,
}
