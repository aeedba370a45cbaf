//! Basic QC statistics for FASTA/FASTQ records.
//!
//! [`crate::core::metrics`] validates and scores sequences and reduces a record
//! stream into a [`crate::core::model::Summary`]; [`report`] writes it out as TSV,
//! HTML and run metadata; [`cli`] wires both behind the `seq-qc` binary.

pub mod cli;
pub mod core;
pub mod report;
