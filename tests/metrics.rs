use seq_qc::core::error::MetricsError;
use seq_qc::core::metrics::{
    gc_fraction, mean_quality, n_fraction, q30_fraction, seq_length, summarise_records,
    validate_sequence,
};
use seq_qc::core::model::{Record, Summary};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

#[test]
fn normalisation_strips_and_uppercases() {
    let cases = [
        ("  acgt  ", "ACGT"),
        ("\nNnAaCcGgTt\t", "NNAACCGGTT"),
        ("a", "A"),
    ];
    for (raw, expected) in cases {
        let seq = validate_sequence(raw).unwrap();
        assert_eq!(seq, expected);
        assert!(!seq.contains(char::is_whitespace));
        assert_eq!(seq_length(raw).unwrap(), expected.len());
    }
}

#[test]
fn per_sequence_examples() {
    assert!(approx(gc_fraction("ACGT").unwrap(), 0.5));
    assert!(approx(gc_fraction("ACNN").unwrap(), 0.25));
    assert!(approx(n_fraction("ACNN").unwrap(), 0.5));
    assert!(matches!(
        gc_fraction("ACGTX"),
        Err(MetricsError::InvalidBases { .. })
    ));
    assert_eq!(seq_length(""), Err(MetricsError::EmptySequence));
}

#[test]
fn quality_examples() {
    assert!(approx(mean_quality(&[30u8, 30, 40, 10][..]).unwrap(), 27.5));
    assert!(approx(q30_fraction(&[29u8, 30, 40, 10][..]).unwrap(), 0.5));
    assert_eq!(
        mean_quality(None::<&[u8]>),
        Err(MetricsError::MissingQualities)
    );
    assert_eq!(
        q30_fraction(&Vec::<u8>::new()[..]),
        Err(MetricsError::EmptyQualities)
    );
}

#[test]
fn fasta_summary() {
    let out = summarise_records([
        Record::new("r1", "ACGT", None),
        Record::new("r2", "AANN", None),
    ])
    .unwrap();
    assert_eq!(out.n_seqs_or_reads, 2);
    assert_eq!(out.total_bases, 8);
    assert!(approx(out.mean_len, 4.0));
    assert!(approx(out.gc_fraction, 0.25));
    assert!(approx(out.n_fraction, 0.25));
    assert!(out.quality.is_none());
}

#[test]
fn fastq_summary_means_per_record_values() {
    let out = summarise_records([
        Record::new("r1", "ACGT", Some(vec![30, 30, 30, 30])),
        Record::new("r2", "GGGG", Some(vec![40, 40, 20, 20])),
    ])
    .unwrap();
    let q = out.quality.expect("quality keys present");
    assert!(approx(q.mean_qual, (30.0 + 30.0) / 2.0));
    assert!(approx(q.q30_fraction, (1.0 + 0.5) / 2.0));
}

#[test]
fn empty_stream_is_zero_filled() {
    let out = summarise_records(std::iter::empty::<Record>()).unwrap();
    assert_eq!(out, Summary::empty());
}

#[test]
fn hundred_lazy_records() {
    let out = summarise_records((0..100).map(|i| Record::new(format!("r{}", i), "ACGT", None)))
        .unwrap();
    assert_eq!(out.n_seqs_or_reads, 100);
    assert!(approx(out.gc_fraction, 0.5));
}
