use crate::core::error::Result;
use crate::core::metrics::validate::Alphabet;

pub fn seq_length<'a>(seq: impl Into<Option<&'a str>>) -> Result<usize> {
    Ok(Alphabet::ACGTN.validate(seq)?.len())
}

/// Fraction of G and C among all bases, in `[0, 1]`.
pub fn gc_fraction<'a>(seq: impl Into<Option<&'a str>>) -> Result<f64> {
    Ok(Alphabet::ACGTN.validate(seq)?.gc_fraction())
}

/// Fraction of ambiguous `N` calls, in `[0, 1]`.
pub fn n_fraction<'a>(seq: impl Into<Option<&'a str>>) -> Result<f64> {
    Ok(Alphabet::ACGTN.validate(seq)?.n_fraction())
}
