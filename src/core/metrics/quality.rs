use crate::core::error::{MetricsError, Result};
use crate::core::model::Q30;

fn require<'a>(phred: impl Into<Option<&'a [u8]>>) -> Result<&'a [u8]> {
    let phred = phred.into().ok_or(MetricsError::MissingQualities)?;
    if phred.is_empty() {
        return Err(MetricsError::EmptyQualities);
    }
    Ok(phred)
}

pub fn mean_quality<'a>(phred: impl Into<Option<&'a [u8]>>) -> Result<f64> {
    let phred = require(phred)?;
    let sum: u64 = phred.iter().map(|&q| q as u64).sum();
    Ok(sum as f64 / phred.len() as f64)
}

/// Fraction of scores at or above Q30.
pub fn q30_fraction<'a>(phred: impl Into<Option<&'a [u8]>>) -> Result<f64> {
    let phred = require(phred)?;
    let hits = phred.iter().filter(|&&q| q >= Q30).count();
    Ok(hits as f64 / phred.len() as f64)
}
