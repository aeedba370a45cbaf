use crate::core::error::{MetricsError, Result};
use std::collections::BTreeSet;

/// Set of characters a normalised sequence may contain.
#[derive(Clone, Copy, Debug)]
pub struct Alphabet {
    bases: &'static [u8],
}

impl Alphabet {
    pub const ACGTN: Alphabet = Alphabet { bases: b"ACGTN" };

    pub fn contains(&self, c: char) -> bool {
        c.is_ascii() && self.bases.contains(&(c as u8))
    }

    pub fn validate<'a>(&self, seq: impl Into<Option<&'a str>>) -> Result<ValidSequence> {
        let seq = seq.into().ok_or(MetricsError::MissingSequence)?;
        let normalised = seq.trim().to_uppercase();
        if normalised.is_empty() {
            return Err(MetricsError::EmptySequence);
        }

        let bad: BTreeSet<char> = normalised.chars().filter(|&c| !self.contains(c)).collect();
        if !bad.is_empty() {
            return Err(MetricsError::InvalidBases {
                bases: bad.into_iter().collect(),
            });
        }

        Ok(ValidSequence(normalised))
    }
}

/// A trimmed, uppercased sequence made only of alphabet characters.
///
/// All per-sequence metrics are computed from this one value so they agree on
/// the sequence length.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidSequence(String);

impl ValidSequence {
    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn gc_fraction(&self) -> f64 {
        let gc = self.count(|b| b == b'G' || b == b'C');
        gc as f64 / self.len() as f64
    }

    pub fn n_fraction(&self) -> f64 {
        self.count(|b| b == b'N') as f64 / self.len() as f64
    }

    fn count(&self, pred: impl Fn(u8) -> bool) -> usize {
        self.0.bytes().filter(|&b| pred(b)).count()
    }
}

/// Trim and uppercase `seq`, then check it against [`Alphabet::ACGTN`].
pub fn validate_sequence<'a>(seq: impl Into<Option<&'a str>>) -> Result<String> {
    Alphabet::ACGTN.validate(seq).map(ValidSequence::into_string)
}
