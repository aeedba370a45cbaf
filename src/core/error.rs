#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("sequence is missing")]
    MissingSequence,

    #[error("sequence is empty")]
    EmptySequence,

    #[error("invalid bases found: {}", fmt_bases(.bases))]
    InvalidBases { bases: Vec<char> },

    #[error("quality scores are missing")]
    MissingQualities,

    #[error("quality scores are empty")]
    EmptyQualities,

    #[error("record {seq_id}")]
    Record {
        seq_id: String,
        #[source]
        source: Box<MetricsError>,
    },
}

impl MetricsError {
    pub(crate) fn in_record(self, seq_id: &str) -> Self {
        MetricsError::Record {
            seq_id: seq_id.to_string(),
            source: Box::new(self),
        }
    }

    /// The per-sequence error, with any record wrapper stripped.
    pub fn root(&self) -> &MetricsError {
        match self {
            MetricsError::Record { source, .. } => source.root(),
            other => other,
        }
    }
}

fn fmt_bases(bases: &[char]) -> String {
    let quoted: Vec<String> = bases.iter().map(|c| format!("{:?}", c)).collect();
    format!("[{}]", quoted.join(", "))
}

pub type Result<T> = std::result::Result<T, MetricsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_bases_message_lists_each_char() {
        let err = MetricsError::InvalidBases {
            bases: vec!['X', 'Z'],
        };
        assert_eq!(err.to_string(), "invalid bases found: ['X', 'Z']");
    }

    #[test]
    fn record_wrapper_keeps_root() {
        let err = MetricsError::EmptySequence.in_record("r7");
        assert_eq!(err.to_string(), "record r7");
        assert_eq!(
            std::error::Error::source(&err).map(|e| e.to_string()),
            Some("sequence is empty".to_string())
        );
        assert_eq!(err.root(), &MetricsError::EmptySequence);
    }
}
