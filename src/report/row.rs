use crate::core::engine::RunOutput;
use crate::core::model::Summary;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(u64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            // keep a fractional digit so floats stay distinguishable from counts
            Value::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{:.1}", v)
            }
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// One report row: metric name to value, iterated in sorted key order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QcRow {
    values: BTreeMap<String, Value>,
}

impl QcRow {
    pub fn from_summary(summary: &Summary) -> Self {
        let mut row = QcRow::default();
        row.insert("n_seqs_or_reads", Value::Int(summary.n_seqs_or_reads));
        row.insert("total_bases", Value::Int(summary.total_bases));
        row.insert("mean_len", Value::Float(summary.mean_len));
        row.insert("gc_fraction", Value::Float(summary.gc_fraction));
        row.insert("n_fraction", Value::Float(summary.n_fraction));
        if let Some(q) = summary.quality {
            row.insert("mean_qual", Value::Float(q.mean_qual));
            row.insert("q30_fraction", Value::Float(q.q30_fraction));
        }
        row
    }

    pub fn from_output(output: &RunOutput) -> Self {
        let mut row = Self::from_summary(&output.summary);
        row.insert("sample_id", Value::Text(output.ctx.sample_id.clone()));
        row.insert("batch", Value::Text(output.ctx.batch.clone()));
        row
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
