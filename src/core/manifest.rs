use anyhow::{Context, Result, bail};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const REQUIRED: [&str; 3] = ["sample_id", "path", "batch"];

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Sample {
    pub sample_id: String,
    pub path: PathBuf,
    pub batch: String,
}

/// Load a `samples.tsv` manifest with `sample_id`, `path` and `batch` columns.
///
/// Relative paths are resolved against the manifest's own directory.
pub fn read_samples_tsv(path: &Path) -> Result<Vec<Sample>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    parse_samples(&text, base).with_context(|| format!("invalid manifest {}", path.display()))
}

/// A sample id names a single directory under the output dir, so it must be
/// non-empty and free of path separators, `..` and NUL.
pub fn check_sample_id(id: &str) -> Result<()> {
    if id.is_empty() {
        bail!("sample_id must not be empty");
    }
    if id.contains(['/', '\\', '\0']) || id.contains("..") {
        bail!("sample_id {:?} must not contain '/', '\\', '..' or NUL", id);
    }
    Ok(())
}

fn parse_samples(text: &str, base: &Path) -> Result<Vec<Sample>> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());

    let header: Vec<&str> = match lines.next() {
        Some((_, l)) => l.split('\t').map(str::trim).collect(),
        None => Vec::new(),
    };
    let mut cols = [0usize; REQUIRED.len()];
    for (slot, name) in cols.iter_mut().zip(REQUIRED) {
        match header.iter().position(|h| *h == name) {
            Some(i) => *slot = i,
            None => bail!("samples.tsv must contain columns: {}", REQUIRED.join(", ")),
        }
    }
    let [id_col, path_col, batch_col] = cols;

    let mut samples = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (idx, line) in lines {
        let fields: Vec<&str> = line.split('\t').collect();
        let field = |i: usize| -> Result<String> {
            fields
                .get(i)
                .map(|s| s.trim().to_string())
                .with_context(|| format!("line {}: expected at least {} columns", idx + 1, i + 1))
        };
        let sample_id = field(id_col)?;
        check_sample_id(&sample_id).with_context(|| format!("line {}", idx + 1))?;
        if let Some(first) = seen.insert(sample_id.clone(), idx + 1) {
            bail!(
                "line {}: duplicate sample_id {} (first seen on line {})",
                idx + 1,
                sample_id,
                first
            );
        }
        let raw_path = PathBuf::from(field(path_col)?);
        let path = if raw_path.is_absolute() {
            raw_path
        } else {
            base.join(raw_path)
        };
        samples.push(Sample {
            sample_id,
            path,
            batch: field(batch_col)?,
        });
    }
    Ok(samples)
}
