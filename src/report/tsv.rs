use crate::report::row::QcRow;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Header row of sorted keys followed by one value row.
pub fn write_row(path: &Path, row: &QcRow) -> Result<()> {
    write_table(path, std::slice::from_ref(row))
}

/// Rows over the sorted union of their keys; a key missing from a row is an
/// empty cell.
pub fn write_table(path: &Path, rows: &[QcRow]) -> Result<()> {
    write_rows(path, rows).with_context(|| format!("failed to write {}", path.display()))
}

fn write_rows(path: &Path, rows: &[QcRow]) -> std::io::Result<()> {
    let keys: BTreeSet<&str> = rows.iter().flat_map(|r| r.keys()).collect();
    let mut w = BufWriter::new(File::create(path)?);

    let header: Vec<&str> = keys.iter().copied().collect();
    writeln!(w, "{}", header.join("\t"))?;
    for row in rows {
        let cells: Vec<String> = keys
            .iter()
            .map(|k| row.get(k).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        writeln!(w, "{}", cells.join("\t"))?;
    }
    w.flush()
}

pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn read_table(path: &Path) -> Result<Table> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mut lines = text
        .lines()
        .map(|l| l.split('\t').map(str::to_string).collect::<Vec<String>>());
    let header = lines.next().unwrap_or_default();
    Ok(Table {
        header,
        rows: lines.collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::row::Value;

    #[test]
    fn union_of_keys_with_blank_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qc.tsv");

        let mut a = QcRow::default();
        a.insert("sample_id", Value::Text("A".into()));
        a.insert("mean_qual", Value::Float(35.5));
        let mut b = QcRow::default();
        b.insert("sample_id", Value::Text("B".into()));
        write_table(&path, &[a, b]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "mean_qual\tsample_id\n35.5\tA\n\tB\n");

        let table = read_table(&path).unwrap();
        assert_eq!(table.header, vec!["mean_qual", "sample_id"]);
        assert_eq!(table.rows[1], vec!["", "B"]);
    }

    #[test]
    fn write_error_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_row(&dir.path().join("missing/qc.tsv"), &QcRow::default()).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.starts_with("failed to write "), "{}", msg);
        assert!(msg.contains("missing/qc.tsv"), "{}", msg);
    }
}
