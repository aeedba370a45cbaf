use crate::report::{fmt_timestamp, now_unix};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

pub const TOOL: &str = "seq-qc";

/// Metadata written to `run.json` before any QC work starts.
#[derive(Debug, Serialize)]
pub struct RunInfo {
    pub tool: &'static str,
    pub tool_version: &'static str,
    pub input: String,
    pub outdir: String,
    pub time: String,
}

impl RunInfo {
    pub fn new(input: &Path, outdir: &Path) -> Self {
        Self {
            tool: TOOL,
            tool_version: env!("CARGO_PKG_VERSION"),
            input: input.display().to_string(),
            outdir: outdir.display().to_string(),
            time: fmt_timestamp(now_unix()),
        }
    }
}

pub fn write(path: &Path, info: &RunInfo) -> Result<()> {
    let json = serde_json::to_string_pretty(info).context("failed to serialise run info")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_expected_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let info = RunInfo::new(Path::new("in.fq"), Path::new("result"));
        write(&path, &info).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["tool"], "seq-qc");
        assert_eq!(value["tool_version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(value["input"], "in.fq");
        assert_eq!(value["outdir"], "result");
        assert!(value["time"].as_str().unwrap().ends_with("UTC"));
    }
}
