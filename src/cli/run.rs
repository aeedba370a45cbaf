use crate::cli::args::{BatchArgs, Cli, Commands, PhredOffsetArg, RunArgs};
use crate::core::engine::{self, PhredOffsetConfig, RunConfig, fmt_dur, log_stage};
use crate::core::io::logical_stem;
use crate::core::manifest;
use crate::report::{self, row::QcRow, run_info::RunInfo};
use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub fn entry() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Batch(args) => batch(args),
    }
}

impl From<PhredOffsetArg> for PhredOffsetConfig {
    fn from(arg: PhredOffsetArg) -> Self {
        match arg {
            PhredOffsetArg::Auto => PhredOffsetConfig::Auto,
            PhredOffsetArg::P33 => PhredOffsetConfig::Fixed(33),
            PhredOffsetArg::P64 => PhredOffsetConfig::Fixed(64),
        }
    }
}

/// Files written for one QC run.
#[derive(Debug)]
pub struct SampleOutput {
    pub row: QcRow,
    pub run_json: PathBuf,
    pub qc_tsv: PathBuf,
    pub html: PathBuf,
}

fn run(args: RunArgs) -> Result<()> {
    let t0 = Instant::now();
    let out = run_sample(
        &args.input,
        &args.outdir,
        args.sample_id,
        args.batch,
        args.phred_offset.into(),
    )?;
    println!("done: {}", out.qc_tsv.display());
    info!("total={}", fmt_dur(t0.elapsed()));
    Ok(())
}

/// QC one input file into `out_dir`: `run.json`, `qc.tsv` and
/// `<sample_id>.html`.
pub fn run_sample(
    input: &Path,
    out_dir: &Path,
    sample_id: Option<String>,
    batch: String,
    phred_offset: PhredOffsetConfig,
) -> Result<SampleOutput> {
    stage("preflight", || {
        if !input.is_file() {
            bail!("input file not found: {}", input.display());
        }
        Ok(())
    })?;

    let sample_id = match sample_id {
        Some(s) => s,
        None => logical_stem(input).context("failed to determine sample id from input file")?,
    };
    manifest::check_sample_id(&sample_id)?;

    let t_out = Instant::now();
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output dir {}", out_dir.display()))?;
    let run_json = out_dir.join("run.json");
    report::run_info::write(&run_json, &RunInfo::new(input, out_dir))?;
    log_stage("run-info", t_out);

    let config = RunConfig {
        input: input.to_path_buf(),
        sample_id: sample_id.clone(),
        batch,
        phred_offset,
    };
    let t_engine = Instant::now();
    let output = engine::run(config)?;
    log_stage("engine", t_engine);

    let row = QcRow::from_output(&output);
    let qc_tsv = out_dir.join("qc.tsv");
    let html = out_dir.join(format!("{}.html", sample_id));

    let t_report = Instant::now();
    report::tsv::write_row(&qc_tsv, &row)?;
    report::html::tsv_to_html(&qc_tsv, &html, Some(output.ctx.file_name.as_str()))?;
    log_stage("report", t_report);

    Ok(SampleOutput {
        row,
        run_json,
        qc_tsv,
        html,
    })
}

fn batch(args: BatchArgs) -> Result<()> {
    let t0 = Instant::now();
    let table = run_batch(&args.samples, &args.outdir, args.phred_offset.into())?;
    println!("done: {}", table.display());
    info!("total={}", fmt_dur(t0.elapsed()));
    Ok(())
}

/// QC every manifest sample into `<out_dir>/<sample_id>/`, then write the
/// combined `qc.tsv` and `qc.html` into `out_dir`. Returns the combined TSV path.
pub fn run_batch(
    manifest_path: &Path,
    out_dir: &Path,
    phred_offset: PhredOffsetConfig,
) -> Result<PathBuf> {
    let samples = manifest::read_samples_tsv(manifest_path)?;
    info!(
        "{} samples in {}",
        samples.len(),
        manifest_path.display()
    );

    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output dir {}", out_dir.display()))?;
    report::run_info::write(
        &out_dir.join("run.json"),
        &RunInfo::new(manifest_path, out_dir),
    )?;

    let mut rows = Vec::with_capacity(samples.len());
    for sample in samples {
        let sample_dir = out_dir.join(&sample.sample_id);
        let out = run_sample(
            &sample.path,
            &sample_dir,
            Some(sample.sample_id.clone()),
            sample.batch,
            phred_offset,
        )
        .with_context(|| format!("sample {} failed", sample.sample_id))?;
        rows.push(out.row);
    }

    let qc_tsv = out_dir.join("qc.tsv");
    let html = out_dir.join("qc.html");
    report::tsv::write_table(&qc_tsv, &rows)?;
    let title = manifest_path.file_name().and_then(|s| s.to_str());
    report::html::tsv_to_html(&qc_tsv, &html, title)?;
    Ok(qc_tsv)
}

fn stage<F>(name: &str, f: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    let t = Instant::now();
    let res = f();
    log_stage(name, t);
    res
}
