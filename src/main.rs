fn main() -> anyhow::Result<()> {
    seq_qc::cli::run::entry()
}
