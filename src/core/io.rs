use crate::core::model::{MAX_Q, Record, RecordFormat};
use anyhow::{Context, Result, bail};
use flate2::read::MultiGzDecoder;
use log::warn;
use memmap2::Mmap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;

pub struct MmapSource {
    mmap: Mmap,
}

impl MmapSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        // SAFETY: read-only file mapping.
        let mmap = unsafe { Mmap::map(&file) }.with_context(|| "mmap failed")?;
        Ok(Self { mmap })
    }

    pub fn into_reader(self) -> Cursor<Mmap> {
        Cursor::new(self.mmap)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputKind {
    Plain,
    Gzip,
}

pub fn detect_input_kind(path: &Path) -> Result<InputKind> {
    if has_gz_extension(path) {
        return Ok(InputKind::Gzip);
    }
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut magic = [0u8; 2];
    let n = file
        .read(&mut magic)
        .with_context(|| "failed to read magic bytes")?;
    if n == 2 && magic == [0x1f, 0x8b] {
        Ok(InputKind::Gzip)
    } else {
        Ok(InputKind::Plain)
    }
}

fn has_gz_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// File name with a trailing `.gz` removed, used for format and sample naming.
pub fn logical_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    if has_gz_extension(path) {
        Some(name[..name.len() - 3].to_string())
    } else {
        Some(name.to_string())
    }
}

/// Logical file name without its last extension, e.g. `a.fastq.gz` -> `a`.
pub fn logical_stem(path: &Path) -> Option<String> {
    let name = logical_name(path)?;
    let stem = Path::new(&name).file_stem()?.to_str()?.to_string();
    Some(stem)
}

pub fn detect_format(path: &Path) -> Result<RecordFormat> {
    let ext = logical_name(path)
        .as_deref()
        .map(Path::new)
        .and_then(|p| p.extension())
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    match ext.as_deref() {
        Some("fa" | "fasta" | "fna") => Ok(RecordFormat::Fasta),
        Some("fq" | "fastq") => Ok(RecordFormat::Fastq),
        _ => bail!("unsupported file format: {}", path.display()),
    }
}

pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = match detect_input_kind(path)? {
        InputKind::Plain => {
            let len = fs::metadata(path)
                .with_context(|| format!("failed to stat {}", path.display()))?
                .len();
            if len == 0 {
                Box::new(std::io::empty())
            } else {
                Box::new(MmapSource::open(path)?.into_reader())
            }
        }
        InputKind::Gzip => {
            let file =
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            Box::new(BufReader::new(MultiGzDecoder::new(BufReader::new(file))))
        }
    };
    Ok(reader)
}

struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
    line_no: u64,
}

impl<R: BufRead> LineReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            line_no: 0,
        }
    }

    /// Reads the next line into `self.buf` without its line terminator.
    fn next_line(&mut self) -> Result<bool> {
        self.buf.clear();
        let n = self
            .inner
            .read_until(b'\n', &mut self.buf)
            .with_context(|| format!("read error after line {}", self.line_no))?;
        if n == 0 {
            return Ok(false);
        }
        self.line_no += 1;
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        }
        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }
        Ok(true)
    }

    fn line(&self) -> &[u8] {
        &self.buf
    }
}

fn header_id(header: &[u8]) -> String {
    let text = String::from_utf8_lossy(&header[1..]);
    text.split_whitespace().next().unwrap_or("").to_string()
}

fn sequence_text(line: &[u8]) -> String {
    String::from_utf8_lossy(line).to_uppercase()
}

pub struct FastaReader<R> {
    lines: LineReader<R>,
    pending_header: Option<Vec<u8>>,
    done: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            lines: LineReader::new(inner),
            pending_header: None,
            done: false,
        }
    }

    fn read_record(&mut self) -> Result<Option<Record>> {
        let header = match self.pending_header.take() {
            Some(h) => h,
            None => loop {
                if !self.lines.next_line()? {
                    return Ok(None);
                }
                let line = self.lines.line();
                if line.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                if line[0] != b'>' {
                    bail!(
                        "FASTA data before first header at line {}",
                        self.lines.line_no
                    );
                }
                break line.to_vec();
            },
        };

        let mut seq = Vec::new();
        while self.lines.next_line()? {
            let line = self.lines.line();
            if line.first() == Some(&b'>') {
                self.pending_header = Some(line.to_vec());
                break;
            }
            seq.extend(line.iter().copied().filter(|b| !b.is_ascii_whitespace()));
        }

        Ok(Some(Record::new(header_id(&header), sequence_text(&seq), None)))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let res = self.read_record().transpose();
        if !matches!(res, Some(Ok(_))) {
            self.done = true;
        }
        res
    }
}

struct RawFastq {
    id: String,
    seq: Vec<u8>,
    qual: Vec<u8>,
}

fn expect_line<R: BufRead>(lines: &mut LineReader<R>, what: &str) -> Result<()> {
    if !lines.next_line()? {
        bail!(
            "truncated FASTQ record: missing {} line after line {}",
            what,
            lines.line_no
        );
    }
    Ok(())
}

/// Next FASTQ record as raw bytes. Sequence lines run up to the `+` line.
/// A one-line sequence takes exactly one quality line; a wrapped sequence
/// takes quality lines until they cover its length.
fn next_raw<R: BufRead>(lines: &mut LineReader<R>) -> Result<Option<RawFastq>> {
    let header = loop {
        if !lines.next_line()? {
            return Ok(None);
        }
        if !lines.line().is_empty() {
            break lines.line().to_vec();
        }
    };
    let header_line = lines.line_no;
    if header[0] != b'@' {
        bail!(
            "FASTQ record at line {} does not start with '@'",
            header_line
        );
    }

    let mut seq = Vec::new();
    let mut seq_lines = 0usize;
    loop {
        expect_line(lines, "separator")?;
        let line = lines.line();
        if line.first() == Some(&b'+') {
            break;
        }
        seq.extend_from_slice(line);
        seq_lines += 1;
    }

    expect_line(lines, "quality")?;
    let mut qual = lines.line().to_vec();
    if seq_lines > 1 {
        while qual.len() < seq.len() && lines.next_line()? {
            qual.extend_from_slice(lines.line());
        }
    }

    Ok(Some(RawFastq {
        id: header_id(&header),
        seq,
        qual,
    }))
}

pub struct FastqReader<R> {
    lines: LineReader<R>,
    phred_offset: u8,
    skipped: u64,
    done: bool,
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(inner: R, phred_offset: u8) -> Self {
        Self {
            lines: LineReader::new(inner),
            phred_offset,
            skipped: 0,
            done: false,
        }
    }

    /// Records dropped because their quality line could not be used.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn decode_qual(&self, qual: &[u8]) -> Option<Vec<u8>> {
        let lo = self.phred_offset;
        let hi = self.phred_offset.saturating_add(MAX_Q);
        qual.iter()
            .map(|&b| (lo..=hi).contains(&b).then(|| b - lo))
            .collect()
    }

    fn read_record(&mut self) -> Result<Option<Record>> {
        while let Some(raw) = next_raw(&mut self.lines)? {
            if raw.seq.len() != raw.qual.len() {
                warn!(
                    "skipping FASTQ record {}: sequence length {} != quality length {}",
                    raw.id,
                    raw.seq.len(),
                    raw.qual.len()
                );
                self.skipped += 1;
                continue;
            }
            match self.decode_qual(&raw.qual) {
                Some(scores) => {
                    return Ok(Some(Record::new(raw.id, sequence_text(&raw.seq), Some(scores))));
                }
                None => {
                    warn!(
                        "skipping FASTQ record {}: quality out of range for offset {}",
                        raw.id, self.phred_offset
                    );
                    self.skipped += 1;
                }
            }
        }
        Ok(None)
    }
}

impl<R: BufRead> Iterator for FastqReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let res = self.read_record().transpose();
        if !matches!(res, Some(Ok(_))) {
            self.done = true;
        }
        res
    }
}

/// Pull-based record source over a FASTA or FASTQ input.
pub enum RecordReader {
    Fasta(FastaReader<Box<dyn BufRead>>),
    Fastq(FastqReader<Box<dyn BufRead>>),
}

impl RecordReader {
    pub fn open(path: &Path, format: RecordFormat, phred_offset: u8) -> Result<Self> {
        let input = open_input(path)?;
        Ok(match format {
            RecordFormat::Fasta => RecordReader::Fasta(FastaReader::new(input)),
            RecordFormat::Fastq => RecordReader::Fastq(FastqReader::new(input, phred_offset)),
        })
    }

    pub fn skipped(&self) -> u64 {
        match self {
            RecordReader::Fasta(_) => 0,
            RecordReader::Fastq(r) => r.skipped(),
        }
    }
}

impl Iterator for RecordReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            RecordReader::Fasta(r) => r.next(),
            RecordReader::Fastq(r) => r.next(),
        }
    }
}

/// Min and max quality bytes over the first `max_records` FASTQ records.
pub fn scan_qual_range<R: BufRead>(reader: R, max_records: usize) -> Result<Option<(u8, u8)>> {
    let mut lines = LineReader::new(reader);
    let mut range: Option<(u8, u8)> = None;
    let mut records = 0usize;
    while records < max_records {
        let Some(raw) = next_raw(&mut lines)? else {
            break;
        };
        records += 1;
        for &b in &raw.qual {
            range = Some(match range {
                Some((lo, hi)) => (lo.min(b), hi.max(b)),
                None => (b, b),
            });
        }
    }
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fasta(text: &str) -> Vec<Record> {
        FastaReader::new(text.as_bytes())
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn fasta_multi_line_records() {
        let recs = fasta(">seq1 first one\nAT\ncg\n\n>seq2\nGGTT\n");
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0], Record::new("seq1", "ATCG", None));
        assert_eq!(recs[1], Record::new("seq2", "GGTT", None));
    }

    #[test]
    fn fasta_without_trailing_newline_and_crlf() {
        let recs = fasta(">s1\r\nATCG\r\n>s2\r\nNN");
        assert_eq!(recs[0].sequence, "ATCG");
        assert_eq!(recs[1].sequence, "NN");
    }

    #[test]
    fn fasta_header_with_no_sequence_is_kept() {
        let recs = fasta(">empty\n>s2\nAC\n");
        assert_eq!(recs[0].sequence, "");
        assert_eq!(recs[1].seq_id, "s2");
    }

    #[test]
    fn fasta_rejects_leading_data() {
        let mut reader = FastaReader::new("ACGT\n>s1\nAC\n".as_bytes());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn fastq_decodes_phred33() {
        let mut reader = FastqReader::new("@r1 extra\nacgt\n+\nII#5\n".as_bytes(), 33);
        let rec = reader.next().unwrap().unwrap();
        assert_eq!(rec.seq_id, "r1");
        assert_eq!(rec.sequence, "ACGT");
        assert_eq!(rec.qualities, Some(vec![40, 40, 2, 20]));
        assert!(reader.next().is_none());
    }

    #[test]
    fn fastq_skips_unusable_quality() {
        let text = "@r1\nACGT\n+\nIIII\n@r2\nACGT\n+\nI\n@r3\nACGT\n+\nII I\n@r4\nAC\n+\nII";
        let mut reader = FastqReader::new(text.as_bytes(), 33);
        let ids: Vec<String> = reader.by_ref().map(|r| r.unwrap().seq_id).collect();
        assert_eq!(ids, vec!["r1", "r4"]);
        assert_eq!(reader.skipped(), 2);
    }

    #[test]
    fn fastq_phred64_rejects_low_bytes() {
        let mut reader = FastqReader::new("@r1\nAC\n+\nh5\n@r2\nAC\n+\nhh\n".as_bytes(), 64);
        let rec = reader.next().unwrap().unwrap();
        assert_eq!(rec.seq_id, "r2");
        assert_eq!(rec.qualities, Some(vec![40, 40]));
        assert_eq!(reader.skipped(), 1);
    }

    #[test]
    fn fastq_truncated_record_is_an_error() {
        let mut reader = FastqReader::new("@r1\nACGT\n+\n".as_bytes(), 33);
        let err = reader.next().unwrap().unwrap_err();
        assert!(err.to_string().contains("missing quality line"));
        assert!(reader.next().is_none());
    }

    #[test]
    fn fastq_missing_separator_is_an_error() {
        let mut reader = FastqReader::new("@r1\nACGT\nIIII\n".as_bytes(), 33);
        let err = reader.next().unwrap().unwrap_err();
        assert!(err.to_string().contains("missing separator line"));
    }

    #[test]
    fn fastq_wrapped_record() {
        // second quality line starts with '@' and is still quality
        let text = "@r1\nACGT\nGG\n+r1\nIIII\n@@\n@r2\nAC\n+\nII\n";
        let mut reader = FastqReader::new(text.as_bytes(), 33);
        let rec = reader.next().unwrap().unwrap();
        assert_eq!(rec.seq_id, "r1");
        assert_eq!(rec.sequence, "ACGTGG");
        assert_eq!(rec.qualities, Some(vec![40, 40, 40, 40, 31, 31]));
        assert_eq!(reader.next().unwrap().unwrap().seq_id, "r2");
        assert!(reader.next().is_none());
        assert_eq!(reader.skipped(), 0);
    }

    #[test]
    fn fastq_wrapped_record_with_short_quality_is_skipped() {
        let mut reader = FastqReader::new("@r1\nACGT\nGG\n+\nIIII\n".as_bytes(), 33);
        assert!(reader.next().is_none());
        assert_eq!(reader.skipped(), 1);
    }

    #[test]
    fn fastq_bad_header_is_an_error() {
        let mut reader = FastqReader::new(">r1\nACGT\n+\nIIII\n".as_bytes(), 33);
        assert!(reader.next().unwrap().is_err());
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(detect_format(Path::new("a.fa")).unwrap(), RecordFormat::Fasta);
        assert_eq!(detect_format(Path::new("a.FNA")).unwrap(), RecordFormat::Fasta);
        assert_eq!(detect_format(Path::new("a.fq")).unwrap(), RecordFormat::Fastq);
        assert_eq!(
            detect_format(Path::new("dir/a.fastq.gz")).unwrap(),
            RecordFormat::Fastq
        );
        assert!(detect_format(Path::new("a.txt")).is_err());
        assert!(detect_format(Path::new("a.gz")).is_err());
    }

    #[test]
    fn stems_ignore_gz() {
        assert_eq!(logical_stem(Path::new("x/s1.fastq.gz")).unwrap(), "s1");
        assert_eq!(logical_stem(Path::new("s2.fa")).unwrap(), "s2");
    }

    #[test]
    fn qual_range_scan() {
        let text = "@r1\nAC\n+\n5I\n@r2\nAC\n+\n#(\n@r3\nAC\n+\n!!\n";
        assert_eq!(scan_qual_range(text.as_bytes(), 2).unwrap(), Some((b'#', b'I')));
        assert_eq!(scan_qual_range("".as_bytes(), 10).unwrap(), None);
        let wrapped = "@r1\nAC\nGT\n+\n5I\n!I\n";
        assert_eq!(scan_qual_range(wrapped.as_bytes(), 1).unwrap(), Some((b'!', b'I')));
    }
}
