use crate::report::{fmt_timestamp, now_unix};
use crate::report::tsv::{self, Table};
use anyhow::{Context, Result};
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;

/// Render the TSV at `tsv_path` as a standalone HTML table.
pub fn tsv_to_html(tsv_path: &Path, html_path: &Path, title: Option<&str>) -> Result<()> {
    let table = tsv::read_table(tsv_path)?;
    let page_title = match title {
        Some(t) => t.to_string(),
        None => tsv_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("qc")
            .to_string(),
    };
    let doc = render(&table, &page_title, &tsv_path.display().to_string(), now_unix())?;
    fs::write(html_path, doc).with_context(|| format!("failed to write {}", html_path.display()))
}

fn render(table: &Table, title: &str, source: &str, ts: u64) -> Result<String> {
    let mut html = String::with_capacity(8 * 1024);

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\"/>")?;
    writeln!(
        html,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"/>"
    )?;
    writeln!(html, "<title>{}</title>", escape_html(title))?;
    writeln!(html, "<style>")?;
    writeln!(
        html,
        "body{{font-family:Arial,Helvetica,sans-serif;margin:24px;color:#222;background:#fff;}}"
    )?;
    writeln!(html, "h1{{margin-bottom:6px;}}")?;
    writeln!(html, ".meta{{color:#555;margin-bottom:16px;}}")?;
    writeln!(html, "table{{border-collapse:collapse;width:100%;}}")?;
    writeln!(
        html,
        "th,td{{border:1px solid #ddd;padding:8px;text-align:left;}}"
    )?;
    writeln!(html, "th{{background:#f5f5f5;}}")?;
    writeln!(html, "tr:nth-child(even){{background:#fafafa;}}")?;
    writeln!(
        html,
        "code{{background:#f5f5f5;padding:2px 4px;border-radius:4px;}}"
    )?;
    writeln!(html, "</style>")?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;
    writeln!(html, "<h1>{}</h1>", escape_html(title))?;
    writeln!(
        html,
        "<div class=\"meta\">Generated: <code>{}</code><br/>Source: <code>{}</code></div>",
        fmt_timestamp(ts),
        escape_html(source)
    )?;

    if table.header.is_empty() {
        writeln!(html, "<p>No data found in TSV.</p>")?;
    } else {
        write_table(&mut html, table)?;
    }

    writeln!(html, "</body>")?;
    writeln!(html, "</html>")?;
    Ok(html)
}

fn write_table(html: &mut String, table: &Table) -> Result<()> {
    writeln!(html, "<table>")?;
    write!(html, "<thead><tr>")?;
    for h in &table.header {
        write!(html, "<th>{}</th>", escape_html(h))?;
    }
    writeln!(html, "</tr></thead>")?;
    writeln!(html, "<tbody>")?;
    if table.rows.is_empty() {
        writeln!(
            html,
            "<tr><td colspan=\"{}\">No rows</td></tr>",
            table.header.len()
        )?;
    }
    for row in &table.rows {
        write!(html, "<tr>")?;
        for cell in row {
            write!(html, "<td>{}</td>", escape_html(cell))?;
        }
        writeln!(html, "</tr>")?;
    }
    writeln!(html, "</tbody>")?;
    writeln!(html, "</table>")?;
    Ok(())
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
