//! Markdown output for a [`ReportView`].

use std::fmt::Write as _;

use crate::structure::{ReportView, SectionBody, Table};

/// Render `view` as a markdown document ending in a single newline.
pub fn render_markdown(view: &ReportView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", view.title);
    for section in &view.sections {
        let _ = writeln!(out);
        let _ = writeln!(out, "## {}", section.title);
        let _ = writeln!(out);
        match &section.body {
            SectionBody::Table(table) => write_table(&mut out, table),
            SectionBody::Note { text } => {
                let _ = writeln!(out, "{}", text);
            }
        }
    }
    out
}

fn write_table(out: &mut String, table: &Table) {
    write_row(out, &table.header);
    let _ = writeln!(out, "|{}", " --- |".repeat(table.header.len()));
    for row in &table.rows {
        write_row(out, row);
    }
}

fn write_row(out: &mut String, cells: &[String]) {
    out.push('|');
    for cell in cells {
        let _ = write!(out, " {} |", escape_cell(cell));
    }
    out.push('\n');
}

/// Keep cell text from breaking the table layout.
fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace('\n', " ")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
