//! Report rendering for resolved sandbox records

use sandbox_idmap::ResolvedRecord;

const HEADERS: [&str; 5] = [
    "CONTAINER",
    "HOST START",
    "HOST END",
    "CONTAINER START",
    "CONTAINER END",
];

/// Render records as a bordered table. Numeric columns are right-aligned.
pub fn render_table(records: &[ResolvedRecord]) -> String {
    let rows: Vec<[String; 5]> = records
        .iter()
        .map(|r| {
            [
                r.name.clone(),
                r.host_start.to_string(),
                r.host_end.to_string(),
                r.namespace_start.to_string(),
                r.namespace_end.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let border = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line
    };

    let mut out = String::new();
    out.push_str(&border);
    out.push('\n');
    out.push('|');
    for (header, width) in HEADERS.iter().zip(&widths) {
        out.push_str(&format!(" {:^width$} |", header, width = *width));
    }
    out.push('\n');
    out.push_str(&border);
    out.push('\n');

    for row in &rows {
        out.push('|');
        for (col, (cell, width)) in row.iter().zip(&widths).enumerate() {
            if col == 0 {
                out.push_str(&format!(" {:<width$} |", cell, width = *width));
            } else {
                out.push_str(&format!(" {:>width$} |", cell, width = *width));
            }
        }
        out.push('\n');
    }
    if !rows.is_empty() {
        out.push_str(&border);
        out.push('\n');
    }

    out
}

pub fn render_json(records: &[ResolvedRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}
