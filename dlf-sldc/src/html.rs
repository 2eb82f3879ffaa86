//! Load table extraction from the SLDC `Loaddata.aspx` page.
//!
//! The helpers are plain string scanning tailored to that page: they match
//! ASCII tag names case-insensitively and do not build a DOM.

use crate::error::{Result, SldcError};
use crate::row::RawRow;

/// Words that identify the load table among the page's layout tables.
pub const LOAD_TABLE_MARKERS: [&str; 3] = ["time", "delhi", "brpl"];

/// Find the next `<open ...>...</close>` block at or after `from`.
///
/// `lc` must be the ASCII-lowercased copy of the document so byte offsets
/// line up. Returns the start of the opening tag and the end of the closing tag.
fn next_block(lc: &str, open_tag: &str, close_tag: &str, from: usize) -> Option<(usize, usize)> {
    let start = lc.get(from..)?.find(open_tag)? + from;
    let open_end = lc[start..].find('>')? + start + 1;
    let end = lc[open_end..].find(close_tag)? + open_end + close_tag.len();
    Some((start, end))
}

/// Given a complete block like `<td ...>INNER</td>`, return INNER.
fn inner_of(block: &str) -> &str {
    match (block.find('>'), block.rfind('<')) {
        (Some(open_end), Some(close_start)) if close_start > open_end => {
            &block[open_end + 1..close_start]
        }
        _ => "",
    }
}

/// Remove all tags `<...>`, then collapse whitespace.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&out)
}

/// Minimal entity decoding: `&nbsp;` and `&amp;` only.
pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ").replace("&amp;", "&")
}

/// Collapse runs of whitespace into a single space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

fn cell_text(block: &str) -> String {
    normalize_ws(&normalize_entities(&strip_tags(inner_of(block))))
}

/// Locate the load table: the innermost `<table>` whose text mentions every
/// marker. Returns its byte span in the document.
fn find_load_table(html: &str, lc: &str) -> Option<(usize, usize)> {
    let mut found = None;
    let mut from = 0;
    while let Some((start, end)) = next_block(lc, "<table", "</table>", from) {
        let text = strip_tags(&lc[start..end]);
        if LOAD_TABLE_MARKERS.iter().all(|m| text.contains(m)) {
            found = Some((start, end));
        }
        // step into the table so nested tables are visited too
        from = start + 1;
        if from >= html.len() {
            break;
        }
    }
    found
}

/// Extract every data-bearing row of the load table.
///
/// Rows without `<td>` cells (header rows made of `<th>`) are skipped here;
/// everything else is handed to the row parser, which rejects non-data rows.
pub fn extract_load_rows(html: &str) -> Result<Vec<RawRow>> {
    let lc = html.to_ascii_lowercase();
    let (table_start, table_end) = find_load_table(html, &lc).ok_or(SldcError::TableNotFound)?;

    let mut rows = Vec::new();
    let mut from = table_start;
    while let Some((row_start, row_end)) = next_block(&lc, "<tr", "</tr>", from) {
        if row_end > table_end {
            break;
        }
        let mut cells = Vec::new();
        let mut cell_from = row_start;
        while let Some((cell_start, cell_end)) = next_block(&lc, "<td", "</td>", cell_from) {
            if cell_end > row_end {
                break;
            }
            cells.push(cell_text(&html[cell_start..cell_end]));
            cell_from = cell_end;
        }
        if !cells.is_empty() {
            rows.push(RawRow { cells });
        }
        from = row_end;
    }
    Ok(rows)
}
