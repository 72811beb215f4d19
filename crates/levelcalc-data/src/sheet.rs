//! CSV sheets exported from the season spreadsheets.
//!
//! Parsing goes through the `csv` crate; this module only strips a leading
//! byte-order mark, normalizes header names with [`normalize_header`] and
//! drops records whose cells are all empty.

use csv::{ReaderBuilder, StringRecord, Trim};

use levelcalc_core::material::normalize_header;

/// A parsed sheet: normalized headers plus raw, trimmed cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvSheet {
    pub headers: Vec<String>,
    /// `(line number, cells)`; line numbers are 1-based and count the header.
    pub records: Vec<(usize, Vec<String>)>,
}

impl CsvSheet {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell text at `column`, empty when the record is short.
    pub fn cell<'a>(&self, record: &'a [String], column: usize) -> &'a str {
        record.get(column).map(String::as_str).unwrap_or("")
    }
}

fn line_of(record: &StringRecord) -> usize {
    record
        .position()
        .map(|pos| pos.line() as usize)
        .unwrap_or_default()
}

pub fn parse(text: &str) -> Result<CsvSheet, csv::Error> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Ok(CsvSheet::default());
    }

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        records.push((line_of(&record), record.iter().map(str::to_string).collect()));
    }
    Ok(CsvSheet { headers, records })
}
