//! Parser for downloaded CSV reports.
//!
//! A report starts with a title line, followed by the column labels and then
//! the data rows. Only the first data row is turned into label/value pairs.

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use thiserror::Error;

const HEADER_ROW: usize = 1;
const DATA_ROW: usize = 2;

#[derive(Error, Debug)]
pub enum MalformedReport {
    #[error("report has {0} line(s), expected title, header and data")]
    TooShort(usize),
    #[error("report is not valid CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub label: String,
    pub value: String,
}

/// Label/value pairs of the first data row, in column order.
///
/// Pairing stops at the shorter of the header and data rows. The sequence
/// is consumed once; parse the raw text again to walk it a second time.
#[derive(Debug)]
pub struct ReportRows {
    labels: StringRecord,
    values: StringRecord,
    next: usize,
}

impl Iterator for ReportRows {
    type Item = ReportRow;

    fn next(&mut self) -> Option<ReportRow> {
        let label = self.labels.get(self.next)?;
        let value = self.values.get(self.next)?;
        self.next += 1;
        Some(ReportRow {
            label: label.to_string(),
            value: value.to_string(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .labels
            .len()
            .min(self.values.len())
            .saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ReportRows {}

impl std::iter::FusedIterator for ReportRows {}

pub fn parse(raw: &str) -> Result<ReportRows, MalformedReport> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());
    let mut records = reader
        .records()
        .take(DATA_ROW + 1)
        .collect::<Result<Vec<_>, _>>()?;
    if records.len() <= DATA_ROW {
        return Err(MalformedReport::TooShort(records.len()));
    }
    let values = records.swap_remove(DATA_ROW);
    let labels = records.swap_remove(HEADER_ROW);
    Ok(ReportRows {
        labels,
        values,
        next: 0,
    })
}
