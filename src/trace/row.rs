use crate::Result;
use anyhow::Context;
use std::io::Read;

/// A single decoded row from the telemetry CSV.
///
/// Field 0 is the row kind tag (`TM_TRACK`, `TM_TICK`, `TM_TIMESPAN`,
/// `TM_ZONE`, ...). Rows may carry different numbers of fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRow(pub Vec<String>);

impl TraceRow {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(Into::into).collect())
    }

    pub fn tag(&self) -> &str {
        self.field_or_empty(0)
    }

    pub fn field(&self, idx: usize) -> Option<&str> {
        self.0.get(idx).map(String::as_str)
    }

    /// Missing trailing fields compare as the empty string.
    pub fn field_or_empty(&self, idx: usize) -> &str {
        self.field(idx).unwrap_or("")
    }
}

/// Decode CSV rows (no header line, flexible column counts).
///
/// Rows are yielded in file order; the position in the iterator is the
/// 0-indexed row number used in parse errors.
pub fn read_rows<R: Read>(reader: R) -> impl Iterator<Item = Result<TraceRow>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
        .into_records()
        .enumerate()
        .map(|(idx, record)| {
            let record = record.with_context(|| format!("decode CSV row {}", idx))?;
            Ok(TraceRow::new(record.iter()))
        })
}
