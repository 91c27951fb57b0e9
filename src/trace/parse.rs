use crate::Result;
use crate::config::AnalysisConfig;
use crate::trace::error::TraceParseError;
use crate::trace::event::{MethodCall, RowClassifier, ThreadRegistry, Timespan, TraceEvent};
use crate::trace::row::{TraceRow, read_rows};
use anyhow::Context;
use std::fs::File;
use std::io::{self, BufReader, Read};

/// Emit a progress line every this many rows.
pub const ROW_LOG_INTERVAL: usize = 100_000;

/// State for one pass over a telemetry log.
///
/// Rows must be fed in file order. Nothing is matched until `finish`, so a
/// timespan that arrives after its calls (or before) is handled the same.
#[derive(Debug)]
pub struct AnalysisRun {
    classifier: RowClassifier,
    registry: ThreadRegistry,
    timespans: Vec<Timespan>,
    method_calls: Vec<MethodCall>,
    rows_seen: usize,
}

/// Everything collected from a finished run.
#[derive(Debug, Clone, Default)]
pub struct CollectedTrace {
    pub main_thread: Option<String>,
    pub rows_seen: usize,
    /// Arrival order.
    pub timespans: Vec<Timespan>,
    /// Arrival order.
    pub method_calls: Vec<MethodCall>,
}

impl AnalysisRun {
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        let classifier =
            RowClassifier::new(config.zone_filter.clone()).context("build zone name patterns")?;
        Ok(Self {
            classifier,
            registry: ThreadRegistry::new(config.main_thread_policy),
            timespans: Vec::new(),
            method_calls: Vec::new(),
            rows_seen: 0,
        })
    }

    /// Classify the next row. The row number is the count of rows fed so far.
    pub fn handle_row(&mut self, row: &TraceRow) -> std::result::Result<(), TraceParseError> {
        let row_idx = self.rows_seen;
        match self.classifier.classify(row, row_idx, &mut self.registry)? {
            Some(TraceEvent::Timespan(timespan)) => self.timespans.push(timespan),
            Some(TraceEvent::MethodCall(call)) => self.method_calls.push(call),
            None => {}
        }

        self.rows_seen += 1;
        if self.rows_seen % ROW_LOG_INTERVAL == 0 {
            log::debug!("Processing rows: {} seen", self.rows_seen);
        }
        Ok(())
    }

    pub fn finish(self) -> CollectedTrace {
        log::debug!(
            "Finished reading {} rows: {} timespans, {} method calls",
            self.rows_seen,
            self.timespans.len(),
            self.method_calls.len()
        );
        CollectedTrace {
            main_thread: self.registry.main_thread().map(str::to_string),
            rows_seen: self.rows_seen,
            timespans: self.timespans,
            method_calls: self.method_calls,
        }
    }
}

/// Read and collect a telemetry CSV file. `-` reads stdin.
pub fn parse_trace_file(path: &str, config: &AnalysisConfig) -> Result<CollectedTrace> {
    if path == "-" {
        return parse_trace_reader(io::stdin().lock(), config).context("read telemetry from stdin");
    }
    let file = File::open(path).with_context(|| format!("open telemetry file {}", path))?;
    parse_trace_reader(BufReader::new(file), config)
        .with_context(|| format!("read telemetry file {}", path))
}

pub fn parse_trace_reader<R: Read>(reader: R, config: &AnalysisConfig) -> Result<CollectedTrace> {
    let mut run = AnalysisRun::new(config)?;
    for row in read_rows(reader) {
        run.handle_row(&row?)?;
    }
    Ok(run.finish())
}
