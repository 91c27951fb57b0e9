//! Row classification: decoded CSV rows to typed trace events.
//!
//! Recognized tags:
//!   TM_TRACK,<thread id>,Main Thread
//!   TM_TICK,...
//!   TM_TIMESPAN,<order>,<name>,<start ns>,<end ns>
//!   TM_ZONE,<thread id>,<method>::<...>::ln@<line>,<start ns>,<end ns>
//!
//! Everything else is ignored.

use crate::trace::error::TraceParseError;
use crate::trace::row::TraceRow;
use regex::Regex;
use serde::Serialize;

pub const TAG_TRACK: &str = "TM_TRACK";
pub const TAG_TICK: &str = "TM_TICK";
pub const TAG_TIMESPAN: &str = "TM_TIMESPAN";
pub const TAG_ZONE: &str = "TM_ZONE";

pub const MAIN_THREAD_NAME: &str = "Main Thread";

/// A higher-level interval of interest (e.g. one rendered frame).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timespan {
    pub name: String,
    pub order: i64,
    pub start_time_ns: i64,
    pub end_time_ns: i64,
}

/// One instrumented method invocation on the main thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodCall {
    pub name: String,
    pub line_number: u64,
    pub start_time_ns: i64,
    pub end_time_ns: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    Timespan(Timespan),
    MethodCall(MethodCall),
}

/// What to do when a second "Main Thread" track shows up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MainThreadPolicy {
    /// The latest declaration replaces the earlier one.
    #[default]
    LastWriteWins,
    /// A declaration naming a different thread is a parse error.
    Strict,
}

/// Tracks which thread id is the main thread.
#[derive(Debug, Clone, Default)]
pub struct ThreadRegistry {
    main_thread: Option<String>,
    policy: MainThreadPolicy,
}

impl ThreadRegistry {
    pub fn new(policy: MainThreadPolicy) -> Self {
        Self {
            main_thread: None,
            policy,
        }
    }

    pub fn main_thread(&self) -> Option<&str> {
        self.main_thread.as_deref()
    }

    pub fn is_main(&self, thread_id: &str) -> bool {
        self.main_thread() == Some(thread_id)
    }

    pub fn declare_main(&mut self, thread_id: &str, row: usize) -> Result<(), TraceParseError> {
        match (&self.main_thread, self.policy) {
            (Some(prev), MainThreadPolicy::Strict) if prev != thread_id => {
                return Err(TraceParseError::new(
                    row,
                    format!(
                        "found a second \"{}\" TM_TRACK for thread {:?}, but thread {:?} was already declared",
                        MAIN_THREAD_NAME, thread_id, prev
                    ),
                ));
            }
            (Some(prev), MainThreadPolicy::LastWriteWins) if prev != thread_id => {
                log::warn!(
                    "main thread redeclared at row {}: {:?} replaces {:?}",
                    row,
                    thread_id,
                    prev
                );
            }
            _ => {}
        }

        log::debug!("Found main thread {:?} at row {}", thread_id, row);
        self.main_thread = Some(thread_id.to_string());
        Ok(())
    }
}

/// Turns rows into events. Holds the compiled zone-name patterns so they are
/// built once per run rather than once per row.
#[derive(Debug, Clone)]
pub struct RowClassifier {
    zone_filter: String,
    method_name_re: Regex,
    line_number_re: Regex,
}

impl RowClassifier {
    pub fn new(zone_filter: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            zone_filter: zone_filter.into(),
            // Shortest non-empty prefix before the first following "::".
            method_name_re: Regex::new(r"^(.+?)::")?,
            line_number_re: Regex::new(r"::ln@([0-9]+)$")?,
        })
    }

    /// Classify one row. `row_idx` is the 0-indexed row number.
    ///
    /// May update `registry` (TM_TRACK), validate against it (TM_TICK), or
    /// consult it (TM_ZONE).
    pub fn classify(
        &self,
        row: &TraceRow,
        row_idx: usize,
        registry: &mut ThreadRegistry,
    ) -> Result<Option<TraceEvent>, TraceParseError> {
        match row.tag() {
            TAG_TRACK => {
                if row.field_or_empty(2) == MAIN_THREAD_NAME {
                    registry.declare_main(row.field_or_empty(1), row_idx)?;
                }
                Ok(None)
            }
            TAG_TICK => {
                if registry.main_thread().is_none() {
                    return Err(TraceParseError::new(
                        row_idx,
                        format!(
                            "expected to find a \"{}\" {} before the first {}, but did not",
                            MAIN_THREAD_NAME, TAG_TRACK, TAG_TICK
                        ),
                    ));
                }
                Ok(None)
            }
            TAG_TIMESPAN => {
                let order = parse_int_field(row, 1, "timespan order", row_idx)?;
                let start_time_ns = parse_int_field(row, 3, "timespan start time", row_idx)?;
                let end_time_ns = parse_int_field(row, 4, "timespan end time", row_idx)?;
                Ok(Some(TraceEvent::Timespan(Timespan {
                    name: row.field_or_empty(2).to_string(),
                    order,
                    start_time_ns,
                    end_time_ns,
                })))
            }
            TAG_ZONE => self.classify_zone(row, row_idx, registry),
            _ => Ok(None),
        }
    }

    fn classify_zone(
        &self,
        row: &TraceRow,
        row_idx: usize,
        registry: &ThreadRegistry,
    ) -> Result<Option<TraceEvent>, TraceParseError> {
        let zone_name = row.field_or_empty(2);
        if !registry.is_main(row.field_or_empty(1)) || !zone_name.contains(&self.zone_filter) {
            return Ok(None);
        }

        let unparseable = || {
            TraceParseError::new(
                row_idx,
                format!("could not parse the following {} row: {:?}", TAG_ZONE, row.0.join(",")),
            )
        };
        let name = self.method_name(zone_name).ok_or_else(unparseable)?;
        let line_number = self.line_number(zone_name).ok_or_else(unparseable)?;

        let start_time_ns = parse_int_field(row, 3, "zone start time", row_idx)?;
        let end_time_ns = parse_int_field(row, 4, "zone end time", row_idx)?;

        Ok(Some(TraceEvent::MethodCall(MethodCall {
            name: name.to_string(),
            line_number,
            start_time_ns,
            end_time_ns,
        })))
    }

    pub fn method_name<'a>(&self, zone_name: &'a str) -> Option<&'a str> {
        self.method_name_re
            .captures(zone_name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// `None` when the suffix is missing or the digits overflow.
    pub fn line_number(&self, zone_name: &str) -> Option<u64> {
        self.line_number_re
            .captures(zone_name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

fn parse_int_field(
    row: &TraceRow,
    idx: usize,
    what: &str,
    row_idx: usize,
) -> Result<i64, TraceParseError> {
    let raw = row.field_or_empty(idx);
    parse_truncating_int(raw).ok_or_else(|| {
        TraceParseError::new(
            row_idx,
            format!("{} (field {}) is not an integer: {:?}", what, idx, raw),
        )
    })
}

/// Leading-integer parse: optional whitespace and sign, then digits. Anything
/// after the digits (a fractional part, units) is dropped.
pub fn parse_truncating_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let sign_len = usize::from(text.starts_with(['-', '+']));
    let digits = &text[sign_len..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Parsed with its sign so that i64::MIN is in range.
    text[..sign_len + end].parse().ok()
}
