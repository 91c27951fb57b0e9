//! Aggregation model: reduce the containment relation to the two report
//! tables (per timespan, per source line).

pub mod precision;

use crate::matcher::ContainmentMatcher;
use crate::trace::{CollectedTrace, MethodCall};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

pub const NANOSECONDS_IN_MILLISECOND: f64 = 1e6;
pub const DURATION_PRECISION: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimespanView {
    /// Position after sorting by start time.
    pub order: usize,
    pub name: String,
    /// Order key as written in the log.
    pub source_order: i64,
    pub start_time_ns: i64,
    pub end_time_ns: i64,
    pub duration_ms: String,

    /// All main-thread calls inside the timespan.
    pub call_count: usize,
    /// Calls inside the timespan whose name matches the method name regex.
    pub queried_call_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineView {
    pub line_number: u64,
    pub call_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalsView {
    pub rows_seen: usize,
    pub timespans: usize,
    pub method_calls: usize,
    pub queried_calls: usize,
    /// Queried calls that fall inside no timespan (excluded from `lines`).
    pub queried_calls_outside_timespans: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportData {
    pub main_thread: Option<String>,
    pub method_name_regex: String,
    /// Sorted by start time.
    pub timespans: Vec<TimespanView>,
    /// Sorted by call count, ascending.
    pub lines: Vec<LineView>,
    pub totals: TotalsView,
}

/// Build report data from a finished collection pass.
pub fn build_report_data(trace: &CollectedTrace, method_name_filter: &Regex) -> ReportData {
    let matcher = ContainmentMatcher::new(&trace.timespans, &trace.method_calls);
    let is_queried = |call: &MethodCall| method_name_filter.is_match(&call.name);

    if log::log_enabled!(log::Level::Trace) {
        dump_collected(trace, &matcher, method_name_filter);
    }

    // 1) Per-timespan table. Stable sort: equal start times keep log order.
    let mut sorted: Vec<_> = trace.timespans.iter().collect();
    sorted.sort_by_key(|t| t.start_time_ns);

    let timespans: Vec<TimespanView> = sorted
        .into_iter()
        .enumerate()
        .map(|(order, timespan)| {
            let calls = matcher.calls_in(timespan);
            // Widened: the difference of two i64 timestamps can overflow.
            let duration_ns =
                i128::from(timespan.end_time_ns) - i128::from(timespan.start_time_ns);
            TimespanView {
                order,
                name: timespan.name.clone(),
                source_order: timespan.order,
                start_time_ns: timespan.start_time_ns,
                end_time_ns: timespan.end_time_ns,
                duration_ms: precision::to_precision(
                    duration_ns as f64 / NANOSECONDS_IN_MILLISECOND,
                    DURATION_PRECISION,
                ),
                call_count: calls.len(),
                queried_call_count: calls.iter().filter(|&&c| is_queried(c)).count(),
            }
        })
        .collect();

    // 2) Per-line table over queried calls that sit inside some timespan.
    let contained = matcher.contained_anywhere();
    let mut per_line: BTreeMap<u64, usize> = BTreeMap::new();
    let mut queried_calls = 0usize;
    let mut outside = 0usize;
    for (call, inside) in trace.method_calls.iter().zip(contained) {
        if !is_queried(call) {
            continue;
        }
        queried_calls += 1;
        if inside {
            *per_line.entry(call.line_number).or_default() += 1;
        } else {
            outside += 1;
        }
    }

    let mut lines: Vec<LineView> = per_line
        .into_iter()
        .map(|(line_number, call_count)| LineView {
            line_number,
            call_count,
        })
        .collect();
    // Stable: equal counts stay in line-number order.
    lines.sort_by_key(|l| l.call_count);

    ReportData {
        main_thread: trace.main_thread.clone(),
        method_name_regex: method_name_filter.as_str().to_string(),
        timespans,
        lines,
        totals: TotalsView {
            rows_seen: trace.rows_seen,
            timespans: trace.timespans.len(),
            method_calls: trace.method_calls.len(),
            queried_calls,
            queried_calls_outside_timespans: outside,
        },
    }
}

/// Names of calls that look like render calls but are not selected by the
/// filter. Useful when a regex is tighter than intended.
fn other_render_calls<'a>(calls: &'a [MethodCall], filter: &Regex) -> Vec<&'a str> {
    calls
        .iter()
        .filter(|c| c.name.contains("render") && !filter.is_match(&c.name))
        .map(|c| c.name.as_str())
        .collect()
}

fn dump_collected(trace: &CollectedTrace, matcher: &ContainmentMatcher<'_>, filter: &Regex) {
    let non_matching = trace
        .method_calls
        .iter()
        .filter(|c| !filter.is_match(&c.name))
        .count();
    let other_render = other_render_calls(&trace.method_calls, filter);
    log::trace!(
        "timespans: {}",
        serde_json::to_string(&trace.timespans).unwrap_or_default()
    );
    log::trace!(
        "method calls: {}",
        serde_json::to_string(&trace.method_calls).unwrap_or_default()
    );
    log::trace!(
        "{} of {} method calls do not match {:?}",
        non_matching,
        trace.method_calls.len(),
        filter.as_str()
    );
    log::trace!(
        "{} other render calls: {:?}",
        other_render.len(),
        other_render
    );

    for call in trace.method_calls.iter().filter(|c| filter.is_match(&c.name)) {
        let spans: Vec<&str> = matcher
            .timespans_containing(call)
            .into_iter()
            .map(|t| t.name.as_str())
            .collect();
        log::trace!(
            "{} (line {}, {}..{}ns) is inside {:?}",
            call.name,
            call.line_number,
            call.start_time_ns,
            call.end_time_ns,
            spans
        );
    }
}
