//! Report output: text tables for the terminal, or JSON.

pub mod json;
pub mod table;

pub use json::render_json_report;

use crate::model::ReportData;
use table::{Align, Table};

pub const TIMESPAN_HEAD: [&str; 6] = [
    "Order",
    "Name",
    "Start Time (ns)",
    "Duration (ms)",
    "Count of all method calls",
    "Count of Queried Method Calls",
];

pub const LINE_HEAD: [&str; 2] = ["Line Number", "Count of Queried Method Calls"];

/// Per-timespan table followed by the per-line table.
pub fn render_text_report(data: &ReportData) -> String {
    let mut out = String::new();
    out.push_str(&timespan_table(data).render());
    out.push('\n');
    out.push_str(&line_table(data).render());

    if data.totals.queried_calls_outside_timespans > 0 {
        out.push_str(&format!(
            "\n{} of {} calls matching {:?} are not inside any timespan.\n",
            data.totals.queried_calls_outside_timespans,
            data.totals.queried_calls,
            data.method_name_regex
        ));
    }
    out
}

fn timespan_table(data: &ReportData) -> Table {
    let mut table = Table::new(TIMESPAN_HEAD)
        .align(0, Align::Right)
        .align(2, Align::Right)
        .align(3, Align::Right)
        .align(4, Align::Right)
        .align(5, Align::Right);

    for t in &data.timespans {
        table.push([
            t.order.to_string(),
            t.name.clone(),
            t.start_time_ns.to_string(),
            t.duration_ms.clone(),
            t.call_count.to_string(),
            t.queried_call_count.to_string(),
        ]);
    }
    table
}

fn line_table(data: &ReportData) -> Table {
    let mut table = Table::new(LINE_HEAD)
        .align(0, Align::Right)
        .align(1, Align::Right);
    for l in &data.lines {
        table.push([l.line_number.to_string(), l.call_count.to_string()]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::model::build_report_data;
    use crate::trace::parse::parse_trace_reader;
    use pretty_assertions::assert_eq;

    fn sample_report() -> ReportData {
        let config = AnalysisConfig::new("^render$").unwrap();
        let trace = parse_trace_reader(
            include_str!("../trace/testdata/sample.csv").as_bytes(),
            &config,
        )
        .unwrap();
        build_report_data(&trace, &config.method_name_filter)
    }

    #[test]
    fn render_sample_trace() {
        let expected = "\
┌───────┬─────────┬─────────────────┬───────────────┬───────────────────────────┬───────────────────────────────┐
│ Order │ Name    │ Start Time (ns) │ Duration (ms) │ Count of all method calls │ Count of Queried Method Calls │
├───────┼─────────┼─────────────────┼───────────────┼───────────────────────────┼───────────────────────────────┤
│     0 │ Frame 1 │         1000000 │          16.7 │                         3 │                             2 │
│     1 │ Frame 2 │        17666667 │          16.7 │                         1 │                             1 │
│     2 │ Frame 3 │        34333334 │          1.00 │                         0 │                             0 │
└───────┴─────────┴─────────────────┴───────────────┴───────────────────────────┴───────────────────────────────┘

┌─────────────┬───────────────────────────────┐
│ Line Number │ Count of Queried Method Calls │
├─────────────┼───────────────────────────────┤
│          88 │                             1 │
│          42 │                             2 │
└─────────────┴───────────────────────────────┘

1 of 4 calls matching \"^render$\" are not inside any timespan.
";
        assert_eq!(render_text_report(&sample_report()), expected);
    }

    #[test]
    fn empty_report_still_prints_headers() {
        let data = build_report_data(
            &Default::default(),
            &regex::Regex::new("^render$").unwrap(),
        );
        let out = render_text_report(&data);
        assert!(out.contains("Count of all method calls"));
        assert!(out.contains("Line Number"));
        assert!(!out.contains("not inside any timespan"));
    }
}
