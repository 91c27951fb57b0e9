//! Telemetry log ingestion: CSV rows, row classification, event collection.

pub mod error;
pub mod event;
pub mod parse;
pub mod row;

pub use event::{MainThreadPolicy, MethodCall, Timespan};
pub use parse::{CollectedTrace, parse_trace_file};
