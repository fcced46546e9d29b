pub mod report;

pub use report::{JsonReporter, ReportSink, TextReporter};
