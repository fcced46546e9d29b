use std::io::{self, Write};

use serde::Serialize;

use crate::core::batch::{BatchSummary, MatchResult};
use crate::core::matcher::DecodeFailure;

/// Receives batch results as they are produced
pub trait ReportSink {
    /// Non-fatal: a reference image was skipped
    fn decode_failure(&mut self, failure: &DecodeFailure) -> io::Result<()>;

    fn match_result(&mut self, result: &MatchResult) -> io::Result<()>;

    /// Called once after the last mystery image
    fn finish(&mut self, summary: &BatchSummary) -> io::Result<()>;
}

/// Plain sentences, one per line
pub struct TextReporter<W: Write> {
    out: W,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TextReporter<W> {
    fn decode_failure(&mut self, failure: &DecodeFailure) -> io::Result<()> {
        writeln!(self.out, "an error occurred decoding {}: {} skipping...", failure.candidate, failure.error)
    }

    fn match_result(&mut self, result: &MatchResult) -> io::Result<()> {
        writeln!(
            self.out,
            "the closest match to {} is {} with a score of {}",
            result.mystery,
            result.best.as_deref().unwrap_or("no match"),
            result.score
        )
    }

    fn finish(&mut self, _summary: &BatchSummary) -> io::Result<()> {
        self.out.flush()
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Record<'a> {
    Match(&'a MatchResult),
    DecodeFailure(&'a DecodeFailure),
    Summary {
        #[serde(flatten)]
        summary: &'a BatchSummary,
        generated_at: String,
    },
}

/// JSON lines, one object per event plus a trailing summary
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, record: &Record<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        writeln!(self.out)
    }
}

impl<W: Write> ReportSink for JsonReporter<W> {
    fn decode_failure(&mut self, failure: &DecodeFailure) -> io::Result<()> {
        self.emit(&Record::DecodeFailure(failure))
    }

    fn match_result(&mut self, result: &MatchResult) -> io::Result<()> {
        self.emit(&Record::Match(result))
    }

    fn finish(&mut self, summary: &BatchSummary) -> io::Result<()> {
        self.emit(&Record::Summary {
            summary,
            generated_at: chrono::Utc::now().to_rfc3339(),
        })?;
        self.out.flush()
    }
}
