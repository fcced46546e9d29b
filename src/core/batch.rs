use std::path::Path;
use std::time::Instant;

use log::{debug, info};
use serde::Serialize;

use super::cache::SignatureCache;
use super::error::BatchError;
use super::matcher::{Candidate, Matcher};
use crate::decoder::ImageSource;
use crate::renderer::ReportSink;
use crate::utils::file_utils;

/// Settings for one batch run
#[derive(Clone, Copy, Debug)]
pub struct MatchConfig {
    /// Worker threads for the candidate scan; 1 scans sequentially
    pub threads: usize,
    /// Keep reference signatures between mystery images
    pub cache: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get().max(1),
            cache: false,
        }
    }
}

/// Outcome reported for each mystery image
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub mystery: String,
    pub best: Option<String>,
    pub score: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub mysteries: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub decode_failures: usize,
}

pub struct BatchDriver<'a, S: ImageSource + ?Sized> {
    source: &'a S,
    config: MatchConfig,
}

impl<'a, S: ImageSource + ?Sized> BatchDriver<'a, S> {
    pub fn new(source: &'a S, config: MatchConfig) -> Self {
        Self { source, config }
    }

    /// Match every file in `inputs_dir` against every file in `flags_dir`.
    pub fn run_dirs(
        &self,
        flags_dir: &Path,
        inputs_dir: &Path,
        sink: &mut dyn ReportSink,
    ) -> Result<BatchSummary, BatchError> {
        let flags = list_entries(flags_dir)?;
        let inputs = list_entries(inputs_dir)?;
        info!(
            "{} reference images in {}, {} mystery images in {}",
            flags.len(),
            flags_dir.display(),
            inputs.len(),
            inputs_dir.display()
        );
        self.run(&inputs, &flags, sink)
    }

    /// Match each mystery against the full reference list, reporting as it goes.
    ///
    /// A mystery that cannot be decoded aborts the run; reference decode
    /// failures are reported and skipped.
    pub fn run(
        &self,
        mysteries: &[Candidate],
        references: &[Candidate],
        sink: &mut dyn ReportSink,
    ) -> Result<BatchSummary, BatchError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads.max(1))
            .build()?;
        let cache = self.config.cache.then(SignatureCache::new);

        let mut matcher = Matcher::new(self.source);
        if let Some(cache) = cache.as_ref() {
            matcher = matcher.with_cache(cache);
        }

        let mut summary = BatchSummary::default();

        for mystery in mysteries {
            let started = Instant::now();
            let image = self
                .source
                .decode(&mystery.path)
                .map_err(|source| BatchError::MysteryDecode {
                    name: mystery.name.clone(),
                    source,
                })?;

            let best = pool
                .install(|| matcher.find_best_match(&image, references))
                .map_err(|source| BatchError::Match {
                    name: mystery.name.clone(),
                    source,
                })?;

            for failure in &best.failures {
                sink.decode_failure(failure)?;
            }
            summary.decode_failures += best.failures.len();

            let result = MatchResult {
                mystery: mystery.name.clone(),
                best: best.best,
                score: best.score,
            };
            debug!(
                "{} -> {:?} ({}) in {:?}",
                result.mystery,
                result.best,
                result.score,
                started.elapsed()
            );
            sink.match_result(&result)?;

            summary.mysteries += 1;
            if result.best.is_some() {
                summary.matched += 1;
            } else {
                summary.unmatched += 1;
            }
        }

        if let Some(cache) = cache.as_ref() {
            debug!("signature cache holds {} references", cache.len());
        }
        info!(
            "processed {} mystery images: {} matched, {} unmatched, {} candidate decode failures",
            summary.mysteries, summary.matched, summary.unmatched, summary.decode_failures
        );
        sink.finish(&summary)?;

        Ok(summary)
    }
}

fn list_entries(dir: &Path) -> Result<Vec<Candidate>, BatchError> {
    let files = file_utils::list_files(dir).map_err(|source| BatchError::Listing {
        dir: dir.to_path_buf(),
        source,
    })?;
    Ok(files
        .into_iter()
        .map(|path| Candidate::new(file_utils::display_name(&path), path))
        .collect())
}
