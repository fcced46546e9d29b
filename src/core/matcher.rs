use std::path::PathBuf;
use std::sync::Arc;

use log::{trace, warn};
use rayon::prelude::*;
use serde::Serialize;

use super::cache::{CachedReference, SignatureCache};
use super::error::MatchError;
use super::scorer::score;
use super::signature::{PixelGrid, Signature};
use crate::decoder::ImageSource;

/// A reference image that a mystery image may be matched against
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub path: PathBuf,
}

impl Candidate {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// A candidate that could not be decoded and was skipped
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DecodeFailure {
    pub candidate: String,
    pub error: String,
}

/// Best candidate for one mystery image.
///
/// `best` is `None` when no candidate shared the mystery's dimensions, every
/// such candidate failed to decode, or none overlapped at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BestMatch {
    pub best: Option<String>,
    pub score: u64,
    /// Candidate decode failures, in candidate order
    pub failures: Vec<DecodeFailure>,
}

enum Scan {
    Skipped,
    DecodeFailed(String),
    Scored(u64),
}

/// Ranks candidates against a mystery image by histogram intersection.
///
/// Candidates are scanned on the current rayon pool; outcomes are folded in
/// input order so the first candidate to reach the top score keeps it.
pub struct Matcher<'a, S: ImageSource + ?Sized> {
    source: &'a S,
    cache: Option<&'a SignatureCache>,
}

impl<'a, S: ImageSource + ?Sized> Matcher<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source, cache: None }
    }

    pub fn with_cache(mut self, cache: &'a SignatureCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn find_best_match<G: PixelGrid + ?Sized>(
        &self,
        mystery: &G,
        candidates: &[Candidate],
    ) -> Result<BestMatch, MatchError> {
        let target = mystery.dimensions();
        let mystery_sig = Signature::build(mystery);

        let scans: Vec<Result<Scan, MatchError>> = candidates
            .par_iter()
            .map(|candidate| self.scan(candidate, target, &mystery_sig))
            .collect();

        let mut best = BestMatch {
            best: None,
            score: 0,
            failures: Vec::new(),
        };

        for (candidate, scan) in candidates.iter().zip(scans) {
            match scan? {
                Scan::Skipped => {
                    trace!("{}: dimensions differ from {}x{}, skipped", candidate.name, target.0, target.1);
                }
                Scan::DecodeFailed(error) => {
                    warn!("cannot decode {}: {}", candidate.name, error);
                    best.failures.push(DecodeFailure {
                        candidate: candidate.name.clone(),
                        error,
                    });
                }
                // Strictly greater: ties keep the earlier candidate, and zero never wins
                Scan::Scored(rank) if rank > best.score => {
                    best.score = rank;
                    best.best = Some(candidate.name.clone());
                }
                Scan::Scored(_) => {}
            }
        }

        Ok(best)
    }

    fn scan(&self, candidate: &Candidate, target: (u32, u32), mystery: &Signature) -> Result<Scan, MatchError> {
        let signature = match self.cache {
            Some(cache) => match &*cache.get_or_load(self.source, &candidate.path) {
                CachedReference::Failed(error) => return Ok(Scan::DecodeFailed(error.clone())),
                CachedReference::Decoded { dimensions, .. } if *dimensions != target => {
                    return Ok(Scan::Skipped)
                }
                CachedReference::Decoded { signature, .. } => Arc::clone(signature),
            },
            None => {
                let image = match self.source.decode(&candidate.path) {
                    Ok(image) => image,
                    Err(e) => return Ok(Scan::DecodeFailed(e.to_string())),
                };
                if PixelGrid::dimensions(&image) != target {
                    return Ok(Scan::Skipped);
                }
                Arc::new(Signature::build(&image))
            }
        };

        score(mystery, &signature).map(Scan::Scored)
    }
}
