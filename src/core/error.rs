use std::path::PathBuf;

use thiserror::Error;

use crate::decoder::DecodeError;

/// Failures raised by the matching core
#[derive(Error, Debug)]
pub enum MatchError {
    /// The two signatures do not cover the same number of pixels.
    /// The matcher filters by dimensions first, so this means a broken invariant.
    #[error("pixel counts differ between the images: {left} vs {right}")]
    DimensionMismatch { left: u64, right: u64 },
}

/// Fatal failures of a batch run
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("cannot list directory {}", .dir.display())]
    Listing {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode mystery image {name}")]
    MysteryDecode {
        name: String,
        #[source]
        source: DecodeError,
    },

    #[error("matching {name} failed")]
    Match {
        name: String,
        #[source]
        source: MatchError,
    },

    #[error("cannot write report")]
    Report(#[from] std::io::Error),

    #[error("cannot build thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
