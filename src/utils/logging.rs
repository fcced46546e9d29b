//! Log setup on top of log4rs
//!
//! Diagnostics go to stderr so stdout carries only the match report.
//! An optional file appender mirrors everything into a log file.

use std::path::Path;

use anyhow::{Context, Result};
use log::LevelFilter;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};

/// Map `-v` / `-q` counts onto a level; default is warn.
pub fn level_from_flags(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init_log(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{h({l:<5})} {t} - {m}{n}")))
        .build();

    let mut config = Config::builder().appender(Appender::builder().build("stderr", Box::new(stderr)));
    let mut root = Root::builder().appender("stderr");

    if let Some(path) = log_file {
        let file = FileAppender::builder()
            .append(false)
            .encoder(Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S)} {l} {t} {m}{n}")))
            .build(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        config = config.appender(Appender::builder().build("logfile", Box::new(file)));
        root = root.appender("logfile");
    }

    let config = config
        .build(root.build(level))
        .context("Invalid logging configuration")?;
    log4rs::init_config(config).context("Logger already initialized")?;
    Ok(())
}
