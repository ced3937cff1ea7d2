//! The subscriber is global, so this file holds a single test.

use std::fs;

use county_cli::logging::{LogConfig, LogFormat, SharedFileWriter, init_logging_with_writer};
use tempfile::TempDir;
use tracing::level_filters::LevelFilter;

#[test]
fn json_logs_respect_the_crate_level() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("county.log");
    let file = fs::File::create(&path).unwrap();
    let mut config = LogConfig::default()
        .with_level(LevelFilter::INFO)
        .with_format(LogFormat::Json)
        .with_ansi(false);
    config.use_env_filter = false;
    init_logging_with_writer(&config, SharedFileWriter::new(file));

    tracing::info!(target: "county_core::merge", counties = 3, "merged feature table");
    tracing::debug!(target: "county_core::merge", "hidden at info");

    let written = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 1);
    let event: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(event["level"], "INFO");
    assert_eq!(event["fields"]["message"], "merged feature table");
    assert_eq!(event["fields"]["counties"], 3);
}
