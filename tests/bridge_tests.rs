// The `log` backend is process-global, so this file holds a single test.

use log::{debug, error, info, warn};
use queue_logger::{init_log_bridge, EasyLoggerConfig, LoggerRegistry, Severity};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_log_macros_reach_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bridge.log");
    let registry = LoggerRegistry::new();
    let easy = EasyLoggerConfig::new(&path)
        .logger_name("bridge")
        .level(Severity::Info)
        .pattern("{level} {name} {message}")
        .install(&registry)
        .unwrap();

    init_log_bridge(easy.logger().clone()).unwrap();
    assert!(init_log_bridge(easy.logger().clone()).is_err());

    debug!("filtered out");
    info!("started {} workers", 3);
    warn!("slow");
    error!("failed: {}", "timeout");

    easy.close();
    easy.join();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "INFO bridge started 3 workers",
            "WARNING bridge slow",
            "ERROR bridge failed: timeout",
        ]
    );
}
