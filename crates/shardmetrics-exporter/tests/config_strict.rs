#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use shardmetrics_exporter::config::{self, FlushMode};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
exporter:
  listen: "0.0.0.0:9108"
engine:
  relative_acuracy: 0.02 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "INVALID_CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.exporter.listen, "0.0.0.0:9108");
    assert_eq!(cfg.exporter.flush_mode, FlushMode::Scrape);
    assert_eq!(cfg.exporter.flush_interval_ms, 60_000);
    assert_eq!(cfg.engine.relative_accuracy, 0.01);
    assert_eq!(cfg.engine.max_index_labels, 3);
    assert!(cfg.engine.metrics_enabled);
    assert!(cfg.engine.resource_tracking_enabled);
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
exporter:
  listen: "127.0.0.1:9200"
  flush_mode: interval
  flush_interval_ms: 5000
engine:
  relative_accuracy: 0.02
  max_index_labels: 5
  metrics_enabled: true
  resource_tracking_enabled: false
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.exporter.flush_mode, FlushMode::Interval);
    assert_eq!(cfg.exporter.flush_interval_ms, 5000);
    assert_eq!(cfg.engine.max_index_labels, 5);
    assert!(!cfg.engine.resource_tracking_enabled);
}

#[test]
fn rejects_out_of_range_values() {
    let cases = [
        "version: 2\n",
        "version: 1\nexporter:\n  flush_interval_ms: 10\n",
        "version: 1\nexporter:\n  listen: \"not-an-addr\"\n",
        "version: 1\nexporter:\n  flush_mode: sometimes\n",
        "version: 1\nengine:\n  relative_accuracy: 0.0\n",
        "version: 1\nengine:\n  relative_accuracy: 0.7\n",
        "version: 1\nengine:\n  max_index_labels: 0\n",
        "version: 1\nengine:\n  max_index_labels: 33\n",
    ];
    for case in cases {
        let err = config::load_from_str(case).expect_err(case);
        assert_eq!(err.code().as_str(), "INVALID_CONFIG", "case={case}");
    }
}

#[test]
fn missing_file_is_internal_error() {
    let err = config::load_from_file("/nonexistent/shardmetrics.yaml").expect_err("must fail");
    assert_eq!(err.code().as_str(), "INTERNAL");
}
