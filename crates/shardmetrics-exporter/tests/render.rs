#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use shardmetrics_core::catalog::registrations;
use shardmetrics_core::Sample;
use shardmetrics_exporter::render::render_text;

fn sample(name: &str, labels: &[&str], value: f64) -> Sample {
    let labels: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
    Sample::new(name, &labels, value)
}

#[test]
fn empty_snapshot_declares_whole_catalog() {
    let text = render_text(&registrations(), &[]);
    assert_eq!(text.matches("# HELP ").count(), 15);
    assert_eq!(text.matches("# TYPE ").count(), 15);
    assert!(text.contains("# TYPE index_shard_cpu_percent gauge\n"));
    assert!(!text.lines().any(|l| !l.starts_with('#')));
}

#[test]
fn samples_use_catalog_label_names() {
    let samples = vec![
        sample("coordinator_bulk_latency_millis_p99", &["a/b/_etc", "false"], 412.5),
        sample("index_shard_cpu_time_nanosecond", &["logs", "3", "search"], 1500.0),
    ];
    let text = render_text(&registrations(), &samples);

    assert!(text.contains(
        "coordinator_bulk_latency_millis_p99{index=\"a/b/_etc\",success=\"false\"} 412.5\n"
    ));
    assert!(text.contains(
        "index_shard_cpu_time_nanosecond{index=\"logs\",shard=\"3\",operation=\"search\"} 1500\n"
    ));
}

#[test]
fn samples_follow_their_type_line() {
    let samples = vec![sample("index_shard_memory_allocation_bytes", &["x", "0", "get"], 8.0)];
    let text = render_text(&registrations(), &samples);

    let type_at = text.find("# TYPE index_shard_memory_allocation_bytes gauge").unwrap();
    let sample_at = text.find("index_shard_memory_allocation_bytes{").unwrap();
    assert!(sample_at > type_at);
}

#[test]
fn label_values_are_escaped() {
    let samples = vec![sample("coordinator_search_latency_millis_count", &["we\"ird\\name\n", "true"], 1.0)];
    let text = render_text(&registrations(), &samples);
    assert!(text.contains(r#"index="we\"ird\\name\n""#));
}

#[test]
fn uncataloged_samples_get_positional_labels() {
    let samples = vec![sample("custom_reading", &["a", "b"], f64::INFINITY)];
    let text = render_text(&registrations(), &samples);
    assert!(text.contains("# TYPE custom_reading gauge\n"));
    assert!(text.contains("custom_reading{label0=\"a\",label1=\"b\"} +Inf\n"));
}
