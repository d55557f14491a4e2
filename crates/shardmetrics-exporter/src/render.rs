//! Prometheus text exposition (format 0.0.4) for flushed samples.
//!
//! Every catalog entry is declared with `# HELP` and `# TYPE ... gauge`, even
//! when the snapshot holds no sample for it. Values are per-flush readings, so
//! everything is a gauge from the scraper's point of view.

use std::collections::HashMap;
use std::fmt::Write;

use shardmetrics_core::{MetricRegistration, Sample};

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

fn write_sample(out: &mut String, sample: &Sample, label_names: &[&str]) {
    let label_str = sample
        .labels
        .iter()
        .enumerate()
        .map(|(i, v)| match label_names.get(i) {
            Some(name) => format!("{}=\"{}\"", name, escape_label(v)),
            None => format!("label{}=\"{}\"", i, escape_label(v)),
        })
        .collect::<Vec<_>>()
        .join(",");
    if label_str.is_empty() {
        let _ = writeln!(out, "{} {}", sample.name, format_value(sample.value));
    } else {
        let _ = writeln!(out, "{}{{{}}} {}", sample.name, label_str, format_value(sample.value));
    }
}

/// Render the catalog plus one snapshot's samples.
pub fn render_text(registrations: &[MetricRegistration], samples: &[Sample]) -> String {
    let mut by_name: HashMap<&str, Vec<&Sample>> = HashMap::new();
    let mut uncataloged: Vec<&str> = Vec::new();
    for sample in samples {
        let group = by_name.entry(sample.name.as_str()).or_default();
        if group.is_empty() && !registrations.iter().any(|r| r.name == sample.name) {
            uncataloged.push(sample.name.as_str());
        }
        group.push(sample);
    }

    let mut out = String::new();
    for reg in registrations {
        let _ = writeln!(out, "# HELP {} {}", reg.name, escape_help(&reg.help));
        let _ = writeln!(out, "# TYPE {} gauge", reg.name);
        for sample in by_name.get(reg.name.as_str()).into_iter().flatten() {
            write_sample(&mut out, sample, reg.labels);
        }
    }

    for name in uncataloged {
        let _ = writeln!(out, "# TYPE {} gauge", name);
        for sample in by_name.get(name).into_iter().flatten() {
            write_sample(&mut out, sample, &[]);
        }
    }
    out
}
