//! Fixed metric catalog published at startup.
//!
//! Exporters use it to declare help/type lines even before any key has been
//! observed for a metric.

pub const SEARCH_LATENCY_METRIC_PREFIX: &str = "coordinator_search_latency_millis";
pub const BULK_LATENCY_METRIC_PREFIX: &str = "coordinator_bulk_latency_millis";

pub const COUNT_METRIC_SUFFIX: &str = "_count";
pub const AVERAGE_METRIC_SUFFIX: &str = "_average";
pub const P50_METRIC_SUFFIX: &str = "_p50";
pub const P90_METRIC_SUFFIX: &str = "_p90";
pub const P95_METRIC_SUFFIX: &str = "_p95";
pub const P99_METRIC_SUFFIX: &str = "_p99";

/// Histogram suffixes in export order. The quantile suffixes line up with
/// `sketch::EXPORTED_QUANTILES`.
pub const HISTOGRAM_SUFFIXES: [&str; 6] = [
    COUNT_METRIC_SUFFIX,
    AVERAGE_METRIC_SUFFIX,
    P50_METRIC_SUFFIX,
    P90_METRIC_SUFFIX,
    P95_METRIC_SUFFIX,
    P99_METRIC_SUFFIX,
];

pub const INDEX_SHARD_CPU_TIME_METRIC: &str = "index_shard_cpu_time_nanosecond";
/// Derived at flush from the CPU time counter; never recorded directly.
pub const INDEX_SHARD_CPU_PERCENT_METRIC: &str = "index_shard_cpu_percent";
pub const INDEX_SHARD_MEMORY_ALLOCATION_METRIC: &str = "index_shard_memory_allocation_bytes";

pub const LATENCY_LABELS: &[&str] = &["index", "success"];
pub const RESOURCE_LABELS: &[&str] = &["index", "shard", "operation"];

/// Latency histogram families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LatencyFamily {
    Search,
    Bulk,
}

impl LatencyFamily {
    pub const ALL: [LatencyFamily; 2] = [LatencyFamily::Search, LatencyFamily::Bulk];

    pub fn prefix(self) -> &'static str {
        match self {
            LatencyFamily::Search => SEARCH_LATENCY_METRIC_PREFIX,
            LatencyFamily::Bulk => BULK_LATENCY_METRIC_PREFIX,
        }
    }
}

/// One catalog entry: `(name, label names, help)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRegistration {
    pub name: String,
    pub labels: &'static [&'static str],
    pub help: String,
}

fn latency_help(family: LatencyFamily, suffix: &str) -> String {
    let what = match family {
        LatencyFamily::Search => "coordinator search",
        LatencyFamily::Bulk => "coordinator bulk and multi-search",
    };
    let stat = match suffix {
        COUNT_METRIC_SUFFIX => "number of completed requests",
        AVERAGE_METRIC_SUFFIX => "average latency in milliseconds",
        P50_METRIC_SUFFIX => "50th percentile latency in milliseconds",
        P90_METRIC_SUFFIX => "90th percentile latency in milliseconds",
        P95_METRIC_SUFFIX => "95th percentile latency in milliseconds",
        _ => "99th percentile latency in milliseconds",
    };
    format!("{what} {stat} since the last flush")
}

/// Build the full catalog: six entries per latency family, then the
/// resource counters.
pub fn registrations() -> Vec<MetricRegistration> {
    let mut out = Vec::with_capacity(LatencyFamily::ALL.len() * HISTOGRAM_SUFFIXES.len() + 3);
    for family in LatencyFamily::ALL {
        for suffix in HISTOGRAM_SUFFIXES {
            out.push(MetricRegistration {
                name: format!("{}{}", family.prefix(), suffix),
                labels: LATENCY_LABELS,
                help: latency_help(family, suffix),
            });
        }
    }

    let resource = [
        (INDEX_SHARD_CPU_TIME_METRIC, "CPU time in nanoseconds spent per index, shard and operation since the last flush"),
        (INDEX_SHARD_CPU_PERCENT_METRIC, "CPU time as a percentage of wall time since the last flush"),
        (INDEX_SHARD_MEMORY_ALLOCATION_METRIC, "bytes allocated per index, shard and operation since the last flush"),
    ];
    for (name, help) in resource {
        out.push(MetricRegistration {
            name: name.to_string(),
            labels: RESOURCE_LABELS,
            help: help.to_string(),
        });
    }
    out
}
