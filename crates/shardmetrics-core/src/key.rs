//! Metric identity and exported readings.

use std::fmt;
use std::sync::Arc;

/// Metric name plus ordered label values.
///
/// Label position carries meaning (`[index, success]` or
/// `[index, shard, operation]`), so two keys are equal only when the name and
/// every label match in order. Cloning is cheap; the labels are shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetricKey {
    name: &'static str,
    labels: Arc<[String]>,
}

impl MetricKey {
    pub fn new<I, S>(name: &'static str, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name,
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.labels.join(","))
    }
}

/// One exported reading. Only produced at flush time.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub labels: Vec<String>,
    pub value: f64,
}

impl Sample {
    pub fn new(name: impl Into<String>, labels: &[String], value: f64) -> Self {
        Self {
            name: name.into(),
            labels: labels.to_vec(),
            value,
        }
    }
}
