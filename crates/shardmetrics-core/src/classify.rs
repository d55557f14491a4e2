//! Request classification into `(index, shard, operation)` labels.
//!
//! Classification is a pure function of the request value. Unknown shapes
//! never fail; they resolve to sentinel labels and are still recorded.
//!
//! Index label precedence:
//! 1. explicit index names (sorted, de-duplicated, capped, joined with `/`)
//! 2. multi-search envelope -> `_msearch`
//! 3. scroll continuation -> `_scroll`
//! 4. forwarded shard request -> classify the inner request
//! 5. anything else -> `_unknown`
//!
//! The wildcard `*` is replaced by `__any` in the final index label.

use crate::error::{MetricsError, Result};
use crate::request::OperationRequest;

/// Placeholder for requests that are not shard-scoped.
pub const EMPTY_LABEL: &str = "-";
/// Placeholder for labels that cannot be determined.
pub const UNKNOWN_LABEL: &str = "_unknown";
pub const SCROLL_LABEL: &str = "_scroll";
pub const MSEARCH_LABEL: &str = "_msearch";
/// Appended when more distinct index names exist than the cap allows.
pub const ETC_MARKER: &str = "_etc";
pub const INDEX_DELIMITER: &str = "/";
pub const WILDCARD: char = '*';
pub const WILDCARD_ESCAPE: &str = "__any";

pub const DEFAULT_MAX_INDICES: usize = 3;

/// Closed set of operation labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Index,
    Get,
    Search,
    Unknown,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Index => "index",
            Operation::Get => "get",
            Operation::Search => "search",
            Operation::Unknown => UNKNOWN_LABEL,
        }
    }
}

/// Labels derived from one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLabels {
    pub index: String,
    pub shard: String,
    pub operation: Operation,
}

/// Where the index label comes from, in precedence order.
enum IndexSource<'a> {
    Names(Option<&'a [String]>),
    Single(Option<&'a str>),
    MultiSearch,
    Scroll,
    Forwarded(&'a OperationRequest),
    Unknown,
}

fn index_source(request: &OperationRequest) -> IndexSource<'_> {
    match request {
        OperationRequest::Index { index } | OperationRequest::Get { index } => {
            IndexSource::Single(index.as_deref())
        }
        OperationRequest::Search { indices } => IndexSource::Names(indices.as_deref()),
        OperationRequest::Bulk { indices } => IndexSource::Names(Some(indices.as_slice())),
        OperationRequest::MultiGet { items } => IndexSource::Names(Some(items.as_slice())),
        OperationRequest::BulkShard(t)
        | OperationRequest::MultiGetShard(t)
        | OperationRequest::ShardSearch(t)
        | OperationRequest::ShardFetchSearch(t) => IndexSource::Names(t.indices.as_deref()),
        OperationRequest::MultiSearch => IndexSource::MultiSearch,
        OperationRequest::SearchScroll => IndexSource::Scroll,
        OperationRequest::Forwarded { inner } => IndexSource::Forwarded(inner.as_ref()),
        OperationRequest::InternalScrollSearch | OperationRequest::Unrecognized { .. } => {
            IndexSource::Unknown
        }
    }
}

/// Stateless request classifier. Holds only the multi-index cap.
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    max_indices: usize,
}

impl Default for Classifier {
    fn default() -> Self {
        Self { max_indices: DEFAULT_MAX_INDICES }
    }
}

impl Classifier {
    /// Build a classifier that keeps at most `max_indices` distinct names.
    pub fn new(max_indices: usize) -> Result<Self> {
        if max_indices == 0 {
            return Err(MetricsError::InvalidConfig(
                "max_indices must be at least 1".into(),
            ));
        }
        Ok(Self { max_indices })
    }

    pub fn max_indices(&self) -> usize {
        self.max_indices
    }

    /// Derive all three labels.
    pub fn classify(&self, request: &OperationRequest) -> RequestLabels {
        let labels = RequestLabels {
            index: self.index_label(request),
            shard: shard_label(request),
            operation: operation(request),
        };
        if labels.operation == Operation::Unknown {
            tracing::debug!(kind = request.kind(), "unrecognized request shape");
        }
        labels
    }

    /// Index label with wildcard escaping applied.
    pub fn index_label(&self, request: &OperationRequest) -> String {
        let raw = match index_source(request) {
            IndexSource::Names(names) => self.join_indices(names),
            IndexSource::Single(name) => non_blank(name).unwrap_or(UNKNOWN_LABEL).to_string(),
            IndexSource::MultiSearch => MSEARCH_LABEL.to_string(),
            IndexSource::Scroll => SCROLL_LABEL.to_string(),
            IndexSource::Forwarded(inner) => return self.index_label(inner),
            IndexSource::Unknown => UNKNOWN_LABEL.to_string(),
        };
        escape_wildcard(raw)
    }

    /// Sort, de-duplicate, skip blanks, cap and join.
    ///
    /// `["b", "a", "a", "c", "d"]` with a cap of 3 yields `a/b/c/_etc`.
    pub fn join_indices(&self, names: Option<&[String]>) -> String {
        let names = match names {
            None | Some([]) => return UNKNOWN_LABEL.to_string(),
            Some([single]) => {
                return non_blank(Some(single.as_str())).unwrap_or(UNKNOWN_LABEL).to_string();
            }
            Some(names) => names,
        };

        let mut sorted: Vec<&str> = names
            .iter()
            .filter_map(|n| non_blank(Some(n.as_str())))
            .collect();
        sorted.sort_unstable();
        sorted.dedup();

        if sorted.is_empty() {
            return UNKNOWN_LABEL.to_string();
        }

        let truncated = sorted.len() > self.max_indices;
        sorted.truncate(self.max_indices);
        let mut out = sorted.join(INDEX_DELIMITER);
        if truncated {
            out.push_str(INDEX_DELIMITER);
            out.push_str(ETC_MARKER);
        }
        out
    }
}

fn non_blank(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.trim().is_empty())
}

pub(crate) fn escape_wildcard(label: String) -> String {
    if label.contains(WILDCARD) {
        label.replace(WILDCARD, WILDCARD_ESCAPE)
    } else {
        label
    }
}

/// Shard id for shard-scoped requests, `-` otherwise.
pub fn shard_label(request: &OperationRequest) -> String {
    match request {
        OperationRequest::Forwarded { inner } => shard_label(inner),
        other => other
            .shard_target()
            .map(|t| t.shard_id.to_string())
            .unwrap_or_else(|| EMPTY_LABEL.to_string()),
    }
}

/// Operation family of a request.
pub fn operation(request: &OperationRequest) -> Operation {
    match request {
        OperationRequest::Index { .. }
        | OperationRequest::Bulk { .. }
        | OperationRequest::BulkShard(_) => Operation::Index,
        OperationRequest::Get { .. }
        | OperationRequest::MultiGet { .. }
        | OperationRequest::MultiGetShard(_) => Operation::Get,
        OperationRequest::Search { .. }
        | OperationRequest::ShardSearch(_)
        | OperationRequest::ShardFetchSearch(_)
        | OperationRequest::MultiSearch
        | OperationRequest::SearchScroll
        | OperationRequest::InternalScrollSearch => Operation::Search,
        OperationRequest::Forwarded { inner } => operation(inner),
        OperationRequest::Unrecognized { .. } => Operation::Unknown,
    }
}
