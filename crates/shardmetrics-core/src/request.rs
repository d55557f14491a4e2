//! Operation request shapes seen by the engine.
//!
//! The host pipeline hands the engine one `OperationRequest` per completed
//! operation. Only the fields that matter for classification are carried;
//! everything else about the request stays with the host.
//!
//! Requests deserialize from JSON tagged by `type`, which keeps the
//! classification contract testable with plain vector files.

use serde::Deserialize;

/// Shard-scoped target shared by all shard-level requests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShardTarget {
    /// Index names the shard request resolves against.
    #[serde(default)]
    pub indices: Option<Vec<String>>,
    /// Numeric shard id within the index.
    pub shard_id: u32,
}

impl ShardTarget {
    pub fn new(indices: Vec<String>, shard_id: u32) -> Self {
        Self { indices: Some(indices), shard_id }
    }
}

/// Closed set of request kinds understood by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationRequest {
    /// Single document write.
    Index {
        #[serde(default)]
        index: Option<String>,
    },
    /// Single document read.
    Get {
        #[serde(default)]
        index: Option<String>,
    },
    /// Coordinator-level search.
    Search {
        #[serde(default)]
        indices: Option<Vec<String>>,
    },
    /// Bulk write; `indices` is the set touched by its items.
    Bulk {
        #[serde(default)]
        indices: Vec<String>,
    },
    /// Multi-get; one index per item.
    MultiGet {
        #[serde(default)]
        items: Vec<String>,
    },
    /// Multi-search envelope.
    MultiSearch,
    /// Scroll continuation issued by a client.
    SearchScroll,
    /// Shard-level scroll continuation.
    InternalScrollSearch,
    BulkShard(ShardTarget),
    MultiGetShard(ShardTarget),
    ShardSearch(ShardTarget),
    /// Fetch phase; carries the target of the shard search it belongs to.
    ShardFetchSearch(ShardTarget),
    /// A shard-level request forwarded to a concrete shard copy.
    Forwarded { inner: Box<OperationRequest> },
    /// Anything else. `kind` is only used for debug logging.
    Unrecognized {
        #[serde(default)]
        kind: String,
    },
}

impl OperationRequest {
    /// Wrap `inner` as a forwarded shard request.
    pub fn forwarded(inner: OperationRequest) -> Self {
        OperationRequest::Forwarded { inner: Box::new(inner) }
    }

    /// Short, stable name of the request shape.
    pub fn kind(&self) -> &str {
        match self {
            OperationRequest::Index { .. } => "index",
            OperationRequest::Get { .. } => "get",
            OperationRequest::Search { .. } => "search",
            OperationRequest::Bulk { .. } => "bulk",
            OperationRequest::MultiGet { .. } => "multi_get",
            OperationRequest::MultiSearch => "multi_search",
            OperationRequest::SearchScroll => "search_scroll",
            OperationRequest::InternalScrollSearch => "internal_scroll_search",
            OperationRequest::BulkShard(_) => "bulk_shard",
            OperationRequest::MultiGetShard(_) => "multi_get_shard",
            OperationRequest::ShardSearch(_) => "shard_search",
            OperationRequest::ShardFetchSearch(_) => "shard_fetch_search",
            OperationRequest::Forwarded { .. } => "forwarded",
            OperationRequest::Unrecognized { kind } => kind,
        }
    }

    /// Shard target of shard-scoped requests (not recursing).
    pub fn shard_target(&self) -> Option<&ShardTarget> {
        match self {
            OperationRequest::BulkShard(target)
            | OperationRequest::MultiGetShard(target)
            | OperationRequest::ShardSearch(target)
            | OperationRequest::ShardFetchSearch(target) => Some(target),
            _ => None,
        }
    }
}

/// Resource usage reported by the host for resource-tracked operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ResourceUsage {
    pub cpu_time_nanos: u64,
    pub memory_bytes: u64,
}
