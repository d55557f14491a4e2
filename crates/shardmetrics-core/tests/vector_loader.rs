//! JSON test vector loader shared by the classification tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use serde::Deserialize;

use shardmetrics_core::OperationRequest;

#[derive(Debug, Deserialize)]
pub struct TestVector {
    pub description: String,
    #[serde(default)]
    pub max_indices: Option<usize>,
    pub request: OperationRequest,
    pub expect: ExpectLabels,
}

#[derive(Debug, Deserialize)]
pub struct ExpectLabels {
    pub index: String,
    pub shard: String,
    pub operation: String,
}

pub fn load(name: &str) -> Vec<TestVector> {
    let s = fs::read_to_string(format!("tests/vectors/{name}"))
        .unwrap_or_else(|e| panic!("read {name}: {e}"));
    serde_json::from_str(&s).unwrap_or_else(|e| panic!("parse {name}: {e}"))
}
