#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum::body::to_bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::Json;

use shardmetrics_exporter::app_state::AppState;
use shardmetrics_exporter::config;
use shardmetrics_exporter::ops::{self, CompletionReport, ToggleUpdate, Toggles};

fn state(yaml: &str) -> AppState {
    AppState::new(config::load_from_str(yaml).unwrap()).unwrap()
}

async fn scrape(state: &AppState) -> String {
    let resp = ops::metrics(State(state.clone())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "text/plain; version=0.0.4; charset=utf-8"
    );
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

fn reports(json: &str) -> Json<Vec<CompletionReport>> {
    Json(serde_json::from_str(json).unwrap())
}

#[tokio::test]
async fn scrape_mode_flushes_on_every_scrape() {
    let state = state("version: 1\n");
    let status = ops::post_completions(
        State(state.clone()),
        reports(
            r#"[
                {"request": {"type": "search", "indices": ["my-index"]}, "success": true, "elapsed_ms": 120},
                {"request": {"type": "search", "indices": ["my-index"]}, "success": false, "elapsed_ms": 400}
            ]"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let first = scrape(&state).await;
    assert!(first.contains("coordinator_search_latency_millis_count{index=\"my-index\",success=\"true\"} 1\n"));
    assert!(first.contains("coordinator_search_latency_millis_average{index=\"my-index\",success=\"false\"} 400\n"));

    let second = scrape(&state).await;
    assert!(!second.contains("my-index"));
}

#[tokio::test]
async fn interval_mode_serves_latest_published() {
    let state = state("version: 1\nexporter:\n  flush_mode: interval\n  flush_interval_ms: 1000\n");
    state.recorder().record_bulk_latency("logs", true, 9);

    // Nothing published yet.
    assert!(!scrape(&state).await.contains("logs"));

    state.flush_and_publish();
    let a = scrape(&state).await;
    let b = scrape(&state).await;
    assert!(a.contains("coordinator_bulk_latency_millis_count{index=\"logs\",success=\"true\"} 1\n"));
    assert_eq!(a, b);
}

#[tokio::test]
async fn toggles_round_trip() {
    let state = state("version: 1\n");

    let Json(before) = ops::get_toggles(State(state.clone())).await;
    assert_eq!(before, Toggles { metrics_enabled: true, resource_tracking_enabled: true });

    let update = ToggleUpdate { metrics_enabled: Some(false), resource_tracking_enabled: None };
    let Json(after) = ops::put_toggles(State(state.clone()), Json(update)).await;
    assert_eq!(after, Toggles { metrics_enabled: false, resource_tracking_enabled: true });

    ops::post_completions(
        State(state.clone()),
        reports(r#"[{"request": {"type": "multi_search"}, "success": true, "elapsed_ms": 5}]"#),
    )
    .await;
    assert!(!scrape(&state).await.contains("_msearch"));
}

#[tokio::test]
async fn completion_usage_lands_in_resource_counters() {
    let state = state("version: 1\n");
    ops::post_completions(
        State(state.clone()),
        reports(
            r#"[{
                "request": {"type": "forwarded", "inner": {"type": "shard_search", "indices": ["logs-*"], "shard_id": 2}},
                "success": true,
                "elapsed_ms": 4,
                "usage": {"cpu_time_nanos": 2500, "memory_bytes": 0}
            }]"#,
        ),
    )
    .await;

    let text = scrape(&state).await;
    assert!(text.contains(
        "index_shard_cpu_time_nanosecond{index=\"logs-__any\",shard=\"2\",operation=\"search\"} 2500\n"
    ));
    assert!(text.contains("index_shard_cpu_percent{index=\"logs-__any\",shard=\"2\",operation=\"search\"} "));
    assert!(!text.contains("index_shard_memory_allocation_bytes{"));
}

#[tokio::test]
async fn healthz_is_ok() {
    let resp = axum::response::IntoResponse::into_response(ops::healthz().await);
    assert_eq!(resp.status(), StatusCode::OK);
}
