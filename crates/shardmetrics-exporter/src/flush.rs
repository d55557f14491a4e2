//! Periodic flush task for `interval` mode.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::app_state::AppState;

/// Spawn the flush loop. The first flush happens one full period after start.
pub fn spawn_flush_task(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;

        loop {
            interval.tick().await;
            let samples = state.flush_and_publish();
            tracing::debug!(samples = samples.len(), "interval flush published");
        }
    })
}
