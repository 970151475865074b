//! Cycle ticker and graceful shutdown (spec SPEC_FULL §10.6), grounded on
//! the teacher's `ctrlc`-driven shutdown flag in `bin/polkadot-archive`
//! but built on `tokio::signal` so shutdown composes with the async
//! ticker instead of busy-waiting on an atomic flag.

use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};
use warwatch_core::Orchestrator;

/// Runs cycles until told to stop, waiting `interval` between ticks but
/// never interrupting a cycle already in flight (spec §4.8, §5: shutdown
/// takes effect only between cycles).
pub async fn run_forever(orchestrator: Arc<Orchestrator>, interval: Duration) {
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

    loop {
        // Shutdown signals are only observed between cycles — a cycle in
        // flight always runs to completion (spec §4.8, §5).
        let outcome = orchestrator.run_cycle().await;
        log_outcome(&outcome);

        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received SIGINT during sleep, shutting down");
                break;
            }
            _ = sigterm.recv() => {
                tracing::info!("received SIGTERM during sleep, shutting down");
                break;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

pub async fn run_once(orchestrator: Arc<Orchestrator>) {
    let outcome = orchestrator.run_cycle().await;
    log_outcome(&outcome);
}

fn log_outcome(outcome: &warwatch_core::CycleOutcome) {
    for failure in &outcome.war_failures {
        tracing::info!(war_id = failure.war_id, message = %failure.message, "war skipped this cycle");
    }
    tracing::info!(
        phase = ?outcome.phase,
        processed = outcome.processed,
        api_calls = outcome.api_calls,
        "tick"
    );
}
