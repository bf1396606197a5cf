// src/webhook.rs

//! Webhook delivery of finalized run results.

use anyhow::Context;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::observe::{LifecycleEvent, Observer};
use crate::state::result::RunResult;

/// POST the run result as JSON to the configured URL.
///
/// Callers treat delivery as best-effort: a failed run is already recorded
/// on disk, so a webhook error is logged and never fails the run.
pub async fn deliver(url: &str, run: &RunResult, observer: &Observer) -> Result<()> {
    debug!(url, run_id = %run.run_id, "delivering run result webhook");

    let client = reqwest::Client::new();
    let response = client
        .post(url)
        .json(run)
        .send()
        .await
        .with_context(|| format!("sending run result webhook to '{}'", url))?;

    let status = response.status();
    observer.emit(&LifecycleEvent::WebhookSent {
        url: url.to_string(),
        status: status.as_u16(),
    });

    if !status.is_success() {
        warn!(url, status = status.as_u16(), "webhook endpoint returned an error status");
    }

    Ok(())
}
