use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::run::{RunId, RunPatch};
use crate::store::RunStore;

/// Error from an image generator implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ImageGenerateError(pub String);

/// Seam between the orchestration step and a concrete generation client.
///
/// Implementations produce exactly one generated image for the input payload.
/// They carry their own credentials; `api_key_override` replaces them for the
/// duration of a single call when present.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(
        &self,
        input_data_url: &str,
        api_key_override: Option<&str>,
    ) -> Result<String, ImageGenerateError>;
}

/// Terminal outcome of one orchestration pass over a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Generation succeeded and the result was recorded on the run.
    Completed {
        /// The generated image, also written to the run record.
        result_data_url: String,
    },
    /// Generation failed and the message was recorded on the run.
    Failed {
        /// The failure message, also written to the run record.
        message: String,
    },
    /// The run id is unknown or carries no input payload. Normal ephemeral
    /// state loss, not an error; the caller should route the user back to the
    /// input flow.
    NotFound,
}

/// Drives one generation attempt for `id`: look the run up, invoke the
/// generator, and record the terminal result or error on the run.
///
/// Exactly one terminal mutation is written per pass. No retry happens at
/// this layer; retry is a user-initiated restart of the whole flow. The
/// caller must not start a second pass for the same id while one is
/// outstanding.
pub async fn execute_run(
    store: &dyn RunStore,
    generator: &dyn ImageGenerator,
    id: &RunId,
) -> RunOutcome {
    let Some(run) = store.get(id) else {
        info!(event = "pipeline.run_missing", domain = "pipeline", run_id = %id);
        return RunOutcome::NotFound;
    };
    if run.input_data_url.is_empty() {
        info!(event = "pipeline.input_missing", domain = "pipeline", run_id = %id);
        return RunOutcome::NotFound;
    }

    debug!(
        event = "pipeline.generate_started",
        domain = "pipeline",
        run_id = %id,
        input_len = run.input_data_url.len() as u64,
        has_key_override = run.api_key.is_some()
    );

    match generator
        .generate_image(&run.input_data_url, run.api_key.as_deref())
        .await
    {
        Ok(result_data_url) => {
            store.update(
                id,
                RunPatch::new()
                    .result_data_url(result_data_url.clone())
                    .clear_error(),
            );
            info!(
                event = "pipeline.run_completed",
                domain = "pipeline",
                run_id = %id,
                result_len = result_data_url.len() as u64
            );
            RunOutcome::Completed { result_data_url }
        }
        Err(err) => {
            store.update(id, RunPatch::new().error(err.0.clone()));
            warn!(event = "pipeline.run_failed", domain = "pipeline", run_id = %id, error = %err);
            RunOutcome::Failed { message: err.0 }
        }
    }
}
