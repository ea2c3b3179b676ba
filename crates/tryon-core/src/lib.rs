//! Ephemeral run tracking and orchestration for the try-on generation
//! pipeline.
//!
//! A [`Run`] is the transient record of one generation attempt, kept in a
//! process-local [`RunStore`] for the lifetime of the hosting process. The
//! orchestration step ([`execute_run`]) looks a run up, drives an
//! [`ImageGenerator`] implementation, and records exactly one terminal
//! mutation (result or error) back onto the run. The generator seam keeps
//! this crate free of any vendor client dependency; composition happens one
//! level up, in the binary.
//!
//! # Usage
//!
//! ```no_run
//! use tryon_core::{
//!     ImageGenerateError, ImageGenerator, InMemoryRunStore, Run, RunId, RunStore, execute_run,
//! };
//!
//! struct EchoGenerator;
//!
//! #[async_trait::async_trait]
//! impl ImageGenerator for EchoGenerator {
//!     async fn generate_image(
//!         &self,
//!         input_data_url: &str,
//!         _api_key_override: Option<&str>,
//!     ) -> Result<String, ImageGenerateError> {
//!         Ok(input_data_url.to_string())
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = InMemoryRunStore::new();
//! let id = RunId::generate();
//! store.set(&id, Run::with_input("data:image/png;base64,AAA="));
//! let outcome = execute_run(&store, &EchoGenerator, &id).await;
//! println!("{outcome:?}");
//! # }
//! ```

/// Process-wide tracing initialization.
pub mod observability;
/// Orchestration of one generation attempt over a stored run.
pub mod pipeline;
/// Run records, identifiers, and partial updates.
pub mod run;
/// Store seam for run records plus the in-memory implementation.
pub mod store;

pub use observability::init_observability;
pub use pipeline::{ImageGenerateError, ImageGenerator, RunOutcome, execute_run};
pub use run::{Run, RunId, RunPatch, RunStatus};
pub use store::{InMemoryRunStore, RunStore};
