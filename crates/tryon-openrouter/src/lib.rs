//! Image-generation client for the OpenRouter chat-completions endpoint.
//!
//! The client obtains exactly one output image per request, in either of two
//! response modes: a single buffered JSON response, or an incremental
//! server-sent-event stream whose partial images are surfaced through a
//! progress callback. Both modes normalize into one [`GenerationResult`].
//!
//! # Builder-first usage
//!
//! ```no_run
//! use tryon_openrouter::{OpenRouterClient, Pose, Scene};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), tryon_openrouter::GenerateError> {
//! let client = OpenRouterClient::from_env()?;
//!
//! let result = client
//!     .generate()
//!     .image_data_url("data:image/png;base64,AAA=")
//!     .pose(Pose::ThreeQuarter)
//!     .scene(Scene::Studio)
//!     .streaming(true)
//!     .on_image_delta(|partial| eprintln!("partial image ({} bytes)", partial.len()))
//!     .send()
//!     .await?;
//!
//! println!("{}", result.image_data_url);
//! # Ok(())
//! # }
//! ```

/// Client construction and the two response-mode request paths.
pub mod client;
/// Client configuration (credentials, endpoint, model, timeout).
pub mod config;
/// Public error taxonomy.
pub mod errors;
/// Image extraction over the two response shapes.
mod extract;
/// Pose and scene directives.
pub mod options;
/// Request builder and validated request.
pub mod request;
/// Normalized generation outcome.
pub mod result;
/// Incremental SSE frame decoding.
mod sse;
/// Folding of stream increments into the last known image.
mod stream;

pub use client::OpenRouterClient;
pub use config::{DEFAULT_MODEL, OpenRouterConfig};
pub use errors::GenerateError;
pub use options::{Pose, Scene};
pub use request::{GenerateBuilder, ImageDeltaCallback};
pub use result::GenerationResult;
