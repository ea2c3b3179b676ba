//! Command-line front end: pick a clothing photo, run the generation
//! pipeline, and write the generated try-on image next to it.
//!
//! This binary is the composition point. The run tracker and the generation
//! client know nothing about each other; the [`OpenRouterGenerator`] adapter
//! below plugs the client into the pipeline's generator seam.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use tracing::info;

use tryon_core::{
    ImageGenerateError, ImageGenerator, InMemoryRunStore, Run, RunId, RunOutcome, RunStore,
    execute_run, init_observability,
};
use tryon_openrouter::{OpenRouterClient, OpenRouterConfig, Pose, Scene};
use tryon_storage::{encode_data_url, parse_data_url};

#[derive(Parser)]
#[command(name = "tryon", about = "Generate a worn view of a garment photo")]
struct Args {
    /// Path to the garment photo.
    image: PathBuf,
    /// Pose directive for the generated image.
    #[arg(long, value_enum, default_value = "face")]
    pose: PoseArg,
    /// Scene directive for the generated image.
    #[arg(long, value_enum, default_value = "studio")]
    scene: SceneArg,
    /// Stream partial images and print a progress dot per delta.
    #[arg(long)]
    stream: bool,
    /// Override the OpenRouter API key for this run.
    #[arg(long)]
    api_key: Option<String>,
    /// Output file. Defaults to the input path with a `.tryon.<ext>` suffix.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PoseArg {
    Face,
    ThreeQuarter,
    Zoom,
}

impl From<PoseArg> for Pose {
    fn from(value: PoseArg) -> Self {
        match value {
            PoseArg::Face => Pose::Face,
            PoseArg::ThreeQuarter => Pose::ThreeQuarter,
            PoseArg::Zoom => Pose::Zoom,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SceneArg {
    Studio,
    Bedroom,
}

impl From<SceneArg> for Scene {
    fn from(value: SceneArg) -> Self {
        match value {
            SceneArg::Studio => Scene::Studio,
            SceneArg::Bedroom => Scene::Bedroom,
        }
    }
}

struct OpenRouterGenerator {
    client: OpenRouterClient,
    pose: Pose,
    scene: Scene,
    stream: bool,
}

#[async_trait::async_trait]
impl ImageGenerator for OpenRouterGenerator {
    async fn generate_image(
        &self,
        input_data_url: &str,
        api_key_override: Option<&str>,
    ) -> Result<String, ImageGenerateError> {
        let mut builder = self
            .client
            .generate()
            .image_data_url(input_data_url)
            .pose(self.pose)
            .scene(self.scene)
            .streaming(self.stream);
        if self.stream {
            builder = builder.on_image_delta(|_| eprint!("."));
        }
        if let Some(key) = api_key_override {
            builder = builder.api_key_override(key);
        }
        builder
            .send()
            .await
            .map(|result| result.image_data_url)
            .map_err(|err| ImageGenerateError(err.to_string()))
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

fn output_path(input: &Path, explicit: Option<PathBuf>, result_content_type: &str) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    let ext = result_content_type
        .split_once('/')
        .map(|(_, subtype)| subtype)
        .unwrap_or("png");
    input.with_extension(format!("tryon.{ext}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_observability();
    let args = Args::parse();

    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("failed to read {}", args.image.display()))?;
    let input_data_url = encode_data_url(content_type_for(&args.image), &bytes);

    let store = InMemoryRunStore::new();
    let id = RunId::generate();
    let mut run = Run::with_input(input_data_url);
    run.api_key = args.api_key.clone();
    store.set(&id, run);
    info!(event = "cli.run_created", domain = "cli", run_id = %id);

    let config = match OpenRouterConfig::from_env() {
        Ok(config) => config,
        Err(err) => match &args.api_key {
            Some(key) => OpenRouterConfig::new(key.clone()),
            None => return Err(err.into()),
        },
    };
    let generator = OpenRouterGenerator {
        client: OpenRouterClient::new(config)?,
        pose: args.pose.into(),
        scene: args.scene.into(),
        stream: args.stream,
    };

    eprintln!("Generating... this can take 20-60 seconds.");
    match execute_run(&store, &generator, &id).await {
        RunOutcome::Completed { .. } => {
            if args.stream {
                eprintln!();
            }
            let result_data_url = store
                .get(&id)
                .and_then(|run| run.result_data_url)
                .context("completed run has no result recorded")?;
            if result_data_url.starts_with("data:") {
                let decoded = parse_data_url(&result_data_url)
                    .context("result was not a decodable data URL")?;
                let path = output_path(&args.image, args.output, &decoded.content_type);
                std::fs::write(&path, &decoded.bytes)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Saved {}", path.display());
            } else {
                // Some models return a hosted URL instead of inline bytes.
                println!("{result_data_url}");
            }
            Ok(())
        }
        RunOutcome::Failed { message } => anyhow::bail!("generation failed: {message}"),
        RunOutcome::NotFound => {
            anyhow::bail!("run not found; start again from image selection")
        }
    }
}
