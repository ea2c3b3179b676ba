use tryon_openrouter::{GenerateError, OpenRouterClient, Pose, Scene};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), GenerateError> {
    let client = OpenRouterClient::from_env()?;

    let result = client
        .generate()
        .image_data_url(std::env::args().nth(1).unwrap_or_else(|| {
            "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==".to_string()
        }))
        .pose(Pose::Face)
        .scene(Scene::Studio)
        .send()
        .await?;

    println!("{}", result.image_data_url);
    Ok(())
}
