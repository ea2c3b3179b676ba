/// Pose directive for the generated image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pose {
    /// Front-facing portrait.
    #[default]
    Face,
    /// Three-quarter view.
    ThreeQuarter,
    /// Detail close-up.
    Zoom,
}

impl Pose {
    pub(crate) fn directive(self) -> &'static str {
        match self {
            Pose::Face => "front-facing",
            Pose::ThreeQuarter => "three-quarter view",
            Pose::Zoom => "detail close-up",
        }
    }
}

/// Scene directive for the generated image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scene {
    /// Neutral studio backdrop.
    #[default]
    Studio,
    /// Bedroom interior.
    Bedroom,
}

impl Scene {
    pub(crate) fn directive(self) -> &'static str {
        match self {
            Scene::Studio => "studio",
            Scene::Bedroom => "bedroom",
        }
    }
}
