use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for one generation attempt.
///
/// Ids minted by [`RunId::generate`] combine a random value with the current
/// wall-clock time, so colliding with a live run id is overwhelmingly
/// unlikely. Uniqueness is probabilistic, not guaranteed.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    /// Creates a run id from any string-like value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Mints a fresh id (UUIDv7: millisecond timestamp plus random bits).
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RunId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Observed lifecycle position of a run.
///
/// Derived from the record fields; the store does not enforce transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Neither result nor error recorded yet.
    Pending,
    /// A result image was recorded.
    Completed,
    /// An error message was recorded.
    Failed,
}

/// Transient record of one generation attempt.
///
/// At most one of `result_data_url` / `error` is set in correct usage; both
/// absent means the run is still pending. Records are never deleted; they are
/// reclaimed only by process restart.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Input image payload as a data URL (or an externally resolvable URL).
    /// Immutable once set.
    pub input_data_url: String,
    /// Per-run credential override, held for the run's duration only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Present once generation succeeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_data_url: Option<String>,
    /// Present once generation fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Run {
    /// Creates a pending run for the given input payload.
    pub fn with_input(input_data_url: impl Into<String>) -> Self {
        Self {
            input_data_url: input_data_url.into(),
            ..Self::default()
        }
    }

    /// Attaches a per-run credential override.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Derives the run status. A recorded error wins over a stale result so a
    /// failure can never be masked.
    pub fn status(&self) -> RunStatus {
        if self.error.is_some() {
            RunStatus::Failed
        } else if self.result_data_url.is_some() {
            RunStatus::Completed
        } else {
            RunStatus::Pending
        }
    }
}

/// Partial update merged onto a [`Run`] by [`crate::RunStore::update`].
///
/// Every field distinguishes "leave as-is" (outer `None`) from "set"; the
/// optional record fields additionally distinguish "clear" (inner `None`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunPatch {
    input_data_url: Option<String>,
    api_key: Option<Option<String>>,
    result_data_url: Option<Option<String>>,
    error: Option<Option<String>>,
}

impl RunPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the input payload.
    pub fn input_data_url(mut self, url: impl Into<String>) -> Self {
        self.input_data_url = Some(url.into());
        self
    }

    /// Sets or clears the credential override.
    pub fn api_key(mut self, key: Option<String>) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Records a successful result.
    pub fn result_data_url(mut self, url: impl Into<String>) -> Self {
        self.result_data_url = Some(Some(url.into()));
        self
    }

    /// Records a failure message.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(Some(message.into()));
        self
    }

    /// Clears a previously recorded failure message.
    pub fn clear_error(mut self) -> Self {
        self.error = Some(None);
        self
    }

    /// Merges the patch onto `run` with shallow field overwrite.
    pub fn apply(self, run: &mut Run) {
        if let Some(url) = self.input_data_url {
            run.input_data_url = url;
        }
        if let Some(key) = self.api_key {
            run.api_key = key;
        }
        if let Some(result) = self.result_data_url {
            run.result_data_url = result;
        }
        if let Some(error) = self.error {
            run.error = error;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        let a = RunId::generate();
        let b = RunId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn status_is_derived_from_record_fields() {
        let mut run = Run::with_input("data:image/png;base64,AAA=");
        assert_eq!(run.status(), RunStatus::Pending);
        run.result_data_url = Some("data:image/png;base64,BBB=".into());
        assert_eq!(run.status(), RunStatus::Completed);
        run.error = Some("boom".into());
        assert_eq!(run.status(), RunStatus::Failed);
    }

    #[test]
    fn patch_applies_only_the_supplied_fields() {
        let mut run = Run::with_input("data:image/png;base64,AAA=").api_key("sk-or-test");
        RunPatch::new()
            .result_data_url("data:image/png;base64,BBB=")
            .apply(&mut run);
        assert_eq!(run.input_data_url, "data:image/png;base64,AAA=");
        assert_eq!(run.api_key.as_deref(), Some("sk-or-test"));
        assert_eq!(
            run.result_data_url.as_deref(),
            Some("data:image/png;base64,BBB=")
        );
        assert_eq!(run.error, None);
    }

    #[test]
    fn patch_clear_error_resets_a_recorded_failure() {
        let mut run = Run::with_input("data:image/png;base64,AAA=");
        run.error = Some("first attempt failed".into());
        RunPatch::new()
            .result_data_url("data:image/png;base64,BBB=")
            .clear_error()
            .apply(&mut run);
        assert_eq!(run.error, None);
        assert_eq!(run.status(), RunStatus::Completed);
    }
}
