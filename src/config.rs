use serde::{Deserialize, Serialize};

use crate::di::ContainerError;

/// How a fake answers an operation that has no matching stub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FakeMode {
    /// Return a default value (zero/empty, or a nested fake)
    #[default]
    Loose,
    /// Panic, so unexpected calls fail the test
    Strict,
}

/// What `stub` does for a capability already fixed to a concrete instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum StubConflictPolicy {
    /// Fail with `ConfigurationConflict`
    #[default]
    Reject,
    /// Keep the concrete instance and drop the rule with a warning
    ProvideWins,
}

/// What `provide` does for a capability already handed out to a consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum LateProvidePolicy {
    /// Fail with `AlreadyResolved`
    #[default]
    Reject,
    /// Replace the slot; earlier consumers keep the instance they were given
    Replace,
}

/// Options controlling container behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContainerOptions {
    /// Name attached to log events (default: none)
    #[serde(default)]
    pub label: Option<String>,

    /// Behavior of unconfigured calls on fakes (default: loose)
    #[serde(default)]
    pub fake_mode: FakeMode,

    /// Stub after provide on the same capability (default: reject)
    #[serde(default)]
    pub stub_conflict: StubConflictPolicy,

    /// Provide after the capability was resolved (default: reject)
    #[serde(default)]
    pub late_provide: LateProvidePolicy,
}

impl ContainerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON document
    ///
    /// ```rust
    /// use autofake::{ContainerOptions, FakeMode};
    ///
    /// let options = ContainerOptions::from_json(r#"{ "fakeMode": "strict" }"#).unwrap();
    /// assert_eq!(options.fake_mode, FakeMode::Strict);
    /// ```
    pub fn from_json(source: &str) -> Result<Self, ContainerError> {
        serde_json::from_str(source).map_err(|e| ContainerError::InvalidOptions(e.to_string()))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_fake_mode(mut self, mode: FakeMode) -> Self {
        self.fake_mode = mode;
        self
    }

    pub fn with_stub_conflict(mut self, policy: StubConflictPolicy) -> Self {
        self.stub_conflict = policy;
        self
    }

    pub fn with_late_provide(mut self, policy: LateProvidePolicy) -> Self {
        self.late_provide = policy;
        self
    }

    pub(crate) fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("container")
    }
}
