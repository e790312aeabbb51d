use crate::error::Result;
use crate::gate::QualityGate;
use crate::paths;
use crate::task::Task;
use crate::types::{deserialize_timestamp, Phase, Status};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// FeatureState
// ---------------------------------------------------------------------------

/// The single persisted workflow document of a project.
///
/// Field order here is the field order on disk; `artifacts` is a `BTreeMap`
/// so that serializing the same state always yields the same bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureState {
    pub name: String,
    #[serde(default)]
    pub phase: Phase,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub artifacts: BTreeMap<String, String>,
    #[serde(default)]
    pub quality_gates: Vec<QualityGate>,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl FeatureState {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            phase: Phase::Init,
            status: Status::Pending,
            tasks: Vec::new(),
            artifacts: BTreeMap::new(),
            quality_gates: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh `updated_at`. The new value is always strictly later than the
    /// previous one, even when the clock has not advanced.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.touch();
    }

    pub fn record_gates(&mut self, results: impl IntoIterator<Item = QualityGate>) {
        self.quality_gates.extend(results);
        self.touch();
    }

    pub fn set_artifact(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.artifacts.insert(name.into(), value.into());
        self.touch();
    }
}

// ---------------------------------------------------------------------------
// StateStore
// ---------------------------------------------------------------------------

/// Loads and saves the feature state of one project directory.
#[derive(Debug, Clone)]
pub struct StateStore {
    root: PathBuf,
}

impl StateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self) -> PathBuf {
        paths::state_path(&self.root)
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Fresh state named after the project directory.
    pub fn default_state(&self) -> FeatureState {
        FeatureState::new(paths::project_name(&self.root))
    }

    /// Load the persisted state.
    ///
    /// A missing file yields a fresh default state. A file that cannot be
    /// read or parsed yields a fresh default state with `Status::Failed`.
    pub fn load(&self) -> FeatureState {
        let path = self.path();
        if !path.exists() {
            return self.default_state();
        }
        let parsed = std::fs::read_to_string(&path)
            .map_err(crate::error::ForgeError::from)
            .and_then(|data| Ok(serde_json::from_str::<FeatureState>(&data)?));
        match parsed {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "state file is corrupt, starting over");
                let mut state = self.default_state();
                state.status = Status::Failed;
                state
            }
        }
    }

    /// Overwrite the persisted state with `state`. `updated_at` is written
    /// as-is; callers refresh it when they mutate.
    pub fn save(&self, state: &FeatureState) -> Result<()> {
        crate::io::atomic_write(&self.path(), &encode(state)?)
    }

    /// Persist `state` only when no state file exists. Returns true if written.
    pub fn save_if_missing(&self, state: &FeatureState) -> Result<bool> {
        crate::io::write_if_missing(&self.path(), &encode(state)?)
    }
}

fn encode(state: &FeatureState) -> Result<Vec<u8>> {
    let mut data = serde_json::to_string_pretty(state)?;
    data.push('\n');
    Ok(data.into_bytes())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
