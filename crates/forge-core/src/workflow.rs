//! Phase transitions.
//!
//! A transition moves the project's single feature state to a new phase,
//! persists it, and renders the phase's workflow fragment as the document the
//! agent acts on. Entering `optimize` is guarded by the quality gate plan.

use crate::compiler::Compiler;
use crate::error::{ForgeError, Result};
use crate::gate::{self, GatePlan};
use crate::state::{FeatureState, StateStore};
use crate::types::{Phase, Status};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionOptions {
    /// Rename the feature while transitioning.
    pub feature: Option<String>,
    pub skip_gates: bool,
}

impl TransitionOptions {
    pub fn feature(name: impl Into<String>) -> Self {
        Self {
            feature: Some(name.into()),
            skip_gates: false,
        }
    }

    pub fn skip_gates() -> Self {
        Self {
            feature: None,
            skip_gates: true,
        }
    }
}

/// Outcome of a successful transition: the saved state and the rendered
/// phase document.
#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub state: FeatureState,
    pub document: String,
}

pub struct PhaseController {
    store: StateStore,
    compiler: Compiler,
    gate_plan: GatePlan,
}

impl PhaseController {
    pub fn new(store: StateStore, compiler: Compiler, gate_plan: GatePlan) -> Self {
        Self {
            store,
            compiler,
            gate_plan,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    pub fn gate_plan(&self) -> &GatePlan {
        &self.gate_plan
    }

    /// Move the feature to `target`.
    ///
    /// When `target` is gated and gates are not skipped, every check runs
    /// and its result is recorded. If any check failed, the recorded results
    /// are saved with the phase left unchanged and `GatesFailed` is returned.
    pub fn transition(&self, target: Phase, opts: TransitionOptions) -> Result<Transition> {
        let mut state = self.store.load();
        if state.status == Status::Failed {
            tracing::warn!(path = %self.store.path().display(), "continuing from a reset state");
        }

        if target.is_gated() && !opts.skip_gates && !self.gate_plan.is_empty() {
            let results = self.gate_plan.run(self.store.root());
            let failed = gate::failures(&results);
            state.record_gates(results);
            if !failed.is_empty() {
                self.store.save(&state)?;
                tracing::warn!(phase = %target, gates = ?failed, "transition blocked by quality gates");
                return Err(ForgeError::GatesFailed(failed));
            }
        }

        let from = state.phase;
        if let Some(name) = opts.feature {
            state.name = name;
        }
        state.set_phase(target);
        self.store.save(&state)?;
        tracing::debug!(from = %from, to = %target, "phase transition");

        let document = self.compiler.render_fragment(target.fragment());
        Ok(Transition { state, document })
    }

    /// Render the fragment of the current phase without changing state.
    pub fn current_document(&self) -> (FeatureState, String) {
        let state = self.store.load();
        let document = self.compiler.render_fragment(state.phase.fragment());
        (state, document)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
