//! The engine facade: raw model text in, policy-compliant signal out, plus
//! the push-path admission decision.

use chrono::Duration;
use common::{PlanTier, PolicyContext, Result, SanitizedSignal};
use dedupe_gate::AlertGate;
use sanitize_engine::{Sanitizer, TargetRules};
use tracing::info;

use crate::config::EngineConfig;
use crate::webhook::AlertEvent;

pub struct SignalPipeline {
    sanitizer: Sanitizer,
    targets: TargetRules,
    gate: AlertGate,
}

impl SignalPipeline {
    pub fn new(config: EngineConfig) -> Self {
        let gate = AlertGate::new(
            Duration::seconds(config.dedupe.window_secs as i64),
            Duration::seconds(config.dedupe.retention_secs as i64),
        );
        Self {
            sanitizer: Sanitizer::new(config.thresholds, config.weights),
            targets: config.targets,
            gate,
        }
    }

    /// Image-analysis path: extract, sanitize, derive targets.
    ///
    /// The only error is `NoStructuredData`; substitute [`Self::fallback_wait`]
    /// when it fires.
    pub fn sanitize(&self, raw: &str, policy: &PolicyContext) -> Result<SanitizedSignal> {
        let candidate = extractor::extract_candidate(raw)?;
        Ok(self.finish(candidate, policy))
    }

    /// Push path: the payload is already structured, so this never fails.
    pub fn sanitize_candidate(
        &self,
        candidate: common::CandidateSignal,
        policy: &PolicyContext,
    ) -> SanitizedSignal {
        self.finish(candidate, policy)
    }

    /// Canned WAIT for callers that hit `NoStructuredData`.
    pub fn fallback_wait(&self, policy: &PolicyContext) -> SanitizedSignal {
        self.sanitizer.fallback(policy)
    }

    /// Admission decision for a logical event under a plan. `false` means the
    /// same event was already delivered within the dedupe window.
    pub fn admit(&self, plan: PlanTier, event_id: &str) -> bool {
        self.gate.admit(&format!("{plan}:{event_id}"))
    }

    /// Full push path: dedupe first, then sanitize. `None` means suppressed.
    pub fn process_alert(
        &self,
        event: AlertEvent,
        policy: &PolicyContext,
    ) -> Option<SanitizedSignal> {
        let event_id = event.logical_event_id();
        if !self.admit(policy.plan, &event_id) {
            info!(%event_id, "alert suppressed by dedupe gate");
            return None;
        }
        Some(self.finish(event.into_candidate(), policy))
    }

    fn finish(
        &self,
        candidate: common::CandidateSignal,
        policy: &PolicyContext,
    ) -> SanitizedSignal {
        let mut signal = self.sanitizer.sanitize(candidate, policy);
        self.targets.apply(&mut signal);
        debug_assert!(signal.is_consistent());
        info!(
            action = %signal.action,
            symbol = %signal.symbol,
            confidence = signal.confidence,
            "signal sanitized"
        );
        signal
    }
}
