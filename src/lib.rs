//! Decision sanitization and alert dedupe for chart-analysis signal bots.
//!
//! Takes the untrusted, possibly malformed structured response of a hosted
//! vision model and turns it into a consistent, policy-compliant trading
//! signal; on the push path, additionally decides whether that signal should
//! actually be delivered. The engine is a pure computation library; chat
//! transport, plan persistence, and message formatting live elsewhere.
//!
//! Entry points: [`SignalPipeline::sanitize`] and [`SignalPipeline::admit`].

pub mod config;
pub mod pipeline;
pub mod webhook;

pub use common::{
    Action, CandidateSignal, Error, InstrumentConstraint, Mode, PlanTier, PolicyContext,
    SanitizedSignal, SubScores,
};
pub use config::{DedupeConfig, EngineConfig};
pub use dedupe_gate::AlertGate;
pub use extractor::extract_candidate;
pub use pipeline::SignalPipeline;
pub use sanitize_engine::{ScoreWeights, Sanitizer, TargetRules, ThresholdTable};
pub use vision_client::{ChartReadout, ChartRequest, VisionClient, VisionError};
pub use webhook::AlertEvent;
