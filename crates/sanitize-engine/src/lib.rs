//! Decision sanitization: scoring, threshold policy, the demotion state
//! machine, and take-profit derivation.

pub mod policy;
pub mod sanitizer;
pub mod scorer;
pub mod targets;

pub use policy::ThresholdTable;
pub use sanitizer::Sanitizer;
pub use scorer::{effective_confidence, ScoreWeights};
pub use targets::TargetRules;
