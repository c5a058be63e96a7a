//! Engine configuration.
//!
//! Every business-tunable constant lives here: the threshold table, score
//! weights, target offsets, and the dedupe window. All sections have full
//! defaults, so an empty TOML file (or no file at all) yields a working
//! engine.

use anyhow::Context;
use sanitize_engine::{ScoreWeights, TargetRules, ThresholdTable};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub thresholds: ThresholdTable,
    pub weights: ScoreWeights,
    pub targets: TargetRules,
    pub dedupe: DedupeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DedupeConfig {
    pub window_secs: u64,
    pub retention_secs: u64,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            window_secs: 900,
            retention_secs: 86_400,
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Mode, PlanTier};

    #[test]
    fn empty_config_gets_full_defaults() {
        let cfg: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.dedupe.window_secs, 900);
        assert_eq!(cfg.targets.tp1_points, 200);
        assert_eq!(
            cfg.thresholds.min_confidence(PlanTier::Pro, Mode::All),
            65
        );
    }

    #[test]
    fn sections_override_independently() {
        let cfg: EngineConfig = toml::from_str(
            r#"
            [targets]
            tp2_strong_points = 550

            [dedupe]
            window_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(cfg.targets.tp2_strong_points, 550);
        assert_eq!(cfg.targets.tp3_strong_points, 700);
        assert_eq!(cfg.dedupe.window_secs, 60);
        assert_eq!(cfg.weights.trend, 25.0);
    }
}
