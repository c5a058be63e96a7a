//! Minimum-confidence thresholds by (plan tier, mode).
//!
//! A table rather than a formula: these are business-tunable constants and
//! must be overridable from configuration without a code change. Restricted
//! mode is stricter than All; generosity rises from LITE to VIP. Every cell
//! carries its own default so a partial override leaves the rest intact.

use common::{Mode, PlanTier};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdTable {
    #[serde(default = "default_all_lite")]
    pub all_lite: u8,
    #[serde(default = "default_all_pro")]
    pub all_pro: u8,
    #[serde(default = "default_all_vip")]
    pub all_vip: u8,
    #[serde(default = "default_restricted_lite")]
    pub restricted_lite: u8,
    #[serde(default = "default_restricted_pro")]
    pub restricted_pro: u8,
    #[serde(default = "default_restricted_vip")]
    pub restricted_vip: u8,
}

fn default_all_lite() -> u8 {
    70
}
fn default_all_pro() -> u8 {
    65
}
fn default_all_vip() -> u8 {
    60
}
fn default_restricted_lite() -> u8 {
    78
}
fn default_restricted_pro() -> u8 {
    72
}
fn default_restricted_vip() -> u8 {
    68
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            all_lite: default_all_lite(),
            all_pro: default_all_pro(),
            all_vip: default_all_vip(),
            restricted_lite: default_restricted_lite(),
            restricted_pro: default_restricted_pro(),
            restricted_vip: default_restricted_vip(),
        }
    }
}

impl ThresholdTable {
    /// Minimum confidence required to authorize a directional call.
    pub fn min_confidence(&self, plan: PlanTier, mode: Mode) -> u8 {
        match (mode, plan) {
            (Mode::All, PlanTier::Lite) => self.all_lite,
            (Mode::All, PlanTier::Pro) => self.all_pro,
            (Mode::All, PlanTier::Vip) => self.all_vip,
            (Mode::Restricted, PlanTier::Lite) => self.restricted_lite,
            (Mode::Restricted, PlanTier::Pro) => self.restricted_pro,
            (Mode::Restricted, PlanTier::Vip) => self.restricted_vip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restricted_mode_is_stricter_for_every_tier() {
        let t = ThresholdTable::default();
        for plan in [PlanTier::Lite, PlanTier::Pro, PlanTier::Vip] {
            assert!(
                t.min_confidence(plan, Mode::Restricted) > t.min_confidence(plan, Mode::All),
                "{plan} restricted should be stricter"
            );
        }
    }

    #[test]
    fn generous_tiers_get_lower_thresholds() {
        let t = ThresholdTable::default();
        for mode in [Mode::All, Mode::Restricted] {
            assert!(t.min_confidence(PlanTier::Lite, mode) > t.min_confidence(PlanTier::Pro, mode));
            assert!(t.min_confidence(PlanTier::Pro, mode) > t.min_confidence(PlanTier::Vip, mode));
        }
    }

    #[test]
    fn partial_override_keeps_other_cells() {
        let t: ThresholdTable = toml::from_str("all_pro = 50\nrestricted_lite = 90\n").unwrap();
        assert_eq!(t.min_confidence(PlanTier::Pro, Mode::All), 50);
        assert_eq!(t.min_confidence(PlanTier::Lite, Mode::Restricted), 90);
        assert_eq!(t.min_confidence(PlanTier::Lite, Mode::All), 70);
        assert_eq!(t.min_confidence(PlanTier::Pro, Mode::Restricted), 72);
    }
}
