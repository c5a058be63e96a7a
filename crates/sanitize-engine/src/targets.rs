//! Take-profit derivation from the entry zone.
//!
//! TP1 sits at a fixed point offset from the anchor no matter how strong the
//! signal is. That is a marketing rule, not a trading heuristic; do not
//! change it without product input. TP2/TP3 switch between a weak and a
//! strong offset pair on the confidence cutoff.

use common::{Action, SanitizedSignal};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

static NUM_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("number regex"));

static DECIMALS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.(\d+)").expect("decimals regex"));

/// Point offsets and conversion constants. All config-overridable.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetRules {
    /// Price delta of one point.
    pub point_value: f64,
    /// Confidence at or above this selects the strong offset pair.
    pub strong_confidence: u8,
    /// TP1 offset, applied on both branches.
    pub tp1_points: u32,
    pub tp2_weak_points: u32,
    pub tp3_weak_points: u32,
    pub tp2_strong_points: u32,
    pub tp3_strong_points: u32,
}

impl Default for TargetRules {
    fn default() -> Self {
        Self {
            point_value: 0.01,
            strong_confidence: 70,
            tp1_points: 200,
            tp2_weak_points: 400,
            tp3_weak_points: 600,
            tp2_strong_points: 500,
            tp3_strong_points: 700,
        }
    }
}

impl TargetRules {
    /// Rewrites the signal's take-profits from its entry zone. Pure and
    /// idempotent: the same zone and confidence always yield the same
    /// targets. Non-directional signals and zones without a single numeric
    /// token are left untouched.
    pub fn apply(&self, signal: &mut SanitizedSignal) {
        if !signal.action.is_directional() {
            return;
        }
        let zone = match signal.entry_zone.as_deref() {
            Some(z) => z,
            None => return,
        };
        let anchor = match parse_anchor(zone) {
            Some(a) => a,
            None => {
                debug!(zone, "no numeric tokens in entry zone, keeping model targets");
                return;
            }
        };
        let decimals = detect_decimals(zone);

        let strong = signal.confidence >= self.strong_confidence;
        let (p2, p3) = if strong {
            (self.tp2_strong_points, self.tp3_strong_points)
        } else {
            (self.tp2_weak_points, self.tp3_weak_points)
        };

        let sign = if signal.action == Action::Sell { -1.0 } else { 1.0 };
        let tp = |points: u32| {
            let price = anchor + sign * f64::from(points) * self.point_value;
            format!("{price:.decimals$}")
        };

        signal.take_profits = Some([tp(self.tp1_points), tp(p2), tp(p3)]);
    }
}

/// Anchor price: midpoint of the first two numbers when the text reads as a
/// range, otherwise the first number.
fn parse_anchor(zone: &str) -> Option<f64> {
    let nums: Vec<f64> = NUM_TOKEN
        .find_iter(zone)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect();
    match nums.as_slice() {
        [] => None,
        [first, second, ..] if zone.contains('-') || zone.contains('–') => {
            Some((first + second) / 2.0)
        }
        [first, ..] => Some(*first),
    }
}

/// Output precision follows the zone text, capped at 4 digits, 1 when the
/// text carries no decimals.
fn detect_decimals(zone: &str) -> usize {
    DECIMALS
        .captures(zone)
        .map(|c| c[1].len().min(4))
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Action;

    fn buy(entry_zone: &str, confidence: u8) -> SanitizedSignal {
        SanitizedSignal {
            action: Action::Buy,
            symbol: "XAUUSD".to_string(),
            timeframe: "15m".to_string(),
            bias: "Bullish".to_string(),
            confidence,
            entry_zone: Some(entry_zone.to_string()),
            entry_low: Some(4420.0),
            entry_high: Some(4424.0),
            stop_loss: Some(4410.0),
            take_profits: Some(["0".to_string(), "0".to_string(), "0".to_string()]),
            triggers: Vec::new(),
            note: None,
        }
    }

    #[test]
    fn strong_buy_from_range_zone() {
        let rules = TargetRules::default();
        let mut s = buy("4420.0 - 4424.0", 75);
        rules.apply(&mut s);
        // anchor 4422.0, one decimal, +2.0/+5.0/+7.0
        assert_eq!(
            s.take_profits,
            Some(["4424.0".to_string(), "4427.0".to_string(), "4429.0".to_string()])
        );
    }

    #[test]
    fn en_dash_range_also_anchors_at_midpoint() {
        let rules = TargetRules::default();
        let mut s = buy("4420.0 – 4424.0", 75);
        rules.apply(&mut s);
        assert_eq!(
            s.take_profits,
            Some(["4424.0".to_string(), "4427.0".to_string(), "4429.0".to_string()])
        );
    }

    #[test]
    fn weak_branch_widens_tp2_tp3_only() {
        let rules = TargetRules::default();
        let mut s = buy("4420.0 - 4424.0", 50);
        rules.apply(&mut s);
        // TP1 offset is fixed on both branches.
        assert_eq!(
            s.take_profits,
            Some(["4424.0".to_string(), "4426.0".to_string(), "4428.0".to_string()])
        );
    }

    #[test]
    fn sell_subtracts_from_anchor() {
        let rules = TargetRules::default();
        let mut s = buy("Breakdown below 4435.0", 80);
        s.action = Action::Sell;
        rules.apply(&mut s);
        assert_eq!(
            s.take_profits,
            Some(["4433.0".to_string(), "4430.0".to_string(), "4428.0".to_string()])
        );
    }

    #[test]
    fn precision_follows_zone_text() {
        let rules = TargetRules::default();
        let mut s = buy("1.0845 - 1.0851", 90);
        rules.apply(&mut s);
        // anchor 1.0848, 4 decimals
        assert_eq!(
            s.take_profits,
            Some(["3.0848".to_string(), "6.0848".to_string(), "8.0848".to_string()])
        );

        let mut s = buy("4420 - 4424", 90);
        rules.apply(&mut s);
        // no decimals in the text, default to 1
        assert_eq!(
            s.take_profits,
            Some(["4424.0".to_string(), "4427.0".to_string(), "4429.0".to_string()])
        );
    }

    #[test]
    fn zone_without_numbers_leaves_targets_untouched() {
        let rules = TargetRules::default();
        let mut s = buy("Wait for breakout", 90);
        let before = s.take_profits.clone();
        rules.apply(&mut s);
        assert_eq!(s.take_profits, before);
    }

    #[test]
    fn wait_signal_is_untouched() {
        let rules = TargetRules::default();
        let mut s = buy("4420.0 - 4424.0", 90);
        s.action = Action::Wait;
        s.take_profits = None;
        rules.apply(&mut s);
        assert_eq!(s.take_profits, None);
    }

    #[test]
    fn derivation_is_idempotent() {
        let rules = TargetRules::default();
        let mut s = buy("4420.0 - 4424.0", 75);
        rules.apply(&mut s);
        let first = s.take_profits.clone();
        rules.apply(&mut s);
        assert_eq!(s.take_profits, first);
    }
}
