//! The demotion state machine.
//!
//! A single pass over the candidate either yields a consistent directional
//! signal or demotes to WAIT. It never errors: incomplete execution levels
//! and unparseable numerics are resolved silently, because the upstream
//! model is untrusted and a WAIT is always a safe answer.

use common::{Action, CandidateSignal, PolicyContext, SanitizedSignal};
use tracing::debug;

use crate::policy::ThresholdTable;
use crate::scorer::{effective_confidence, ScoreWeights};

/// Placeholders so a WAIT is never empty-handed. A documented fallback, not
/// an error path.
const WAIT_TRIGGERS: [&str; 3] = [
    "Wait for a confirmed break of the nearest key level",
    "Watch for a clean retest with momentum confirmation",
    "Re-check once the current candle closes",
];

const DEFAULT_SYMBOL: &str = "SYMBOL";
const DEFAULT_TIMEFRAME: &str = "TF";

pub struct Sanitizer {
    thresholds: ThresholdTable,
    weights: ScoreWeights,
}

impl Sanitizer {
    pub fn new(thresholds: ThresholdTable, weights: ScoreWeights) -> Self {
        Self {
            thresholds,
            weights,
        }
    }

    /// Sanitizes a candidate under the given policy. Infallible by design.
    pub fn sanitize(&self, candidate: CandidateSignal, policy: &PolicyContext) -> SanitizedSignal {
        let confidence = effective_confidence(&candidate, &self.weights);
        let mut action = candidate.action.unwrap_or(Action::Wait);
        let mut triggers = candidate.triggers.clone();

        let threshold = self.thresholds.min_confidence(policy.plan, policy.mode);
        if action.is_directional() && confidence < threshold {
            debug!(
                %action,
                confidence,
                threshold,
                "confidence below plan threshold, demoting to WAIT"
            );
            triggers.insert(
                0,
                format!("Conviction at {confidence}% is below the bar for this plan"),
            );
            action = Action::Wait;
        }

        let (symbol, timeframe) = resolve_instrument(&candidate, policy);
        let bias = candidate
            .bias
            .clone()
            .unwrap_or_else(|| "Neutral".to_string());

        let entry_low = round2(candidate.entry_low);
        let entry_high = round2(candidate.entry_high);
        let stop_loss = round2(candidate.stop_loss);
        let take_profits = complete_levels(candidate.take_profits);

        if action.is_directional() {
            match (entry_low, entry_high, stop_loss, &take_profits) {
                (Some(lo), Some(hi), Some(sl), Some(tps)) => {
                    let entry_zone = candidate
                        .entry_zone
                        .clone()
                        .unwrap_or_else(|| format!("{lo:.2} - {hi:.2}"));
                    return SanitizedSignal {
                        action,
                        symbol,
                        timeframe,
                        bias,
                        confidence,
                        entry_zone: Some(entry_zone),
                        entry_low: Some(lo),
                        entry_high: Some(hi),
                        stop_loss: Some(sl),
                        take_profits: Some([
                            format!("{:.2}", tps[0]),
                            format!("{:.2}", tps[1]),
                            format!("{:.2}", tps[2]),
                        ]),
                        triggers,
                        note: candidate.note,
                    };
                }
                _ => {
                    debug!(%action, "incomplete execution levels, demoting to WAIT");
                    triggers.insert(
                        0,
                        "Setup is not fully mapped yet; levels still forming".to_string(),
                    );
                }
            }
        }

        wait_signal(symbol, timeframe, bias, confidence, triggers, candidate.note)
    }

    /// The canned WAIT a caller substitutes when the extractor found nothing
    /// structured at all.
    pub fn fallback(&self, policy: &PolicyContext) -> SanitizedSignal {
        let (symbol, timeframe) = resolve_instrument(&CandidateSignal::default(), policy);
        wait_signal(
            symbol,
            timeframe,
            "Neutral".to_string(),
            0,
            Vec::new(),
            None,
        )
    }
}

/// WAIT terminal state: price-free, with at least three triggers.
fn wait_signal(
    symbol: String,
    timeframe: String,
    bias: String,
    confidence: u8,
    mut triggers: Vec<String>,
    note: Option<String>,
) -> SanitizedSignal {
    for placeholder in WAIT_TRIGGERS {
        if triggers.len() >= 3 {
            break;
        }
        if !triggers.iter().any(|t| t == placeholder) {
            triggers.push(placeholder.to_string());
        }
    }

    SanitizedSignal {
        action: Action::Wait,
        symbol,
        timeframe,
        bias,
        confidence,
        entry_zone: None,
        entry_low: None,
        entry_high: None,
        stop_loss: None,
        take_profits: None,
        triggers,
        note,
    }
}

/// Hard instrument override: a configured constraint beats whatever the model
/// reported. Not a validation failure.
fn resolve_instrument(candidate: &CandidateSignal, policy: &PolicyContext) -> (String, String) {
    match &policy.constraint {
        Some(c) => {
            let reported = candidate.timeframe.as_deref().unwrap_or("");
            let timeframe = if c.timeframes.iter().any(|t| t.eq_ignore_ascii_case(reported)) {
                reported.to_string()
            } else {
                c.timeframes
                    .first()
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_TIMEFRAME.to_string())
            };
            (c.symbol.clone(), timeframe)
        }
        None => (
            candidate
                .symbol
                .clone()
                .unwrap_or_else(|| DEFAULT_SYMBOL.to_string()),
            candidate
                .timeframe
                .clone()
                .unwrap_or_else(|| DEFAULT_TIMEFRAME.to_string()),
        ),
    }
}

fn round2(value: Option<f64>) -> Option<f64> {
    match value {
        Some(v) if v.is_finite() => Some((v * 100.0).round() / 100.0),
        _ => None,
    }
}

fn complete_levels(tps: [Option<f64>; 3]) -> Option<[f64; 3]> {
    match (round2(tps[0]), round2(tps[1]), round2(tps[2])) {
        (Some(a), Some(b), Some(c)) => Some([a, b, c]),
        _ => None,
    }
}
