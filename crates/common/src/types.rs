//! Core records flowing through the engine.
//!
//! `CandidateSignal` is the parsed-but-untrusted shape recovered from model
//! output; `SanitizedSignal` is the only record safe to format or deliver.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional call. `Wait` is the safe state every malformed record
/// degrades into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Buy,
    Sell,
    Wait,
}

impl Action {
    pub fn is_directional(self) -> bool {
        matches!(self, Action::Buy | Action::Sell)
    }

    /// Loose parse of whatever the model reported. Unknown labels are `None`,
    /// not an error.
    pub fn parse_loose(raw: &str) -> Option<Action> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "BUY" | "LONG" => Some(Action::Buy),
            "SELL" | "SHORT" => Some(Action::Sell),
            "WAIT" | "HOLD" | "NEUTRAL" => Some(Action::Wait),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
            Action::Wait => write!(f, "WAIT"),
        }
    }
}

/// Subscription tier of the requesting account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanTier {
    Lite,
    Pro,
    Vip,
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanTier::Lite => write!(f, "LITE"),
            PlanTier::Pro => write!(f, "PRO"),
            PlanTier::Vip => write!(f, "VIP"),
        }
    }
}

/// Operating mode. `Restricted` pins the bot to a configured instrument and
/// demands higher confidence before a directional call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    All,
    Restricted,
}

/// Forced symbol/timeframe set for restricted modes. When present, whatever
/// the model reported is overwritten, not validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentConstraint {
    pub symbol: String,
    /// Allowed timeframes; the first entry is the fallback when the reported
    /// timeframe is absent or not in the set.
    pub timeframes: Vec<String>,
}

/// Immutable per-request policy inputs, supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyContext {
    pub plan: PlanTier,
    pub mode: Mode,
    #[serde(default)]
    pub constraint: Option<InstrumentConstraint>,
}

/// Named sub-indicator weights reported by the model. All fields optional:
/// the upstream model is untrusted and may omit any of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubScores {
    pub trend: Option<f64>,
    #[serde(alias = "rsi")]
    pub oscillator: Option<f64>,
    #[serde(alias = "macd")]
    pub oscillator_confirm: Option<f64>,
    #[serde(alias = "candle")]
    pub candles: Option<f64>,
    #[serde(alias = "cleanliness")]
    pub clarity: Option<f64>,
}

impl SubScores {
    pub fn is_empty(&self) -> bool {
        self.trend.is_none()
            && self.oscillator.is_none()
            && self.oscillator_confirm.is_none()
            && self.candles.is_none()
            && self.clarity.is_none()
    }
}

/// Parsed-but-unvalidated record recovered from raw model output. Created per
/// inference call and discarded after sanitization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateSignal {
    pub action: Option<Action>,
    pub symbol: Option<String>,
    pub timeframe: Option<String>,
    /// Free-form trend label ("Bullish", "ranging", ...).
    pub bias: Option<String>,
    pub subscores: Option<SubScores>,
    pub confidence: Option<f64>,
    /// Textual entry description, e.g. "4420.0 - 4424.0".
    pub entry_zone: Option<String>,
    pub entry_low: Option<f64>,
    pub entry_high: Option<f64>,
    pub stop_loss: Option<f64>,
    /// Expected length 3; slots the model failed to supply stay `None`.
    pub take_profits: [Option<f64>; 3],
    pub triggers: Vec<String>,
    pub note: Option<String>,
}

/// Invariant-respecting output record. A directional signal always carries
/// complete execution levels; a WAIT signal carries none and at least one
/// trigger. Only the sanitizer constructs these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizedSignal {
    pub action: Action,
    pub symbol: String,
    pub timeframe: String,
    pub bias: String,
    /// Integer confidence, [0, 95] when recomputed from subscores, [0, 100]
    /// on the self-reported fallback path.
    pub confidence: u8,
    pub entry_zone: Option<String>,
    pub entry_low: Option<f64>,
    pub entry_high: Option<f64>,
    pub stop_loss: Option<f64>,
    /// Formatted price levels, present iff the action is directional.
    pub take_profits: Option<[String; 3]>,
    pub triggers: Vec<String>,
    pub note: Option<String>,
}

impl SanitizedSignal {
    /// True when the §3 shape invariant holds. Used by tests and debug
    /// assertions; production code upholds it by construction.
    pub fn is_consistent(&self) -> bool {
        if self.action.is_directional() {
            self.entry_low.is_some()
                && self.entry_high.is_some()
                && self.stop_loss.is_some()
                && self.take_profits.is_some()
        } else {
            self.entry_low.is_none()
                && self.entry_high.is_none()
                && self.stop_loss.is_none()
                && self.take_profits.is_none()
                && !self.triggers.is_empty()
        }
    }
}
