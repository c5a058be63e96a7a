//! Push-path alert payloads.
//!
//! Webhook deliveries arrive as flat JSON from an external alerting trigger.
//! The payload maps onto a candidate signal and yields the logical event
//! identity the dedupe gate keys on.

use common::{Action, CandidateSignal};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AlertEvent {
    pub symbol: String,
    pub timeframe: String,
    #[serde(default)]
    pub action: Option<String>,
    /// Kind of update ("new", "tp_hit", "sl_moved", ...). Part of the event
    /// identity so a follow-up is not deduped against the original signal.
    #[serde(default)]
    pub update: Option<String>,
    /// Caller-supplied identity; when present it wins over the synthesized one.
    #[serde(default)]
    pub signal_id: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub entry_zone: Option<String>,
    #[serde(default)]
    pub entry_low: Option<f64>,
    #[serde(default)]
    pub entry_high: Option<f64>,
    #[serde(default, alias = "sl")]
    pub stop_loss: Option<f64>,
    #[serde(default)]
    pub tp1: Option<f64>,
    #[serde(default)]
    pub tp2: Option<f64>,
    #[serde(default)]
    pub tp3: Option<f64>,
}

impl AlertEvent {
    fn parsed_action(&self) -> Option<Action> {
        self.action.as_deref().and_then(Action::parse_loose)
    }

    /// The identity the dedupe gate sees. Explicit `signal_id` wins;
    /// otherwise synthesized from what makes two alerts "the same event".
    pub fn logical_event_id(&self) -> String {
        if let Some(id) = self.signal_id.as_deref() {
            let id = id.trim();
            if !id.is_empty() {
                return id.to_string();
            }
        }
        let action = self.parsed_action().unwrap_or(Action::Wait);
        let update = self.update.as_deref().unwrap_or("new");
        format!("{}:{}:{}:{}", self.symbol, self.timeframe, action, update)
    }

    pub fn into_candidate(self) -> CandidateSignal {
        let action = self.parsed_action();
        CandidateSignal {
            action,
            symbol: Some(self.symbol),
            timeframe: Some(self.timeframe),
            confidence: self.confidence,
            entry_zone: self.entry_zone,
            entry_low: self.entry_low,
            entry_high: self.entry_high,
            stop_loss: self.stop_loss,
            take_profits: [self.tp1, self.tp2, self.tp3],
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(json: &str) -> AlertEvent {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn explicit_signal_id_wins() {
        let e = event(r#"{"symbol":"XAUUSD","timeframe":"15m","signal_id":"sig-42"}"#);
        assert_eq!(e.logical_event_id(), "sig-42");
    }

    #[test]
    fn id_synthesized_from_event_identity() {
        let e = event(
            r#"{"symbol":"XAUUSD","timeframe":"15m","action":"buy","update":"tp_hit"}"#,
        );
        assert_eq!(e.logical_event_id(), "XAUUSD:15m:BUY:tp_hit");

        let e = event(r#"{"symbol":"EURUSD","timeframe":"1h"}"#);
        assert_eq!(e.logical_event_id(), "EURUSD:1h:WAIT:new");
    }

    #[test]
    fn blank_signal_id_falls_back_to_synthesis() {
        let e = event(r#"{"symbol":"XAUUSD","timeframe":"15m","signal_id":"  "}"#);
        assert_eq!(e.logical_event_id(), "XAUUSD:15m:WAIT:new");
    }

    #[test]
    fn converts_into_candidate() {
        let e = event(
            r#"{"symbol":"XAUUSD","timeframe":"15m","action":"SELL","confidence":81,
                "entry_zone":"4435.0","entry_low":4434.0,"entry_high":4436.0,
                "sl":4442.0,"tp1":4433.0,"tp2":4430.0,"tp3":4428.0}"#,
        );
        let c = e.into_candidate();
        assert_eq!(c.action, Some(Action::Sell));
        assert_eq!(c.stop_loss, Some(4442.0));
        assert_eq!(c.take_profits, [Some(4433.0), Some(4430.0), Some(4428.0)]);
    }
}
