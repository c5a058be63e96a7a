use common::{Action, CandidateSignal, Error, Result, SubScores};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Markdown fence around a JSON object, the most common wrapper in model output.
static JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.+?\})\s*```").expect("fence regex"));

/// Recovers a candidate signal from raw model output.
///
/// Parse order: the trimmed text as-is, then the body of a ```json fence,
/// then the substring between the first `{` and the last `}`. Anything less
/// structured than that is `Error::NoStructuredData`; the caller substitutes
/// its canned WAIT fallback.
pub fn extract_candidate(raw: &str) -> Result<CandidateSignal> {
    let value = parse_object(raw).ok_or_else(|| {
        debug!("no parseable object in model output ({} bytes)", raw.len());
        Error::no_structured_data(raw)
    })?;
    Ok(candidate_from_value(&value))
}

fn parse_object(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if let Ok(v @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
        return Some(v);
    }

    if let Some(caps) = JSON_FENCE.captures(trimmed) {
        if let Ok(v @ Value::Object(_)) = serde_json::from_str::<Value>(&caps[1]) {
            return Some(v);
        }
    }

    // Brace-bounded substring. Intentionally the last resort and the last
    // attempt: no lenient repair beyond this.
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&trimmed[start..=end]) {
        Ok(v @ Value::Object(_)) => Some(v),
        _ => None,
    }
}

/// Builds the candidate with explicit per-field recovery. Every field is
/// optional; a wrong type degrades that field to `None` rather than failing
/// the whole record.
fn candidate_from_value(value: &Value) -> CandidateSignal {
    let action = field(value, &["action", "signal"])
        .and_then(Value::as_str)
        .and_then(Action::parse_loose);

    let take_profits = extract_take_profits(value);

    CandidateSignal {
        action,
        symbol: loose_string(field(value, &["symbol", "pair"])),
        timeframe: loose_string(field(value, &["timeframe", "tf"])),
        bias: loose_string(field(value, &["bias", "market_state", "trend"])),
        subscores: extract_subscores(value),
        confidence: loose_f64(field(value, &["confidence"])),
        entry_zone: loose_string(field(value, &["entry_zone", "entry"])),
        entry_low: loose_f64(field(value, &["entry_low"])),
        entry_high: loose_f64(field(value, &["entry_high"])),
        stop_loss: loose_f64(field(value, &["sl", "stop_loss"])),
        take_profits,
        triggers: extract_strings(value, &["triggers", "reasons", "wait_reasons"]),
        note: loose_string(field(value, &["note", "reasoning_short"])),
    }
}

fn field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| value.get(k))
}

/// Numbers may arrive as JSON numbers or numeric strings ("4424.0").
fn loose_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn loose_string(value: Option<&Value>) -> Option<String> {
    let s = value?.as_str()?.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("n/a") || s.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(s.to_string())
    }
}

fn extract_subscores(value: &Value) -> Option<SubScores> {
    let obj = field(value, &["subscores", "scores"])?;
    if !obj.is_object() {
        return None;
    }
    let scores = SubScores {
        trend: loose_f64(field(obj, &["trend"])),
        oscillator: loose_f64(field(obj, &["oscillator", "rsi"])),
        oscillator_confirm: loose_f64(field(obj, &["oscillator_confirm", "macd"])),
        candles: loose_f64(field(obj, &["candles", "candle"])),
        clarity: loose_f64(field(obj, &["clarity", "cleanliness"])),
    };
    if scores.is_empty() {
        None
    } else {
        Some(scores)
    }
}

fn extract_take_profits(value: &Value) -> [Option<f64>; 3] {
    let mut tps = [None, None, None];
    if let Some(Value::Array(items)) = field(value, &["take_profits", "tps"]) {
        for (slot, item) in tps.iter_mut().zip(items.iter()) {
            *slot = loose_f64(Some(item));
        }
        return tps;
    }
    for (slot, key) in tps.iter_mut().zip(["tp1", "tp2", "tp3"]) {
        *slot = loose_f64(field(value, &[key]));
    }
    tps
}

fn extract_strings(value: &Value, keys: &[&str]) -> Vec<String> {
    match field(value, keys) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| loose_string(Some(v)))
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_json() {
        let raw = r#"{"action":"BUY","symbol":"XAUUSD","confidence":72,"entry_zone":"4420.0 - 4424.0","sl":"4410.5","tp1":"4424.0","tp2":"4427.0","tp3":"4429.0"}"#;
        let c = extract_candidate(raw).unwrap();
        assert_eq!(c.action, Some(Action::Buy));
        assert_eq!(c.symbol.as_deref(), Some("XAUUSD"));
        assert_eq!(c.confidence, Some(72.0));
        assert_eq!(c.stop_loss, Some(4410.5));
        assert_eq!(c.take_profits, [Some(4424.0), Some(4427.0), Some(4429.0)]);
    }

    #[test]
    fn parses_json_wrapped_in_prose() {
        let raw = "Here is the result: {\"action\":\"SELL\", \"confidence\": \"61\"} Thanks!";
        let c = extract_candidate(raw).unwrap();
        assert_eq!(c.action, Some(Action::Sell));
        assert_eq!(c.confidence, Some(61.0));
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n{\"signal\":\"BUY\",\"entry_zone\":\"1.0845\"}\n```";
        let c = extract_candidate(raw).unwrap();
        assert_eq!(c.action, Some(Action::Buy));
        assert_eq!(c.entry_zone.as_deref(), Some("1.0845"));
    }

    #[test]
    fn rejects_text_without_object() {
        let err = extract_candidate("Sorry, I cannot analyze this chart.").unwrap_err();
        assert!(matches!(err, Error::NoStructuredData { .. }));
    }

    #[test]
    fn rejects_non_object_json() {
        assert!(extract_candidate("[1, 2, 3]").is_err());
        assert!(extract_candidate("}{").is_err());
    }

    #[test]
    fn wrong_types_degrade_to_none() {
        let raw = r#"{"action":"MOON","confidence":"very high","sl":{"x":1},"tp1":null}"#;
        let c = extract_candidate(raw).unwrap();
        assert_eq!(c.action, None);
        assert_eq!(c.confidence, None);
        assert_eq!(c.stop_loss, None);
        assert_eq!(c.take_profits, [None, None, None]);
    }

    #[test]
    fn take_profit_array_and_subscore_aliases() {
        let raw = r#"{"take_profits":[101.5,"102.5",104],"subscores":{"trend":20,"rsi":"15","macd":true}}"#;
        let c = extract_candidate(raw).unwrap();
        assert_eq!(c.take_profits, [Some(101.5), Some(102.5), Some(104.0)]);
        let s = c.subscores.unwrap();
        assert_eq!(s.trend, Some(20.0));
        assert_eq!(s.oscillator, Some(15.0));
        assert_eq!(s.oscillator_confirm, None);
    }

    #[test]
    fn filters_placeholder_strings() {
        let raw = r#"{"entry_zone":"N/A","symbol":"","triggers":["Wait for retest",""]}"#;
        let c = extract_candidate(raw).unwrap();
        assert_eq!(c.entry_zone, None);
        assert_eq!(c.symbol, None);
        assert_eq!(c.triggers, vec!["Wait for retest".to_string()]);
    }
}
