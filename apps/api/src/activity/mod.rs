pub mod buffer;
pub mod handlers;

use serde::Deserialize;
use serde_json::Value;

/// A client-reported activity event. Every field defaults so one malformed
/// event cannot fail the whole batch; validation filters instead.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    #[serde(default)]
    pub visitor_id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub painting_id: Option<String>,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    /// Client-side epoch millis, if the client bothered to send one.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Drops events missing a visitor id or an event name.
pub fn filter_valid(events: Vec<ActivityEvent>) -> Vec<ActivityEvent> {
    events
        .into_iter()
        .filter(|e| !e.visitor_id.is_empty() && !e.event.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(visitor: &str, name: &str) -> ActivityEvent {
        ActivityEvent {
            visitor_id: visitor.to_string(),
            session_id: None,
            event: name.to_string(),
            painting_id: None,
            position: None,
            source: None,
            metadata: None,
            timestamp: None,
        }
    }

    #[test]
    fn test_filter_keeps_valid_events() {
        let valid = filter_valid(vec![event("v1", "view"), event("v2", "save")]);
        assert_eq!(valid.len(), 2);
    }

    #[test]
    fn test_filter_drops_missing_visitor_or_event() {
        let valid = filter_valid(vec![event("", "view"), event("v1", ""), event("v1", "view")]);
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].visitor_id, "v1");
    }

    #[test]
    fn test_malformed_event_still_deserializes() {
        let e: ActivityEvent = serde_json::from_str(r#"{"paintingId": "p1"}"#).unwrap();
        assert!(e.visitor_id.is_empty());
        assert!(filter_valid(vec![e]).is_empty());
    }
}
