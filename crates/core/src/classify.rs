//! Keyword-based error classification
//!
//! Classification is total and deterministic: every message yields exactly
//! one severity and one category, unknowns fall to the least alarming
//! bucket. Rules are evaluated first-match-wins over the lower-cased
//! message, independently for severity and category. The keyword tables are
//! a deliberately simple heuristic; precision is not guaranteed.

use beacon_domain::{Category, ContextMap, Severity};

const UI_KEYWORDS: &[&str] = &["component", "render"];
const NETWORK_KEYWORDS: &[&str] = &["network", "fetch", "connection"];
const API_KEYWORDS: &[&str] = &["api", "http", "request"];

const AUTH_KEYWORDS: &[&str] = &["unauthorized", "forbidden", "auth"];
const FATAL_TYPE_KEYWORDS: &[&str] = &["typeerror", "referenceerror", "syntaxerror"];
const RANGE_TYPE_KEYWORDS: &[&str] = &["rangeerror", "urierror"];

/// Context keys that mark a report as originating from the UI layer
const COMPONENT_CONTEXT_KEYS: &[&str] = &["component", "componentName", "componentStack"];

/// Classify a message into `(severity, category)` in one call
pub fn classify(
    message: &str,
    context: Option<&ContextMap>,
    has_component_marker: bool,
) -> (Severity, Category) {
    let lowered = message.to_lowercase();
    (severity_of(&lowered), category_of(&lowered, context, has_component_marker))
}

/// Infer the category for an error message
pub fn classify_category(
    message: &str,
    context: Option<&ContextMap>,
    has_component_marker: bool,
) -> Category {
    category_of(&message.to_lowercase(), context, has_component_marker)
}

/// Infer the severity for an error message
pub fn classify_severity(message: &str) -> Severity {
    severity_of(&message.to_lowercase())
}

fn category_of(lowered: &str, context: Option<&ContextMap>, has_component_marker: bool) -> Category {
    let context_marks_ui = context
        .map(|map| COMPONENT_CONTEXT_KEYS.iter().any(|key| map.contains_key(*key)))
        .unwrap_or(false);

    if has_component_marker || context_marks_ui || contains_any(lowered, UI_KEYWORDS) {
        Category::Ui
    } else if contains_any(lowered, NETWORK_KEYWORDS) {
        Category::Network
    } else if contains_any(lowered, API_KEYWORDS) {
        Category::Api
    } else {
        Category::Javascript
    }
}

fn severity_of(lowered: &str) -> Severity {
    if contains_any(lowered, NETWORK_KEYWORDS) {
        Severity::Medium
    } else if contains_any(lowered, AUTH_KEYWORDS) {
        Severity::High
    } else if contains_any(lowered, FATAL_TYPE_KEYWORDS) {
        Severity::High
    } else if contains_any(lowered, RANGE_TYPE_KEYWORDS) {
        Severity::Medium
    } else {
        Severity::Low
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use beacon_domain::ContextValue;

    use super::*;

    #[test]
    fn network_failures_classify_as_network_medium() {
        let (severity, category) = classify("Network request failed: GET /x (500)", None, false);
        assert_eq!(category, Category::Network);
        assert_eq!(severity, Severity::Medium);
    }

    #[test]
    fn auth_failures_are_high_severity() {
        assert_eq!(classify_severity("401 Unauthorized"), Severity::High);
        assert_eq!(classify_severity("token auth expired"), Severity::High);
    }

    #[test]
    fn script_type_errors_are_high_severity() {
        assert_eq!(classify_severity("TypeError: x is not a function"), Severity::High);
        assert_eq!(classify_severity("ReferenceError: y is not defined"), Severity::High);
        assert_eq!(classify_severity("RangeError: invalid array length"), Severity::Medium);
    }

    #[test]
    fn unknown_messages_fall_to_least_alarming_bucket() {
        let (severity, category) = classify("something odd happened", None, false);
        assert_eq!(severity, Severity::Low);
        assert_eq!(category, Category::Javascript);
    }

    #[test]
    fn component_marker_wins_over_message_keywords() {
        assert_eq!(classify_category("network glitch", None, true), Category::Ui);

        let mut context = ContextMap::new();
        context.insert("componentStack".into(), ContextValue::from("at App"));
        assert_eq!(classify_category("fetch failed", Some(&context), false), Category::Ui);
    }

    #[test]
    fn render_messages_classify_as_ui() {
        assert_eq!(classify_category("failed to render list", None, false), Category::Ui);
    }

    #[test]
    fn api_keywords_classify_as_api() {
        assert_eq!(classify_category("HTTP 502 from upstream", None, false), Category::Api);
        assert_eq!(classify_category("API error: POST /v1 (400)", None, false), Category::Api);
    }

    #[test]
    fn classification_is_deterministic() {
        let message = "Connection reset while rendering";
        let first = classify(message, None, false);
        let second = classify(message, None, false);
        assert_eq!(first, second);
    }

    #[test]
    fn first_match_wins_between_severity_rules() {
        // "network" is evaluated before "auth", so a mixed message stays medium
        assert_eq!(classify_severity("network auth handshake failed"), Severity::Medium);
    }
}
