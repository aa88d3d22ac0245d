//! JSON rule-file parsing.
//!
//! Two file shapes exist. Rewrite tables:
//!
//! ```json
//! { "name": "german",
//!   "rules": [
//!     { "pattern": "sch", "phonetic": "s",
//!       "leftContext": "", "rightContext": "",
//!       "languageMask": 128, "logicalOp": "ANY" } ] }
//! ```
//!
//! where only `pattern` and `phonetic` are required, and language-detection
//! tables:
//!
//! ```json
//! { "rules": [ { "pattern": "/sch/", "languages": 65680, "accept": true } ] }
//! ```
//!
//! whose patterns are `/regex/flags` delimited. Parsing and regex
//! compilation both happen here, so every rule-data defect is a load-time
//! [`RuleError`] and the engine can assume well-formed tables.

use serde::Deserialize;

use crate::detect::DetectRule;
use crate::error::RuleError;
use crate::rules::{LogicalOp, Rule, RuleTable};

#[derive(Deserialize)]
struct RawRuleFile {
    name: Option<String>,
    rules: Vec<RawRule>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRule {
    pattern: String,
    phonetic: String,
    #[serde(default)]
    left_context: String,
    #[serde(default)]
    right_context: String,
    #[serde(default)]
    language_mask: Option<u32>,
    #[serde(default)]
    logical_op: RawLogicalOp,
}

#[derive(Deserialize, Default, Clone, Copy)]
enum RawLogicalOp {
    #[default]
    #[serde(rename = "ANY")]
    Any,
    #[serde(rename = "ALL")]
    All,
}

impl From<RawLogicalOp> for LogicalOp {
    fn from(raw: RawLogicalOp) -> Self {
        match raw {
            RawLogicalOp::Any => LogicalOp::Any,
            RawLogicalOp::All => LogicalOp::All,
        }
    }
}

/// Parse one rewrite-table file.
pub fn parse_rule_table(json: &str) -> Result<RuleTable, RuleError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.get("rules").is_none() {
        return Err(RuleError::MissingField("rules"));
    }
    let raw: RawRuleFile = serde_json::from_value(value)?;

    let rules = raw
        .rules
        .into_iter()
        .map(|r| {
            Rule::new(
                r.pattern,
                &r.left_context,
                &r.right_context,
                r.phonetic,
                r.language_mask,
                r.logical_op.into(),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RuleTable::new(raw.name, rules))
}

#[derive(Deserialize)]
struct RawDetectFile {
    rules: Vec<RawDetectRule>,
}

#[derive(Deserialize)]
struct RawDetectRule {
    pattern: String,
    languages: u32,
    accept: bool,
}

/// Parse one language-detection file.
pub fn parse_detect_rules(json: &str) -> Result<Vec<DetectRule>, RuleError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.get("rules").is_none() {
        return Err(RuleError::MissingField("rules"));
    }
    let raw: RawDetectFile = serde_json::from_value(value)?;

    raw.rules
        .into_iter()
        .map(|r| {
            let regex = compile_delimited(&r.pattern)?;
            Ok(DetectRule::new(regex, r.languages, r.accept))
        })
        .collect()
}

/// Compile a `/regex/flags` pattern. The Unicode flag is the engine default
/// and always on; `i` toggles case-insensitivity; other flags are accepted
/// and ignored.
fn compile_delimited(pattern: &str) -> Result<regex::Regex, RuleError> {
    let (body, flags) = match pattern.strip_prefix('/') {
        Some(rest) => match rest.rfind('/') {
            Some(end) => (&rest[..end], &rest[end + 1..]),
            None => (rest, ""),
        },
        None => (pattern, ""),
    };
    let source = if flags.contains('i') {
        format!("(?i){body}")
    } else {
        body.to_string()
    };
    regex::Regex::new(&source).map_err(|err| RuleError::Pattern {
        pattern: pattern.to_string(),
        source: Box::new(err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_rule_table() {
        let table = parse_rule_table(
            r#"{ "name": "t", "rules": [ { "pattern": "th", "phonetic": "t" } ] }"#,
        )
        .unwrap();
        assert_eq!(table.name(), Some("t"));
        assert_eq!(table.len(), 1);
        let rule = table.iter().next().unwrap();
        assert_eq!(rule.pattern(), "th");
        assert_eq!(rule.phonetic(), "t");
        assert!(rule.applies_to(0));
    }

    #[test]
    fn test_parse_full_rule() {
        let table = parse_rule_table(
            r#"{ "rules": [ {
                "pattern": "c", "phonetic": "(s|c)",
                "leftContext": "^", "rightContext": "[ei]",
                "languageMask": 96, "logicalOp": "ALL" } ] }"#,
        )
        .unwrap();
        let rule = table.iter().next().unwrap();
        assert!(rule.matches_at("ce", 0));
        assert!(!rule.matches_at("ca", 0));
        assert!(rule.applies_to(96 | 1));
        assert!(!rule.applies_to(32));
    }

    #[test]
    fn test_missing_rules_field() {
        let err = parse_rule_table(r#"{ "name": "x" }"#).unwrap_err();
        assert!(matches!(err, RuleError::MissingField("rules")));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            parse_rule_table("not json").unwrap_err(),
            RuleError::Format(_)
        ));
    }

    #[test]
    fn test_missing_pattern_is_format_error() {
        let err = parse_rule_table(r#"{ "rules": [ { "phonetic": "t" } ] }"#).unwrap_err();
        assert!(matches!(err, RuleError::Format(_)));
    }

    #[test]
    fn test_bad_context_regex_is_pattern_error() {
        let err = parse_rule_table(
            r#"{ "rules": [ { "pattern": "a", "phonetic": "a", "leftContext": "(" } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, RuleError::Pattern { .. }));
    }

    #[test]
    fn test_parse_detect_rules() {
        let rules = parse_detect_rules(
            r#"{ "rules": [
                { "pattern": "/sch/", "languages": 65680, "accept": true },
                { "pattern": "/W/iu", "languages": 184384, "accept": false } ] }"#,
        )
        .unwrap();
        assert_eq!(rules.len(), 2);
        assert!(rules[0].accept());
        assert_eq!(rules[0].languages(), 65680);
        assert!(!rules[1].accept());
        // the i flag was honored
        assert!(rules[1].is_match("warsaw"));
    }

    #[test]
    fn test_detect_missing_rules_field() {
        let err = parse_detect_rules(r#"{}"#).unwrap_err();
        assert!(matches!(err, RuleError::MissingField("rules")));
    }
}
