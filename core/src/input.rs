use std::collections::HashMap;

use crate::error::{Result, TrackerError};

/// Keys accepted after the title words, e.g. `due:tomorrow`.
pub const TASK_KEYS: &[&str] = &["due", "priority", "tags", "notes"];

#[derive(Debug, PartialEq)]
pub struct ParsedInput {
    pub title: String,
    pub metadata: HashMap<String, String>,
}

/// Splits command-line words into a title and `key:value` pairs.
///
/// A word is metadata when the text before its first colon is non-empty and
/// has no whitespace. A quoted phrase such as `"lunch at 12:30"` stays in the
/// title.
pub fn parse_args(args: &[String]) -> ParsedInput {
    let mut title_parts = Vec::new();
    let mut metadata = HashMap::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once(':') {
            if !key.is_empty() && !key.contains(char::is_whitespace) {
                metadata.insert(key.to_lowercase(), value.to_string());
                continue;
            }
        }
        title_parts.push(arg.as_str());
    }

    ParsedInput {
        title: title_parts.join(" "),
        metadata,
    }
}

/// Resolves a possibly abbreviated key against `candidates`.
pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    // 1. Exact match
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    // 2. Prefix match
    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.starts_with(key))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(TrackerError::Validation(format!("Unknown key: '{}'", key))),
        _ => Err(TrackerError::Validation(format!(
            "Ambiguous key: '{}' matches {:?}",
            key, matches
        ))),
    }
}

/// Expands every metadata key; the first unknown or ambiguous key is an error.
pub fn normalize_metadata(
    metadata: HashMap<String, String>,
    candidates: &[&str],
) -> Result<HashMap<String, String>> {
    metadata
        .into_iter()
        .map(|(key, value)| Ok((expand_key(&key, candidates)?, value)))
        .collect()
}

/// `"work, home,,dev"` -> `["work", "home", "dev"]`. Case and duplicates are
/// kept as typed.
pub fn split_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_simple() {
        let parsed = parse_args(&args(&["Buy", "milk", "due:tomorrow", "tags:home,errands"]));
        assert_eq!(parsed.title, "Buy milk");
        assert_eq!(parsed.metadata.get("due"), Some(&"tomorrow".to_string()));
        assert_eq!(parsed.metadata.get("tags"), Some(&"home,errands".to_string()));
    }

    #[test]
    fn test_parse_keeps_spaced_values_and_colon_titles() {
        let parsed = parse_args(&args(&["Call", "notes:ask about the bill", ":smile:", "lunch at 12:30"]));
        assert_eq!(parsed.title, "Call :smile: lunch at 12:30");
        assert_eq!(parsed.metadata.get("notes"), Some(&"ask about the bill".to_string()));
    }

    #[test]
    fn test_expand_key() {
        assert_eq!(expand_key("d", TASK_KEYS).unwrap(), "due");
        assert_eq!(expand_key("pri", TASK_KEYS).unwrap(), "priority");
        assert_eq!(expand_key("tags", TASK_KEYS).unwrap(), "tags");
        assert_eq!(expand_key("n", TASK_KEYS).unwrap(), "notes");

        // Unknown
        assert!(expand_key("x", TASK_KEYS).is_err());
        assert!(expand_key("project", TASK_KEYS).is_err());
    }

    #[test]
    fn test_expand_key_ambiguous() {
        let candidates = ["due", "project", "priority"];
        assert!(expand_key("p", &candidates).is_err());
        assert!(expand_key("pr", &candidates).is_err());
        assert_eq!(expand_key("pro", &candidates).unwrap(), "project");
    }

    #[test]
    fn test_normalize_metadata() {
        let parsed = parse_args(&args(&["Task", "d:eow", "p:h"]));
        let normalized = normalize_metadata(parsed.metadata, TASK_KEYS).unwrap();
        assert_eq!(normalized.get("due"), Some(&"eow".to_string()));
        assert_eq!(normalized.get("priority"), Some(&"h".to_string()));

        let bad = parse_args(&args(&["Task", "zz:1"]));
        assert!(normalize_metadata(bad.metadata, TASK_KEYS).is_err());
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags("work, home,,Work"), vec!["work", "home", "Work"]);
        assert!(split_tags("").is_empty());
    }
}
