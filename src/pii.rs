//! Regex-based PII detection and redaction.

use crate::config::CompiledPolicy;

/// The outcome of scanning one piece of text.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Whether any category matched.
    pub found: bool,
    /// The text with every match replaced by its category placeholder.
    pub redacted: String,
    /// Categories that matched, in evaluation order.
    pub categories: Vec<String>,
}

/// Scan text for the configured PII categories, replacing every
/// non-overlapping match with `[REDACTED_<CATEGORY>]`.
///
/// Categories run in priority order; later categories see the already
/// partially redacted text, so overlapping matches resolve
/// deterministically. Placeholders contain no digits or `@`, so a second
/// pass over redacted text is a no-op.
pub fn detect(text: &str, policy: &CompiledPolicy) -> Detection {
    let mut redacted = text.to_string();
    let mut categories = Vec::new();

    for (name, re) in &policy.pii_categories {
        if !re.is_match(&redacted) {
            continue;
        }
        let placeholder = format!("[REDACTED_{name}]");
        redacted = re.replace_all(&redacted, placeholder.as_str()).to_string();
        categories.push(name.clone());
    }

    Detection {
        found: !categories.is_empty(),
        redacted,
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyConfig;
    use std::collections::BTreeMap;

    fn default_policy() -> CompiledPolicy {
        PolicyConfig::default().compile()
    }

    #[test]
    fn test_email_redacted() {
        let policy = default_policy();
        let result = detect("contact me at a@b.com", &policy);
        assert!(result.found);
        assert_eq!(result.redacted, "contact me at [REDACTED_EMAIL]");
        assert_eq!(result.categories, vec!["EMAIL"]);
    }

    #[test]
    fn test_every_email_occurrence_redacted() {
        let policy = default_policy();
        let result = detect("a@b.com then c@d.org", &policy);
        assert!(!result.redacted.contains('@'));
        assert_eq!(result.redacted, "[REDACTED_EMAIL] then [REDACTED_EMAIL]");
    }

    #[test]
    fn test_clean_text_unchanged() {
        let policy = default_policy();
        let result = detect("hello world", &policy);
        assert!(!result.found);
        assert_eq!(result.redacted, "hello world");
        assert!(result.categories.is_empty());
    }

    #[test]
    fn test_empty_text() {
        let policy = default_policy();
        let result = detect("", &policy);
        assert!(!result.found);
        assert_eq!(result.redacted, "");
    }

    #[test]
    fn test_ssn_redacted() {
        let policy = default_policy();
        let result = detect("ssn is 123-45-6789 ok", &policy);
        assert!(result.found);
        assert_eq!(result.redacted, "ssn is [REDACTED_SSN] ok");
    }

    #[test]
    fn test_credit_card_plain() {
        let policy = default_policy();
        let result = detect("card 4111111111111111 on file", &policy);
        assert_eq!(result.redacted, "card [REDACTED_CREDIT_CARD] on file");
    }

    #[test]
    fn test_credit_card_with_separators() {
        let policy = default_policy();
        assert!(detect("4111 1111 1111 1111", &policy).found);
        assert!(detect("4111-1111-1111-1111", &policy).found);
    }

    #[test]
    fn test_short_digit_run_not_card() {
        let policy = default_policy();
        // Phone-length runs stay untouched
        let result = detect("call 555-123-4567", &policy);
        assert!(!result.found);
    }

    #[test]
    fn test_multiple_categories() {
        let policy = default_policy();
        let result = detect("a@b.com and 123-45-6789", &policy);
        assert_eq!(result.categories, vec!["EMAIL", "SSN"]);
        assert_eq!(result.redacted, "[REDACTED_EMAIL] and [REDACTED_SSN]");
    }

    #[test]
    fn test_redaction_idempotent() {
        let policy = default_policy();
        let first = detect("mail a@b.com, ssn 123-45-6789", &policy);
        let second = detect(&first.redacted, &policy);
        assert!(!second.found);
        assert_eq!(second.redacted, first.redacted);
    }

    #[test]
    fn test_custom_category() {
        let config = PolicyConfig {
            pii_patterns: BTreeMap::from([(
                "employee_id".to_string(),
                r"EMP-\d{6}".to_string(),
            )]),
            ..Default::default()
        };
        let policy = config.compile();
        let result = detect("badge EMP-004211 checked in", &policy);
        assert!(result.found);
        assert_eq!(result.redacted, "badge [REDACTED_EMPLOYEE_ID] checked in");
        assert_eq!(result.categories, vec!["EMPLOYEE_ID"]);
    }

    #[test]
    fn test_email_digits_consumed_before_card_check() {
        let policy = default_policy();
        // The local part digits vanish with the email match; the card
        // category must not fire on the leftovers.
        let result = detect("4111111111111111a@b.com", &policy);
        assert!(result.found);
        assert!(!result.redacted.contains("4111"));
    }
}
