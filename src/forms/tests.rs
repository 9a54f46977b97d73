//! Tests for forms module
//!
//! These tests verify the validation engine including:
//! - Rule priority and short-circuiting
//! - Numeric coercion and skipping of non-numeric text
//! - Debounced change handling and immediate blur handling
//! - Reset and teardown semantics

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::forms::rules::{matches_field, password_strength};
    use regex::Regex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    type Form = HashMap<String, FieldValue>;

    fn form(pairs: &[(&str, FieldValue)]) -> Form {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn pseudonym_rules() -> RuleSet<Form> {
        RuleSet::new().field("pseudonym", FieldRules::new().required().min_length(3))
    }

    #[test]
    fn test_required_wins_over_min_length() {
        let rules = pseudonym_rules();
        let error = rules.validate_field("pseudonym", &"".into(), &Form::new());
        assert_eq!(error.as_deref(), Some("pseudonym is required"));
    }

    #[test]
    fn test_min_length_reported_when_present() {
        let rules = pseudonym_rules();
        let error = rules.validate_field("pseudonym", &"ab".into(), &Form::new());
        assert_eq!(
            error.as_deref(),
            Some("pseudonym must be at least 3 characters")
        );
        assert!(rules
            .validate_field("pseudonym", &"abc".into(), &Form::new())
            .is_none());
    }

    #[test]
    fn test_numeric_string_is_coerced() {
        let rules: RuleSet<Form> =
            RuleSet::new().field("age", FieldRules::new().min(18.0).max(100.0));
        let error = rules.validate_field("age", &"15".into(), &Form::new());
        assert!(error.unwrap().contains("must be at least 18"));

        let error = rules.validate_field("age", &FieldValue::Number(120.0), &Form::new());
        assert_eq!(error.as_deref(), Some("age must be at most 100"));

        assert!(rules.validate_field("age", &"42".into(), &Form::new()).is_none());
    }

    #[test]
    fn test_non_numeric_text_skips_numeric_rules() {
        let rules: RuleSet<Form> = RuleSet::new().field("age", FieldRules::new().min(18.0));
        assert!(rules
            .validate_field("age", &"eighteen".into(), &Form::new())
            .is_none());
    }

    #[test]
    fn test_optional_empty_field_skips_format_rules() {
        let rules: RuleSet<Form> = RuleSet::new().field("phone", FieldRules::new().phone());
        assert!(rules.validate_field("phone", &"".into(), &Form::new()).is_none());
        assert!(rules
            .validate_field("phone", &FieldValue::Empty, &Form::new())
            .is_none());
        assert!(rules
            .validate_field("phone", &"call me".into(), &Form::new())
            .is_some());
    }

    #[test]
    fn test_pattern_on_non_text_is_skipped() {
        let rules: RuleSet<Form> = RuleSet::new().field(
            "code",
            FieldRules::new().pattern(Regex::new(r"^[A-Z]+$").unwrap()),
        );
        assert!(rules
            .validate_field("code", &FieldValue::Number(12.0), &Form::new())
            .is_none());
        assert!(rules
            .validate_field("code", &"abc".into(), &Form::new())
            .is_some());
    }

    #[test]
    fn test_custom_rule_sees_whole_form() {
        let rules: RuleSet<Form> = RuleSet::new().field(
            "password_confirmation",
            FieldRules::new()
                .required()
                .custom(matches_field("password", "Passwords do not match")),
        );
        let data = form(&[("password", "secret123".into())]);

        assert_eq!(
            rules
                .validate_field("password_confirmation", &"secret124".into(), &data)
                .as_deref(),
            Some("Passwords do not match")
        );
        assert!(rules
            .validate_field("password_confirmation", &"secret123".into(), &data)
            .is_none());
    }

    #[test]
    fn test_custom_bool_failure_uses_default_message() {
        let rules: RuleSet<Form> = RuleSet::new().field(
            "terms",
            FieldRules::new().custom(|v: &FieldValue, _: &Form| v.as_bool() == Some(true)),
        );
        assert_eq!(
            rules
                .validate_field("terms", &false.into(), &Form::new())
                .as_deref(),
            Some("terms is invalid")
        );
    }

    #[test]
    fn test_static_and_dynamic_messages() {
        let rules: RuleSet<Form> = RuleSet::new()
            .field(
                "email",
                FieldRules::new()
                    .required()
                    .email()
                    .message("Please enter a valid email"),
            )
            .field(
                "nickname",
                FieldRules::new()
                    .max_length(4)
                    .message_fn(|field, kind, _| format!("{}:{}", field, kind)),
            );

        assert_eq!(
            rules
                .validate_field("email", &"nope".into(), &Form::new())
                .as_deref(),
            Some("Please enter a valid email")
        );
        assert_eq!(
            rules
                .validate_field("nickname", &"toolong".into(), &Form::new())
                .as_deref(),
            Some("nickname:maxLength")
        );
    }

    #[test]
    fn test_label_used_in_default_messages() {
        let rules: RuleSet<Form> =
            RuleSet::new().field("email", FieldRules::new().label("Email").required());
        assert_eq!(
            rules
                .validate_field("email", &"  ".into(), &Form::new())
                .as_deref(),
            Some("Email is required")
        );
    }

    #[test]
    fn test_password_strength_rule() {
        let rules: RuleSet<Form> = RuleSet::new().field(
            "password",
            FieldRules::new()
                .required()
                .min_length(8)
                .custom(password_strength::<Form>),
        );
        assert!(rules
            .validate_field("password", &"abcdefgh".into(), &Form::new())
            .unwrap()
            .contains("one number"));
        assert!(rules
            .validate_field("password", &"abcdefg1".into(), &Form::new())
            .is_none());
    }

    #[test]
    fn test_validate_field_is_idempotent() {
        let validator = FormValidator::new(pseudonym_rules());
        let data = Form::new();
        let first = validator.validate_field("pseudonym", &"ab".into(), &data);
        let second = validator.validate_field("pseudonym", &"ab".into(), &data);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_field_passes() {
        let validator = FormValidator::new(pseudonym_rules());
        assert!(validator
            .validate_field("unknown", &"".into(), &Form::new())
            .is_none());
    }

    #[test]
    fn test_validate_form_replaces_error_map() {
        let rules: RuleSet<Form> = RuleSet::new()
            .field("pseudonym", FieldRules::new().required())
            .field("email", FieldRules::new().required().email());
        let validator = FormValidator::new(rules);

        assert!(!validator.validate_form(&Form::new()));
        assert_eq!(validator.errors().len(), 2);

        let data = form(&[
            ("pseudonym", "nightowl".into()),
            ("email", "owl@club.io".into()),
        ]);
        assert!(validator.validate_form(&data));
        assert!(validator.errors().is_empty());
    }

    #[test]
    fn test_blur_is_synchronous() {
        let validator = FormValidator::new(pseudonym_rules());
        validator.handle_field_blur("pseudonym", &"ab".into(), &Form::new());

        assert_eq!(validator.field_status("pseudonym"), FieldStatus::Invalid);
        assert!(validator.is_touched("pseudonym"));
        assert!(!validator.is_field_valid("pseudonym"));

        validator.handle_field_blur("pseudonym", &"abcd".into(), &Form::new());
        assert_eq!(validator.field_status("pseudonym"), FieldStatus::Valid);
        assert!(validator.is_field_valid("pseudonym"));
    }

    #[test]
    fn test_untouched_field_is_never_valid() {
        let validator = FormValidator::new(pseudonym_rules());
        assert_eq!(validator.field_status("pseudonym"), FieldStatus::Untouched);
        assert!(!validator.is_field_valid("pseudonym"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_change_is_debounced() {
        let validator = FormValidator::new(pseudonym_rules());
        validator.handle_field_change("pseudonym", "ab".into(), &Form::new());

        assert_eq!(validator.field_status("pseudonym"), FieldStatus::Validating);
        assert!(validator.has_pending("pseudonym"));
        assert!(validator.error("pseudonym").is_none());

        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(validator.field_status("pseudonym"), FieldStatus::Invalid);
        assert!(!validator.has_pending("pseudonym"));
        assert!(validator.error("pseudonym").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_changes_validate_once_with_latest_value() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let (calls_in, seen_in) = (Arc::clone(&calls), Arc::clone(&seen));

        let rules: RuleSet<Form> = RuleSet::new().field(
            "pseudonym",
            FieldRules::new().custom(move |v: &FieldValue, _: &Form| {
                calls_in.fetch_add(1, Ordering::SeqCst);
                seen_in
                    .lock()
                    .unwrap()
                    .push(v.as_text().unwrap_or_default().to_string());
                true
            }),
        );
        let validator = FormValidator::new(rules);

        validator.handle_field_change("pseudonym", "n".into(), &Form::new());
        tokio::time::sleep(Duration::from_millis(200)).await;
        validator.handle_field_change("pseudonym", "ni".into(), &Form::new());
        tokio::time::sleep(Duration::from_millis(200)).await;
        validator.handle_field_change("pseudonym", "nig".into(), &Form::new());
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(seen.lock().unwrap().as_slice(), ["nig".to_string()]);
        assert_eq!(validator.field_status("pseudonym"), FieldStatus::Valid);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blur_overrides_pending_change() {
        let validator = FormValidator::new(pseudonym_rules());
        validator.handle_field_change("pseudonym", "ab".into(), &Form::new());
        validator.handle_field_blur("pseudonym", &"abcdef".into(), &Form::new());

        assert_eq!(validator.field_status("pseudonym"), FieldStatus::Valid);
        assert!(!validator.has_pending("pseudonym"));

        tokio::time::sleep(Duration::from_millis(1000)).await;
        // The stale "ab" validation never lands
        assert_eq!(validator.field_status("pseudonym"), FieldStatus::Valid);
        assert!(validator.error("pseudonym").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_cancels_pending_timers() {
        let validator = FormValidator::new(pseudonym_rules());
        validator.handle_field_blur("pseudonym", &"".into(), &Form::new());
        validator.handle_field_change("pseudonym", "a".into(), &Form::new());
        validator.reset_validation();

        let snapshot = validator.snapshot();
        assert!(snapshot.errors.is_empty());
        assert!(snapshot.touched.is_empty());
        assert!(snapshot.field_status.is_empty());

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(validator.snapshot(), ValidationSnapshot::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_fields_have_independent_timers() {
        let rules: RuleSet<Form> = RuleSet::new()
            .field("pseudonym", FieldRules::new().required().min_length(3))
            .field("email", FieldRules::new().required().email());
        let validator = FormValidator::with_debounce(rules, Duration::from_millis(100));

        validator.handle_field_change("pseudonym", "ab".into(), &Form::new());
        validator.handle_field_change("email", "x@y.io".into(), &Form::new());
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(validator.field_status("pseudonym"), FieldStatus::Invalid);
        assert_eq!(validator.field_status("email"), FieldStatus::Valid);
    }

    #[test]
    fn test_change_without_runtime_validates_immediately() {
        let validator = FormValidator::new(pseudonym_rules());
        validator.handle_field_change("pseudonym", "ab".into(), &Form::new());
        assert_eq!(validator.field_status("pseudonym"), FieldStatus::Invalid);
    }
}
