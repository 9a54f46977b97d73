// src/forms/rules.rs

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use super::value::{FieldValue, FormFields};
use crate::common::ValidationResult;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ()-]{7,20}$").expect("valid regex"));

/// Rule kinds in evaluation priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleKind {
    Required,
    MinLength,
    MaxLength,
    Min,
    Max,
    Pattern,
    Custom,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength => "minLength",
            Self::MaxLength => "maxLength",
            Self::Min => "min",
            Self::Max => "max",
            Self::Pattern => "pattern",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a custom rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    Pass,
    Fail,
    FailWith(String),
}

impl From<bool> for Check {
    fn from(ok: bool) -> Self {
        if ok {
            Check::Pass
        } else {
            Check::Fail
        }
    }
}

impl From<Result<(), String>> for Check {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Check::Pass,
            Err(msg) => Check::FailWith(msg),
        }
    }
}

pub type CustomFn<F> = Arc<dyn Fn(&FieldValue, &F) -> Check + Send + Sync>;
pub type MessageFn = Arc<dyn Fn(&str, RuleKind, &FieldValue) -> String + Send + Sync>;

/// One constraint on a field
pub enum Rule<F> {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Min(f64),
    Max(f64),
    Pattern(Regex),
    Custom(CustomFn<F>),
}

impl<F> Rule<F> {
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Required => RuleKind::Required,
            Rule::MinLength(_) => RuleKind::MinLength,
            Rule::MaxLength(_) => RuleKind::MaxLength,
            Rule::Min(_) => RuleKind::Min,
            Rule::Max(_) => RuleKind::Max,
            Rule::Pattern(_) => RuleKind::Pattern,
            Rule::Custom(_) => RuleKind::Custom,
        }
    }
}

impl<F> Clone for Rule<F> {
    fn clone(&self) -> Self {
        match self {
            Rule::Required => Rule::Required,
            Rule::MinLength(n) => Rule::MinLength(*n),
            Rule::MaxLength(n) => Rule::MaxLength(*n),
            Rule::Min(n) => Rule::Min(*n),
            Rule::Max(n) => Rule::Max(*n),
            Rule::Pattern(re) => Rule::Pattern(re.clone()),
            Rule::Custom(f) => Rule::Custom(Arc::clone(f)),
        }
    }
}

impl<F> fmt::Debug for Rule<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Pattern(re) => write!(f, "Pattern({})", re.as_str()),
            Rule::MinLength(n) => write!(f, "MinLength({})", n),
            Rule::MaxLength(n) => write!(f, "MaxLength({})", n),
            Rule::Min(n) => write!(f, "Min({})", n),
            Rule::Max(n) => write!(f, "Max({})", n),
            other => f.write_str(other.kind().as_str()),
        }
    }
}

/// Error message override for a field
#[derive(Clone)]
pub enum Message {
    Static(String),
    Dynamic(MessageFn),
}

/// All rules attached to a single field
pub struct FieldRules<F> {
    label: Option<String>,
    rules: Vec<Rule<F>>,
    message: Option<Message>,
}

impl<F> Clone for FieldRules<F> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            rules: self.rules.clone(),
            message: self.message.clone(),
        }
    }
}

impl<F> Default for FieldRules<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> FieldRules<F> {
    pub fn new() -> Self {
        Self {
            label: None,
            rules: Vec::new(),
            message: None,
        }
    }

    /// Human label used in default messages instead of the field key
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(self) -> Self {
        self.rule(Rule::Required)
    }

    pub fn min_length(self, n: usize) -> Self {
        self.rule(Rule::MinLength(n))
    }

    pub fn max_length(self, n: usize) -> Self {
        self.rule(Rule::MaxLength(n))
    }

    pub fn min(self, n: f64) -> Self {
        self.rule(Rule::Min(n))
    }

    pub fn max(self, n: f64) -> Self {
        self.rule(Rule::Max(n))
    }

    pub fn pattern(self, re: Regex) -> Self {
        self.rule(Rule::Pattern(re))
    }

    pub fn email(self) -> Self {
        self.pattern(EMAIL_RE.clone())
    }

    pub fn phone(self) -> Self {
        self.pattern(PHONE_RE.clone())
    }

    pub fn custom<C>(self, check: impl Fn(&FieldValue, &F) -> C + Send + Sync + 'static) -> Self
    where
        C: Into<Check>,
        F: 'static,
    {
        self.rule(Rule::Custom(Arc::new(
            move |value: &FieldValue, form: &F| -> Check { check(value, form).into() },
        )))
    }

    /// Replaces every default message with a fixed string
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(Message::Static(message.into()));
        self
    }

    /// Builds the message from `(field, rule kind, value)`
    pub fn message_fn(
        mut self,
        f: impl Fn(&str, RuleKind, &FieldValue) -> String + Send + Sync + 'static,
    ) -> Self {
        self.message = Some(Message::Dynamic(Arc::new(f)));
        self
    }

    fn rule(mut self, rule: Rule<F>) -> Self {
        let kind = rule.kind();
        // Custom rules stack; every other kind is replaced
        if kind != RuleKind::Custom {
            self.rules.retain(|r| r.kind() != kind);
        }
        self.rules.push(rule);
        self.rules.sort_by_key(|r| r.kind());
        self
    }

    pub fn rules(&self) -> &[Rule<F>] {
        &self.rules
    }

    pub fn is_required(&self) -> bool {
        self.rules.iter().any(|r| matches!(r, Rule::Required))
    }

    /// Evaluates the rules in priority order and returns the first failure
    pub fn evaluate(&self, field: &str, value: &FieldValue, form: &F) -> Option<String> {
        let label = self.label.as_deref().unwrap_or(field);

        if value.is_empty() {
            // Optional empty fields impose no further constraints
            return if self.is_required() {
                Some(self.failure(label, RuleKind::Required, value, None))
            } else {
                None
            };
        }

        for rule in &self.rules {
            let failed = match rule {
                Rule::Required => None,
                // Lengths count the trimmed text, as it will be submitted
                Rule::MinLength(n) => value
                    .as_text()
                    .filter(|s| s.trim().chars().count() < *n)
                    .map(|_| format!("{} must be at least {} characters", label, n)),
                Rule::MaxLength(n) => value
                    .as_text()
                    .filter(|s| s.trim().chars().count() > *n)
                    .map(|_| format!("{} must be at most {} characters", label, n)),
                Rule::Min(n) => value
                    .as_number()
                    .filter(|v| v < n)
                    .map(|_| format!("{} must be at least {}", label, n)),
                Rule::Max(n) => value
                    .as_number()
                    .filter(|v| v > n)
                    .map(|_| format!("{} must be at most {}", label, n)),
                Rule::Pattern(re) => value
                    .as_text()
                    .filter(|s| !re.is_match(s))
                    .map(|_| format!("{} format is invalid", label)),
                Rule::Custom(check) => match check(value, form) {
                    Check::Pass => None,
                    Check::Fail => Some(format!("{} is invalid", label)),
                    // A message returned by the rule itself wins over any override
                    Check::FailWith(msg) => return Some(msg),
                },
            };

            if let Some(default) = failed {
                return Some(self.failure(label, rule.kind(), value, Some(default)));
            }
        }

        None
    }

    fn failure(
        &self,
        label: &str,
        kind: RuleKind,
        value: &FieldValue,
        default: Option<String>,
    ) -> String {
        match &self.message {
            Some(Message::Static(msg)) => msg.clone(),
            Some(Message::Dynamic(f)) => f(label, kind, value),
            None => default.unwrap_or_else(|| format!("{} is required", label)),
        }
    }
}

/// Rules for a whole form, keyed by field name
pub struct RuleSet<F> {
    fields: BTreeMap<String, FieldRules<F>>,
}

impl<F> Clone for RuleSet<F> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
        }
    }
}

impl<F> Default for RuleSet<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> RuleSet<F> {
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, rules: FieldRules<F>) -> Self {
        self.fields.insert(name.into(), rules);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldRules<F>> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validates a single field value; unknown fields always pass
    pub fn validate_field(&self, field: &str, value: &FieldValue, form: &F) -> Option<String> {
        self.fields
            .get(field)
            .and_then(|rules| rules.evaluate(field, value, form))
    }
}

impl<F: FormFields> RuleSet<F> {
    /// Validates every ruled field against the given snapshot
    pub fn check(&self, form: &F) -> ValidationResult {
        let mut result = ValidationResult::new();
        for (field, rules) in &self.fields {
            let value = form.field_value(field);
            if let Some(message) = rules.evaluate(field, &value, form) {
                result.add_error(field, &message);
            }
        }
        result
    }
}

/// Custom rule: the value must equal another field of the same form
pub fn matches_field<F: FormFields + 'static>(
    other: &'static str,
    message: &'static str,
) -> impl Fn(&FieldValue, &F) -> Check + Send + Sync + 'static {
    move |value, form| {
        if *value == form.field_value(other) {
            Check::Pass
        } else {
            Check::FailWith(message.to_string())
        }
    }
}

/// Custom rule: at least one letter and one digit
pub fn password_strength<F>(value: &FieldValue, _form: &F) -> Check {
    match value.as_text() {
        Some(s) => {
            let has_letter = s.chars().any(|c| c.is_alphabetic());
            let has_digit = s.chars().any(|c| c.is_ascii_digit());
            if has_letter && has_digit {
                Check::Pass
            } else {
                Check::FailWith(
                    "Password must contain at least one letter and one number".to_string(),
                )
            }
        }
        None => Check::Pass,
    }
}
