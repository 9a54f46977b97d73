// src/forms/engine.rs
//! Stateful field validation with per-field debounce timers
//!
//! A `FormValidator` owns the derived UI state of one form instance: the
//! error map, the touched set and the per-field status. The form data itself
//! stays with the caller and is passed in as a snapshot on every call.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::rules::RuleSet;
use super::value::{FieldValue, FormFields};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Validation lifecycle of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    #[default]
    Untouched,
    Validating,
    Valid,
    Invalid,
}

/// Point-in-time copy of the validator's derived state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationSnapshot {
    pub errors: HashMap<String, String>,
    pub touched: HashSet<String>,
    pub field_status: HashMap<String, FieldStatus>,
}

#[derive(Default)]
struct Inner {
    snapshot: ValidationSnapshot,
    // Latest generation per field; a woken timer only applies its result
    // when it still owns the field's current generation
    generations: HashMap<String, u64>,
    next_generation: u64,
    timers: HashMap<String, JoinHandle<()>>,
}

impl Inner {
    fn supersede(&mut self, field: &str) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.generations.insert(field.to_string(), generation);
        if let Some(handle) = self.timers.remove(field) {
            handle.abort();
        }
        generation
    }

    fn apply(&mut self, field: &str, message: Option<String>) {
        let status = match message {
            Some(msg) => {
                self.snapshot.errors.insert(field.to_string(), msg);
                FieldStatus::Invalid
            }
            None => {
                self.snapshot.errors.remove(field);
                FieldStatus::Valid
            }
        };
        self.snapshot.field_status.insert(field.to_string(), status);
    }

    fn cancel_all(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct FormValidator<F> {
    rules: Arc<RuleSet<F>>,
    debounce: Duration,
    inner: Arc<Mutex<Inner>>,
}

impl<F> FormValidator<F> {
    pub fn new(rules: RuleSet<F>) -> Self {
        Self::with_debounce(rules, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(rules: RuleSet<F>, debounce: Duration) -> Self {
        Self {
            rules: Arc::new(rules),
            debounce,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub fn rules(&self) -> &RuleSet<F> {
        &self.rules
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Pure single-field validation; returns the first failing rule's message
    pub fn validate_field(&self, field: &str, value: &FieldValue, form: &F) -> Option<String> {
        self.rules.validate_field(field, value, form)
    }

    /// Marks the field touched and validates it immediately, overriding any
    /// pending debounced validation for the same field
    pub fn handle_field_blur(&self, field: &str, value: &FieldValue, form: &F) {
        let message = self.rules.validate_field(field, value, form);

        let mut inner = lock(&self.inner);
        inner.snapshot.touched.insert(field.to_string());
        inner.supersede(field);
        inner.apply(field, message);
    }

    /// Clears errors, touched fields and statuses and cancels every pending timer
    pub fn reset_validation(&self) {
        let mut inner = lock(&self.inner);
        inner.cancel_all();
        inner.generations.clear();
        inner.snapshot = ValidationSnapshot::default();
        debug!("Validation state reset");
    }

    /// Touched and currently error-free; untouched fields are never valid
    pub fn is_field_valid(&self, field: &str) -> bool {
        let inner = lock(&self.inner);
        inner.snapshot.touched.contains(field) && !inner.snapshot.errors.contains_key(field)
    }

    pub fn is_touched(&self, field: &str) -> bool {
        lock(&self.inner).snapshot.touched.contains(field)
    }

    pub fn field_status(&self, field: &str) -> FieldStatus {
        lock(&self.inner)
            .snapshot
            .field_status
            .get(field)
            .copied()
            .unwrap_or_default()
    }

    pub fn error(&self, field: &str) -> Option<String> {
        lock(&self.inner).snapshot.errors.get(field).cloned()
    }

    pub fn errors(&self) -> HashMap<String, String> {
        lock(&self.inner).snapshot.errors.clone()
    }

    /// Whether a debounced validation is scheduled for the field
    pub fn has_pending(&self, field: &str) -> bool {
        lock(&self.inner).timers.contains_key(field)
    }

    pub fn snapshot(&self) -> ValidationSnapshot {
        lock(&self.inner).snapshot.clone()
    }
}

impl<F: FormFields> FormValidator<F> {
    /// Validates every ruled field and replaces the whole error map
    pub fn validate_form(&self, form: &F) -> bool {
        let result = self.rules.check(form);
        let is_valid = result.is_valid;

        let mut inner = lock(&self.inner);
        inner.snapshot.errors = result.into_error_map();

        debug!(
            is_valid,
            error_count = inner.snapshot.errors.len(),
            "Form validated"
        );
        is_valid
    }
}

impl<F> FormValidator<F>
where
    F: Clone + Send + Sync + 'static,
{
    /// Marks the field touched, sets it to `Validating` and schedules a
    /// validation after the debounce period, replacing any pending one
    pub fn handle_field_change(&self, field: &str, value: FieldValue, form: &F) {
        let mut inner = lock(&self.inner);
        inner.snapshot.touched.insert(field.to_string());
        inner
            .snapshot
            .field_status
            .insert(field.to_string(), FieldStatus::Validating);
        let generation = inner.supersede(field);

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!(field = %field, "No async runtime available, validating immediately");
                let message = self.rules.validate_field(field, &value, form);
                inner.apply(field, message);
                return;
            }
        };

        let rules = Arc::clone(&self.rules);
        let state = Arc::clone(&self.inner);
        let form = form.clone();
        let field_name = field.to_string();
        let delay = self.debounce;

        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;

            let message = rules.validate_field(&field_name, &value, &form);
            let mut inner = lock(&state);
            if inner.generations.get(&field_name) != Some(&generation) {
                debug!(field = %field_name, "Discarding superseded validation");
                return;
            }
            inner.timers.remove(&field_name);
            inner.apply(&field_name, message);
        });

        inner.timers.insert(field.to_string(), handle);
    }
}

impl<F> Drop for FormValidator<F> {
    fn drop(&mut self) {
        lock(&self.inner).cancel_all();
    }
}
