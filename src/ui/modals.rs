// src/ui/modals.rs
//! Confirmation and prompt dialog state
//!
//! Both modals are props in, outcome out: the caller builds one, feeds it user
//! actions and renders from the accessors. Callbacks fire once, on the action
//! that closes the modal.

use tracing::debug;

use crate::forms::{FieldRules, FieldValue};

type ConfirmCallback = Box<dyn FnOnce() + Send>;
type PromptCallback = Box<dyn FnOnce(String) + Send>;

/// How a modal was closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalOutcome {
    Confirmed,
    Submitted(String),
    Cancelled,
}

// ============================================================================
// Confirm
// ============================================================================

pub struct ConfirmModal {
    title: String,
    message: String,
    confirm_label: String,
    cancel_label: String,
    destructive: bool,
    open: bool,
    on_confirm: Option<ConfirmCallback>,
    on_cancel: Option<ConfirmCallback>,
}

impl ConfirmModal {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            confirm_label: "Confirm".into(),
            cancel_label: "Cancel".into(),
            destructive: false,
            open: true,
            on_confirm: None,
            on_cancel: None,
        }
    }

    pub fn confirm_label(mut self, label: impl Into<String>) -> Self {
        self.confirm_label = label.into();
        self
    }

    pub fn cancel_label(mut self, label: impl Into<String>) -> Self {
        self.cancel_label = label.into();
        self
    }

    /// Marks the confirm action as irreversible (rendered in a warning style)
    pub fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }

    pub fn on_confirm(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_confirm = Some(Box::new(f));
        self
    }

    pub fn on_cancel(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_cancel = Some(Box::new(f));
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> (&str, &str) {
        (&self.confirm_label, &self.cancel_label)
    }

    pub fn is_destructive(&self) -> bool {
        self.destructive
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Closes the modal and runs `on_confirm`; no-op once closed
    pub fn confirm(&mut self) -> Option<ModalOutcome> {
        if !self.open {
            return None;
        }
        self.open = false;
        self.on_cancel = None;
        debug!(title = %self.title, "Modal confirmed");
        if let Some(f) = self.on_confirm.take() {
            f();
        }
        Some(ModalOutcome::Confirmed)
    }

    pub fn cancel(&mut self) -> Option<ModalOutcome> {
        if !self.open {
            return None;
        }
        self.open = false;
        self.on_confirm = None;
        debug!(title = %self.title, "Modal cancelled");
        if let Some(f) = self.on_cancel.take() {
            f();
        }
        Some(ModalOutcome::Cancelled)
    }
}

// ============================================================================
// Prompt
// ============================================================================

/// Single text input dialog, e.g. asking for a removal reason
pub struct PromptModal {
    title: String,
    label: String,
    value: String,
    error: Option<String>,
    rules: Option<FieldRules<()>>,
    open: bool,
    on_confirm: Option<PromptCallback>,
    on_cancel: Option<ConfirmCallback>,
}

impl PromptModal {
    pub fn new(title: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            label: label.into(),
            value: String::new(),
            error: None,
            rules: None,
            open: true,
            on_confirm: None,
            on_cancel: None,
        }
    }

    pub fn initial_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Rules the input must pass before `confirm` closes the modal
    pub fn rules(mut self, rules: FieldRules<()>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn on_confirm(mut self, f: impl FnOnce(String) + Send + 'static) -> Self {
        self.on_confirm = Some(Box::new(f));
        self
    }

    pub fn on_cancel(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_cancel = Some(Box::new(f));
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Replaces the input; a shown error stays until the next confirm
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    fn check(&self) -> Option<String> {
        let rules = self.rules.as_ref()?;
        rules.evaluate(&self.label, &FieldValue::from(self.value.as_str()), &())
    }

    /// Validates the input; on success closes and hands the trimmed value to
    /// `on_confirm`, otherwise keeps the modal open with the error set
    pub fn confirm(&mut self) -> Option<ModalOutcome> {
        if !self.open {
            return None;
        }

        if let Some(message) = self.check() {
            debug!(title = %self.title, error = %message, "Prompt input rejected");
            self.error = Some(message);
            return None;
        }

        self.error = None;
        self.open = false;
        self.on_cancel = None;
        let value = self.value.trim().to_string();
        if let Some(f) = self.on_confirm.take() {
            f(value.clone());
        }
        Some(ModalOutcome::Submitted(value))
    }

    pub fn cancel(&mut self) -> Option<ModalOutcome> {
        if !self.open {
            return None;
        }
        self.open = false;
        self.on_confirm = None;
        if let Some(f) = self.on_cancel.take() {
            f();
        }
        Some(ModalOutcome::Cancelled)
    }
}
