// src/registration/wizard.rs
//! Multi-step registration controller
//!
//! Owns the form state, the current step, a validator scoped to the current
//! step and the draft autosaver. Rendering is left to the caller, which reads
//! `current_kind()` and the validator state after every action.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::draft::{DraftAutosaver, DraftSnapshot, DraftStore, REGISTER_DRAFT_KEY};
use super::error::WizardError;
use super::models::{AccountType, PathChoice, RegistrationForm, RegistrationReceipt};
use super::steps::{self, StepKind, MIN_STEP};
use super::submit::RegistrationSubmitter;
use crate::common::{ClientConfig, ClientResult};
use crate::forms::{FieldValue, FormFields, FormValidator, RuleSet};

/// How the step is chosen when a draft is restored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumePolicy {
    /// Resume at the persisted step when it exists for the restored
    /// selections, otherwise infer it from the filled-in fields
    #[default]
    PersistedStep,
    /// Always infer the step from the filled-in fields
    Heuristic,
}

/// Step to show after restoring `draft`
pub fn resume_step(draft: &DraftSnapshot, policy: ResumePolicy) -> u8 {
    match (policy, draft.current_step) {
        (ResumePolicy::PersistedStep, Some(step))
            if StepKind::resolve(step, &draft.form).is_ok() =>
        {
            step
        }
        _ => steps::infer_step(&draft.form),
    }
}

type CloseCallback = Box<dyn FnOnce() + Send>;

/// Selections the current validator was built for
type RulesScope = (
    u8,
    Option<AccountType>,
    Option<PathChoice>,
    Option<PathChoice>,
);

pub struct WizardController<S: DraftStore + 'static, R: RegistrationSubmitter> {
    form: RegistrationForm,
    current_step: u8,
    validator: FormValidator<RegistrationForm>,
    rules_scope: RulesScope,
    validation_debounce: Duration,
    autosaver: DraftAutosaver<S>,
    submitter: R,
    resume_policy: ResumePolicy,
    submit_error: Option<String>,
    closed: bool,
    on_close: Option<CloseCallback>,
}

impl<S: DraftStore + 'static, R: RegistrationSubmitter> WizardController<S, R> {
    pub fn new(store: Arc<S>, submitter: R, config: &ClientConfig) -> Self {
        let form = RegistrationForm::default();
        let scope = rules_scope(MIN_STEP, &form);

        Self {
            validator: build_validator(MIN_STEP, &form, config.validation_debounce),
            rules_scope: scope,
            validation_debounce: config.validation_debounce,
            autosaver: DraftAutosaver::new(
                store,
                REGISTER_DRAFT_KEY,
                config.draft_autosave_debounce,
            ),
            form,
            current_step: MIN_STEP,
            submitter,
            resume_policy: ResumePolicy::default(),
            submit_error: None,
            closed: false,
            on_close: None,
        }
    }

    pub fn with_resume_policy(mut self, policy: ResumePolicy) -> Self {
        self.resume_policy = policy;
        self
    }

    pub fn on_close(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(callback));
        self
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Restores a saved draft, if any; returns whether one was found
    pub async fn mount(&mut self) -> ClientResult<bool> {
        let Some(draft) = self.autosaver.load().await? else {
            debug!("No registration draft to restore");
            return Ok(false);
        };

        let step = resume_step(&draft, self.resume_policy);
        info!(
            step,
            persisted_step = ?draft.current_step,
            policy = ?self.resume_policy,
            "Restoring registration draft"
        );

        self.form = draft.form;
        self.current_step = step;
        self.submit_error = None;
        self.rebuild_validator();
        Ok(true)
    }

    /// Discards the saved draft and starts over at the first step
    pub async fn clear_draft(&mut self) -> ClientResult<()> {
        self.autosaver.clear().await?;
        self.form = RegistrationForm::default();
        self.current_step = MIN_STEP;
        self.submit_error = None;
        self.rebuild_validator();
        Ok(())
    }

    /// Dismisses the wizard, saving any pending draft first
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }

        if self.autosaver.is_pending() || !self.form.is_blank() {
            let draft = self.draft_snapshot();
            if let Err(e) = self.autosaver.save_now(&draft).await {
                warn!(error = %e, "Could not save draft on close");
            }
        }

        self.finish();
    }

    fn finish(&mut self) {
        self.closed = true;
        self.validator.reset_validation();
        if let Some(callback) = self.on_close.take() {
            callback();
        }
    }

    // ========================================================================
    // Field edits
    // ========================================================================

    /// Applies an edit, schedules its validation and the draft autosave
    pub fn set_field(
        &mut self,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), WizardError> {
        self.form
            .set_field(field, value.into())
            .map_err(WizardError::InvalidField)?;

        self.clamp_step();
        if rules_scope(self.current_step, &self.form) != self.rules_scope {
            self.rebuild_validator();
        }

        if self.validator.rules().get(field).is_some() {
            let value = self.form.field_value(field);
            self.validator.handle_field_change(field, value, &self.form);
        }

        self.submit_error = None;
        self.schedule_autosave();
        Ok(())
    }

    pub fn blur_field(&self, field: &str) {
        let value = self.form.field_value(field);
        self.validator.handle_field_blur(field, &value, &self.form);
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Moves to the next step when the current one is complete
    pub fn next(&mut self) -> Result<u8, WizardError> {
        let kind = self.current_kind()?;
        if self.is_final_step() {
            return Err(WizardError::AtFinalStep(self.current_step));
        }

        let result = kind.check(&self.form);
        if !result.is_valid {
            self.validator.validate_form(&self.form);
            return Err(WizardError::StepIncomplete {
                step: self.current_step,
                result,
            });
        }

        let next = steps::next_step(self.current_step, &self.form)
            .ok_or(WizardError::AtFinalStep(self.current_step))?;
        self.go_to(next);
        Ok(next)
    }

    pub fn previous(&mut self) -> Result<u8, WizardError> {
        let previous = steps::previous_step(self.current_step, &self.form)
            .ok_or(WizardError::AtFirstStep)?;
        self.go_to(previous);
        Ok(previous)
    }

    fn go_to(&mut self, step: u8) {
        debug!(from = self.current_step, to = step, "Changing step");
        self.current_step = step;
        self.submit_error = None;
        self.rebuild_validator();
        self.schedule_autosave();
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Submits from the final step
    ///
    /// Every step on the chosen branch must be complete. On success the draft
    /// is removed and the close callback runs; on failure the error message is
    /// kept for display and the wizard stays where it is.
    pub async fn submit(&mut self) -> Result<RegistrationReceipt, WizardError> {
        self.current_kind()?;
        if !self.is_final_step() {
            return Err(WizardError::NotFinalStep(self.current_step));
        }

        for step in steps::step_sequence(&self.form) {
            let result = StepKind::resolve(step, &self.form)?.check(&self.form);
            if !result.is_valid {
                if step == self.current_step {
                    self.validator.validate_form(&self.form);
                }
                return Err(WizardError::StepIncomplete { step, result });
            }
        }

        self.submit_error = None;
        match self.submitter.submit(&self.form).await {
            Ok(receipt) => {
                info!(user_id = %receipt.user_id, "Registration submitted");
                if let Err(e) = self.autosaver.clear().await {
                    warn!(error = %e, "Could not remove draft after submission");
                }
                self.finish();
                Ok(receipt)
            }
            Err(e) => {
                warn!(error = %e, step = self.current_step, "Registration submission failed");
                self.submit_error = Some(e.user_message());
                Err(WizardError::Submission(e))
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn current_step(&self) -> u8 {
        self.current_step
    }

    pub fn current_kind(&self) -> Result<StepKind, WizardError> {
        StepKind::resolve(self.current_step, &self.form)
    }

    /// Steps on the branch chosen so far
    pub fn steps(&self) -> Vec<u8> {
        steps::step_sequence(&self.form)
    }

    pub fn is_final_step(&self) -> bool {
        steps::final_step(&self.form) == Some(self.current_step)
    }

    pub fn can_advance(&self) -> bool {
        self.current_kind()
            .map(|kind| kind.can_advance(&self.form))
            .unwrap_or(false)
    }

    pub fn validator(&self) -> &FormValidator<RegistrationForm> {
        &self.validator
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn has_pending_autosave(&self) -> bool {
        self.autosaver.is_pending()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn draft_snapshot(&self) -> DraftSnapshot {
        DraftSnapshot::new(self.form.clone(), self.current_step)
    }

    fn schedule_autosave(&self) {
        if self.closed {
            return;
        }
        self.autosaver.schedule(self.draft_snapshot());
    }

    /// Steps back along the branch when an edit removed the current step
    fn clamp_step(&mut self) {
        if StepKind::resolve(self.current_step, &self.form).is_ok() {
            return;
        }
        let step = steps::step_sequence(&self.form)
            .into_iter()
            .rev()
            .find(|&s| s <= self.current_step)
            .unwrap_or(MIN_STEP);
        debug!(from = self.current_step, to = step, "Step no longer on branch");
        self.current_step = step;
    }

    fn rebuild_validator(&mut self) {
        self.validator = build_validator(self.current_step, &self.form, self.validation_debounce);
        self.rules_scope = rules_scope(self.current_step, &self.form);
    }
}

fn rules_scope(step: u8, form: &RegistrationForm) -> RulesScope {
    (step, form.account_type, form.employee_path, form.owner_path)
}

fn build_validator(
    step: u8,
    form: &RegistrationForm,
    debounce: Duration,
) -> FormValidator<RegistrationForm> {
    let rules = StepKind::resolve(step, form)
        .map(|kind| kind.rules(form))
        .unwrap_or_else(|_| RuleSet::new());
    FormValidator::with_debounce(rules, debounce)
}
