//! # Registration Module
//!
//! The multi-step account registration wizard:
//! - Step graph per account type and claim/create path
//! - Step rule sets gating navigation and submission
//! - Debounced draft autosave and restore
//! - Submission of the account plus its path-specific follow-up

pub mod draft;
pub mod error;
pub mod models;
pub mod steps;
pub mod submit;
pub mod validators;
pub mod wizard;


pub use draft::{
    DraftAutosaver, DraftSnapshot, DraftStore, FileDraftStore, MemoryDraftStore,
    REGISTER_DRAFT_KEY,
};
pub use error::WizardError;
pub use models::{AccountType, PathChoice, RegistrationForm, RegistrationReceipt};
pub use steps::{StepKind, MAX_STEP, MIN_STEP};
pub use submit::{HttpRegistrationSubmitter, RegistrationSubmitter};
pub use wizard::{resume_step, ResumePolicy, WizardController};
