//! # UI Module
//!
//! Presentation-side state with no network access:
//! - Motion presets and the reduced-motion substitution
//! - Confirm and prompt modal state with outcome callbacks

pub mod animation;
pub mod modals;


pub use animation::{get_reduced_motion_variant, presets_json, Easing, MotionPreset, MotionVariant};
pub use modals::{ConfirmModal, ModalOutcome, PromptModal};
