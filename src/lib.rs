// src/lib.rs
//! Client-side core of the nightlife directory: form validation, the
//! registration wizard, cached API access and UI presets.

pub mod api;
pub mod common;
pub mod forms;
pub mod registration;
pub mod ui;
