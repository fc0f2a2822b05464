//! Editing operations on a `ResumeDocument`: pure mutators, field validation,
//! progress tracking and the HTTP handlers that drive them.

pub mod handlers;
pub mod mutators;
pub mod progress;
pub mod sorting;
pub mod validation;
