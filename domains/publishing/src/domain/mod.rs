//! Publishing domain layer: draft, previews, validation, staging, state machine

pub mod draft;
pub mod preview;
pub mod staging;
pub mod state;
pub mod validation;
