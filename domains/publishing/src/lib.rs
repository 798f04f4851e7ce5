//! Publishing domain: item editor, publish state machine, preview change tracking

pub mod domain;
pub mod editor;
pub mod error;
pub mod workshop;

// Re-export domain types at the crate root for convenience
pub use domain::draft::ItemDraft;
pub use domain::preview::{ItemPreview, PendingChange, PreviewAction, PreviewOrigin};
pub use domain::staging::{StagingPlan, StagingStep};
pub use domain::state::{PublishEvent, PublishState, PublishStateMachine, StateError};
pub use domain::validation::{ValidationError, MAX_PREVIEW_BYTES};

pub use editor::{Editor, MetadataStatus};
pub use error::{EditorError, PublishError};
pub use workshop::Workshop;
