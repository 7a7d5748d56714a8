//! Variant reconciliation engine for culture/segment-variant content.
//!
//! Everything in this crate is synchronous and side-effect free: callers hand
//! in snapshots, the engine hands back new values. No module performs I/O.
//!
//! # Crate layout
//!
//! - [`id`] — [`VariantId`], the (culture, segment) key, and the
//!   [`VariantCoordinates`] capability.
//! - [`model`] — snapshots, variant entries, property values and the
//!   [`ContentLike`] capability the engine is generic over.
//! - [`name`] — display-name resolution across a culture fallback chain.
//! - [`changes`] — which variants differ between persisted and current data.
//! - [`merge`] — the snapshot to submit for a save of selected variants.
//! - [`options`] — the variants a content item may have.
//! - [`plan`] — save-dialog preselection and final selection.
//! - [`validate`] — mandatory checks on save data.
//! - [`session`] — an editing session tying the above together.
//! - [`error`] — the [`VariantError`] enum returned by fallible operations.

#![forbid(unsafe_code)]

pub mod changes;
pub mod error;
pub mod id;
pub mod merge;
pub mod model;
pub mod name;
pub mod options;
pub mod plan;
pub mod session;
pub mod validate;

pub use changes::detect_changed;
pub use error::VariantError;
pub use id::{VariantCoordinates, VariantId};
pub use merge::{ValueMerger, ValueMergerRegistry, merge_for_save};
pub use model::{
    ContentLike, ContentSnapshot, NamedVariant, PropertyValue, VariantEntry, VariantState,
    VariesBy,
};
pub use name::{DisplayNameTracker, UNTITLED, VariantContext, resolve_name};
pub use options::{Language, Segment, VariantOption, build_variant_options};
pub use plan::{SavePlan, plan_save};
pub use session::EditSession;
pub use validate::validate_save_data;
