//! Error types for variant operations.
//!
//! [`VariantError`] is the single error type returned by the fallible engine
//! operations. Variants are specific enough that callers (a save dialog, the
//! CLI) can match on the failure mode without parsing messages.

use thiserror::Error;

use crate::id::VariantId;

/// Errors returned by the variant engine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum VariantError {
    /// The input is not in a state the operation can work with, e.g. a
    /// snapshot without a `unique` identifier.
    #[error("invalid state: {message}")]
    InvalidState {
        /// What was wrong.
        message: String,
    },

    /// Two variant entries in one snapshot share the same coordinates.
    #[error("duplicate variant `{id}` in {snapshot} data")]
    DuplicateVariant {
        /// The repeated coordinates.
        id: VariantId,
        /// Which snapshot held the duplicate (`"current"` or `"persisted"`).
        snapshot: &'static str,
    },

    /// Two property values in one snapshot share alias and coordinates.
    #[error("duplicate value for property `{alias}` at `{id}` in {snapshot} data")]
    DuplicateValue {
        /// The property alias.
        alias: String,
        /// The repeated coordinates.
        id: VariantId,
        /// Which snapshot held the duplicate.
        snapshot: &'static str,
    },

    /// A variant id string could not be parsed.
    #[error("invalid variant id `{value}`: {reason}")]
    InvalidVariantId {
        /// The raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A save was requested but the content offers no variant to save.
    #[error("no variants are available to save")]
    NoVariantsAvailable,

    /// The user confirmed a save dialog without picking any variant.
    #[error("cannot save without selecting at least one variant")]
    NothingSelected,

    /// Selected variants have no entry in the data to save.
    #[error("selected variants have not been created: {}", join_ids(ids))]
    MissingVariants {
        /// The selected ids with no matching variant entry.
        ids: Vec<VariantId>,
    },

    /// Variants in the data to save have no name.
    #[error("all variants must have a name, these variants are missing a name: {}", labels.join(", "))]
    UnnamedVariants {
        /// `culture_segment` labels of the unnamed variants.
        labels: Vec<String>,
    },
}

fn join_ids(ids: &[VariantId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
