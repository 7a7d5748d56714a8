//! Mandatory checks on data about to be saved.

use crate::error::VariantError;
use crate::id::{VariantCoordinates, VariantId};
use crate::model::{ContentLike, NamedVariant};

/// Check merged save data before it is sent.
///
/// Every selected variant must exist in `save_data`, and every variant in
/// `save_data` must have a name. When the content varies by culture the
/// invariant id carries no variant entry of its own, so culture-less ids are
/// not required to exist.
///
/// # Errors
/// - [`VariantError::MissingVariants`] listing selected ids with no entry.
/// - [`VariantError::UnnamedVariants`] listing `culture_segment` labels of
///   variants without a name.
pub fn validate_save_data<C: ContentLike>(
    save_data: &C,
    selected: &[VariantId],
    varies_by_culture: bool,
) -> Result<(), VariantError> {
    let missing: Vec<VariantId> = selected
        .iter()
        .filter(|id| !(varies_by_culture && id.is_invariant()))
        .filter(|id| !save_data.variants().iter().any(|v| id.compare(v)))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(VariantError::MissingVariants { ids: missing });
    }

    let unnamed: Vec<String> = save_data
        .variants()
        .iter()
        .filter(|v| v.name().is_none_or(str::is_empty))
        .map(|v| {
            format!(
                "{}_{}",
                v.culture().unwrap_or("invariant"),
                v.segment().unwrap_or_default()
            )
        })
        .collect();
    if !unnamed.is_empty() {
        tracing::warn!(variants = %unnamed.join(", "), "save data has unnamed variants");
        return Err(VariantError::UnnamedVariants { labels: unnamed });
    }
    Ok(())
}
