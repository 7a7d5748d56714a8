//! Choosing which variants a save covers.
//!
//! Before a save, the user is offered the culture-level variant options with
//! a preselection built from what they are looking at and what they edited:
//!
//! - every active (open in a split view) variant;
//! - every changed variant;
//! - the culture of every changed or active segment variant, since the
//!   picker only lists cultures;
//!
//! minus anything the user may not write. [`SavePlan::resolve_selection`]
//! then turns the picker outcome into the final list handed to
//! [`crate::merge::merge_for_save`].

use crate::error::VariantError;
use crate::id::VariantId;

/// Offered and preselected variants for one save.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SavePlan {
    /// Culture-level options the picker lists.
    pub options: Vec<VariantId>,
    /// Writable ids selected up front. May contain segment ids that the
    /// picker does not list.
    pub preselected: Vec<VariantId>,
    /// Ids the user may not write.
    pub read_only: Vec<VariantId>,
}

/// Build the save plan.
///
/// `options` is every variant option of the item; only segment-invariant
/// ones are offered.
#[must_use]
pub fn plan_save(
    options: &[VariantId],
    active: &[VariantId],
    changed: &[VariantId],
    read_only: &[VariantId],
) -> SavePlan {
    let offered: Vec<VariantId> = options
        .iter()
        .filter(|id| id.is_segment_invariant())
        .cloned()
        .collect();

    let touched: Vec<&VariantId> = active.iter().chain(changed).collect();
    let parents = touched
        .iter()
        .filter(|id| !id.is_segment_invariant())
        .map(|id| id.to_segment_invariant());

    let mut preselected: Vec<VariantId> = Vec::new();
    for id in touched.iter().map(|id| (*id).clone()).chain(parents) {
        if !read_only.contains(&id) && !preselected.contains(&id) {
            preselected.push(id);
        }
    }

    tracing::debug!(
        offered = offered.len(),
        preselected = preselected.len(),
        "planned save selection"
    );
    SavePlan {
        options: offered,
        preselected,
        read_only: read_only.to_vec(),
    }
}

impl SavePlan {
    /// Options the user may tick.
    pub fn pickable(&self) -> impl Iterator<Item = &VariantId> {
        self.options.iter().filter(|id| !self.read_only.contains(id))
    }

    /// `true` when a picker must be shown (more than one option).
    #[must_use]
    pub fn needs_picker(&self) -> bool {
        self.options.len() > 1
    }

    /// Decide the variants to save.
    ///
    /// `picked` is the picker outcome, or `None` when no picker was shown.
    ///
    /// # Errors
    /// - [`VariantError::NoVariantsAvailable`] when nothing is offered.
    /// - [`VariantError::NothingSelected`] when the picker returned an empty
    ///   selection.
    pub fn resolve_selection(
        &self,
        picked: Option<&[VariantId]>,
    ) -> Result<Vec<VariantId>, VariantError> {
        match (self.options.as_slice(), picked) {
            ([], _) => Err(VariantError::NoVariantsAvailable),
            ([only], _) => Ok(vec![only.clone()]),
            (_, Some([])) => Err(VariantError::NothingSelected),
            (_, Some(picked)) => Ok(picked.to_vec()),
            (_, None) => Ok(self.preselected.clone()),
        }
    }
}
