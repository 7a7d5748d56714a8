//! Change detection between persisted and current content data.
//!
//! [`detect_changed`] reports the variant coordinates whose data differs
//! between the last persisted snapshot and the current edits. A coordinate is
//! changed when either its variant metadata or any property value stored at
//! it differs structurally from the persisted state.
//!
//! ```text
//! persisted: en-US{name: Home}   title@en-US = "Hi"    title@fr-FR = "Salut"
//! current:   en-US{name: Home}   title@en-US = "Hi"    title@fr-FR = "Bonjour"
//! changed:   [fr-FR]
//! ```
//!
//! Output order is first-seen: variant coordinates in current order, then
//! value coordinates in current order, each coordinate once.

use std::collections::HashSet;

use crate::error::VariantError;
use crate::id::{VariantCoordinates, VariantId};
use crate::model::{ContentLike, ensure_unique, index_slots};

/// Return the coordinates that differ between `persisted` and `current`.
///
/// With no persisted snapshot (an item never saved), every variant and
/// every value coordinate in `current` is reported.
///
/// # Errors
/// Returns [`VariantError::DuplicateVariant`] or
/// [`VariantError::DuplicateValue`] if either snapshot holds two records for
/// the same slot.
pub fn detect_changed<C: ContentLike>(
    persisted: Option<&C>,
    current: &C,
) -> Result<Vec<VariantId>, VariantError> {
    ensure_unique(current, "current")?;
    let old = persisted
        .map(|p| index_slots(p, "persisted"))
        .transpose()?;

    let mut changed = Changed::default();

    for variant in current.variants() {
        let id = variant.variant_id();
        let unchanged = old
            .as_ref()
            .and_then(|old| old.variants.get(&id))
            .is_some_and(|old| *old == variant);
        if !unchanged {
            changed.mark(id);
        }
    }

    for value in current.values() {
        let id = value.variant_id();
        let unchanged = old
            .as_ref()
            .and_then(|old| old.values.get(&(value.alias.as_str(), id.clone())))
            .is_some_and(|old| *old == value);
        if !unchanged {
            changed.mark(id);
        }
    }

    tracing::debug!(
        variants = current.variants().len(),
        values = current.values().len(),
        changed = changed.order.len(),
        first_save = persisted.is_none(),
        "detected changed variants"
    );
    Ok(changed.order)
}

/// Changed coordinates in first-seen order, each once.
#[derive(Default)]
struct Changed {
    order: Vec<VariantId>,
    seen: HashSet<VariantId>,
}

impl Changed {
    fn mark(&mut self, id: VariantId) {
        if self.seen.insert(id.clone()) {
            self.order.push(id);
        }
    }
}
