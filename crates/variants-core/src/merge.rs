//! Build the data to persist for a save of selected variants.
//!
//! [`merge_for_save`] takes the persisted snapshot, the current edits and the
//! variants the user chose to commit, and produces the exact snapshot to hand
//! to the save operation:
//!
//! - records at a chosen coordinate come from `current`;
//! - records anywhere else are carried over from `persisted` untouched;
//! - invariant data is always chosen, whatever cultures were picked.
//!
//! ```text
//! persisted: [en-US v1, da-DK v1]
//! current:   [en-US v2, da-DK v2, de-DE v1]
//! selected:  [en-US, de-DE]
//! result:    [en-US v2, da-DK v1, de-DE v1]
//! ```
//!
//! Order is stable across saves: persisted order first, then records that
//! are new in this save, appended in selection order.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use crate::error::VariantError;
use crate::id::{VariantCoordinates, VariantId};
use crate::model::{ContentLike, PropertyValue, ensure_unique};

// ---------------------------------------------------------------------------
// ValueMerger
// ---------------------------------------------------------------------------

/// Merge hook for property editors whose values hold nested variant data
/// (block lists, block grids).
///
/// Without a hook, a chosen value is taken from `current` as a whole. With a
/// hook registered for the value's editor alias, the hook decides how the
/// persisted and current payloads combine for the chosen variants.
pub trait ValueMerger: Send + Sync {
    /// Combine one property value.
    ///
    /// `persisted` is `None` when the value is new in this save. `variants`
    /// is the full set of coordinates being stored.
    ///
    /// # Errors
    /// Implementations return an error when the payload cannot be merged.
    fn merge(
        &self,
        persisted: Option<&PropertyValue>,
        current: &PropertyValue,
        variants: &[VariantId],
    ) -> Result<PropertyValue, VariantError>;
}

/// [`ValueMerger`]s keyed by property editor alias.
#[derive(Default)]
pub struct ValueMergerRegistry {
    by_editor: HashMap<String, Box<dyn ValueMerger>>,
}

impl ValueMergerRegistry {
    /// An empty registry: every value merges by overwrite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `merger` for values owned by `editor_alias`, replacing any
    /// previous registration.
    pub fn register(&mut self, editor_alias: impl Into<String>, merger: impl ValueMerger + 'static) {
        self.by_editor.insert(editor_alias.into(), Box::new(merger));
    }

    /// The merger for `editor_alias`, if any.
    #[must_use]
    pub fn get(&self, editor_alias: &str) -> Option<&dyn ValueMerger> {
        self.by_editor.get(editor_alias).map(AsRef::as_ref)
    }

    fn apply(
        &self,
        persisted: Option<&PropertyValue>,
        current: &PropertyValue,
        variants: &[VariantId],
    ) -> Result<PropertyValue, VariantError> {
        match current.editor_alias.as_deref().and_then(|alias| self.get(alias)) {
            Some(merger) => merger.merge(persisted, current, variants),
            None => Ok(current.clone()),
        }
    }
}

impl fmt::Debug for ValueMergerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut editors: Vec<&str> = self.by_editor.keys().map(String::as_str).collect();
        editors.sort_unstable();
        f.debug_struct("ValueMergerRegistry")
            .field("editors", &editors)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// merge_for_save
// ---------------------------------------------------------------------------

/// Build the snapshot to submit for saving `selected` variants.
///
/// The coordinates written from `current` are `selected`, then
/// `variants_to_store`, then the invariant id, deduplicated. When `varies` is
/// `false` the selection is ignored: the result is the current invariant
/// variant plus every current value.
///
/// Selected ids with no data in `current` contribute nothing. A persisted
/// record at a chosen coordinate with no current counterpart is dropped,
/// since `current` is the write source for chosen coordinates.
///
/// # Errors
/// - [`VariantError::InvalidState`] if `current` has no `unique` id, or
///   `varies` is `false` and `current` has no invariant variant.
/// - [`VariantError::DuplicateVariant`] / [`VariantError::DuplicateValue`]
///   if either snapshot holds two records for one slot.
/// - Any error returned by a registered [`ValueMerger`].
pub fn merge_for_save<C: ContentLike>(
    persisted: Option<&C>,
    current: &C,
    selected: &[VariantId],
    variants_to_store: &[VariantId],
    varies: bool,
    mergers: &ValueMergerRegistry,
) -> Result<C, VariantError> {
    if current.unique().is_none_or(str::is_empty) {
        return Err(VariantError::InvalidState {
            message: "content data has no unique id and cannot be merged for save".to_owned(),
        });
    }
    ensure_unique(current, "current")?;
    if let Some(persisted) = persisted {
        ensure_unique(persisted, "persisted")?;
    }

    if !varies {
        let Some(invariant) = current.variants().iter().find(|v| v.variant_id().is_invariant())
        else {
            return Err(VariantError::InvalidState {
                message: "content does not vary but has no invariant variant".to_owned(),
            });
        };
        let variants = vec![invariant.clone()];
        tracing::debug!(
            values = current.values().len(),
            "content does not vary; saving invariant data only"
        );
        return Ok(current.with_parts(variants, current.values().to_vec()));
    }

    let effective = effective_set(selected, variants_to_store);

    let variants = merge_records(
        persisted.map_or(&[][..], C::variants),
        current.variants(),
        &effective,
        VariantCoordinates::variant_id,
        |_, new| Ok(new.clone()),
    )?;
    let values = merge_records(
        persisted.map_or(&[][..], C::values),
        current.values(),
        &effective,
        |value: &PropertyValue| (value.alias.clone(), value.variant_id()),
        |old, new| mergers.apply(old, new, &effective),
    )?;

    tracing::debug!(
        stored = %effective.iter().map(ToString::to_string).collect::<Vec<_>>().join(","),
        variants = variants.len(),
        values = values.len(),
        "merged data for save"
    );
    Ok(current.with_parts(variants, values))
}

/// `selected`, then `variants_to_store`, then invariant, each once.
fn effective_set(selected: &[VariantId], variants_to_store: &[VariantId]) -> Vec<VariantId> {
    let invariant = VariantId::invariant();
    let mut seen: HashSet<&VariantId> = HashSet::new();
    selected
        .iter()
        .chain(variants_to_store)
        .chain(std::iter::once(&invariant))
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect()
}

fn merge_records<T, K, F>(
    persisted: &[T],
    current: &[T],
    effective: &[VariantId],
    key: impl Fn(&T) -> K,
    mut take: F,
) -> Result<Vec<T>, VariantError>
where
    T: Clone + VariantCoordinates,
    K: Eq + Hash,
    F: FnMut(Option<&T>, &T) -> Result<T, VariantError>,
{
    let chosen: HashSet<&VariantId> = effective.iter().collect();
    let current_by_key: HashMap<K, &T> = current.iter().map(|record| (key(record), record)).collect();
    let mut in_persisted: HashSet<K> = HashSet::with_capacity(persisted.len());
    let mut out = Vec::with_capacity(persisted.len().max(current.len()));

    for old in persisted {
        let slot = key(old);
        if !chosen.contains(&old.variant_id()) {
            out.push(old.clone());
        } else if let Some(&new) = current_by_key.get(&slot) {
            out.push(take(Some(old), new)?);
        }
        in_persisted.insert(slot);
    }

    let mut new_by_coordinates: HashMap<VariantId, Vec<&T>> = HashMap::new();
    for record in current {
        if !in_persisted.contains(&key(record)) {
            new_by_coordinates.entry(record.variant_id()).or_default().push(record);
        }
    }
    for id in effective {
        for &new in new_by_coordinates.get(id).into_iter().flatten() {
            out.push(take(None, new)?);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::model::{ContentSnapshot, VariantEntry, VariantState};

    fn en() -> VariantId {
        VariantId::culture("en-US")
    }

    fn da() -> VariantId {
        VariantId::culture("da-DK")
    }

    fn inv() -> VariantId {
        VariantId::invariant()
    }

    fn persisted() -> ContentSnapshot {
        ContentSnapshot::new("doc-1")
            .with_variant(VariantEntry::new(&en()).with_name("Old English"))
            .with_variant(VariantEntry::new(&da()).with_name("Gammel dansk"))
            .with_value(PropertyValue::new("title", &en(), json!("old en")))
            .with_value(PropertyValue::new("title", &da(), json!("old da")))
            .with_value(PropertyValue::new("logo", &inv(), json!("old logo")))
    }

    fn current() -> ContentSnapshot {
        ContentSnapshot::new("doc-1")
            .with_variant(VariantEntry::new(&en()).with_name("New English"))
            .with_variant(VariantEntry::new(&da()).with_name("Ny dansk"))
            .with_value(PropertyValue::new("title", &en(), json!("new en")))
            .with_value(PropertyValue::new("title", &da(), json!("new da")))
            .with_value(PropertyValue::new("logo", &inv(), json!("new logo")))
    }

    fn value_of<'a>(snapshot: &'a ContentSnapshot, alias: &str, id: &VariantId) -> Option<&'a Value> {
        snapshot
            .values
            .iter()
            .find(|v| v.alias == alias && id.compare(*v))
            .map(|v| &v.value)
    }

    fn merge(
        persisted: Option<&ContentSnapshot>,
        current: &ContentSnapshot,
        selected: &[VariantId],
    ) -> ContentSnapshot {
        merge_for_save(persisted, current, selected, selected, true, &ValueMergerRegistry::new())
            .unwrap()
    }

    #[test]
    fn unselected_variants_keep_persisted_data() {
        let result = merge(Some(&persisted()), &current(), &[en()]);

        assert_eq!(result.variants[0].name.as_deref(), Some("New English"));
        assert_eq!(result.variants[1], persisted().variants[1]);
        assert_eq!(value_of(&result, "title", &en()), Some(&json!("new en")));
        assert_eq!(value_of(&result, "title", &da()), Some(&json!("old da")));
    }

    #[test]
    fn invariant_values_always_travel() {
        let result = merge(Some(&persisted()), &current(), &[da()]);
        assert_eq!(value_of(&result, "logo", &inv()), Some(&json!("new logo")));

        let result = merge(Some(&persisted()), &current(), &[]);
        assert_eq!(value_of(&result, "logo", &inv()), Some(&json!("new logo")));
        assert_eq!(value_of(&result, "title", &en()), Some(&json!("old en")));
    }

    #[test]
    fn invariant_variant_entry_always_travels() {
        let current = ContentSnapshot::new("doc-1")
            .with_variant(VariantEntry::new(&inv()).with_name("Shared"))
            .with_variant(VariantEntry::new(&en()).with_name("English"));
        let result = merge(None, &current, &[]);
        assert_eq!(result.variants.len(), 1);
        assert_eq!(result.variants[0].name.as_deref(), Some("Shared"));
    }

    #[test]
    fn persisted_order_is_kept_and_new_records_are_appended_in_selection_order() {
        let de = VariantId::culture("de-DE");
        let fr = VariantId::culture("fr-FR");
        let current = current()
            .with_variant(VariantEntry::new(&fr).with_name("Français"))
            .with_variant(VariantEntry::new(&de).with_name("Deutsch"))
            .with_value(PropertyValue::new("title", &fr, json!("fr")))
            .with_value(PropertyValue::new("title", &de, json!("de")));

        let result = merge(Some(&persisted()), &current, &[de.clone(), da(), fr.clone()]);

        let order: Vec<VariantId> = result.variants.iter().map(VariantCoordinates::variant_id).collect();
        assert_eq!(order, vec![en(), da(), de.clone(), fr.clone()]);
        let value_order: Vec<VariantId> = result.values.iter().map(VariantCoordinates::variant_id).collect();
        assert_eq!(value_order, vec![en(), da(), inv(), de, fr]);
    }

    #[test]
    fn variants_to_store_extend_the_selection() {
        let fr = VariantId::culture("fr-FR");
        let vip = VariantId::new(Some("en-US"), Some("vip"));
        let current = current()
            .with_variant(VariantEntry::new(&vip).with_name("VIP English"))
            .with_variant(VariantEntry::new(&fr).with_name("Français"))
            .with_value(PropertyValue::new("title", &vip, json!("vip en")))
            .with_value(PropertyValue::new("title", &fr, json!("fr")));

        let result = merge_for_save(
            Some(&persisted()),
            &current,
            &[fr.clone(), da()],
            std::slice::from_ref(&vip),
            true,
            &ValueMergerRegistry::new(),
        )
        .unwrap();

        let order: Vec<VariantId> = result.variants.iter().map(VariantCoordinates::variant_id).collect();
        assert_eq!(order, vec![en(), da(), fr.clone(), vip.clone()]);
        assert_eq!(result.variants[0].name.as_deref(), Some("Old English"));
        assert_eq!(result.variants[1].name.as_deref(), Some("Ny dansk"));
        assert_eq!(value_of(&result, "title", &en()), Some(&json!("old en")));
        assert_eq!(value_of(&result, "title", &vip), Some(&json!("vip en")));
        let value_order: Vec<VariantId> = result.values.iter().map(VariantCoordinates::variant_id).collect();
        assert_eq!(value_order, vec![en(), da(), inv(), fr, vip]);
    }

    #[test]
    fn large_snapshots_merge_every_slot() {
        let cultures: Vec<VariantId> = (0..200).map(|i| VariantId::culture(format!("c{i}"))).collect();
        let mut persisted = ContentSnapshot::new("doc-1");
        let mut current = ContentSnapshot::new("doc-1");
        for id in &cultures {
            persisted = persisted.with_variant(VariantEntry::new(id).with_name("old"));
            current = current.with_variant(VariantEntry::new(id).with_name("new"));
            for alias in ["a", "b", "c"] {
                persisted = persisted.with_value(PropertyValue::new(alias, id, json!(0)));
                current = current.with_value(PropertyValue::new(alias, id, json!(1)));
            }
        }
        let selected: Vec<VariantId> = cultures.iter().step_by(2).cloned().collect();

        let result = merge(Some(&persisted), &current, &selected);
        assert_eq!(result.variants.len(), 200);
        assert_eq!(result.values.len(), 600);
        assert_eq!(result.variants[0].name.as_deref(), Some("new"));
        assert_eq!(result.variants[1].name.as_deref(), Some("old"));
        assert_eq!(value_of(&result, "c", &cultures[2]), Some(&json!(1)));
        assert_eq!(value_of(&result, "c", &cultures[3]), Some(&json!(0)));
    }

    #[test]
    fn selection_matches_case_insensitively() {
        let result = merge(Some(&persisted()), &current(), &[VariantId::culture("EN-us")]);
        assert_eq!(value_of(&result, "title", &en()), Some(&json!("new en")));
    }

    #[test]
    fn selected_variant_missing_from_current_is_a_no_op() {
        let result = merge(Some(&persisted()), &current(), &[VariantId::culture("sv-SE")]);
        assert_eq!(result.variants, persisted().variants);
        assert_eq!(value_of(&result, "title", &en()), Some(&json!("old en")));
    }

    #[test]
    fn value_removed_from_current_is_dropped_for_chosen_coordinates() {
        let mut current = current();
        current.values.retain(|v| !(v.alias == "title" && en().compare(v)));
        let result = merge(Some(&persisted()), &current, &[en()]);
        assert_eq!(value_of(&result, "title", &en()), None);
        assert_eq!(value_of(&result, "title", &da()), Some(&json!("old da")));
    }

    #[test]
    fn first_save_takes_only_selected_and_invariant() {
        let result = merge(None, &current(), &[da()]);
        let ids: Vec<VariantId> = result.variants.iter().map(VariantCoordinates::variant_id).collect();
        assert_eq!(ids, vec![da()]);
        assert_eq!(result.values.len(), 2);
    }

    #[test]
    fn non_varying_content_saves_current_invariant_data() {
        let current = ContentSnapshot::new("doc-1")
            .with_variant(VariantEntry::new(&inv()).with_name("Page").with_state(VariantState::Draft))
            .with_variant(VariantEntry::new(&en()).with_name("Stale"))
            .with_value(PropertyValue::new("title", &inv(), json!("t")))
            .with_value(PropertyValue::new("stale", &en(), json!("s")));
        let result = merge_for_save(
            Some(&persisted()),
            &current,
            &[da()],
            &[da()],
            false,
            &ValueMergerRegistry::new(),
        )
        .unwrap();

        assert_eq!(result.variants, vec![current.variants[0].clone()]);
        assert_eq!(result.values, current.values);
    }

    #[test]
    fn non_varying_content_without_invariant_variant_is_invalid_state() {
        let current = ContentSnapshot::new("doc-1")
            .with_variant(VariantEntry::new(&en()).with_name("English"))
            .with_value(PropertyValue::new("title", &inv(), json!("t")));
        let err = merge_for_save(None, &current, &[], &[], false, &ValueMergerRegistry::new())
            .unwrap_err();
        assert!(matches!(err, VariantError::InvalidState { .. }));
    }

    #[test]
    fn missing_unique_is_invalid_state() {
        let mut current = current();
        current.unique = None;
        let err = merge_for_save(None, &current, &[en()], &[], true, &ValueMergerRegistry::new())
            .unwrap_err();
        assert!(matches!(err, VariantError::InvalidState { .. }));

        current.unique = Some(String::new());
        assert!(merge_for_save(None, &current, &[], &[], false, &ValueMergerRegistry::new()).is_err());
    }

    #[test]
    fn duplicate_persisted_variant_fails() {
        let persisted = persisted().with_variant(VariantEntry::new(&VariantId::culture("DA-dk")));
        let err = merge_for_save(
            Some(&persisted),
            &current(),
            &[en()],
            &[],
            true,
            &ValueMergerRegistry::new(),
        )
        .unwrap_err();
        assert!(matches!(err, VariantError::DuplicateVariant { snapshot: "persisted", .. }));
    }

    #[test]
    fn merge_does_not_touch_inputs_and_is_repeatable() {
        let persisted = persisted();
        let current = current();
        let first = merge(Some(&persisted), &current, &[en()]);
        let second = merge(Some(&persisted), &current, &[en()]);
        assert_eq!(first, second);
        assert_eq!(persisted, self::persisted());
        assert_eq!(current, self::current());
    }

    /// Keeps persisted entries of a keyed JSON object for cultures that are
    /// not being stored.
    struct KeyedByCulture;

    impl ValueMerger for KeyedByCulture {
        fn merge(
            &self,
            persisted: Option<&PropertyValue>,
            current: &PropertyValue,
            variants: &[VariantId],
        ) -> Result<PropertyValue, VariantError> {
            let mut merged = current.clone();
            let (Some(old), Some(out)) = (
                persisted.and_then(|p| p.value.as_object()),
                merged.value.as_object_mut(),
            ) else {
                return Ok(merged);
            };
            for (culture, value) in old {
                if !variants.iter().any(|id| id.compare(&VariantId::culture(culture.as_str()))) {
                    out.insert(culture.clone(), value.clone());
                }
            }
            Ok(merged)
        }
    }

    #[test]
    fn registered_value_merger_combines_nested_data() {
        let blocks = "Umbraco.BlockList";
        let persisted = persisted().with_value(
            PropertyValue::new("blocks", &inv(), json!({ "en-US": "old en", "da-DK": "old da" }))
                .with_editor_alias(blocks),
        );
        let current = current().with_value(
            PropertyValue::new("blocks", &inv(), json!({ "en-US": "new en", "da-DK": "new da" }))
                .with_editor_alias(blocks),
        );
        let mut mergers = ValueMergerRegistry::new();
        mergers.register(blocks, KeyedByCulture);

        let result =
            merge_for_save(Some(&persisted), &current, &[en()], &[en()], true, &mergers).unwrap();
        assert_eq!(
            value_of(&result, "blocks", &inv()),
            Some(&json!({ "en-US": "new en", "da-DK": "old da" }))
        );
        assert_eq!(format!("{mergers:?}"), r#"ValueMergerRegistry { editors: ["Umbraco.BlockList"] }"#);
    }
}
