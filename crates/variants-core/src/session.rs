//! An editing session over one content item.
//!
//! [`EditSession`] owns the persisted and current snapshots of an item and
//! runs the engine operations against them: edits go to `current`,
//! [`changed_variants`](EditSession::changed_variants) compares the two,
//! [`prepare_save`](EditSession::prepare_save) builds and checks the payload,
//! and [`accept_saved`](EditSession::accept_saved) folds the server's answer
//! back in without losing unsaved edits to other variants.
//!
//! The session is single-owner (`&mut self` for edits), so every engine call
//! sees a consistent snapshot pair.

use crate::changes::detect_changed;
use crate::error::VariantError;
use crate::id::VariantId;
use crate::merge::{ValueMergerRegistry, merge_for_save};
use crate::model::{ContentLike, NamedVariant, PropertyValue, VariesBy};
use crate::name::VariantContext;
use crate::options::{Language, Segment, build_variant_options};
use crate::plan::{SavePlan, plan_save};
use crate::validate::validate_save_data;

/// Persisted + current data of one item under edit.
#[derive(Debug)]
pub struct EditSession<C: ContentLike> {
    persisted: Option<C>,
    current: C,
    varies: VariesBy,
    mergers: ValueMergerRegistry,
}

impl<C: ContentLike> EditSession<C> {
    /// Start editing an item that was loaded from storage.
    #[must_use]
    pub fn load(persisted: C, varies: VariesBy) -> Self {
        Self {
            current: persisted.clone(),
            persisted: Some(persisted),
            varies,
            mergers: ValueMergerRegistry::new(),
        }
    }

    /// Start editing an item that has never been saved.
    #[must_use]
    pub fn create(scaffold: C, varies: VariesBy) -> Self {
        Self {
            persisted: None,
            current: scaffold,
            varies,
            mergers: ValueMergerRegistry::new(),
        }
    }

    /// Builder: use `mergers` for structured property values.
    #[must_use]
    pub fn with_mergers(mut self, mergers: ValueMergerRegistry) -> Self {
        self.mergers = mergers;
        self
    }

    /// The last persisted snapshot, `None` before the first save.
    #[must_use]
    pub const fn persisted(&self) -> Option<&C> {
        self.persisted.as_ref()
    }

    /// The snapshot with all edits applied.
    #[must_use]
    pub const fn current(&self) -> &C {
        &self.current
    }

    #[must_use]
    pub const fn varies(&self) -> VariesBy {
        self.varies
    }

    /// Set the name of the variant at `id`, creating the variant if needed.
    pub fn set_name(&mut self, id: &VariantId, name: impl Into<String>) {
        let mut variants = self.current.variants().to_vec();
        let name = Some(name.into());
        if let Some(variant) = variants.iter_mut().find(|v| id.compare(&**v)) {
            variant.set_name(name);
        } else {
            let mut variant = <C::Variant as NamedVariant>::scaffold(id);
            variant.set_name(name);
            variants.push(variant);
        }
        self.current = self.current.with_parts(variants, self.current.values().to_vec());
    }

    /// Insert or replace the value of `alias` at `id`.
    ///
    /// A value for a culture or segment the item has no variant for yet also
    /// creates that variant, so the value has something to be saved with.
    pub fn set_property_value(
        &mut self,
        alias: &str,
        id: &VariantId,
        value: serde_json::Value,
        editor_alias: Option<&str>,
    ) {
        let mut entry = PropertyValue::new(alias, id, value);
        entry.editor_alias = editor_alias.map(str::to_owned);

        let mut values = self.current.values().to_vec();
        match values.iter_mut().find(|v| v.same_slot(&entry)) {
            Some(slot) => *slot = entry,
            None => values.push(entry),
        }

        let mut variants = self.current.variants().to_vec();
        if self.varies.any()
            && !(id.is_invariant() && id.is_segment_invariant())
            && !variants.iter().any(|v| id.compare(v))
        {
            tracing::debug!(variant = %id, property = alias, "creating variant for property value");
            variants.push(<C::Variant as NamedVariant>::scaffold(id));
        }
        self.current = self.current.with_parts(variants, values);
    }

    /// Variants whose data differs from the persisted snapshot.
    ///
    /// # Errors
    /// Propagates duplicate-slot errors from [`detect_changed`].
    pub fn changed_variants(&self) -> Result<Vec<VariantId>, VariantError> {
        detect_changed(self.persisted.as_ref(), &self.current)
    }

    /// `true` when there is anything to save.
    ///
    /// # Errors
    /// Propagates duplicate-slot errors from [`detect_changed`].
    pub fn is_dirty(&self) -> Result<bool, VariantError> {
        Ok(!self.changed_variants()?.is_empty())
    }

    /// The snapshot to submit for saving `selected`.
    ///
    /// # Errors
    /// Propagates errors from [`merge_for_save`].
    pub fn construct_save_data(&self, selected: &[VariantId]) -> Result<C, VariantError> {
        merge_for_save(
            self.persisted.as_ref(),
            &self.current,
            selected,
            selected,
            self.varies.any(),
            &self.mergers,
        )
    }

    /// Plan the save dialog: every variant option of the item, with the
    /// `active` and changed variants preselected.
    ///
    /// # Errors
    /// Propagates duplicate-slot errors from [`detect_changed`].
    pub fn save_plan(
        &self,
        languages: &[Language],
        segments: &[Segment],
        active: &[VariantId],
        read_only: &[VariantId],
    ) -> Result<SavePlan, VariantError> {
        let options: Vec<VariantId> =
            build_variant_options(self.varies, self.current.variants(), languages, segments)
                .into_iter()
                .map(|option| option.id)
                .collect();
        let changed = self.changed_variants()?;
        Ok(plan_save(&options, active, &changed, read_only))
    }

    /// Construct the save data for `selected` and run the mandatory checks.
    ///
    /// # Errors
    /// Propagates errors from [`merge_for_save`] and [`validate_save_data`].
    pub fn prepare_save(&self, selected: &[VariantId]) -> Result<C, VariantError> {
        let data = self.construct_save_data(selected)?;
        validate_save_data(&data, selected, self.varies.culture)?;
        Ok(data)
    }

    /// Adopt `saved` as the new persisted state after saving `selected`.
    ///
    /// Current data takes the saved records for the saved variants and keeps
    /// its own, still unsaved, records for every other variant.
    ///
    /// # Errors
    /// Propagates errors from [`merge_for_save`].
    pub fn accept_saved(&mut self, saved: C, selected: &[VariantId]) -> Result<(), VariantError> {
        let current = merge_for_save(
            Some(&self.current),
            &saved,
            selected,
            selected,
            self.varies.any(),
            &ValueMergerRegistry::new(),
        )?;
        self.current = current;
        self.persisted = Some(saved);
        Ok(())
    }

    /// The label to show for this item in `context`.
    #[must_use]
    pub fn display_name(&self, context: &VariantContext) -> String {
        context.resolve(self.current.variants())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::{ContentSnapshot, VariantEntry, VariantState};

    fn en() -> VariantId {
        VariantId::culture("en-US")
    }

    fn da() -> VariantId {
        VariantId::culture("da-DK")
    }

    fn loaded() -> EditSession<ContentSnapshot> {
        let persisted = ContentSnapshot::new("doc-1")
            .with_variant(VariantEntry::new(&en()).with_name("Home").with_state(VariantState::Draft))
            .with_variant(VariantEntry::new(&da()).with_name("Hjem").with_state(VariantState::Draft))
            .with_value(PropertyValue::new("title", &en(), json!("Hello")))
            .with_value(PropertyValue::new("title", &da(), json!("Hej")));
        EditSession::load(persisted, VariesBy::CULTURE)
    }

    #[test]
    fn fresh_session_is_clean() {
        assert!(!loaded().is_dirty().unwrap());
    }

    #[test]
    fn edits_mark_their_variant() {
        let mut session = loaded();
        session.set_property_value("title", &da(), json!("Hej verden"), None);
        assert_eq!(session.changed_variants().unwrap(), vec![da()]);

        session.set_name(&en(), "Start");
        assert_eq!(session.changed_variants().unwrap(), vec![en(), da()]);
    }

    #[test]
    fn value_for_unknown_culture_creates_the_variant() {
        let mut session = loaded();
        let de = VariantId::culture("de-DE");
        session.set_property_value("title", &de, json!("Hallo"), Some("Umbraco.TextBox"));
        assert!(session.current().variants.iter().any(|v| de.compare(v)));
        assert_eq!(session.changed_variants().unwrap(), vec![de]);
    }

    #[test]
    fn prepare_save_rejects_unnamed_new_variant() {
        let mut session = loaded();
        let de = VariantId::culture("de-DE");
        session.set_property_value("title", &de, json!("Hallo"), None);
        assert!(matches!(
            session.prepare_save(&[de.clone()]),
            Err(VariantError::UnnamedVariants { .. })
        ));

        session.set_name(&de, "Startseite");
        let data = session.prepare_save(&[de]).unwrap();
        assert_eq!(data.variants.len(), 3);
    }

    #[test]
    fn accept_saved_keeps_unsaved_edits_of_other_variants() {
        let mut session = loaded();
        session.set_property_value("title", &en(), json!("Hello there"), None);
        session.set_property_value("title", &da(), json!("Hej med dig"), None);

        let mut saved = session.construct_save_data(&[en()]).unwrap();
        saved.variants[0].state = VariantState::Published;
        session.accept_saved(saved, &[en()]).unwrap();

        assert_eq!(session.changed_variants().unwrap(), vec![da()]);
        assert_eq!(session.current().variants[0].state, VariantState::Published);
        assert_eq!(session.current().values[1].value, json!("Hej med dig"));
    }

    #[test]
    fn new_item_save_takes_selected_culture() {
        let mut session = EditSession::create(ContentSnapshot::new("doc-2"), VariesBy::CULTURE);
        session.set_name(&en(), "About");
        session.set_name(&da(), "Om");
        let data = session.prepare_save(&[en()]).unwrap();
        assert_eq!(data.variants.len(), 1);
        assert_eq!(data.variants[0].name.as_deref(), Some("About"));
    }

    #[test]
    fn save_plan_preselects_active_and_edited_cultures() {
        let mut session = loaded();
        session.set_property_value("title", &da(), json!("Hej igen"), None);

        let mut english = Language::new("en-US", "English");
        english.is_default = true;
        let languages = [english, Language::new("da-DK", "Dansk"), Language::new("de-DE", "Deutsch")];
        let de = VariantId::culture("de-DE");

        let plan = session.save_plan(&languages, &[], &[en()], &[]).unwrap();
        assert_eq!(plan.options, vec![en(), da(), de.clone()]);
        assert_eq!(plan.preselected, vec![en(), da()]);

        let selected = plan.resolve_selection(None).unwrap();
        let data = session.prepare_save(&selected).unwrap();
        assert_eq!(data.values[1].value, json!("Hej igen"));

        let plan = session.save_plan(&languages, &[], &[en()], &[en()]).unwrap();
        assert_eq!(plan.preselected, vec![da()]);
        assert_eq!(plan.pickable().collect::<Vec<_>>(), vec![&da(), &de]);
    }

    #[test]
    fn display_name_follows_context() {
        let session = loaded();
        assert_eq!(session.display_name(&VariantContext::new(Some("da-DK"), None)), "Hjem");
        assert_eq!(
            session.display_name(&VariantContext::new(Some("sv-SE"), Some("en-US"))),
            "(Home)"
        );
    }
}
