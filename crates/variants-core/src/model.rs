//! Content data model.
//!
//! A content item is edited as two [`ContentSnapshot`]s: the *persisted*
//! snapshot (last server-confirmed state) and the *current* snapshot
//! (in-memory edits). Both carry the same shapes: a list of
//! [`VariantEntry`]s and a list of [`PropertyValue`]s, each addressed by
//! culture and segment.
//!
//! The engine does not hard-code [`ContentSnapshot`]. Change detection and
//! merging work through [`ContentLike`], so documents, media, members and
//! block elements with their own variant shapes can share the same logic.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::VariantError;
use crate::id::{VariantCoordinates, VariantId};

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// A variant-scoped record with an optional display name.
pub trait NamedVariant: VariantCoordinates {
    /// The display name, if one has been entered.
    fn name(&self) -> Option<&str>;

    /// Replace the display name.
    fn set_name(&mut self, name: Option<String>);

    /// A fresh, unnamed record for `id`, used when an edit targets a variant
    /// that does not exist yet.
    fn scaffold(id: &VariantId) -> Self
    where
        Self: Sized;
}

/// Capability set shared by every content-like entity: an identifier, a list
/// of variants and a list of property values.
pub trait ContentLike: Clone {
    /// The variant record type of this entity.
    type Variant: NamedVariant + Clone + PartialEq;

    /// The entity's identifier, `None` for an item that was never identified.
    fn unique(&self) -> Option<&str>;

    /// Variant records, in stored order.
    fn variants(&self) -> &[Self::Variant];

    /// Property values, in stored order.
    fn values(&self) -> &[PropertyValue];

    /// A copy of `self` with variants and values replaced.
    #[must_use]
    fn with_parts(&self, variants: Vec<Self::Variant>, values: Vec<PropertyValue>) -> Self;
}

// ---------------------------------------------------------------------------
// VariantState
// ---------------------------------------------------------------------------

/// Publishing state of one variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantState {
    /// The variant exists only as an option; nothing has been saved for it.
    #[default]
    NotCreated,
    /// Saved but never published.
    Draft,
    /// Published and unchanged since.
    Published,
    /// Published, with saved changes not yet published.
    PublishedPendingChanges,
}

// ---------------------------------------------------------------------------
// VariantEntry
// ---------------------------------------------------------------------------

/// Variant metadata of a content item.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantEntry {
    /// Culture code, `None` for the invariant variant.
    #[serde(default)]
    pub culture: Option<String>,
    /// Segment alias, `None` when not segmented.
    #[serde(default)]
    pub segment: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Publishing state.
    #[serde(default)]
    pub state: VariantState,
    #[serde(default)]
    pub create_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub publish_date: Option<DateTime<Utc>>,
    /// Free-form variant-scoped flags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
}

impl VariantEntry {
    /// An unnamed, not-yet-created entry at `id`.
    #[must_use]
    pub fn new(id: &VariantId) -> Self {
        Self {
            culture: id.culture().map(str::to_owned),
            segment: id.segment().map(str::to_owned),
            ..Self::default()
        }
    }

    /// Builder: set the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder: set the state.
    #[must_use]
    pub fn with_state(mut self, state: VariantState) -> Self {
        self.state = state;
        self
    }
}

impl VariantCoordinates for VariantEntry {
    fn culture(&self) -> Option<&str> {
        self.culture.as_deref()
    }

    fn segment(&self) -> Option<&str> {
        self.segment.as_deref()
    }
}

impl NamedVariant for VariantEntry {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    fn scaffold(id: &VariantId) -> Self {
        Self::new(id)
    }
}

// ---------------------------------------------------------------------------
// PropertyValue
// ---------------------------------------------------------------------------

/// One property value, identified by (alias, culture, segment).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyValue {
    /// Property alias.
    pub alias: String,
    #[serde(default)]
    pub culture: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
    /// Alias of the property editor that owns the value format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_alias: Option<String>,
    /// Opaque payload.
    #[serde(default)]
    pub value: serde_json::Value,
}

impl PropertyValue {
    /// A value for `alias` at `id`.
    #[must_use]
    pub fn new(alias: impl Into<String>, id: &VariantId, value: serde_json::Value) -> Self {
        Self {
            alias: alias.into(),
            culture: id.culture().map(str::to_owned),
            segment: id.segment().map(str::to_owned),
            editor_alias: None,
            value,
        }
    }

    /// Builder: set the editor alias.
    #[must_use]
    pub fn with_editor_alias(mut self, editor_alias: impl Into<String>) -> Self {
        self.editor_alias = Some(editor_alias.into());
        self
    }

    /// `true` when `other` addresses the same property at the same coordinates.
    #[must_use]
    pub fn same_slot(&self, other: &Self) -> bool {
        self.alias == other.alias && self.variant_id().compare(other)
    }
}

impl VariantCoordinates for PropertyValue {
    fn culture(&self) -> Option<&str> {
        self.culture.as_deref()
    }

    fn segment(&self) -> Option<&str> {
        self.segment.as_deref()
    }
}

// ---------------------------------------------------------------------------
// ContentSnapshot
// ---------------------------------------------------------------------------

/// A content item's data at one point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSnapshot {
    /// Item identity.
    #[serde(default)]
    pub unique: Option<String>,
    #[serde(default)]
    pub variants: Vec<VariantEntry>,
    #[serde(default)]
    pub values: Vec<PropertyValue>,
}

impl ContentSnapshot {
    /// An empty snapshot for the item `unique`.
    #[must_use]
    pub fn new(unique: impl Into<String>) -> Self {
        Self {
            unique: Some(unique.into()),
            ..Self::default()
        }
    }

    /// Builder: append a variant entry.
    #[must_use]
    pub fn with_variant(mut self, variant: VariantEntry) -> Self {
        self.variants.push(variant);
        self
    }

    /// Builder: append a property value.
    #[must_use]
    pub fn with_value(mut self, value: PropertyValue) -> Self {
        self.values.push(value);
        self
    }
}

impl ContentLike for ContentSnapshot {
    type Variant = VariantEntry;

    fn unique(&self) -> Option<&str> {
        self.unique.as_deref()
    }

    fn variants(&self) -> &[VariantEntry] {
        &self.variants
    }

    fn values(&self) -> &[PropertyValue] {
        &self.values
    }

    fn with_parts(&self, variants: Vec<VariantEntry>, values: Vec<PropertyValue>) -> Self {
        Self {
            unique: self.unique.clone(),
            variants,
            values,
        }
    }
}

// ---------------------------------------------------------------------------
// VariesBy
// ---------------------------------------------------------------------------

/// Which dimensions the content type allows to vary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariesBy {
    #[serde(default)]
    pub culture: bool,
    #[serde(default)]
    pub segment: bool,
}

impl VariesBy {
    /// Varies by neither culture nor segment.
    pub const NOTHING: Self = Self {
        culture: false,
        segment: false,
    };

    /// Varies by culture only.
    pub const CULTURE: Self = Self {
        culture: true,
        segment: false,
    };

    /// `true` when the content type varies at all.
    #[must_use]
    pub const fn any(self) -> bool {
        self.culture || self.segment
    }
}

// ---------------------------------------------------------------------------
// Invariant checks
// ---------------------------------------------------------------------------

/// Lookup tables over one snapshot: variants by coordinates, values by
/// alias and coordinates.
pub(crate) struct SlotIndex<'a, V> {
    pub variants: HashMap<VariantId, &'a V>,
    pub values: HashMap<(&'a str, VariantId), &'a PropertyValue>,
}

/// Index `content`, rejecting two variants with the same coordinates or two
/// values with the same alias and coordinates.
pub(crate) fn index_slots<'a, C: ContentLike>(
    content: &'a C,
    snapshot: &'static str,
) -> Result<SlotIndex<'a, C::Variant>, VariantError> {
    let mut variants = HashMap::with_capacity(content.variants().len());
    for variant in content.variants() {
        let id = variant.variant_id();
        if variants.insert(id.clone(), variant).is_some() {
            return Err(VariantError::DuplicateVariant { id, snapshot });
        }
    }

    let mut values = HashMap::with_capacity(content.values().len());
    for value in content.values() {
        let id = value.variant_id();
        if values.insert((value.alias.as_str(), id.clone()), value).is_some() {
            return Err(VariantError::DuplicateValue {
                alias: value.alias.clone(),
                id,
                snapshot,
            });
        }
    }
    Ok(SlotIndex { variants, values })
}

/// [`index_slots`] for callers that only need the uniqueness check.
pub(crate) fn ensure_unique<C: ContentLike>(
    content: &C,
    snapshot: &'static str,
) -> Result<(), VariantError> {
    index_slots(content, snapshot).map(|_| ())
}
