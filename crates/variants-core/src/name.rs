//! Display-name resolution for multi-variant content.
//!
//! [`resolve_name`] picks one label for a content item given the culture the
//! user is viewing and the configured fallback culture. Only a name from the
//! viewed culture is shown bare; anything borrowed from another culture is
//! wrapped in parentheses so the UI signals "not the name for this language".
//!
//! Search order:
//!
//! ```text
//! 1. invariant item (single culture-less variant) → its name
//! 2. variant for the display culture               → name
//! 3. variant for the fallback culture              → (name)
//! 4. first variant in list order with a name       → (name)
//! 5. nothing named                                 → (Untitled)
//! ```

use crate::id::same;
use crate::model::NamedVariant;
use crate::options::Language;

/// Label used when no variant has a usable name.
pub const UNTITLED: &str = "(Untitled)";

/// Resolve the display name of a content item.
///
/// Pure: never mutates `variants` and never fails. An absent
/// `display_culture` or `fallback_culture` skips the corresponding step.
pub fn resolve_name<V: NamedVariant>(
    variants: &[V],
    display_culture: Option<&str>,
    fallback_culture: Option<&str>,
) -> String {
    if let [only] = variants
        && only.culture().is_none_or(str::is_empty)
    {
        return named(only).unwrap_or(UNTITLED).to_owned();
    }

    if let Some(name) = display_culture.and_then(|c| name_for_culture(variants, c)) {
        return name.to_owned();
    }

    if let Some(name) = fallback_culture.and_then(|c| name_for_culture(variants, c)) {
        return format!("({name})");
    }

    variants
        .iter()
        .find_map(named)
        .map_or_else(|| UNTITLED.to_owned(), |name| format!("({name})"))
}

/// The name of `culture`: its segment-invariant variant first, then any
/// named segment variant of that culture.
fn name_for_culture<'a, V: NamedVariant>(variants: &'a [V], culture: &str) -> Option<&'a str> {
    let in_culture = variants.iter().filter(|v| same(v.culture(), Some(culture)));
    in_culture
        .clone()
        .filter(|v| v.segment().is_none_or(str::is_empty))
        .find_map(named)
        .or_else(|| in_culture.clone().find_map(named))
}

fn named<V: NamedVariant>(variant: &V) -> Option<&str> {
    variant.name().filter(|n| !n.is_empty())
}

// ---------------------------------------------------------------------------
// VariantContext / DisplayNameTracker
// ---------------------------------------------------------------------------

/// The culture context a label is resolved in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariantContext {
    /// Culture currently shown to the user.
    pub display_culture: Option<String>,
    /// Culture to borrow a name from when the displayed one has none.
    pub fallback_culture: Option<String>,
}

impl VariantContext {
    /// Context for `display_culture` with `fallback_culture`.
    #[must_use]
    pub fn new(display_culture: Option<&str>, fallback_culture: Option<&str>) -> Self {
        Self {
            display_culture: display_culture.map(str::to_owned),
            fallback_culture: fallback_culture.map(str::to_owned),
        }
    }

    /// Context for viewing `language`: its configured fallback language, or
    /// the default language when none is configured.
    #[must_use]
    pub fn for_language(language: &Language, languages: &[Language]) -> Self {
        let fallback = language.fallback_iso_code.as_deref().or_else(|| {
            languages
                .iter()
                .find(|l| l.is_default && !same(Some(l.unique.as_str()), Some(language.unique.as_str())))
                .map(|l| l.unique.as_str())
        });
        Self::new(Some(language.unique.as_str()), fallback)
    }

    /// Resolve a label for `variants` in this context.
    pub fn resolve<V: NamedVariant>(&self, variants: &[V]) -> String {
        resolve_name(
            variants,
            self.display_culture.as_deref(),
            self.fallback_culture.as_deref(),
        )
    }
}

/// Keeps a resolved label in step with its inputs.
///
/// Call [`set_context`](Self::set_context) when the display or fallback
/// culture changes and [`refresh`](Self::refresh) whenever the variant data
/// changes. Both recompute the label and report whether it moved, so a
/// caller can re-render only on actual changes.
#[derive(Clone, Debug, Default)]
pub struct DisplayNameTracker {
    context: VariantContext,
    label: Option<String>,
}

impl DisplayNameTracker {
    /// A tracker with no label computed yet.
    #[must_use]
    pub fn new(context: VariantContext) -> Self {
        Self {
            context,
            label: None,
        }
    }

    /// The most recently computed label.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The context labels are resolved in.
    #[must_use]
    pub const fn context(&self) -> &VariantContext {
        &self.context
    }

    /// Switch context and recompute. Returns the new label if it changed.
    pub fn set_context<V: NamedVariant>(
        &mut self,
        context: VariantContext,
        variants: &[V],
    ) -> Option<&str> {
        self.context = context;
        self.refresh(variants)
    }

    /// Recompute for `variants`. Returns the new label if it changed.
    pub fn refresh<V: NamedVariant>(&mut self, variants: &[V]) -> Option<&str> {
        let next = self.context.resolve(variants);
        if self.label.as_deref() == Some(next.as_str()) {
            return None;
        }
        tracing::trace!(label = %next, "display name changed");
        self.label = Some(next);
        self.label.as_deref()
    }
}
