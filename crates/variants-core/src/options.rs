//! Variant options: every variant a content item may have.
//!
//! Options are what a variant picker lists. Which options exist depends on
//! the content type's variation flags, the configured languages and the
//! available segments:
//!
//! | varies by         | options                                                   |
//! |-------------------|-----------------------------------------------------------|
//! | nothing           | one invariant option                                      |
//! | culture           | one per language                                          |
//! | segment           | invariant, then one per segment without culture limits    |
//! | culture + segment | per language: the culture, then each segment allowed in it |
//!
//! Each option carries the item's current variant at those coordinates, if
//! one exists yet.

use serde::{Deserialize, Serialize};

use crate::id::{VariantId, same};
use crate::model::{NamedVariant, VariesBy};

/// A configured language.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    /// Culture code, e.g. `en-US`.
    pub unique: String,
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    /// Publishing requires this culture to be filled in.
    #[serde(default)]
    pub is_mandatory: bool,
    #[serde(default)]
    pub fallback_iso_code: Option<String>,
}

impl Language {
    /// A non-default, non-mandatory language.
    #[must_use]
    pub fn new(unique: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            unique: unique.into(),
            name: name.into(),
            is_default: false,
            is_mandatory: false,
            fallback_iso_code: None,
        }
    }
}

/// A content segment (e.g. a personalisation audience).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub alias: String,
    pub name: String,
    /// Cultures the segment is limited to; `None` means every culture.
    #[serde(default)]
    pub cultures: Option<Vec<String>>,
}

impl Segment {
    fn allowed_in(&self, culture: &str) -> bool {
        self.cultures
            .as_ref()
            .is_none_or(|cultures| cultures.iter().any(|c| same(Some(c.as_str()), Some(culture))))
    }
}

/// One pickable variant.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantOption<'a, V> {
    pub id: VariantId,
    /// The item's variant at these coordinates, if it exists.
    pub variant: Option<&'a V>,
    /// The language of the option; the default language for culture-less
    /// options.
    pub language: Option<&'a Language>,
    /// The segment of the option, if segmented.
    pub segment: Option<&'a Segment>,
}

impl<V> VariantOption<'_, V> {
    /// `true` when publishing requires this option's culture.
    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        !self.id.is_invariant() && self.language.is_some_and(|l| l.is_mandatory)
    }
}

/// List the variant options for an item.
pub fn build_variant_options<'a, V: NamedVariant>(
    varies: VariesBy,
    variants: &'a [V],
    languages: &'a [Language],
    segments: &'a [Segment],
) -> Vec<VariantOption<'a, V>> {
    let default_language = languages.iter().find(|l| l.is_default);
    let option = move |id: VariantId, language: Option<&'a Language>, segment: Option<&'a Segment>| {
        VariantOption {
            variant: variants.iter().find(|v| id.compare(*v)),
            id,
            language,
            segment,
        }
    };

    match (varies.culture, varies.segment) {
        (false, false) => vec![option(VariantId::invariant(), default_language, None)],
        (true, false) => languages
            .iter()
            .map(|language| option(VariantId::culture(language.unique.as_str()), Some(language), None))
            .collect(),
        (false, true) => std::iter::once(option(VariantId::invariant(), default_language, None))
            .chain(segments.iter().filter(|s| s.cultures.is_none()).map(|segment| {
                option(
                    VariantId::new(None, Some(segment.alias.as_str())),
                    default_language,
                    Some(segment),
                )
            }))
            .collect(),
        (true, true) => languages
            .iter()
            .flat_map(|language| {
                let culture = language.unique.as_str();
                std::iter::once(option(VariantId::culture(culture), Some(language), None)).chain(
                    segments
                        .iter()
                        .filter(move |s| s.allowed_in(culture))
                        .map(move |segment| {
                            option(
                                VariantId::new(Some(culture), Some(segment.alias.as_str())),
                                Some(language),
                                Some(segment),
                            )
                        }),
                )
            })
            .collect(),
    }
}
