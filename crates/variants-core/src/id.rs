//! Variant identity.
//!
//! A [`VariantId`] names one culture/segment edition of a content item. It is
//! a value object: built wherever a variant needs to be referenced, never
//! mutated, and compared by value.
//!
//! Comparison rules (shared by [`VariantId::compare`], `PartialEq` and `Hash`):
//!
//! - culture and segment are compared case-insensitively;
//! - an empty string is the same as an absent value.
//!
//! The string form is `<culture>[_<segment>]`, with `invariant` standing in
//! for an absent culture:
//!
//! ```text
//! invariant        culture: None,          segment: None
//! invariant_vip    culture: None,          segment: Some("vip")
//! en-US            culture: Some("en-US"), segment: None
//! da-DK_vip        culture: Some("da-DK"), segment: Some("vip")
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VariantError;

/// The culture placeholder used in the string form of invariant ids.
pub const INVARIANT_LABEL: &str = "invariant";

// ---------------------------------------------------------------------------
// VariantCoordinates
// ---------------------------------------------------------------------------

/// Anything addressed by a (culture, segment) pair.
///
/// Implemented by [`VariantId`] itself and by the variant-scoped records in
/// [`crate::model`], so ids can be compared against entries directly.
pub trait VariantCoordinates {
    /// The culture code, `None` when culture-invariant.
    fn culture(&self) -> Option<&str>;

    /// The segment alias, `None` when segment-invariant.
    fn segment(&self) -> Option<&str>;

    /// The coordinates as an owned [`VariantId`].
    fn variant_id(&self) -> VariantId {
        VariantId::new(self.culture(), self.segment())
    }
}

// ---------------------------------------------------------------------------
// VariantId
// ---------------------------------------------------------------------------

/// Immutable (culture, segment) key of a content variant.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VariantId {
    #[serde(default)]
    culture: Option<String>,
    #[serde(default)]
    segment: Option<String>,
}

impl VariantId {
    /// Build an id from optional culture and segment.
    #[must_use]
    pub fn new(culture: Option<&str>, segment: Option<&str>) -> Self {
        Self {
            culture: culture.map(str::to_owned),
            segment: segment.map(str::to_owned),
        }
    }

    /// The invariant id: no culture, no segment.
    #[must_use]
    pub const fn invariant() -> Self {
        Self {
            culture: None,
            segment: None,
        }
    }

    /// A segment-invariant id for `culture`.
    #[must_use]
    pub fn culture(culture: impl Into<String>) -> Self {
        Self {
            culture: Some(culture.into()),
            segment: None,
        }
    }

    /// Copy the coordinates of any variant-scoped record.
    #[must_use]
    pub fn from_coordinates(source: &impl VariantCoordinates) -> Self {
        source.variant_id()
    }

    /// `true` when the id has no culture. The segment is not considered.
    #[must_use]
    pub fn is_invariant(&self) -> bool {
        normalized(self.culture.as_deref()).is_none()
    }

    /// `true` when the id has no segment.
    #[must_use]
    pub fn is_segment_invariant(&self) -> bool {
        normalized(self.segment.as_deref()).is_none()
    }

    /// Compare against anything with coordinates, case-insensitively and
    /// treating empty strings as absent.
    pub fn compare(&self, other: &(impl VariantCoordinates + ?Sized)) -> bool {
        same(self.culture.as_deref(), other.culture())
            && same(self.segment.as_deref(), other.segment())
    }

    /// The culture exactly as stored, for building wire payloads.
    #[must_use]
    pub fn to_culture_string(&self) -> Option<&str> {
        self.culture.as_deref()
    }

    /// The same culture with the segment dropped.
    #[must_use]
    pub fn to_segment_invariant(&self) -> Self {
        Self {
            culture: self.culture.clone(),
            segment: None,
        }
    }

    /// The same segment with the culture dropped.
    #[must_use]
    pub fn to_culture_invariant(&self) -> Self {
        Self {
            culture: None,
            segment: self.segment.clone(),
        }
    }
}

impl VariantCoordinates for VariantId {
    fn culture(&self) -> Option<&str> {
        self.culture.as_deref()
    }

    fn segment(&self) -> Option<&str> {
        self.segment.as_deref()
    }

    fn variant_id(&self) -> VariantId {
        self.clone()
    }
}

impl PartialEq for VariantId {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other)
    }
}

impl Eq for VariantId {}

impl Hash for VariantId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for part in [self.culture.as_deref(), self.segment.as_deref()] {
            match normalized(part) {
                Some(text) => {
                    state.write_u8(1);
                    folded(text).for_each(|c| c.hash(state));
                    state.write_u8(0xff);
                }
                None => state.write_u8(0),
            }
        }
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(normalized(self.culture.as_deref()).unwrap_or(INVARIANT_LABEL))?;
        if let Some(segment) = normalized(self.segment.as_deref()) {
            write!(f, "_{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for VariantId {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (culture, segment) = match s.split_once('_') {
            Some((culture, segment)) => (culture, Some(segment)),
            None => (s, None),
        };
        if culture.is_empty() {
            return Err(VariantError::InvalidVariantId {
                value: s.to_owned(),
                reason: format!("culture is empty; use `{INVARIANT_LABEL}` for no culture"),
            });
        }
        if segment.is_some_and(str::is_empty) {
            return Err(VariantError::InvalidVariantId {
                value: s.to_owned(),
                reason: "segment after `_` is empty".to_owned(),
            });
        }
        let culture = (!culture.eq_ignore_ascii_case(INVARIANT_LABEL)).then_some(culture);
        Ok(Self::new(culture, segment))
    }
}

fn normalized(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Lowercased characters of `text`, without allocating.
fn folded(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars().flat_map(char::to_lowercase)
}

/// Case-insensitive equality with `None == Some("")`.
pub(crate) fn same(a: Option<&str>, b: Option<&str>) -> bool {
    match (normalized(a), normalized(b)) {
        (None, None) => true,
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b) || folded(a).eq(folded(b)),
        _ => false,
    }
}
